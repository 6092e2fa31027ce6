use sea_orm_migration::prelude::*;

use crate::m20261001_000002_alunos_responsaveis::Aluno;
use crate::m20261001_000003_cursos_turmas::Turma;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Matricula::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Matricula::IdMatricula)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Matricula::AlunoIdAluno).integer().not_null())
                    .col(
                        ColumnDef::new(Matricula::TurmasIdTurma)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Matricula::DataMatricula)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Matricula::Status)
                            .string_len(32)
                            .not_null()
                            .default("ativo"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_matricula_aluno")
                            .from(Matricula::Table, Matricula::AlunoIdAluno)
                            .to(Aluno::Table, Aluno::IdAluno)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_matricula_turma")
                            .from(Matricula::Table, Matricula::TurmasIdTurma)
                            .to(Turma::Table, Turma::IdTurma)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DocumentoAluno::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DocumentoAluno::IdDocumento)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DocumentoAluno::AlunoIdAluno)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DocumentoAluno::TipoDocumento)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DocumentoAluno::CaminhoArquivo)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DocumentoAluno::DataUpload)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_documento_aluno")
                            .from(DocumentoAluno::Table, DocumentoAluno::AlunoIdAluno)
                            .to(Aluno::Table, Aluno::IdAluno)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_matricula_turma")
                    .table(Matricula::Table)
                    .col(Matricula::TurmasIdTurma)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_matricula_turma").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DocumentoAluno::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Matricula::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Matricula {
    Table,
    IdMatricula,
    AlunoIdAluno,
    TurmasIdTurma,
    DataMatricula,
    Status,
}

#[derive(DeriveIden)]
enum DocumentoAluno {
    Table,
    IdDocumento,
    AlunoIdAluno,
    TipoDocumento,
    CaminhoArquivo,
    DataUpload,
}
