use sea_orm_migration::prelude::*;

use crate::m20261001_000001_usuarios::Usuarios;
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
                    .table(Chamada::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Chamada::IdChamada)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Chamada::UsersIdUsuario).integer().not_null())
                    .col(ColumnDef::new(Chamada::TurmasIdTurma).integer().not_null())
                    .col(ColumnDef::new(Chamada::DataAula).date().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_chamada_usuario")
                            .from(Chamada::Table, Chamada::UsersIdUsuario)
                            .to(Usuarios::Table, Usuarios::IdUsuario)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_chamada_turma")
                            .from(Chamada::Table, Chamada::TurmasIdTurma)
                            .to(Turma::Table, Turma::IdTurma)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // 同一班级同一天只允许一次点名
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_chamada_turma_data")
                    .table(Chamada::Table)
                    .col(Chamada::TurmasIdTurma)
                    .col(Chamada::DataAula)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Presenca::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Presenca::IdPresenca)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Presenca::ChamadaIdChamada)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Presenca::AlunoIdAluno).integer().not_null())
                    .col(
                        ColumnDef::new(Presenca::Presente)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Presenca::Justificada)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Presenca::Observacao).text().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_presenca_chamada")
                            .from(Presenca::Table, Presenca::ChamadaIdChamada)
                            .to(Chamada::Table, Chamada::IdChamada)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_presenca_aluno")
                            .from(Presenca::Table, Presenca::AlunoIdAluno)
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
                    .name("uq_presenca_chamada_aluno")
                    .table(Presenca::Table)
                    .col(Presenca::ChamadaIdChamada)
                    .col(Presenca::AlunoIdAluno)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("uq_presenca_chamada_aluno").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Presenca::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uq_chamada_turma_data").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Chamada::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Chamada {
    Table,
    IdChamada,
    UsersIdUsuario,
    TurmasIdTurma,
    DataAula,
}

#[derive(DeriveIden)]
enum Presenca {
    Table,
    IdPresenca,
    ChamadaIdChamada,
    AlunoIdAluno,
    Presente,
    Justificada,
    Observacao,
}
