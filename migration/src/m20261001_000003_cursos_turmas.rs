use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Curso::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Curso::IdCurso)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Curso::Nome).string().not_null())
                    .col(ColumnDef::new(Curso::VagasTotais).integer().not_null())
                    .col(ColumnDef::new(Curso::VagasRestantes).integer().not_null())
                    .col(
                        ColumnDef::new(Curso::Ativo)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        // 删除课程时若仍有班级引用则拒绝（RESTRICT）
        manager
            .create_table(
                Table::create()
                    .table(Turma::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Turma::IdTurma)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Turma::CursosIdCurso).integer().not_null())
                    .col(ColumnDef::new(Turma::NomeTurma).string().not_null())
                    .col(ColumnDef::new(Turma::Descricao).text().null())
                    .col(ColumnDef::new(Turma::DiaSemana).string_len(16).not_null())
                    .col(ColumnDef::new(Turma::HoraInicio).string_len(8).not_null())
                    .col(ColumnDef::new(Turma::HoraFim).string_len(8).not_null())
                    .col(ColumnDef::new(Turma::VagasTurma).integer().not_null())
                    .col(ColumnDef::new(Turma::DataInicio).date().null())
                    .col(ColumnDef::new(Turma::DataFim).date().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_turma_curso")
                            .from(Turma::Table, Turma::CursosIdCurso)
                            .to(Curso::Table, Curso::IdCurso)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_turma_curso")
                    .table(Turma::Table)
                    .col(Turma::CursosIdCurso)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_turma_curso").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Turma::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Curso::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Curso {
    Table,
    IdCurso,
    Nome,
    VagasTotais,
    VagasRestantes,
    Ativo,
}

#[derive(DeriveIden)]
pub(crate) enum Turma {
    Table,
    IdTurma,
    CursosIdCurso,
    NomeTurma,
    Descricao,
    DiaSemana,
    HoraInicio,
    HoraFim,
    VagasTurma,
    DataInicio,
    DataFim,
}
