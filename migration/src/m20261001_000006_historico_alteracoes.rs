use sea_orm_migration::prelude::*;

use crate::m20261001_000001_usuarios::Usuarios;
use crate::m20261001_000004_matriculas_documentos::Matricula;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 审计记录只追加，不做级联删除
        manager
            .create_table(
                Table::create()
                    .table(HistoricoAlteracoes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(HistoricoAlteracoes::IdHistorico)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(HistoricoAlteracoes::UsersIdUsuario)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(HistoricoAlteracoes::MatriculaIdMatricula)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(HistoricoAlteracoes::DataHora)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(HistoricoAlteracoes::CampoAlterado)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(HistoricoAlteracoes::ValorAntigo).text().null())
                    .col(ColumnDef::new(HistoricoAlteracoes::ValorNovo).text().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_historico_usuario")
                            .from(
                                HistoricoAlteracoes::Table,
                                HistoricoAlteracoes::UsersIdUsuario,
                            )
                            .to(Usuarios::Table, Usuarios::IdUsuario)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_historico_matricula")
                            .from(
                                HistoricoAlteracoes::Table,
                                HistoricoAlteracoes::MatriculaIdMatricula,
                            )
                            .to(Matricula::Table, Matricula::IdMatricula)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_historico_data_hora")
                    .table(HistoricoAlteracoes::Table)
                    .col(HistoricoAlteracoes::DataHora)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_historico_matricula")
                    .table(HistoricoAlteracoes::Table)
                    .col(HistoricoAlteracoes::MatriculaIdMatricula)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_historico_matricula").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_historico_data_hora").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(HistoricoAlteracoes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum HistoricoAlteracoes {
    Table,
    IdHistorico,
    UsersIdUsuario,
    MatriculaIdMatricula,
    DataHora,
    CampoAlterado,
    ValorAntigo,
    ValorNovo,
}
