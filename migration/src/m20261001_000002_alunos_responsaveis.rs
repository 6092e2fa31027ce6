use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 学生表
        manager
            .create_table(
                Table::create()
                    .table(Aluno::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Aluno::IdAluno)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Aluno::NomeCompleto).string().not_null())
                    .col(ColumnDef::new(Aluno::DataNascimento).date().not_null())
                    .col(ColumnDef::new(Aluno::Sexo).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Aluno::Cpf)
                            .string_len(14)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Aluno::Telefone).string().not_null())
                    .col(ColumnDef::new(Aluno::EscolaAtual).string().not_null())
                    .col(ColumnDef::new(Aluno::SerieAtual).integer().not_null())
                    .col(ColumnDef::new(Aluno::PeriodoEscolar).string().not_null())
                    .col(ColumnDef::new(Aluno::NomeRua).string().not_null())
                    .col(ColumnDef::new(Aluno::NumeroEndereco).integer().not_null())
                    .col(ColumnDef::new(Aluno::Bairro).string().not_null())
                    .col(ColumnDef::new(Aluno::DataMatricula).date().not_null())
                    .col(ColumnDef::new(Aluno::Observacoes).text().not_null())
                    .col(ColumnDef::new(Aluno::Cep).string_len(9).null())
                    .col(
                        ColumnDef::new(Aluno::Ativo)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        // 监护人表（CPF 唯一，用于去重）
        manager
            .create_table(
                Table::create()
                    .table(Responsavel::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Responsavel::IdResponsavel)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Responsavel::NomeCompleto).string().not_null())
                    .col(
                        ColumnDef::new(Responsavel::Cpf)
                            .string_len(14)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Responsavel::Telefone).string().not_null())
                    .col(
                        ColumnDef::new(Responsavel::TelefoneRecado1)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Responsavel::TelefoneRecado2)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Responsavel::Parentesco).string().not_null())
                    .to_owned(),
            )
            .await?;

        // 关联表：复合主键 (responsavel, aluno)
        manager
            .create_table(
                Table::create()
                    .table(ResponsavelAluno::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ResponsavelAluno::ResponsavelIdResponsavel)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ResponsavelAluno::AlunoIdAluno)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ResponsavelAluno::Tipo)
                            .string_len(32)
                            .not_null()
                            .default("principal"),
                    )
                    .primary_key(
                        Index::create()
                            .col(ResponsavelAluno::ResponsavelIdResponsavel)
                            .col(ResponsavelAluno::AlunoIdAluno),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_responsavel_aluno_responsavel")
                            .from(
                                ResponsavelAluno::Table,
                                ResponsavelAluno::ResponsavelIdResponsavel,
                            )
                            .to(Responsavel::Table, Responsavel::IdResponsavel)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_responsavel_aluno_aluno")
                            .from(ResponsavelAluno::Table, ResponsavelAluno::AlunoIdAluno)
                            .to(Aluno::Table, Aluno::IdAluno)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ResponsavelAluno::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Responsavel::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Aluno::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Aluno {
    Table,
    IdAluno,
    NomeCompleto,
    DataNascimento,
    Sexo,
    Cpf,
    Telefone,
    EscolaAtual,
    SerieAtual,
    PeriodoEscolar,
    NomeRua,
    NumeroEndereco,
    Bairro,
    DataMatricula,
    Observacoes,
    Cep,
    Ativo,
}

#[derive(DeriveIden)]
pub(crate) enum Responsavel {
    Table,
    IdResponsavel,
    NomeCompleto,
    Cpf,
    Telefone,
    TelefoneRecado1,
    TelefoneRecado2,
    Parentesco,
}

#[derive(DeriveIden)]
enum ResponsavelAluno {
    Table,
    ResponsavelIdResponsavel,
    AlunoIdAluno,
    Tipo,
}
