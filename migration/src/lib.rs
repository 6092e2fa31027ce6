pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m20261001_000001_usuarios;
mod m20261001_000002_alunos_responsaveis;
mod m20261001_000003_cursos_turmas;
mod m20261001_000004_matriculas_documentos;
mod m20261001_000005_chamadas_presencas;
mod m20261001_000006_historico_alteracoes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_usuarios::Migration),
            Box::new(m20261001_000002_alunos_responsaveis::Migration),
            Box::new(m20261001_000003_cursos_turmas::Migration),
            Box::new(m20261001_000004_matriculas_documentos::Migration),
            Box::new(m20261001_000005_chamadas_presencas::Migration),
            Box::new(m20261001_000006_historico_alteracoes::Migration),
        ]
    }
}
