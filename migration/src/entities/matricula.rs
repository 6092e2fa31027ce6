use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "matricula")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id_matricula: i32,
    pub aluno_id_aluno: i32,
    pub turmas_id_turma: i32,
    pub data_matricula: DateTimeUtc,
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::aluno::Entity",
        from = "Column::AlunoIdAluno",
        to = "super::aluno::Column::IdAluno",
        on_delete = "Cascade"
    )]
    Aluno,
    #[sea_orm(
        belongs_to = "super::turma::Entity",
        from = "Column::TurmasIdTurma",
        to = "super::turma::Column::IdTurma",
        on_delete = "Restrict"
    )]
    Turma,
}

impl Related<super::aluno::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Aluno.def()
    }
}

impl Related<super::turma::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Turma.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
