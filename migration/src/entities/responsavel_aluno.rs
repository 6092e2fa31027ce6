//! Guardian <-> student link, `tipo` marks the principal guardian

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "responsavel_aluno")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub responsavel_id_responsavel: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub aluno_id_aluno: i32,
    pub tipo: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::responsavel::Entity",
        from = "Column::ResponsavelIdResponsavel",
        to = "super::responsavel::Column::IdResponsavel",
        on_delete = "Cascade"
    )]
    Responsavel,
    #[sea_orm(
        belongs_to = "super::aluno::Entity",
        from = "Column::AlunoIdAluno",
        to = "super::aluno::Column::IdAluno",
        on_delete = "Cascade"
    )]
    Aluno,
}

impl Related<super::responsavel::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Responsavel.def()
    }
}

impl Related<super::aluno::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Aluno.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
