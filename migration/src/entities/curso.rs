use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "curso")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id_curso: i32,
    pub nome: String,
    pub vagas_totais: i32,
    pub vagas_restantes: i32,
    pub ativo: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::turma::Entity")]
    Turma,
}

impl Related<super::turma::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Turma.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
