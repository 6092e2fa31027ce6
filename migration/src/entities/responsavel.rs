use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "responsavel")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id_responsavel: i32,
    pub nome_completo: String,
    /// 按 CPF 去重
    #[sea_orm(unique)]
    pub cpf: String,
    pub telefone: String,
    pub telefone_recado1: String,
    pub telefone_recado2: String,
    pub parentesco: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::responsavel_aluno::Entity")]
    ResponsavelAluno,
}

impl Related<super::responsavel_aluno::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ResponsavelAluno.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
