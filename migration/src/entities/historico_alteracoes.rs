//! Append-only audit trail of enrollment field changes

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "historico_alteracoes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id_historico: i32,
    pub users_id_usuario: i32,
    pub matricula_id_matricula: i32,
    pub data_hora: DateTimeUtc,
    pub campo_alterado: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub valor_antigo: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub valor_novo: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
