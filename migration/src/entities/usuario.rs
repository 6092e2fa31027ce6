//! System user entity (login accounts)

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "usuarios")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id_usuario: i32,
    #[sea_orm(unique)]
    pub username: String,
    pub nome: String,
    pub telefone: Option<String>,
    #[sea_orm(unique)]
    pub email: String,
    pub tipo: String,
    /// Argon2id hash, never serialized
    pub senha_hash: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
