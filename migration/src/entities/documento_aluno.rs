//! Document metadata attached to a student (the file itself lives elsewhere)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "documento_aluno")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id_documento: i32,
    pub aluno_id_aluno: i32,
    pub tipo_documento: String,
    #[sea_orm(column_type = "Text")]
    pub caminho_arquivo: String,
    pub data_upload: DateTimeUtc,
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
}

impl Related<super::aluno::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Aluno.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
