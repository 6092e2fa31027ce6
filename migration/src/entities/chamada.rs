//! Attendance session: one class meeting on one date

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "chamada")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id_chamada: i32,
    pub users_id_usuario: i32,
    pub turmas_id_turma: i32,
    pub data_aula: Date,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::turma::Entity",
        from = "Column::TurmasIdTurma",
        to = "super::turma::Column::IdTurma",
        on_delete = "Restrict"
    )]
    Turma,
    #[sea_orm(has_many = "super::presenca::Entity")]
    Presenca,
}

impl Related<super::turma::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Turma.def()
    }
}

impl Related<super::presenca::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Presenca.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
