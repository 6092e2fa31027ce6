use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "turma")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id_turma: i32,
    pub cursos_id_curso: i32,
    pub nome_turma: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub descricao: Option<String>,
    /// 星期名称（葡语），如 "Segunda-feira"
    pub dia_semana: String,
    pub hora_inicio: String,
    pub hora_fim: String,
    pub vagas_turma: i32,
    pub data_inicio: Option<Date>,
    pub data_fim: Option<Date>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::curso::Entity",
        from = "Column::CursosIdCurso",
        to = "super::curso::Column::IdCurso",
        on_delete = "Restrict"
    )]
    Curso,
    #[sea_orm(has_many = "super::matricula::Entity")]
    Matricula,
    #[sea_orm(has_many = "super::chamada::Entity")]
    Chamada,
}

impl Related<super::curso::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Curso.def()
    }
}

impl Related<super::matricula::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Matricula.def()
    }
}

impl Related<super::chamada::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Chamada.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
