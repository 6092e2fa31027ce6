use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "presenca")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id_presenca: i32,
    pub chamada_id_chamada: i32,
    pub aluno_id_aluno: i32,
    pub presente: bool,
    /// 缺勤但已说明理由（FJ）
    pub justificada: bool,
    #[sea_orm(column_type = "Text", nullable)]
    pub observacao: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::chamada::Entity",
        from = "Column::ChamadaIdChamada",
        to = "super::chamada::Column::IdChamada",
        on_delete = "Cascade"
    )]
    Chamada,
    #[sea_orm(
        belongs_to = "super::aluno::Entity",
        from = "Column::AlunoIdAluno",
        to = "super::aluno::Column::IdAluno",
        on_delete = "Cascade"
    )]
    Aluno,
}

impl Related<super::chamada::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Chamada.def()
    }
}

impl Related<super::aluno::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Aluno.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
