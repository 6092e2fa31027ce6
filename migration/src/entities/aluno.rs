use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "aluno")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id_aluno: i32,
    pub nome_completo: String,
    pub data_nascimento: Date,
    pub sexo: String,
    #[sea_orm(unique)]
    pub cpf: String,
    pub telefone: String,
    pub escola_atual: String,
    pub serie_atual: i32,
    pub periodo_escolar: String,
    pub nome_rua: String,
    pub numero_endereco: i32,
    pub bairro: String,
    pub data_matricula: Date,
    #[sea_orm(column_type = "Text")]
    pub observacoes: String,
    pub cep: Option<String>,
    pub ativo: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::matricula::Entity")]
    Matricula,
    #[sea_orm(has_many = "super::responsavel_aluno::Entity")]
    ResponsavelAluno,
    #[sea_orm(has_many = "super::documento_aluno::Entity")]
    DocumentoAluno,
}

impl Related<super::matricula::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Matricula.def()
    }
}

impl Related<super::documento_aluno::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DocumentoAluno.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
