//! Course management service
//!
//! 课程可在创建时附带班级，课程与班级在同一事务中写入。

use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use ts_rs::TS;

use crate::errors::{Result, SysocialError};
use crate::services::TurmaInput;
use crate::services::validation::Required;
use crate::storage::SeaOrmStorage;
use crate::utils::{non_empty, parse_bool_flag};
use migration::entities::{curso, turma};

#[derive(Debug, Clone, Default, Deserialize, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/app/services/types.generated.ts")]
pub struct CursoInput {
    pub nome: Option<String>,
    pub vagas_totais: Option<i32>,
    pub ativo: Option<bool>,
}

/// POST /cursos 请求体
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/app/services/types.generated.ts")]
pub struct CreateCursoRequest {
    #[serde(flatten)]
    pub curso: CursoInput,
    pub turmas: Option<Vec<TurmaInput>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CursoFilter {
    /// `true` / `1` 为真，其余为假
    pub ativo: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CursoComTurmas {
    #[serde(flatten)]
    pub curso: curso::Model,
    pub turmas: Vec<turma::Model>,
}

fn check_vagas_totais(vagas: i32) -> Result<i32> {
    if vagas < 0 {
        return Err(SysocialError::validation(
            "vagas_totais não pode ser negativo",
        ));
    }
    Ok(vagas)
}

pub struct CursoService {
    storage: Arc<SeaOrmStorage>,
}

impl CursoService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    pub async fn list(&self, filter: &CursoFilter) -> Result<Vec<curso::Model>> {
        let ativo = filter.ativo.as_deref().map(parse_bool_flag);
        let db = self.storage.get_db();

        self.storage
            .read("list_cursos", || async move {
                let mut query = curso::Entity::find();
                if let Some(ativo) = ativo {
                    query = query.filter(curso::Column::Ativo.eq(ativo));
                }
                query.order_by_asc(curso::Column::IdCurso).all(db).await
            })
            .await
    }

    pub async fn get(&self, id: i32) -> Result<curso::Model> {
        let db = self.storage.get_db();
        self.storage
            .read("get_curso", || curso::Entity::find_by_id(id).one(db))
            .await?
            .ok_or_else(|| SysocialError::not_found("Curso não encontrado"))
    }

    /// 课程下的班级；课程不存在时 404
    pub async fn turmas(&self, id: i32) -> Result<Vec<turma::Model>> {
        self.get(id).await?;

        let db = self.storage.get_db();
        self.storage
            .read("list_turmas_curso", || {
                turma::Entity::find()
                    .filter(turma::Column::CursosIdCurso.eq(id))
                    .order_by_asc(turma::Column::IdTurma)
                    .all(db)
            })
            .await
    }

    pub async fn com_turmas(&self, id: i32) -> Result<CursoComTurmas> {
        let curso = self.get(id).await?;
        let turmas = self.turmas(id).await?;
        Ok(CursoComTurmas { curso, turmas })
    }

    pub async fn create(&self, req: CreateCursoRequest) -> Result<CursoComTurmas> {
        let mut required = Required::new();
        let nome = required.text("nome", &req.curso.nome).to_string();
        let vagas_totais = required.value("vagas_totais", req.curso.vagas_totais);

        let turmas = req.turmas.unwrap_or_default();
        for (i, turma) in turmas.iter().enumerate() {
            let mut nested = Required::nested(format!("turmas[{}]", i));
            turma.check_required(&mut nested, false);
            required.merge(nested);
        }
        required.finish()?;
        let vagas_totais = check_vagas_totais(vagas_totais)?;

        let txn = self.storage.get_db().begin().await?;

        let curso = curso::ActiveModel {
            nome: Set(nome),
            vagas_totais: Set(vagas_totais),
            vagas_restantes: Set(vagas_totais),
            ativo: Set(req.curso.ativo.unwrap_or(true)),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut criadas = Vec::with_capacity(turmas.len());
        for turma in &turmas {
            criadas.push(turma.build_new(curso.id_curso)?.insert(&txn).await?);
        }

        txn.commit().await?;

        info!(
            "Curso {} criado com {} turma(s)",
            curso.id_curso,
            criadas.len()
        );
        Ok(CursoComTurmas {
            curso,
            turmas: criadas,
        })
    }

    /// 部分更新；`vagas_totais` 变化时按差值调整剩余名额
    pub async fn update(&self, id: i32, input: CursoInput) -> Result<curso::Model> {
        let existing = self.get(id).await?;
        let mut model: curso::ActiveModel = existing.clone().into();
        let mut changed = false;

        if let Some(nome) = non_empty(input.nome.as_deref()) {
            model.nome = Set(nome.to_string());
            changed = true;
        }
        if let Some(vagas) = input.vagas_totais {
            let vagas = check_vagas_totais(vagas)?;
            model.vagas_totais = Set(vagas);
            model.vagas_restantes =
                Set(existing.vagas_restantes + (vagas - existing.vagas_totais));
            changed = true;
        }
        if let Some(ativo) = input.ativo {
            model.ativo = Set(ativo);
            changed = true;
        }

        if !changed {
            return Ok(existing);
        }

        let updated = model.update(self.storage.get_db()).await?;
        info!("Curso {} atualizado", id);
        Ok(updated)
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        let result = curso::Entity::delete_by_id(id)
            .exec(self.storage.get_db())
            .await?;

        if result.rows_affected == 0 {
            return Err(SysocialError::not_found("Curso não encontrado"));
        }
        info!("Curso {} removido", id);
        Ok(())
    }
}
