//! Audit trail service
//!
//! 审计记录只允许新增与查询，修改与删除一律拒绝。

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, FromQueryResult, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    sea_query::{Expr, Func},
};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;
use ts_rs::TS;

use crate::errors::{Result, SysocialError};
use crate::services::validation::Required;
use crate::services::{Page, ilike};
use crate::storage::SeaOrmStorage;
use crate::utils::dates::{DateBound, parse_datetime, parse_range_end, parse_range_start};
use crate::utils::{PageRequest, non_empty};
use migration::entities::historico_alteracoes as historico;

pub const IMMUTABLE_MESSAGE: &str = "Registros de auditoria são imutáveis";

/// 区分“字段缺失”与“显式 null”
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditoriaInput {
    pub users_id_usuario: Option<i32>,
    pub matricula_id_matricula: Option<i32>,
    pub campo_alterado: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub valor_antigo: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub valor_novo: Option<Option<String>>,
    pub data_hora: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/app/services/types.generated.ts")]
pub struct AuditoriaFilter {
    pub usuario: Option<i32>,
    pub matricula: Option<i32>,
    pub campo: Option<String>,
    pub de: Option<String>,
    pub ate: Option<String>,
    pub q: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/app/services/types.generated.ts")]
pub struct PeriodoFilter {
    pub de: Option<String>,
    pub ate: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromQueryResult, TS)]
#[ts(export, export_to = "../frontend/src/app/services/types.generated.ts")]
pub struct TotalPorCampo {
    pub campo_alterado: String,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, FromQueryResult, TS)]
#[ts(export, export_to = "../frontend/src/app/services/types.generated.ts")]
pub struct TotalPorUsuario {
    pub users_id_usuario: i32,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/app/services/types.generated.ts")]
pub struct AuditoriaResumo {
    pub por_campo: Vec<TotalPorCampo>,
    pub por_usuario: Vec<TotalPorUsuario>,
}

/// `de` / `ate` 时间范围条件
fn periodo_condition(de: Option<&str>, ate: Option<&str>) -> Result<Condition> {
    let mut cond = Condition::all();
    if let Some(de) = non_empty(de) {
        cond = cond.add(historico::Column::DataHora.gte(parse_range_start("de", de)?));
    }
    if let Some(ate) = non_empty(ate) {
        cond = match parse_range_end("ate", ate)? {
            DateBound::Inclusive(t) => cond.add(historico::Column::DataHora.lte(t)),
            DateBound::Exclusive(t) => cond.add(historico::Column::DataHora.lt(t)),
        };
    }
    Ok(cond)
}

pub struct AuditoriaService {
    storage: Arc<SeaOrmStorage>,
}

impl AuditoriaService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    fn build_condition(filter: &AuditoriaFilter) -> Result<Condition> {
        let mut cond = periodo_condition(filter.de.as_deref(), filter.ate.as_deref())?;

        if let Some(usuario) = filter.usuario {
            cond = cond.add(historico::Column::UsersIdUsuario.eq(usuario));
        }
        if let Some(matricula) = filter.matricula {
            cond = cond.add(historico::Column::MatriculaIdMatricula.eq(matricula));
        }
        if let Some(campo) = non_empty(filter.campo.as_deref()) {
            cond = cond.add(ilike(historico::Column::CampoAlterado, campo));
        }
        if let Some(q) = non_empty(filter.q.as_deref()) {
            cond = cond.add(
                Condition::any()
                    .add(ilike(historico::Column::ValorAntigo, q))
                    .add(ilike(historico::Column::ValorNovo, q)),
            );
        }
        Ok(cond)
    }

    pub async fn list(&self, filter: &AuditoriaFilter) -> Result<Page<historico::Model>> {
        let cond = Self::build_condition(filter)?;
        let page = PageRequest::new(filter.page, filter.limit);
        let db = self.storage.get_db();

        let (items, total) = self
            .storage
            .read("list_auditoria", || {
                let cond = cond.clone();
                async move {
                    let paginator = historico::Entity::find()
                        .filter(cond)
                        .order_by_desc(historico::Column::DataHora)
                        .order_by_desc(historico::Column::IdHistorico)
                        .paginate(db, page.limit);
                    let total = paginator.num_items().await?;
                    let items = paginator.fetch_page(page.zero_based()).await?;
                    Ok((items, total))
                }
            })
            .await?;

        Ok(Page::new(items, page.info(total)))
    }

    /// 按字段与按用户的变更次数
    pub async fn resumo(&self, filter: &PeriodoFilter) -> Result<AuditoriaResumo> {
        let cond = periodo_condition(filter.de.as_deref(), filter.ate.as_deref())?;
        let db = self.storage.get_db();

        self.storage
            .read("resumo_auditoria", || {
                let cond = cond.clone();
                async move {
                    let total = || -> Expr { Func::count(Expr::col(historico::Column::IdHistorico)).into() };

                    let por_campo = historico::Entity::find()
                        .select_only()
                        .column(historico::Column::CampoAlterado)
                        .column_as(total(), "total")
                        .filter(cond.clone())
                        .group_by(historico::Column::CampoAlterado)
                        .order_by(total(), Order::Desc)
                        .order_by_asc(historico::Column::CampoAlterado)
                        .into_model::<TotalPorCampo>()
                        .all(db)
                        .await?;

                    let por_usuario = historico::Entity::find()
                        .select_only()
                        .column(historico::Column::UsersIdUsuario)
                        .column_as(total(), "total")
                        .filter(cond)
                        .group_by(historico::Column::UsersIdUsuario)
                        .order_by(total(), Order::Desc)
                        .order_by_asc(historico::Column::UsersIdUsuario)
                        .into_model::<TotalPorUsuario>()
                        .all(db)
                        .await?;

                    Ok(AuditoriaResumo {
                        por_campo,
                        por_usuario,
                    })
                }
            })
            .await
    }

    /// 某报名的完整变更记录，最新在前
    pub async fn trilha(&self, matricula_id: i32) -> Result<Vec<historico::Model>> {
        let db = self.storage.get_db();
        self.storage
            .read("trilha_matricula", || {
                historico::Entity::find()
                    .filter(historico::Column::MatriculaIdMatricula.eq(matricula_id))
                    .order_by_desc(historico::Column::DataHora)
                    .order_by_desc(historico::Column::IdHistorico)
                    .all(db)
            })
            .await
    }

    pub async fn get(&self, id: i32) -> Result<historico::Model> {
        let db = self.storage.get_db();
        self.storage
            .read("get_auditoria", || historico::Entity::find_by_id(id).one(db))
            .await?
            .ok_or_else(|| SysocialError::not_found("Registro de auditoria não encontrado"))
    }

    pub async fn create(&self, input: AuditoriaInput) -> Result<historico::Model> {
        let mut req = Required::new();
        let usuario = req.value("users_id_usuario", input.users_id_usuario);
        let matricula = req.value("matricula_id_matricula", input.matricula_id_matricula);
        let campo = req.text("campo_alterado", &input.campo_alterado).to_string();
        let valor_antigo = req.object("valor_antigo", input.valor_antigo);
        let valor_novo = req.object("valor_novo", input.valor_novo);
        req.finish()?;

        let data_hora = match non_empty(input.data_hora.as_deref()) {
            Some(s) => parse_datetime("data_hora", s)?,
            None => Utc::now(),
        };

        let model = historico::ActiveModel {
            users_id_usuario: Set(usuario),
            matricula_id_matricula: Set(matricula),
            data_hora: Set(data_hora),
            campo_alterado: Set(campo),
            valor_antigo: Set(valor_antigo.flatten()),
            valor_novo: Set(valor_novo.flatten()),
            ..Default::default()
        }
        .insert(self.storage.get_db())
        .await?;

        info!(
            "Auditoria {} registrada para matrícula {}",
            model.id_historico, model.matricula_id_matricula
        );
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_distinguishes_null_from_missing() {
        let input: AuditoriaInput = serde_json::from_str(
            r#"{"users_id_usuario":1,"matricula_id_matricula":2,"campo_alterado":"status","valor_antigo":null}"#,
        )
        .unwrap();
        assert_eq!(input.valor_antigo, Some(None));
        assert_eq!(input.valor_novo, None);
    }

    #[test]
    fn test_periodo_condition_rejects_bad_dates() {
        assert!(periodo_condition(Some("2024-01-01"), Some("2024-01-31")).is_ok());
        assert!(matches!(
            periodo_condition(Some("ontem"), None),
            Err(SysocialError::InvalidDate(_))
        ));
        assert!(matches!(
            periodo_condition(None, Some("31/01/2024")),
            Err(SysocialError::InvalidDate(_))
        ));
    }
}
