//! Attendance record service
//!
//! 出勤状态在库中以 `presente` + `justificada` 两个布尔值保存，
//! 接口层使用 `P` / `F` / `FJ` 三种状态码。

use std::collections::HashMap;
use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, FromQueryResult, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use tracing::{debug, info};
use ts_rs::TS;

use crate::errors::{Result, SysocialError};
use crate::services::validation::Required;
use crate::storage::SeaOrmStorage;
use crate::utils::parse_bool_flag;
use migration::entities::{aluno, chamada, presenca};

/// 出勤状态
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumString,
    AsRefStr,
    Display,
    TS,
)]
#[ts(export, export_to = "../frontend/src/app/services/types.generated.ts")]
pub enum StatusPresenca {
    /// 出席
    P,
    /// 缺席
    F,
    /// 缺席（已说明理由）
    FJ,
}

impl StatusPresenca {
    /// (presente, justificada)
    pub fn flags(self) -> (bool, bool) {
        match self {
            StatusPresenca::P => (true, false),
            StatusPresenca::F => (false, false),
            StatusPresenca::FJ => (false, true),
        }
    }

    pub fn from_flags(presente: bool, justificada: bool) -> Self {
        match (presente, justificada) {
            (true, _) => StatusPresenca::P,
            (false, true) => StatusPresenca::FJ,
            (false, false) => StatusPresenca::F,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/app/services/types.generated.ts")]
pub struct PresencaInput {
    pub chamada_id_chamada: Option<i32>,
    pub aluno_id_aluno: Option<i32>,
    pub presente: Option<bool>,
    pub justificada: Option<bool>,
    pub observacao: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PresencaFilter {
    pub chamada: Option<i32>,
    pub aluno: Option<i32>,
    /// `true` / `1` 为真，其余为假
    pub presente: Option<String>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/app/services/types.generated.ts")]
pub struct PresencaLoteItem {
    pub aluno_id_aluno: i32,
    pub status: StatusPresenca,
    pub observacao: Option<String>,
}

/// POST /presencas/lote 请求体
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/app/services/types.generated.ts")]
pub struct PresencaLoteRequest {
    pub chamada_id_chamada: Option<i32>,
    #[serde(default)]
    pub presencas: Vec<PresencaLoteItem>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/app/services/types.generated.ts")]
pub struct LoteResultado {
    pub inseridas: u32,
    pub atualizadas: u32,
}

/// 出勤记录 + 学生姓名
#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct PresencaComAluno {
    pub id_presenca: i32,
    pub chamada_id_chamada: i32,
    pub aluno_id_aluno: i32,
    pub presente: bool,
    pub justificada: bool,
    pub observacao: Option<String>,
    pub nome_completo: String,
}

fn not_found() -> SysocialError {
    SysocialError::not_found("Presença não encontrada")
}

pub struct PresencaService {
    storage: Arc<SeaOrmStorage>,
}

impl PresencaService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    pub async fn list(&self, filter: &PresencaFilter) -> Result<Vec<presenca::Model>> {
        let mut cond = Condition::all();
        if let Some(chamada) = filter.chamada {
            cond = cond.add(presenca::Column::ChamadaIdChamada.eq(chamada));
        }
        if let Some(aluno) = filter.aluno {
            cond = cond.add(presenca::Column::AlunoIdAluno.eq(aluno));
        }
        if let Some(presente) = filter.presente.as_deref() {
            cond = cond.add(presenca::Column::Presente.eq(parse_bool_flag(presente)));
        }

        let db = self.storage.get_db();
        self.storage
            .read("list_presencas", || {
                presenca::Entity::find()
                    .filter(cond.clone())
                    .order_by_desc(presenca::Column::IdPresenca)
                    .all(db)
            })
            .await
    }

    pub async fn get(&self, id: i32) -> Result<presenca::Model> {
        let db = self.storage.get_db();
        self.storage
            .read("get_presenca", || presenca::Entity::find_by_id(id).one(db))
            .await?
            .ok_or_else(not_found)
    }

    /// 某次点名的全部记录，按学生姓名排序
    pub async fn by_chamada(&self, chamada_id: i32) -> Result<Vec<PresencaComAluno>> {
        let db = self.storage.get_db();
        self.storage
            .read("list_presencas_chamada", || {
                presenca::Entity::find()
                    .select_only()
                    .columns([
                        presenca::Column::IdPresenca,
                        presenca::Column::ChamadaIdChamada,
                        presenca::Column::AlunoIdAluno,
                        presenca::Column::Presente,
                        presenca::Column::Justificada,
                        presenca::Column::Observacao,
                    ])
                    .column(aluno::Column::NomeCompleto)
                    .join(JoinType::InnerJoin, presenca::Relation::Aluno.def())
                    .filter(presenca::Column::ChamadaIdChamada.eq(chamada_id))
                    .order_by_asc(aluno::Column::NomeCompleto)
                    .into_model::<PresencaComAluno>()
                    .all(db)
            })
            .await
    }

    pub async fn create(&self, input: PresencaInput) -> Result<presenca::Model> {
        let mut req = Required::new();
        let chamada_id = req.value("chamada_id_chamada", input.chamada_id_chamada);
        let aluno_id = req.value("aluno_id_aluno", input.aluno_id_aluno);
        req.finish()?;

        let model = presenca::ActiveModel {
            chamada_id_chamada: Set(chamada_id),
            aluno_id_aluno: Set(aluno_id),
            presente: Set(input.presente.unwrap_or(false)),
            justificada: Set(input.justificada.unwrap_or(false)),
            observacao: Set(input.observacao),
            ..Default::default()
        }
        .insert(self.storage.get_db())
        .await?;

        info!(
            "Presença {} registrada (chamada {}, aluno {})",
            model.id_presenca, chamada_id, aluno_id
        );
        Ok(model)
    }

    /// 批量登记：已有记录更新，否则插入；任何学生不存在或未激活则全部回滚
    pub async fn lote(&self, req: PresencaLoteRequest) -> Result<LoteResultado> {
        let mut required = Required::new();
        let chamada_id = required.value("chamada_id_chamada", req.chamada_id_chamada);
        required.finish()?;

        if req.presencas.is_empty() {
            return Err(SysocialError::validation(
                "A lista de presenças não pode ser vazia",
            ));
        }

        let txn = self.storage.get_db().begin().await?;

        chamada::Entity::find_by_id(chamada_id)
            .one(&txn)
            .await?
            .ok_or_else(|| SysocialError::not_found("Aula não encontrada"))?;

        let ids: Vec<i32> = req.presencas.iter().map(|p| p.aluno_id_aluno).collect();
        let ativos: HashMap<i32, bool> = aluno::Entity::find()
            .filter(aluno::Column::IdAluno.is_in(ids.iter().copied()))
            .all(&txn)
            .await?
            .into_iter()
            .map(|a| (a.id_aluno, a.ativo))
            .collect();

        let invalidos: Vec<String> = ids
            .iter()
            .filter(|id| !ativos.get(id).copied().unwrap_or(false))
            .map(|id| id.to_string())
            .collect();
        if !invalidos.is_empty() {
            return Err(SysocialError::validation(format!(
                "Alunos inexistentes ou inativos: {}",
                invalidos.join(", ")
            )));
        }

        let mut existentes: HashMap<i32, presenca::Model> = presenca::Entity::find()
            .filter(presenca::Column::ChamadaIdChamada.eq(chamada_id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|p| (p.aluno_id_aluno, p))
            .collect();

        let mut resultado = LoteResultado::default();
        for item in req.presencas {
            let (presente, justificada) = item.status.flags();
            match existentes.get(&item.aluno_id_aluno).cloned() {
                Some(existing) => {
                    let mut model: presenca::ActiveModel = existing.into();
                    model.presente = Set(presente);
                    model.justificada = Set(justificada);
                    model.observacao = Set(item.observacao);
                    let atualizada = model.update(&txn).await?;
                    existentes.insert(atualizada.aluno_id_aluno, atualizada);
                    resultado.atualizadas += 1;
                }
                None => {
                    // 同一批次中重复出现的学生后续按更新处理
                    let inserida = presenca::ActiveModel {
                        chamada_id_chamada: Set(chamada_id),
                        aluno_id_aluno: Set(item.aluno_id_aluno),
                        presente: Set(presente),
                        justificada: Set(justificada),
                        observacao: Set(item.observacao),
                        ..Default::default()
                    }
                    .insert(&txn)
                    .await?;
                    existentes.insert(inserida.aluno_id_aluno, inserida);
                    resultado.inseridas += 1;
                }
            }
        }

        txn.commit().await?;

        info!(
            "Chamada {}: {} presença(s) inserida(s), {} atualizada(s)",
            chamada_id, resultado.inseridas, resultado.atualizadas
        );
        Ok(resultado)
    }

    /// 删除某次点名的全部记录
    pub async fn delete_by_chamada(&self, chamada_id: i32) -> Result<u64> {
        let result = presenca::Entity::delete_many()
            .filter(presenca::Column::ChamadaIdChamada.eq(chamada_id))
            .exec(self.storage.get_db())
            .await?;

        debug!(
            "Chamada {}: {} presença(s) removida(s)",
            chamada_id, result.rows_affected
        );
        Ok(result.rows_affected)
    }

    pub async fn update(&self, id: i32, input: PresencaInput) -> Result<presenca::Model> {
        let existing = self.get(id).await?;
        let mut model: presenca::ActiveModel = existing.clone().into();
        let mut changed = false;

        if let Some(v) = input.chamada_id_chamada {
            model.chamada_id_chamada = Set(v);
            changed = true;
        }
        if let Some(v) = input.aluno_id_aluno {
            model.aluno_id_aluno = Set(v);
            changed = true;
        }
        if let Some(v) = input.presente {
            model.presente = Set(v);
            changed = true;
        }
        if let Some(v) = input.justificada {
            model.justificada = Set(v);
            changed = true;
        }
        if let Some(v) = input.observacao {
            model.observacao = Set(Some(v));
            changed = true;
        }

        if !changed {
            return Ok(existing);
        }

        let updated = model.update(self.storage.get_db()).await?;
        info!("Presença {} atualizada", id);
        Ok(updated)
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        let result = presenca::Entity::delete_by_id(id)
            .exec(self.storage.get_db())
            .await?;

        if result.rows_affected == 0 {
            return Err(not_found());
        }
        info!("Presença {} removida", id);
        Ok(())
    }
}
