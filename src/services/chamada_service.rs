//! Attendance session (aula / chamada) service
//!
//! 包含月度点名表：按班级的上课星期计算当月日期，缺失的点名在同一事务中补建。

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ts_rs::TS;

use crate::errors::{Result, SysocialError};
use crate::services::validation::Required;
use crate::services::{Page, PeriodoFilter, StatusPresenca};
use crate::storage::SeaOrmStorage;
use crate::utils::dates::{dates_in_month, parse_ano_mes, parse_date, parse_dia_semana};
use crate::utils::{PageRequest, non_empty};
use migration::entities::{aluno, chamada, matricula, presenca, turma};

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Default, Deserialize, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/app/services/types.generated.ts")]
pub struct ChamadaInput {
    pub users_id_usuario: Option<i32>,
    pub turmas_id_turma: Option<i32>,
    pub data_aula: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/app/services/types.generated.ts")]
pub struct ChamadaFilter {
    pub turma: Option<i32>,
    pub usuario: Option<i32>,
    pub de: Option<String>,
    pub ate: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// 月度点名表中的一格
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/app/services/types.generated.ts")]
pub struct CelulaPresenca {
    pub presenca_id: Option<i32>,
    /// `P` / `F` / `FJ`，未登记为空字符串
    pub status: String,
    pub observacao: Option<String>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/app/services/types.generated.ts")]
pub struct AlunoChamada {
    pub aluno_id: i32,
    pub aluno_nome: String,
    /// 日期（AAAA-MM-DD）→ 出勤状态
    pub presencas: BTreeMap<String, CelulaPresenca>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/app/services/types.generated.ts")]
pub struct ChamadaMensal {
    pub turma_id: i32,
    pub ano_mes: String,
    pub datas: Vec<NaiveDate>,
    pub alunos: Vec<AlunoChamada>,
}

fn not_found() -> SysocialError {
    SysocialError::not_found("Aula não encontrada")
}

/// `data_aula` 必须落在班级的起止日期之内（已设置时）
fn check_janela(turma: &turma::Model, data: NaiveDate) -> Result<()> {
    let antes = turma.data_inicio.is_some_and(|ini| data < ini);
    let depois = turma.data_fim.is_some_and(|fim| data > fim);
    if antes || depois {
        return Err(SysocialError::validation(format!(
            "data_aula {} fora do período da turma",
            data
        )));
    }
    Ok(())
}

fn date_range(de: Option<&str>, ate: Option<&str>) -> Result<Condition> {
    let mut cond = Condition::all();
    if let Some(de) = non_empty(de) {
        cond = cond.add(chamada::Column::DataAula.gte(parse_date("de", de)?));
    }
    if let Some(ate) = non_empty(ate) {
        cond = cond.add(chamada::Column::DataAula.lte(parse_date("ate", ate)?));
    }
    Ok(cond)
}

/// 组装月度表格：每个学生在每个日期一格
fn build_grid(
    datas: &[NaiveDate],
    chamadas: &HashMap<NaiveDate, i32>,
    alunos: Vec<(i32, String)>,
    presencas: &[presenca::Model],
) -> Vec<AlunoChamada> {
    let por_chave: HashMap<(i32, i32), &presenca::Model> = presencas
        .iter()
        .map(|p| ((p.chamada_id_chamada, p.aluno_id_aluno), p))
        .collect();

    alunos
        .into_iter()
        .map(|(aluno_id, aluno_nome)| {
            let presencas = datas
                .iter()
                .map(|data| {
                    let registro = chamadas
                        .get(data)
                        .and_then(|id_chamada| por_chave.get(&(*id_chamada, aluno_id)));
                    let celula = match registro {
                        Some(p) => CelulaPresenca {
                            presenca_id: Some(p.id_presenca),
                            status: StatusPresenca::from_flags(p.presente, p.justificada)
                                .to_string(),
                            observacao: p.observacao.clone(),
                        },
                        None => CelulaPresenca {
                            presenca_id: None,
                            status: String::new(),
                            observacao: None,
                        },
                    };
                    (data.format(DATE_KEY_FORMAT).to_string(), celula)
                })
                .collect();

            AlunoChamada {
                aluno_id,
                aluno_nome,
                presencas,
            }
        })
        .collect()
}

pub struct ChamadaService {
    storage: Arc<SeaOrmStorage>,
}

impl ChamadaService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    pub async fn list(&self, filter: &ChamadaFilter) -> Result<Page<chamada::Model>> {
        let mut cond = date_range(filter.de.as_deref(), filter.ate.as_deref())?;
        if let Some(turma) = filter.turma {
            cond = cond.add(chamada::Column::TurmasIdTurma.eq(turma));
        }
        if let Some(usuario) = filter.usuario {
            cond = cond.add(chamada::Column::UsersIdUsuario.eq(usuario));
        }

        let page = PageRequest::new(filter.page, filter.limit);
        let db = self.storage.get_db();

        let (items, total) = self
            .storage
            .read("list_chamadas", || {
                let cond = cond.clone();
                async move {
                    let paginator = chamada::Entity::find()
                        .filter(cond)
                        .order_by_desc(chamada::Column::DataAula)
                        .order_by_desc(chamada::Column::IdChamada)
                        .paginate(db, page.limit);
                    let total = paginator.num_items().await?;
                    let items = paginator.fetch_page(page.zero_based()).await?;
                    Ok((items, total))
                }
            })
            .await?;

        Ok(Page::new(items, page.info(total)))
    }

    /// 某班级的全部点名，最新在前
    pub async fn by_turma(
        &self,
        turma_id: i32,
        periodo: &PeriodoFilter,
    ) -> Result<Vec<chamada::Model>> {
        let cond = date_range(periodo.de.as_deref(), periodo.ate.as_deref())?
            .add(chamada::Column::TurmasIdTurma.eq(turma_id));

        let db = self.storage.get_db();
        self.storage
            .read("list_chamadas_turma", || {
                chamada::Entity::find()
                    .filter(cond.clone())
                    .order_by_desc(chamada::Column::DataAula)
                    .order_by_desc(chamada::Column::IdChamada)
                    .all(db)
            })
            .await
    }

    pub async fn get(&self, id: i32) -> Result<chamada::Model> {
        let db = self.storage.get_db();
        self.storage
            .read("get_chamada", || chamada::Entity::find_by_id(id).one(db))
            .await?
            .ok_or_else(not_found)
    }

    async fn find_turma(&self, id: i32) -> Result<turma::Model> {
        let db = self.storage.get_db();
        self.storage
            .read("find_turma", || turma::Entity::find_by_id(id).one(db))
            .await?
            .ok_or_else(|| SysocialError::not_found("Turma não encontrada"))
    }

    pub async fn create(&self, input: ChamadaInput) -> Result<chamada::Model> {
        let mut req = Required::new();
        let usuario = req.value("users_id_usuario", input.users_id_usuario);
        let turma_id = req.value("turmas_id_turma", input.turmas_id_turma);
        let data_aula = req.text("data_aula", &input.data_aula).to_string();
        req.finish()?;

        let data_aula = parse_date("data_aula", &data_aula)?;
        let turma = self.find_turma(turma_id).await?;
        check_janela(&turma, data_aula)?;

        let model = chamada::ActiveModel {
            users_id_usuario: Set(usuario),
            turmas_id_turma: Set(turma_id),
            data_aula: Set(data_aula),
            ..Default::default()
        }
        .insert(self.storage.get_db())
        .await?;

        info!(
            "Aula {} criada (turma {}, {})",
            model.id_chamada, turma_id, data_aula
        );
        Ok(model)
    }

    pub async fn update(&self, id: i32, input: ChamadaInput) -> Result<chamada::Model> {
        let existing = self.get(id).await?;
        let mut model: chamada::ActiveModel = existing.clone().into();
        let mut changed = false;

        if let Some(v) = input.users_id_usuario {
            model.users_id_usuario = Set(v);
            changed = true;
        }
        let turma_id = input.turmas_id_turma.unwrap_or(existing.turmas_id_turma);
        if input.turmas_id_turma.is_some() {
            model.turmas_id_turma = Set(turma_id);
            changed = true;
        }
        let data_aula = match non_empty(input.data_aula.as_deref()) {
            Some(v) => {
                let data = parse_date("data_aula", v)?;
                model.data_aula = Set(data);
                changed = true;
                data
            }
            None => existing.data_aula,
        };

        if !changed {
            return Ok(existing);
        }

        // 班级或日期变化后重新校验班级存在与日期窗口
        let turma = self.find_turma(turma_id).await?;
        check_janela(&turma, data_aula)?;

        let updated = model.update(self.storage.get_db()).await?;
        info!("Aula {} atualizada", id);
        Ok(updated)
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        let result = chamada::Entity::delete_by_id(id)
            .exec(self.storage.get_db())
            .await?;

        if result.rows_affected == 0 {
            return Err(not_found());
        }
        info!("Aula {} removida", id);
        Ok(())
    }

    /// 月度点名表
    ///
    /// `usuario` 为补建点名时记录的负责人。
    pub async fn mensal(
        &self,
        turma_id: i32,
        ano_mes: &str,
        usuario: i32,
    ) -> Result<ChamadaMensal> {
        let (ano, mes) = parse_ano_mes(ano_mes)?;
        let turma = self.find_turma(turma_id).await?;
        let weekday = parse_dia_semana(&turma.dia_semana).ok_or_else(|| {
            SysocialError::validation(format!(
                "dia_semana da turma não reconhecido: '{}'",
                turma.dia_semana
            ))
        })?;
        let datas = dates_in_month(ano, mes, weekday);

        let txn = self.storage.get_db().begin().await?;

        let mut chamadas: HashMap<NaiveDate, i32> = chamada::Entity::find()
            .filter(chamada::Column::TurmasIdTurma.eq(turma_id))
            .filter(chamada::Column::DataAula.is_in(datas.iter().copied()))
            .all(&txn)
            .await?
            .into_iter()
            .map(|c| (c.data_aula, c.id_chamada))
            .collect();

        let mut criadas = 0;
        for data in &datas {
            if chamadas.contains_key(data) {
                continue;
            }
            let nova = chamada::ActiveModel {
                users_id_usuario: Set(usuario),
                turmas_id_turma: Set(turma_id),
                data_aula: Set(*data),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            chamadas.insert(*data, nova.id_chamada);
            criadas += 1;
        }

        let alunos: Vec<(i32, String)> = aluno::Entity::find()
            .select_only()
            .columns([aluno::Column::IdAluno, aluno::Column::NomeCompleto])
            .join(JoinType::InnerJoin, aluno::Relation::Matricula.def())
            .filter(matricula::Column::TurmasIdTurma.eq(turma_id))
            .filter(aluno::Column::Ativo.eq(true))
            .distinct()
            .order_by_asc(aluno::Column::NomeCompleto)
            .into_tuple()
            .all(&txn)
            .await?;

        let presencas = presenca::Entity::find()
            .filter(presenca::Column::ChamadaIdChamada.is_in(chamadas.values().copied()))
            .all(&txn)
            .await?;

        txn.commit().await?;

        if criadas > 0 {
            info!(
                "Turma {}: {} aula(s) criada(s) para {}",
                turma_id, criadas, ano_mes
            );
        } else {
            debug!("Turma {}: chamada mensal {} sem novas aulas", turma_id, ano_mes);
        }

        Ok(ChamadaMensal {
            turma_id,
            ano_mes: ano_mes.to_string(),
            alunos: build_grid(&datas, &chamadas, alunos, &presencas),
            datas,
        })
    }
}
