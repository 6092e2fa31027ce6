//! Class (turma) management service

use std::sync::Arc;

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, FromQueryResult, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, Set,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use ts_rs::TS;

use crate::errors::{Result, SysocialError};
use crate::services::validation::Required;
use crate::storage::SeaOrmStorage;
use crate::utils::dates::{parse_dia_semana, parse_hora, parse_optional_date};
use crate::utils::non_empty;
use migration::entities::{aluno, curso, matricula, turma};

/// 班级字段（创建时必填项见 `check_required`，更新时全部可选）
#[derive(Debug, Clone, Default, Deserialize, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/app/services/types.generated.ts")]
pub struct TurmaInput {
    pub cursos_id_curso: Option<i32>,
    pub nome_turma: Option<String>,
    pub descricao: Option<String>,
    pub dia_semana: Option<String>,
    pub hora_inicio: Option<String>,
    pub hora_fim: Option<String>,
    pub vagas_turma: Option<i32>,
    pub data_inicio: Option<String>,
    pub data_fim: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/app/services/types.generated.ts")]
pub struct TurmaFilter {
    pub curso_id: Option<i32>,
    pub dia_semana: Option<String>,
}

/// 班级 + 课程名称
#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct TurmaComCurso {
    pub id_turma: i32,
    pub cursos_id_curso: i32,
    pub nome_curso: String,
    pub nome_turma: String,
    pub descricao: Option<String>,
    pub dia_semana: String,
    pub hora_inicio: String,
    pub hora_fim: String,
    pub vagas_turma: i32,
    pub data_inicio: Option<NaiveDate>,
    pub data_fim: Option<NaiveDate>,
}

/// 班级中的学生
#[derive(Debug, Clone, Serialize, FromQueryResult, TS)]
#[ts(export, export_to = "../frontend/src/app/services/types.generated.ts")]
pub struct AlunoDaTurma {
    pub id: i32,
    pub nome: String,
}

fn check_vagas(vagas: i32) -> Result<i32> {
    if vagas < 1 {
        return Err(SysocialError::validation(
            "vagas_turma deve ser maior ou igual a 1",
        ));
    }
    Ok(vagas)
}

fn check_dia_semana(dia: &str) -> Result<String> {
    let dia = dia.trim();
    if parse_dia_semana(dia).is_none() {
        return Err(SysocialError::validation(format!(
            "dia_semana inválido: '{}'",
            dia
        )));
    }
    Ok(dia.to_string())
}

fn check_periodo(inicio: Option<NaiveDate>, fim: Option<NaiveDate>) -> Result<()> {
    if let (Some(ini), Some(fim)) = (inicio, fim)
        && ini > fim
    {
        return Err(SysocialError::validation(
            "data_inicio deve ser anterior ou igual a data_fim",
        ));
    }
    Ok(())
}

impl TurmaInput {
    /// 记录缺失的必填字段；嵌套在课程中创建时不需要 `cursos_id_curso`
    pub(crate) fn check_required(&self, req: &mut Required, need_curso: bool) {
        if need_curso {
            req.value("cursos_id_curso", self.cursos_id_curso);
        }
        req.text("nome_turma", &self.nome_turma);
        req.text("dia_semana", &self.dia_semana);
        req.text("hora_inicio", &self.hora_inicio);
        req.text("hora_fim", &self.hora_fim);
        req.value("vagas_turma", self.vagas_turma);
    }

    /// 必填项齐全后构造 ActiveModel，格式错误返回 400
    pub(crate) fn build_new(&self, curso_id: i32) -> Result<turma::ActiveModel> {
        let data_inicio = parse_optional_date("data_inicio", self.data_inicio.as_deref())?;
        let data_fim = parse_optional_date("data_fim", self.data_fim.as_deref())?;
        check_periodo(data_inicio, data_fim)?;

        Ok(turma::ActiveModel {
            cursos_id_curso: Set(curso_id),
            nome_turma: Set(self.nome_turma.clone().unwrap_or_default().trim().to_string()),
            descricao: Set(non_empty(self.descricao.as_deref()).map(str::to_string)),
            dia_semana: Set(check_dia_semana(self.dia_semana.as_deref().unwrap_or_default())?),
            hora_inicio: Set(parse_hora(
                "hora_inicio",
                self.hora_inicio.as_deref().unwrap_or_default(),
            )?),
            hora_fim: Set(parse_hora(
                "hora_fim",
                self.hora_fim.as_deref().unwrap_or_default(),
            )?),
            vagas_turma: Set(check_vagas(self.vagas_turma.unwrap_or_default())?),
            data_inicio: Set(data_inicio),
            data_fim: Set(data_fim),
            ..Default::default()
        })
    }

    fn apply_update(&self, current: &turma::Model) -> Result<Option<turma::ActiveModel>> {
        let mut model: turma::ActiveModel = current.clone().into();
        let mut changed = false;

        if let Some(v) = self.cursos_id_curso {
            model.cursos_id_curso = Set(v);
            changed = true;
        }
        if let Some(v) = non_empty(self.nome_turma.as_deref()) {
            model.nome_turma = Set(v.to_string());
            changed = true;
        }
        if let Some(v) = &self.descricao {
            model.descricao = Set(non_empty(Some(v)).map(str::to_string));
            changed = true;
        }
        if let Some(v) = &self.dia_semana {
            model.dia_semana = Set(check_dia_semana(v)?);
            changed = true;
        }
        if let Some(v) = &self.hora_inicio {
            model.hora_inicio = Set(parse_hora("hora_inicio", v)?);
            changed = true;
        }
        if let Some(v) = &self.hora_fim {
            model.hora_fim = Set(parse_hora("hora_fim", v)?);
            changed = true;
        }
        if let Some(v) = self.vagas_turma {
            model.vagas_turma = Set(check_vagas(v)?);
            changed = true;
        }

        // 空字符串表示清除日期
        let mut data_inicio = current.data_inicio;
        let mut data_fim = current.data_fim;
        if let Some(v) = &self.data_inicio {
            data_inicio = parse_optional_date("data_inicio", Some(v))?;
            model.data_inicio = Set(data_inicio);
            changed = true;
        }
        if let Some(v) = &self.data_fim {
            data_fim = parse_optional_date("data_fim", Some(v))?;
            model.data_fim = Set(data_fim);
            changed = true;
        }
        check_periodo(data_inicio, data_fim)?;

        Ok(changed.then_some(model))
    }
}

pub struct TurmaService {
    storage: Arc<SeaOrmStorage>,
}

impl TurmaService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// 班级列 + 课程名称的基础查询
    pub(crate) fn select_com_curso() -> Select<turma::Entity> {
        turma::Entity::find()
            .select_only()
            .columns([
                turma::Column::IdTurma,
                turma::Column::CursosIdCurso,
                turma::Column::NomeTurma,
                turma::Column::Descricao,
                turma::Column::DiaSemana,
                turma::Column::HoraInicio,
                turma::Column::HoraFim,
                turma::Column::VagasTurma,
                turma::Column::DataInicio,
                turma::Column::DataFim,
            ])
            .column_as(curso::Column::Nome, "nome_curso")
            .join(JoinType::InnerJoin, turma::Relation::Curso.def())
    }

    pub async fn list(&self, filter: &TurmaFilter) -> Result<Vec<TurmaComCurso>> {
        let mut cond = Condition::all();
        if let Some(curso_id) = filter.curso_id {
            cond = cond.add(turma::Column::CursosIdCurso.eq(curso_id));
        }
        if let Some(dia) = non_empty(filter.dia_semana.as_deref()) {
            cond = cond.add(turma::Column::DiaSemana.eq(dia));
        }

        let db = self.storage.get_db();
        self.storage
            .read("list_turmas", || {
                let cond = cond.clone();
                async move {
                    Self::select_com_curso()
                        .filter(cond)
                        .order_by_asc(turma::Column::IdTurma)
                        .into_model::<TurmaComCurso>()
                        .all(db)
                        .await
                }
            })
            .await
    }

    pub async fn get(&self, id: i32) -> Result<TurmaComCurso> {
        let db = self.storage.get_db();
        self.storage
            .read("get_turma", || async {
                Self::select_com_curso()
                    .filter(turma::Column::IdTurma.eq(id))
                    .into_model::<TurmaComCurso>()
                    .one(db)
                    .await
            })
            .await?
            .ok_or_else(|| SysocialError::not_found("Turma não encontrada"))
    }

    /// 原始记录（不含课程名），供其他 service 使用
    pub async fn find(&self, id: i32) -> Result<turma::Model> {
        let db = self.storage.get_db();
        self.storage
            .read("find_turma", || turma::Entity::find_by_id(id).one(db))
            .await?
            .ok_or_else(|| SysocialError::not_found("Turma não encontrada"))
    }

    /// 报名在该班级的学生，按姓名排序
    pub async fn alunos(&self, id: i32) -> Result<Vec<AlunoDaTurma>> {
        self.find(id).await?;

        let db = self.storage.get_db();
        self.storage
            .read("list_alunos_turma", || {
                aluno::Entity::find()
                    .select_only()
                    .column_as(aluno::Column::IdAluno, "id")
                    .column_as(aluno::Column::NomeCompleto, "nome")
                    .join(JoinType::InnerJoin, aluno::Relation::Matricula.def())
                    .filter(matricula::Column::TurmasIdTurma.eq(id))
                    .distinct()
                    .order_by_asc(aluno::Column::NomeCompleto)
                    .into_model::<AlunoDaTurma>()
                    .all(db)
            })
            .await
    }

    pub async fn create(&self, input: TurmaInput) -> Result<turma::Model> {
        let mut req = Required::new();
        input.check_required(&mut req, true);
        req.finish()?;

        let model = input
            .build_new(input.cursos_id_curso.unwrap_or_default())?
            .insert(self.storage.get_db())
            .await?;

        info!("Turma {} criada no curso {}", model.id_turma, model.cursos_id_curso);
        Ok(model)
    }

    pub async fn update(&self, id: i32, input: TurmaInput) -> Result<turma::Model> {
        let current = self.find(id).await?;

        let Some(model) = input.apply_update(&current)? else {
            return Ok(current);
        };
        let updated = model.update(self.storage.get_db()).await?;

        info!("Turma {} atualizada", id);
        Ok(updated)
    }

    /// 仍有报名或点名记录时由外键拒绝（409）
    pub async fn delete(&self, id: i32) -> Result<()> {
        let result = turma::Entity::delete_by_id(id)
            .exec(self.storage.get_db())
            .await?;

        if result.rows_affected == 0 {
            return Err(SysocialError::not_found("Turma não encontrada"));
        }
        info!("Turma {} removida", id);
        Ok(())
    }
}
