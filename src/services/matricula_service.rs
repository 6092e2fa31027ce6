//! Enrollment service
//!
//! 报名创建：学生 + 监护人（按 CPF 去重）+ 关联 + 报名 + 文档，全部在一个事务内。
//! 报名更新：各部分均可选，同样在一个事务内完成。

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, FromQueryResult,
    JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};
use tracing::info;
use ts_rs::TS;

use crate::errors::{Result, SysocialError};
use crate::services::responsavel::{self, ResponsavelInput, ResponsavelVinculado};
use crate::services::validation::{MISSING_FIELDS_MESSAGE, Required};
use crate::services::{AlunoInput, CursoComTurmas, contains, ilike};
use crate::storage::SeaOrmStorage;
use crate::utils::non_empty;
use migration::entities::{aluno, curso, documento_aluno, matricula, turma};

pub const STATUS_ATIVO: &str = "ativo";

/// 上午与下午的分界（`HH:MM` 可按字典序比较）
const MEIO_DIA: &str = "12:00";

/// 学生的在校时段；课程班级只能排在另一个时段
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Turno {
    Manha,
    Tarde,
    Integral,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/app/services/types.generated.ts")]
pub struct CursosDisponiveisFilter {
    pub turno: Option<String>,
}

/// 报名本身的字段
#[derive(Debug, Clone, Default, Deserialize, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/app/services/types.generated.ts")]
pub struct MatriculaInput {
    pub turmas_id_turma: Option<i32>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/app/services/types.generated.ts")]
pub struct DocumentoInput {
    pub tipo_documento: Option<String>,
    pub caminho_arquivo: Option<String>,
}

/// POST / PUT /matriculas 请求体
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/app/services/types.generated.ts")]
pub struct MatriculaRequest {
    pub aluno: Option<AlunoInput>,
    pub responsavel: Option<ResponsavelInput>,
    pub matricula: Option<MatriculaInput>,
    pub documentos: Option<Vec<DocumentoInput>>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/app/services/types.generated.ts")]
pub struct MatriculaFilter {
    pub nome: Option<String>,
    pub cpf: Option<String>,
    pub curso: Option<i32>,
    pub turma: Option<i32>,
    pub status: Option<String>,
}

#[derive(Debug, FromQueryResult)]
struct ListRow {
    id_matricula: i32,
    status: String,
    data_matricula: DateTime<Utc>,
    id_aluno: i32,
    nome_aluno: String,
    cpf: String,
    telefone_aluno: String,
    id_curso: i32,
    curso: String,
    id_turma: i32,
    turma: String,
}

/// 列表行：报名 + 学生 + 课程/班级 + 主监护人
#[derive(Debug, Clone, Serialize)]
pub struct MatriculaResumo {
    pub id_matricula: i32,
    pub status: String,
    pub data_matricula: DateTime<Utc>,
    pub id_aluno: i32,
    pub nome_aluno: String,
    pub cpf: String,
    pub telefone_aluno: String,
    pub id_curso: i32,
    pub curso: String,
    pub id_turma: i32,
    pub turma: String,
    pub nome_responsavel: Option<String>,
    pub telefone_responsavel: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CursoRef {
    pub id_curso: i32,
    pub nome: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TurmaRef {
    pub id_turma: i32,
    pub nome_turma: String,
    pub dia_semana: String,
    pub hora_inicio: String,
    pub hora_fim: String,
}

/// 报名详情（表单回显所需的全部数据）
#[derive(Debug, Clone, Serialize)]
pub struct MatriculaDetalhe {
    pub id_matricula: i32,
    pub status: String,
    pub data_matricula: DateTime<Utc>,
    pub aluno: aluno::Model,
    pub curso: CursoRef,
    pub turma: TurmaRef,
    pub responsaveis: Vec<ResponsavelVinculado>,
    pub documentos: Vec<documento_aluno::Model>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatriculaCriada {
    pub aluno: aluno::Model,
    pub responsavel: ResponsavelVinculado,
    pub matricula: matricula::Model,
    pub documentos: Vec<documento_aluno::Model>,
}

/// 校验文档列表，返回 (tipo_documento, caminho_arquivo)
fn validate_documentos(docs: &[DocumentoInput], req: &mut Required) -> Vec<(String, String)> {
    docs.iter()
        .enumerate()
        .map(|(i, doc)| {
            let mut nested = Required::nested(format!("documentos[{}]", i));
            let tipo = nested.text("tipo_documento", &doc.tipo_documento).to_string();
            let caminho = nested
                .text("caminho_arquivo", &doc.caminho_arquivo)
                .to_string();
            req.merge(nested);
            (tipo, caminho)
        })
        .collect()
}

async fn insert_documentos<C: ConnectionTrait>(
    conn: &C,
    id_aluno: i32,
    docs: Vec<(String, String)>,
) -> Result<Vec<documento_aluno::Model>> {
    let mut criados = Vec::with_capacity(docs.len());
    for (tipo_documento, caminho_arquivo) in docs {
        let doc = documento_aluno::ActiveModel {
            aluno_id_aluno: Set(id_aluno),
            tipo_documento: Set(tipo_documento),
            caminho_arquivo: Set(caminho_arquivo),
            data_upload: Set(Utc::now()),
            ..Default::default()
        }
        .insert(conn)
        .await?;
        criados.push(doc);
    }
    Ok(criados)
}

fn not_found() -> SysocialError {
    SysocialError::not_found("Matrícula não encontrada")
}

pub struct MatriculaService {
    storage: Arc<SeaOrmStorage>,
}

impl MatriculaService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    fn build_condition(filter: &MatriculaFilter) -> Condition {
        let mut cond = Condition::all();
        if let Some(nome) = non_empty(filter.nome.as_deref()) {
            cond = cond.add(ilike(aluno::Column::NomeCompleto, nome));
        }
        if let Some(cpf) = non_empty(filter.cpf.as_deref()) {
            cond = cond.add(contains(aluno::Column::Cpf, cpf));
        }
        if let Some(curso) = filter.curso {
            cond = cond.add(curso::Column::IdCurso.eq(curso));
        }
        if let Some(turma) = filter.turma {
            cond = cond.add(matricula::Column::TurmasIdTurma.eq(turma));
        }
        if let Some(status) = non_empty(filter.status.as_deref()) {
            cond = cond.add(matricula::Column::Status.eq(status));
        }
        cond
    }

    pub async fn list(&self, filter: &MatriculaFilter) -> Result<Vec<MatriculaResumo>> {
        let cond = Self::build_condition(filter);
        let db = self.storage.get_db();

        let rows = self
            .storage
            .read("list_matriculas", || {
                let cond = cond.clone();
                async move {
                    matricula::Entity::find()
                        .select_only()
                        .columns([
                            matricula::Column::IdMatricula,
                            matricula::Column::Status,
                            matricula::Column::DataMatricula,
                        ])
                        .column_as(aluno::Column::IdAluno, "id_aluno")
                        .column_as(aluno::Column::NomeCompleto, "nome_aluno")
                        .column_as(aluno::Column::Cpf, "cpf")
                        .column_as(aluno::Column::Telefone, "telefone_aluno")
                        .column_as(curso::Column::IdCurso, "id_curso")
                        .column_as(curso::Column::Nome, "curso")
                        .column_as(turma::Column::IdTurma, "id_turma")
                        .column_as(turma::Column::NomeTurma, "turma")
                        .join(JoinType::InnerJoin, matricula::Relation::Aluno.def())
                        .join(JoinType::InnerJoin, matricula::Relation::Turma.def())
                        .join(JoinType::InnerJoin, turma::Relation::Curso.def())
                        .filter(cond)
                        .order_by_desc(matricula::Column::IdMatricula)
                        .into_model::<ListRow>()
                        .all(db)
                        .await
                }
            })
            .await?;

        let ids: Vec<i32> = rows.iter().map(|r| r.id_aluno).collect();
        let principais = responsavel::principal_by_aluno(db, &ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let resp = principais.get(&row.id_aluno);
                MatriculaResumo {
                    nome_responsavel: resp.map(|r| r.nome_completo.clone()),
                    telefone_responsavel: resp.map(|r| r.telefone.clone()),
                    id_matricula: row.id_matricula,
                    status: row.status,
                    data_matricula: row.data_matricula,
                    id_aluno: row.id_aluno,
                    nome_aluno: row.nome_aluno,
                    cpf: row.cpf,
                    telefone_aluno: row.telefone_aluno,
                    id_curso: row.id_curso,
                    curso: row.curso,
                    id_turma: row.id_turma,
                    turma: row.turma,
                }
            })
            .collect())
    }

    pub async fn get(&self, id: i32) -> Result<MatriculaDetalhe> {
        let db = self.storage.get_db();

        let (mat, aluno, turma, curso) = self
            .storage
            .read("get_matricula", || async move {
                let Some((mat, Some(turma))) = matricula::Entity::find_by_id(id)
                    .find_also_related(turma::Entity)
                    .one(db)
                    .await?
                else {
                    return Ok(None);
                };
                let aluno = aluno::Entity::find_by_id(mat.aluno_id_aluno).one(db).await?;
                let curso = curso::Entity::find_by_id(turma.cursos_id_curso)
                    .one(db)
                    .await?;
                Ok(aluno.zip(curso).map(|(a, c)| (mat, a, turma, c)))
            })
            .await?
            .ok_or_else(not_found)?;

        let responsaveis = responsavel::list_for_aluno(db, aluno.id_aluno).await?;
        let documentos = self
            .storage
            .read("list_documentos", || {
                documento_aluno::Entity::find()
                    .filter(documento_aluno::Column::AlunoIdAluno.eq(aluno.id_aluno))
                    .order_by_asc(documento_aluno::Column::IdDocumento)
                    .all(db)
            })
            .await?;

        Ok(MatriculaDetalhe {
            id_matricula: mat.id_matricula,
            status: mat.status,
            data_matricula: mat.data_matricula,
            aluno,
            curso: CursoRef {
                id_curso: curso.id_curso,
                nome: curso.nome,
            },
            turma: TurmaRef {
                id_turma: turma.id_turma,
                nome_turma: turma.nome_turma,
                dia_semana: turma.dia_semana,
                hora_inicio: turma.hora_inicio,
                hora_fim: turma.hora_fim,
            },
            responsaveis,
            documentos,
        })
    }

    pub async fn create(&self, req: MatriculaRequest) -> Result<MatriculaCriada> {
        let mut required = Required::new();

        let aluno_input = required.object("aluno", req.aluno);
        let resp_input = required.object("responsavel", req.responsavel);
        let mat_input = required.object("matricula", req.matricula);

        let aluno_model = aluno_input.as_ref().map(|a| {
            let mut nested = Required::nested("aluno");
            let model = a.to_new_model(&mut nested);
            required.merge(nested);
            model
        });
        let resp_fields = resp_input.as_ref().map(|r| r.validate(&mut required));
        let turma_id = mat_input.as_ref().map(|m| {
            let mut nested = Required::nested("matricula");
            let id = nested.value("turmas_id_turma", m.turmas_id_turma);
            required.merge(nested);
            id
        });
        let docs = validate_documentos(
            req.documentos.as_deref().unwrap_or_default(),
            &mut required,
        );
        required.finish()?;

        let (
            Some(aluno_input),
            Some(mut aluno_model),
            Some(resp_fields),
            Some(mat_input),
            Some(turma_id),
        ) = (aluno_input, aluno_model, resp_fields, mat_input, turma_id)
        else {
            return Err(SysocialError::missing_fields(
                MISSING_FIELDS_MESSAGE,
                vec!["aluno".into(), "responsavel".into(), "matricula".into()],
            ));
        };
        aluno_input.apply_dates(&mut aluno_model)?;

        let txn = self.storage.get_db().begin().await?;

        let aluno = aluno_model.insert(&txn).await?;
        let resp = responsavel::find_or_create(&txn, &resp_fields).await?;
        responsavel::link(&txn, resp.id_responsavel, aluno.id_aluno, &resp_fields.tipo).await?;

        let matricula = matricula::ActiveModel {
            aluno_id_aluno: Set(aluno.id_aluno),
            turmas_id_turma: Set(turma_id),
            data_matricula: Set(Utc::now()),
            status: Set(non_empty(mat_input.status.as_deref())
                .unwrap_or(STATUS_ATIVO)
                .to_string()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let documentos = insert_documentos(&txn, aluno.id_aluno, docs).await?;

        txn.commit().await?;

        info!(
            "Matrícula {} criada (aluno {}, turma {})",
            matricula.id_matricula, aluno.id_aluno, turma_id
        );
        Ok(MatriculaCriada {
            aluno,
            responsavel: ResponsavelVinculado {
                responsavel: resp,
                tipo: resp_fields.tipo,
            },
            matricula,
            documentos,
        })
    }

    /// 每个部分都可选；`documentos` 出现时替换该学生的全部文档
    pub async fn update(&self, id: i32, req: MatriculaRequest) -> Result<MatriculaDetalhe> {
        let mut required = Required::new();
        let docs = req
            .documentos
            .as_deref()
            .map(|d| validate_documentos(d, &mut required));
        required.finish()?;

        let txn = self.storage.get_db().begin().await?;

        let current = matricula::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(not_found)?;
        let id_aluno = current.aluno_id_aluno;

        if let Some(input) = &req.aluno {
            let existing = aluno::Entity::find_by_id(id_aluno)
                .one(&txn)
                .await?
                .ok_or_else(|| SysocialError::not_found("Aluno não encontrado"))?;
            let mut model: aluno::ActiveModel = existing.into();
            if input.apply_update(&mut model)? {
                model.update(&txn).await?;
            }
        }

        if let Some(input) = &req.responsavel {
            let (resp, tipo) = responsavel::update_or_create(&txn, input).await?;
            responsavel::link(&txn, resp.id_responsavel, id_aluno, &tipo).await?;
        }

        if let Some(input) = &req.matricula {
            let mut model: matricula::ActiveModel = current.into();
            let mut changed = false;
            if let Some(turma_id) = input.turmas_id_turma {
                model.turmas_id_turma = Set(turma_id);
                changed = true;
            }
            if let Some(status) = non_empty(input.status.as_deref()) {
                model.status = Set(status.to_string());
                changed = true;
            }
            if changed {
                model.update(&txn).await?;
            }
        }

        if let Some(docs) = docs {
            documento_aluno::Entity::delete_many()
                .filter(documento_aluno::Column::AlunoIdAluno.eq(id_aluno))
                .exec(&txn)
                .await?;
            insert_documentos(&txn, id_aluno, docs).await?;
        }

        txn.commit().await?;

        info!("Matrícula {} atualizada", id);
        self.get(id).await
    }

    /// 可报名的课程：启用且有剩余名额，只保留与学生在校时段不冲突的班级
    pub async fn cursos_disponiveis(
        &self,
        filter: &CursosDisponiveisFilter,
    ) -> Result<Vec<CursoComTurmas>> {
        let mut required = Required::new();
        let turno = required.text("turno", &filter.turno).to_string();
        required.finish()?;

        let turno: Turno = turno.parse().map_err(|_| {
            SysocialError::validation("turno deve ser manha, tarde ou integral")
        })?;
        let horario = match turno {
            // 上午上学只能选下午开始的班级，反之亦然
            Turno::Manha => turma::Column::HoraInicio.gte(MEIO_DIA),
            Turno::Tarde => turma::Column::HoraInicio.lt(MEIO_DIA),
            Turno::Integral => return Ok(Vec::new()),
        };

        let db = self.storage.get_db();
        let cursos = self
            .storage
            .read("list_cursos_disponiveis", || {
                curso::Entity::find()
                    .filter(curso::Column::Ativo.eq(true))
                    .filter(curso::Column::VagasRestantes.gt(0))
                    .order_by_asc(curso::Column::Nome)
                    .all(db)
            })
            .await?;
        if cursos.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = cursos.iter().map(|c| c.id_curso).collect();
        let turmas = self
            .storage
            .read("list_turmas_disponiveis", || {
                turma::Entity::find()
                    .filter(turma::Column::CursosIdCurso.is_in(ids.clone()))
                    .filter(horario.clone())
                    .order_by_asc(turma::Column::NomeTurma)
                    .all(db)
            })
            .await?;

        let mut por_curso: HashMap<i32, Vec<turma::Model>> = HashMap::new();
        for turma in turmas {
            por_curso.entry(turma.cursos_id_curso).or_default().push(turma);
        }

        // 没有合适班级的课程不返回
        Ok(cursos
            .into_iter()
            .filter_map(|curso| {
                por_curso
                    .remove(&curso.id_curso)
                    .map(|turmas| CursoComTurmas { curso, turmas })
            })
            .collect())
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        let result = matricula::Entity::delete_by_id(id)
            .exec(self.storage.get_db())
            .await?;

        if result.rows_affected == 0 {
            return Err(not_found());
        }
        info!("Matrícula {} removida", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turno_parse() {
        assert_eq!("manha".parse::<Turno>().unwrap(), Turno::Manha);
        assert_eq!("Tarde".parse::<Turno>().unwrap(), Turno::Tarde);
        assert_eq!(Turno::Integral.as_ref(), "integral");
        assert!("noite".parse::<Turno>().is_err());
    }

    #[test]
    fn test_validate_documentos_prefixes_index() {
        let docs = vec![
            DocumentoInput {
                tipo_documento: Some("RG".into()),
                caminho_arquivo: Some("/docs/rg.pdf".into()),
            },
            DocumentoInput {
                tipo_documento: Some("CPF".into()),
                caminho_arquivo: None,
            },
        ];
        let mut req = Required::new();
        let parsed = validate_documentos(&docs, &mut req);
        assert_eq!(parsed[0], ("RG".to_string(), "/docs/rg.pdf".to_string()));

        match req.finish() {
            Err(SysocialError::MissingFields { campos, .. }) => {
                assert_eq!(campos, vec!["documentos[1].caminho_arquivo"]);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }
}
