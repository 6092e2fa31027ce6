//! Student management service
//!
//! 学生 CRUD。创建时必须同时提供监护人，二者在同一事务中写入。

use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, FromQueryResult, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use ts_rs::TS;

use crate::errors::{Result, SysocialError};
use crate::services::responsavel::{self, ResponsavelInput, ResponsavelVinculado};
use crate::services::validation::{MISSING_FIELDS_MESSAGE, Required};
use crate::services::{Page, contains, ilike};
use crate::storage::SeaOrmStorage;
use crate::utils::dates::{parse_date, parse_optional_date};
use crate::utils::{PageRequest, non_empty};
use migration::entities::{aluno, matricula};

/// 学生字段（创建时必填项由 `validate` 检查，更新时全部可选）
#[derive(Debug, Clone, Default, Deserialize, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/app/services/types.generated.ts")]
pub struct AlunoInput {
    pub nome_completo: Option<String>,
    pub data_nascimento: Option<String>,
    pub sexo: Option<String>,
    pub cpf: Option<String>,
    pub telefone: Option<String>,
    pub escola_atual: Option<String>,
    pub serie_atual: Option<i32>,
    pub periodo_escolar: Option<String>,
    pub nome_rua: Option<String>,
    pub numero_endereco: Option<i32>,
    pub bairro: Option<String>,
    pub data_matricula: Option<String>,
    pub observacoes: Option<String>,
    pub cep: Option<String>,
    pub ativo: Option<bool>,
}

/// POST /alunos 请求体
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/app/services/types.generated.ts")]
pub struct CreateAlunoRequest {
    #[serde(flatten)]
    pub aluno: AlunoInput,
    pub responsavel: Option<ResponsavelInput>,
}

/// 学生列表过滤条件
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/app/services/types.generated.ts")]
pub struct AlunoFilter {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub nome: Option<String>,
    pub cpf: Option<String>,
    pub serie_atual: Option<i32>,
    pub periodo_escolar: Option<String>,
    pub data_matricula_ini: Option<String>,
    pub data_matricula_fim: Option<String>,
}

/// 创建结果：学生 + 监护人
#[derive(Debug, Clone, Serialize)]
pub struct AlunoCriado {
    #[serde(flatten)]
    pub aluno: aluno::Model,
    pub responsavel: ResponsavelVinculado,
}

/// 每条报名对应的学生摘要
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/app/services/types.generated.ts")]
pub struct AlunoResumo {
    pub id_matricula: i32,
    pub nome_aluno: String,
    pub cpf: String,
    pub nome_responsavel: Option<String>,
}

/// 报名前的 CPF 查询结果
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/app/services/types.generated.ts")]
pub struct CpfDisponibilidade {
    pub cpf: String,
    /// 已有学生使用该 CPF 时为 false
    pub disponivel: bool,
    pub id_aluno: Option<i32>,
}

#[derive(Debug, FromQueryResult)]
struct ResumoRow {
    id_matricula: i32,
    id_aluno: i32,
    nome_aluno: String,
    cpf: String,
}

impl AlunoInput {
    /// 校验必填字段并构造 ActiveModel（日期稍后由 `apply_dates` 填入）
    pub(crate) fn to_new_model(&self, req: &mut Required) -> aluno::ActiveModel {
        let nome_completo = req.text("nome_completo", &self.nome_completo).to_string();
        req.text("data_nascimento", &self.data_nascimento);
        let sexo = req.text("sexo", &self.sexo).to_string();
        let cpf = req.text("cpf", &self.cpf).to_string();
        let telefone = req.text("telefone", &self.telefone).to_string();
        let escola_atual = req.text("escola_atual", &self.escola_atual).to_string();
        let serie_atual = req.value("serie_atual", self.serie_atual);
        let periodo_escolar = req.text("periodo_escolar", &self.periodo_escolar).to_string();
        let nome_rua = req.text("nome_rua", &self.nome_rua).to_string();
        let numero_endereco = req.value("numero_endereco", self.numero_endereco);
        let bairro = req.text("bairro", &self.bairro).to_string();
        req.text("data_matricula", &self.data_matricula);
        let observacoes = req.present("observacoes", &self.observacoes).to_string();

        aluno::ActiveModel {
            nome_completo: Set(nome_completo),
            sexo: Set(sexo),
            cpf: Set(cpf),
            telefone: Set(telefone),
            escola_atual: Set(escola_atual),
            serie_atual: Set(serie_atual),
            periodo_escolar: Set(periodo_escolar),
            nome_rua: Set(nome_rua),
            numero_endereco: Set(numero_endereco),
            bairro: Set(bairro),
            observacoes: Set(observacoes),
            cep: Set(non_empty(self.cep.as_deref()).map(str::to_string)),
            ativo: Set(self.ativo.unwrap_or(true)),
            ..Default::default()
        }
    }

    /// 必填项齐全后解析日期
    pub(crate) fn apply_dates(&self, model: &mut aluno::ActiveModel) -> Result<()> {
        if let Some(s) = self.data_nascimento.as_deref() {
            model.data_nascimento = Set(parse_date("data_nascimento", s)?);
        }
        if let Some(s) = self.data_matricula.as_deref() {
            model.data_matricula = Set(parse_date("data_matricula", s)?);
        }
        Ok(())
    }

    /// 部分更新：只覆盖出现的字段
    pub(crate) fn apply_update(&self, model: &mut aluno::ActiveModel) -> Result<bool> {
        let mut changed = false;

        macro_rules! set_text {
            ($($field:ident),*) => {
                $(if let Some(v) = &self.$field {
                    model.$field = Set(v.clone());
                    changed = true;
                })*
            };
        }
        set_text!(
            nome_completo,
            sexo,
            cpf,
            telefone,
            escola_atual,
            periodo_escolar,
            nome_rua,
            bairro,
            observacoes
        );

        if let Some(v) = self.serie_atual {
            model.serie_atual = Set(v);
            changed = true;
        }
        if let Some(v) = self.numero_endereco {
            model.numero_endereco = Set(v);
            changed = true;
        }
        if let Some(v) = &self.cep {
            model.cep = Set(non_empty(Some(v)).map(str::to_string));
            changed = true;
        }
        if let Some(v) = self.ativo {
            model.ativo = Set(v);
            changed = true;
        }
        if self.data_nascimento.is_some() || self.data_matricula.is_some() {
            self.apply_dates(model)?;
            changed = true;
        }

        Ok(changed)
    }
}

pub struct AlunoService {
    storage: Arc<SeaOrmStorage>,
}

impl AlunoService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    fn build_condition(filter: &AlunoFilter) -> Result<Condition> {
        let mut cond = Condition::all();

        if let Some(nome) = non_empty(filter.nome.as_deref()) {
            cond = cond.add(ilike(aluno::Column::NomeCompleto, nome));
        }
        if let Some(cpf) = non_empty(filter.cpf.as_deref()) {
            cond = cond.add(contains(aluno::Column::Cpf, cpf));
        }
        if let Some(serie) = filter.serie_atual {
            cond = cond.add(aluno::Column::SerieAtual.eq(serie));
        }
        if let Some(periodo) = non_empty(filter.periodo_escolar.as_deref()) {
            cond = cond.add(aluno::Column::PeriodoEscolar.eq(periodo));
        }
        if let Some(ini) =
            parse_optional_date("data_matricula_ini", filter.data_matricula_ini.as_deref())?
        {
            cond = cond.add(aluno::Column::DataMatricula.gte(ini));
        }
        if let Some(fim) =
            parse_optional_date("data_matricula_fim", filter.data_matricula_fim.as_deref())?
        {
            cond = cond.add(aluno::Column::DataMatricula.lte(fim));
        }

        Ok(cond)
    }

    pub async fn list(&self, filter: &AlunoFilter) -> Result<Page<aluno::Model>> {
        let cond = Self::build_condition(filter)?;
        let page = PageRequest::new(filter.page, filter.limit);
        let db = self.storage.get_db();

        let (items, total) = self
            .storage
            .read("list_alunos", || {
                let cond = cond.clone();
                async move {
                    let paginator = aluno::Entity::find()
                        .filter(cond)
                        .order_by_desc(aluno::Column::IdAluno)
                        .paginate(db, page.limit);
                    let total = paginator.num_items().await?;
                    let items = paginator.fetch_page(page.zero_based()).await?;
                    Ok((items, total))
                }
            })
            .await?;

        Ok(Page::new(items, page.info(total)))
    }

    /// 每条报名一行：报名 id、学生姓名、CPF、主监护人姓名
    pub async fn resumo(&self) -> Result<Vec<AlunoResumo>> {
        let db = self.storage.get_db();

        let rows = self
            .storage
            .read("resumo_alunos", || async {
                matricula::Entity::find()
                    .select_only()
                    .column(matricula::Column::IdMatricula)
                    .column_as(aluno::Column::IdAluno, "id_aluno")
                    .column_as(aluno::Column::NomeCompleto, "nome_aluno")
                    .column_as(aluno::Column::Cpf, "cpf")
                    .join(JoinType::InnerJoin, matricula::Relation::Aluno.def())
                    .order_by_asc(matricula::Column::IdMatricula)
                    .into_model::<ResumoRow>()
                    .all(db)
                    .await
            })
            .await?;

        let ids: Vec<i32> = rows.iter().map(|r| r.id_aluno).collect();
        let principais = responsavel::principal_by_aluno(db, &ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| AlunoResumo {
                nome_responsavel: principais
                    .get(&row.id_aluno)
                    .map(|r| r.nome_completo.clone()),
                id_matricula: row.id_matricula,
                nome_aluno: row.nome_aluno,
                cpf: row.cpf,
            })
            .collect())
    }

    pub async fn get(&self, id: i32) -> Result<aluno::Model> {
        let db = self.storage.get_db();
        self.storage
            .read("get_aluno", || aluno::Entity::find_by_id(id).one(db))
            .await?
            .ok_or_else(|| SysocialError::not_found("Aluno não encontrado"))
    }

    /// CPF 是否仍可用于新的报名
    pub async fn verificar_cpf(&self, cpf: &str) -> Result<CpfDisponibilidade> {
        let cpf = cpf.trim().to_string();
        if cpf.is_empty() {
            return Err(SysocialError::missing_fields(
                MISSING_FIELDS_MESSAGE,
                vec!["cpf".to_string()],
            ));
        }

        let db = self.storage.get_db();
        let existente = self
            .storage
            .read("find_aluno_cpf", || {
                aluno::Entity::find()
                    .filter(aluno::Column::Cpf.eq(cpf.as_str()))
                    .one(db)
            })
            .await?;

        Ok(CpfDisponibilidade {
            disponivel: existente.is_none(),
            id_aluno: existente.map(|a| a.id_aluno),
            cpf,
        })
    }

    /// 学生 + 监护人（按 CPF 去重）+ 关联，全部在一个事务内
    pub async fn create(&self, req: CreateAlunoRequest) -> Result<AlunoCriado> {
        let mut required = Required::new();
        let mut model = req.aluno.to_new_model(&mut required);
        let resp_fields = required
            .object("responsavel", req.responsavel)
            .map(|r| r.validate(&mut required));
        required.finish()?;
        req.aluno.apply_dates(&mut model)?;

        let resp_fields = resp_fields.ok_or_else(|| {
            SysocialError::missing_fields(MISSING_FIELDS_MESSAGE, vec!["responsavel".into()])
        })?;

        let txn = self.storage.get_db().begin().await?;

        let aluno = model.insert(&txn).await?;
        let resp = responsavel::find_or_create(&txn, &resp_fields).await?;
        responsavel::link(&txn, resp.id_responsavel, aluno.id_aluno, &resp_fields.tipo).await?;

        txn.commit().await?;

        info!(
            "Aluno {} criado com responsável {}",
            aluno.id_aluno, resp.id_responsavel
        );
        Ok(AlunoCriado {
            aluno,
            responsavel: ResponsavelVinculado {
                responsavel: resp,
                tipo: resp_fields.tipo,
            },
        })
    }

    pub async fn update(&self, id: i32, input: AlunoInput) -> Result<aluno::Model> {
        let existing = self.get(id).await?;
        let mut model: aluno::ActiveModel = existing.clone().into();

        if !input.apply_update(&mut model)? {
            return Ok(existing);
        }

        let updated = model.update(self.storage.get_db()).await?;
        info!("Aluno {} atualizado", id);
        Ok(updated)
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        let result = aluno::Entity::delete_by_id(id)
            .exec(self.storage.get_db())
            .await?;

        if result.rows_affected == 0 {
            return Err(SysocialError::not_found("Aluno não encontrado"));
        }
        info!("Aluno {} removido", id);
        Ok(())
    }
}
