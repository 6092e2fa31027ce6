//! 监护人（responsável）公共逻辑
//!
//! 学生创建、报名创建与报名更新共用：按 CPF 去重、upsert 关联、选出主监护人。

use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
    sea_query::OnConflict,
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::errors::Result;
use crate::services::validation::Required;
use migration::entities::{responsavel, responsavel_aluno};

pub const TIPO_PRINCIPAL: &str = "principal";

/// 请求中的监护人字段
#[derive(Debug, Clone, Default, Deserialize, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/app/services/types.generated.ts")]
pub struct ResponsavelInput {
    pub nome_completo: Option<String>,
    pub cpf: Option<String>,
    pub telefone: Option<String>,
    pub telefone_recado1: Option<String>,
    pub telefone_recado2: Option<String>,
    pub parentesco: Option<String>,
    /// 关联类型，默认 `principal`
    pub tipo: Option<String>,
}

/// 校验后的监护人数据
#[derive(Debug, Clone)]
pub struct ResponsavelFields {
    pub nome_completo: String,
    pub cpf: String,
    pub telefone: String,
    pub telefone_recado1: String,
    pub telefone_recado2: String,
    pub parentesco: String,
    pub tipo: String,
}

impl ResponsavelInput {
    /// 缺失字段记入 `req`（前缀 `responsavel.`）
    pub fn validate(&self, req: &mut Required) -> ResponsavelFields {
        let mut own = Required::nested("responsavel");
        let fields = ResponsavelFields {
            nome_completo: own.text("nome_completo", &self.nome_completo).to_string(),
            cpf: own.text("cpf", &self.cpf).to_string(),
            telefone: own.text("telefone", &self.telefone).to_string(),
            telefone_recado1: own.text("telefone_recado1", &self.telefone_recado1).to_string(),
            telefone_recado2: own.text("telefone_recado2", &self.telefone_recado2).to_string(),
            parentesco: own.text("parentesco", &self.parentesco).to_string(),
            tipo: crate::utils::non_empty(self.tipo.as_deref())
                .unwrap_or(TIPO_PRINCIPAL)
                .to_string(),
        };
        req.merge(own);
        fields
    }
}

/// 监护人 + 关联类型
#[derive(Debug, Clone, Serialize)]
pub struct ResponsavelVinculado {
    #[serde(flatten)]
    pub responsavel: responsavel::Model,
    pub tipo: String,
}

/// CPF 已存在则复用，否则插入
pub async fn find_or_create<C: ConnectionTrait>(
    conn: &C,
    fields: &ResponsavelFields,
) -> Result<responsavel::Model> {
    let existing = responsavel::Entity::find()
        .filter(responsavel::Column::Cpf.eq(&fields.cpf))
        .one(conn)
        .await?;

    if let Some(model) = existing {
        return Ok(model);
    }

    let model = responsavel::ActiveModel {
        nome_completo: Set(fields.nome_completo.clone()),
        cpf: Set(fields.cpf.clone()),
        telefone: Set(fields.telefone.clone()),
        telefone_recado1: Set(fields.telefone_recado1.clone()),
        telefone_recado2: Set(fields.telefone_recado2.clone()),
        parentesco: Set(fields.parentesco.clone()),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    Ok(model)
}

/// 更新报名时的监护人处理
///
/// CPF 必填；已存在则只覆盖请求中出现的字段，不存在则按完整字段插入。
pub async fn update_or_create<C: ConnectionTrait>(
    conn: &C,
    input: &ResponsavelInput,
) -> Result<(responsavel::Model, String)> {
    let mut req = Required::nested("responsavel");
    let cpf = req.text("cpf", &input.cpf).to_string();
    req.finish()?;

    let tipo = crate::utils::non_empty(input.tipo.as_deref())
        .unwrap_or(TIPO_PRINCIPAL)
        .to_string();

    let existing = responsavel::Entity::find()
        .filter(responsavel::Column::Cpf.eq(&cpf))
        .one(conn)
        .await?;

    let Some(model) = existing else {
        let mut req = Required::new();
        let fields = input.validate(&mut req);
        req.finish()?;
        return Ok((find_or_create(conn, &fields).await?, tipo));
    };

    let mut active: responsavel::ActiveModel = model.clone().into();
    let mut changed = false;
    for (value, slot) in [
        (&input.nome_completo, &mut active.nome_completo),
        (&input.telefone, &mut active.telefone),
        (&input.telefone_recado1, &mut active.telefone_recado1),
        (&input.telefone_recado2, &mut active.telefone_recado2),
        (&input.parentesco, &mut active.parentesco),
    ] {
        if let Some(v) = value {
            *slot = Set(v.clone());
            changed = true;
        }
    }

    let model = if changed {
        active.update(conn).await?
    } else {
        model
    };
    Ok((model, tipo))
}

/// 关联监护人与学生，已存在则更新类型
pub async fn link<C: ConnectionTrait>(
    conn: &C,
    id_responsavel: i32,
    id_aluno: i32,
    tipo: &str,
) -> Result<()> {
    let model = responsavel_aluno::ActiveModel {
        responsavel_id_responsavel: Set(id_responsavel),
        aluno_id_aluno: Set(id_aluno),
        tipo: Set(tipo.to_string()),
    };

    responsavel_aluno::Entity::insert(model)
        .on_conflict(
            OnConflict::columns([
                responsavel_aluno::Column::ResponsavelIdResponsavel,
                responsavel_aluno::Column::AlunoIdAluno,
            ])
            .update_column(responsavel_aluno::Column::Tipo)
            .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    Ok(())
}

/// 学生的全部监护人：主监护人在前，其余按姓名
pub async fn list_for_aluno<C: ConnectionTrait>(
    conn: &C,
    id_aluno: i32,
) -> Result<Vec<ResponsavelVinculado>> {
    let rows = responsavel_aluno::Entity::find()
        .filter(responsavel_aluno::Column::AlunoIdAluno.eq(id_aluno))
        .find_also_related(responsavel::Entity)
        .all(conn)
        .await?;

    let mut list: Vec<ResponsavelVinculado> = rows
        .into_iter()
        .filter_map(|(link, resp)| {
            resp.map(|responsavel| ResponsavelVinculado {
                responsavel,
                tipo: link.tipo,
            })
        })
        .collect();

    list.sort_by(|a, b| {
        (a.tipo != TIPO_PRINCIPAL)
            .cmp(&(b.tipo != TIPO_PRINCIPAL))
            .then_with(|| a.responsavel.nome_completo.cmp(&b.responsavel.nome_completo))
    });
    Ok(list)
}

/// 每个学生的主监护人：`principal` 优先，否则 id 最小者
pub async fn principal_by_aluno<C: ConnectionTrait>(
    conn: &C,
    aluno_ids: &[i32],
) -> Result<HashMap<i32, responsavel::Model>> {
    if aluno_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = responsavel_aluno::Entity::find()
        .filter(responsavel_aluno::Column::AlunoIdAluno.is_in(aluno_ids.iter().copied()))
        .find_also_related(responsavel::Entity)
        .all(conn)
        .await?;

    Ok(pick_principal(rows.into_iter().filter_map(
        |(link, resp)| resp.map(|r| (link.aluno_id_aluno, link.tipo, r)),
    )))
}

fn pick_principal(
    rows: impl Iterator<Item = (i32, String, responsavel::Model)>,
) -> HashMap<i32, responsavel::Model> {
    let mut best: HashMap<i32, (bool, responsavel::Model)> = HashMap::new();

    for (id_aluno, tipo, resp) in rows {
        let is_principal = tipo == TIPO_PRINCIPAL;
        let replace = match best.get(&id_aluno) {
            None => true,
            Some((cur_principal, cur)) => {
                (is_principal, -resp.id_responsavel) > (*cur_principal, -cur.id_responsavel)
            }
        };
        if replace {
            best.insert(id_aluno, (is_principal, resp));
        }
    }

    best.into_iter().map(|(k, (_, v))| (k, v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resp(id: i32, nome: &str) -> responsavel::Model {
        responsavel::Model {
            id_responsavel: id,
            nome_completo: nome.to_string(),
            cpf: format!("cpf-{}", id),
            telefone: "1".into(),
            telefone_recado1: "2".into(),
            telefone_recado2: "3".into(),
            parentesco: "mãe".into(),
        }
    }

    #[test]
    fn test_principal_wins_over_lower_id() {
        let rows = vec![
            (1, "secundario".to_string(), resp(3, "B")),
            (1, TIPO_PRINCIPAL.to_string(), resp(9, "A")),
        ];
        let map = pick_principal(rows.into_iter());
        assert_eq!(map[&1].id_responsavel, 9);
    }

    #[test]
    fn test_lowest_id_without_principal() {
        let rows = vec![
            (2, "outro".to_string(), resp(7, "B")),
            (2, "outro".to_string(), resp(4, "A")),
            (3, "outro".to_string(), resp(5, "C")),
        ];
        let map = pick_principal(rows.into_iter());
        assert_eq!(map[&2].id_responsavel, 4);
        assert_eq!(map[&3].id_responsavel, 5);
    }

    #[test]
    fn test_validate_defaults_tipo_and_reports_missing() {
        let input = ResponsavelInput {
            nome_completo: Some("Maria".into()),
            cpf: Some("111".into()),
            telefone: Some("9999".into()),
            ..Default::default()
        };
        let mut req = Required::new();
        let fields = input.validate(&mut req);
        assert_eq!(fields.tipo, TIPO_PRINCIPAL);

        match req.finish() {
            Err(crate::errors::SysocialError::MissingFields { campos, .. }) => assert_eq!(
                campos,
                vec![
                    "responsavel.telefone_recado1",
                    "responsavel.telefone_recado2",
                    "responsavel.parentesco"
                ]
            ),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
