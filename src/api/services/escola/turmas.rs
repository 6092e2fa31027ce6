//! Turmas endpoints `/turmas`
//!
//! 包含班级 CRUD、班级学生、班级点名列表以及月度点名表。

use actix_web::{HttpRequest, Responder, Result as ActixResult, web};
use std::sync::Arc;
use tracing::{debug, trace};

use crate::errors::SysocialError;
use crate::services::{ChamadaService, PeriodoFilter, TurmaFilter, TurmaInput, TurmaService};

use super::error_code::Recurso;
use super::helpers::{api_result, auth_user, created_result, deleted_result, error_from_sysocial};
use super::types::MensalQuery;

pub async fn list_turmas(
    query: web::Query<TurmaFilter>,
    service: web::Data<Arc<TurmaService>>,
) -> ActixResult<impl Responder> {
    trace!("REST API: list turmas with filters: {:?}", query);
    Ok(api_result(Recurso::Turma, service.list(&query).await))
}

pub async fn get_turma(
    path: web::Path<i32>,
    service: web::Data<Arc<TurmaService>>,
) -> ActixResult<impl Responder> {
    Ok(api_result(Recurso::Turma, service.get(path.into_inner()).await))
}

/// 班级内已报名的学生（按姓名）
pub async fn get_turma_alunos(
    path: web::Path<i32>,
    service: web::Data<Arc<TurmaService>>,
) -> ActixResult<impl Responder> {
    Ok(api_result(Recurso::Turma, service.alunos(path.into_inner()).await))
}

/// 班级的点名记录，最新在前
pub async fn get_turma_aulas(
    path: web::Path<i32>,
    query: web::Query<PeriodoFilter>,
    turmas: web::Data<Arc<TurmaService>>,
    chamadas: web::Data<Arc<ChamadaService>>,
) -> ActixResult<impl Responder> {
    let id = path.into_inner();
    if let Err(e) = turmas.find(id).await {
        return Ok(error_from_sysocial(Recurso::Turma, &e));
    }
    Ok(api_result(Recurso::Aula, chamadas.by_turma(id, &query).await))
}

/// 月度点名表，缺失的点名会自动补建
pub async fn get_chamada_mensal(
    req: HttpRequest,
    path: web::Path<(i32, String)>,
    query: web::Query<MensalQuery>,
    service: web::Data<Arc<ChamadaService>>,
) -> ActixResult<impl Responder> {
    let (turma_id, ano_mes) = path.into_inner();

    // 未指定负责人时使用当前登录用户
    let usuario = match query.usuario {
        Some(id) => id,
        None => match auth_user(&req).ok().and_then(|claims| claims.user_id()) {
            Some(id) => id,
            None => {
                let err = SysocialError::missing_fields(
                    "Informe o usuário responsável pela chamada",
                    vec!["usuario".to_string()],
                );
                return Ok(error_from_sysocial(Recurso::Aula, &err));
            }
        },
    };

    debug!(
        "REST API: chamada mensal turma {} ({}) por usuário {}",
        turma_id, ano_mes, usuario
    );
    Ok(api_result(
        Recurso::Aula,
        service.mensal(turma_id, &ano_mes, usuario).await,
    ))
}

pub async fn create_turma(
    body: web::Json<TurmaInput>,
    service: web::Data<Arc<TurmaService>>,
) -> ActixResult<impl Responder> {
    Ok(created_result(
        Recurso::Turma,
        service.create(body.into_inner()).await,
    ))
}

pub async fn update_turma(
    path: web::Path<i32>,
    body: web::Json<TurmaInput>,
    service: web::Data<Arc<TurmaService>>,
) -> ActixResult<impl Responder> {
    Ok(api_result(
        Recurso::Turma,
        service.update(path.into_inner(), body.into_inner()).await,
    ))
}

pub async fn delete_turma(
    path: web::Path<i32>,
    service: web::Data<Arc<TurmaService>>,
) -> ActixResult<impl Responder> {
    Ok(deleted_result(
        Recurso::Turma,
        service.delete(path.into_inner()).await,
    ))
}
