//! Auditoria endpoints `/auditoria`
//!
//! 审计记录只读：PUT / DELETE 固定返回 405。

use actix_web::http::header::ALLOW;
use actix_web::{Responder, Result as ActixResult, web};
use std::sync::Arc;
use tracing::{info, trace};

use crate::errors::SysocialError;
use crate::services::{
    AuditoriaFilter, AuditoriaInput, AuditoriaService, IMMUTABLE_MESSAGE, PeriodoFilter,
};

use super::error_code::Recurso;
use super::helpers::{api_result, created_result, error_from_sysocial, paginated_result};

pub async fn list_auditoria(
    query: web::Query<AuditoriaFilter>,
    service: web::Data<Arc<AuditoriaService>>,
) -> ActixResult<impl Responder> {
    trace!("REST API: list auditoria with filters: {:?}", query);
    Ok(paginated_result(Recurso::Auditoria, service.list(&query).await))
}

/// 按字段、按用户统计变更次数
pub async fn resumo_auditoria(
    query: web::Query<PeriodoFilter>,
    service: web::Data<Arc<AuditoriaService>>,
) -> ActixResult<impl Responder> {
    Ok(api_result(Recurso::Auditoria, service.resumo(&query).await))
}

pub async fn trilha_matricula(
    path: web::Path<i32>,
    service: web::Data<Arc<AuditoriaService>>,
) -> ActixResult<impl Responder> {
    Ok(api_result(
        Recurso::Auditoria,
        service.trilha(path.into_inner()).await,
    ))
}

pub async fn get_auditoria(
    path: web::Path<i32>,
    service: web::Data<Arc<AuditoriaService>>,
) -> ActixResult<impl Responder> {
    Ok(api_result(
        Recurso::Auditoria,
        service.get(path.into_inner()).await,
    ))
}

pub async fn create_auditoria(
    body: web::Json<AuditoriaInput>,
    service: web::Data<Arc<AuditoriaService>>,
) -> ActixResult<impl Responder> {
    Ok(created_result(
        Recurso::Auditoria,
        service.create(body.into_inner()).await,
    ))
}

/// PUT / DELETE `/auditoria/{id}`
pub async fn reject_mutation(path: web::Path<String>) -> ActixResult<impl Responder> {
    info!("REST API: mutation attempt on auditoria {} rejected", path.into_inner());
    let mut response = error_from_sysocial(
        Recurso::Auditoria,
        &SysocialError::method_not_allowed(IMMUTABLE_MESSAGE),
    );
    response
        .headers_mut()
        .insert(ALLOW, actix_web::http::header::HeaderValue::from_static("GET"));
    Ok(response)
}
