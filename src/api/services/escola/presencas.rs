//! Presenças endpoints `/presencas`

use actix_web::{Responder, Result as ActixResult, web};
use std::sync::Arc;
use tracing::{info, trace};

use crate::services::{PresencaFilter, PresencaInput, PresencaLoteRequest, PresencaService};

use super::error_code::Recurso;
use super::helpers::{api_result, created_result, deleted_result};

pub async fn list_presencas(
    query: web::Query<PresencaFilter>,
    service: web::Data<Arc<PresencaService>>,
) -> ActixResult<impl Responder> {
    trace!("REST API: list presencas with filters: {:?}", query);
    Ok(api_result(Recurso::Presenca, service.list(&query).await))
}

pub async fn get_presenca(
    path: web::Path<i32>,
    service: web::Data<Arc<PresencaService>>,
) -> ActixResult<impl Responder> {
    Ok(api_result(
        Recurso::Presenca,
        service.get(path.into_inner()).await,
    ))
}

pub async fn create_presenca(
    body: web::Json<PresencaInput>,
    service: web::Data<Arc<PresencaService>>,
) -> ActixResult<impl Responder> {
    Ok(created_result(
        Recurso::Presenca,
        service.create(body.into_inner()).await,
    ))
}

/// 批量登记出勤（P / F / FJ），单一事务
pub async fn lote_presencas(
    body: web::Json<PresencaLoteRequest>,
    service: web::Data<Arc<PresencaService>>,
) -> ActixResult<impl Responder> {
    Ok(api_result(
        Recurso::Presenca,
        service.lote(body.into_inner()).await,
    ))
}

/// 删除某次点名的全部出勤记录
pub async fn delete_presencas_chamada(
    path: web::Path<i32>,
    service: web::Data<Arc<PresencaService>>,
) -> ActixResult<impl Responder> {
    let chamada_id = path.into_inner();
    let result = service.delete_by_chamada(chamada_id).await;
    if let Ok(removidas) = &result {
        info!(
            "REST API: {} presenças removidas da aula {}",
            removidas, chamada_id
        );
    }
    Ok(deleted_result(Recurso::Presenca, result))
}

pub async fn update_presenca(
    path: web::Path<i32>,
    body: web::Json<PresencaInput>,
    service: web::Data<Arc<PresencaService>>,
) -> ActixResult<impl Responder> {
    Ok(api_result(
        Recurso::Presenca,
        service.update(path.into_inner(), body.into_inner()).await,
    ))
}

pub async fn delete_presenca(
    path: web::Path<i32>,
    service: web::Data<Arc<PresencaService>>,
) -> ActixResult<impl Responder> {
    Ok(deleted_result(
        Recurso::Presenca,
        service.delete(path.into_inner()).await,
    ))
}
