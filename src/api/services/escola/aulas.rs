//! Aulas (chamadas) endpoints `/aulas`

use actix_web::{Responder, Result as ActixResult, web};
use std::sync::Arc;
use tracing::trace;

use crate::services::{ChamadaFilter, ChamadaInput, ChamadaService, PresencaService};

use super::error_code::Recurso;
use super::helpers::{api_result, created_result, deleted_result, paginated_result};

pub async fn list_aulas(
    query: web::Query<ChamadaFilter>,
    service: web::Data<Arc<ChamadaService>>,
) -> ActixResult<impl Responder> {
    trace!("REST API: list aulas with filters: {:?}", query);
    Ok(paginated_result(Recurso::Aula, service.list(&query).await))
}

pub async fn get_aula(
    path: web::Path<i32>,
    service: web::Data<Arc<ChamadaService>>,
) -> ActixResult<impl Responder> {
    Ok(api_result(Recurso::Aula, service.get(path.into_inner()).await))
}

/// 某次点名的出勤记录（含学生姓名）
pub async fn get_aula_presencas(
    path: web::Path<i32>,
    service: web::Data<Arc<PresencaService>>,
) -> ActixResult<impl Responder> {
    Ok(api_result(
        Recurso::Presenca,
        service.by_chamada(path.into_inner()).await,
    ))
}

pub async fn create_aula(
    body: web::Json<ChamadaInput>,
    service: web::Data<Arc<ChamadaService>>,
) -> ActixResult<impl Responder> {
    Ok(created_result(
        Recurso::Aula,
        service.create(body.into_inner()).await,
    ))
}

pub async fn update_aula(
    path: web::Path<i32>,
    body: web::Json<ChamadaInput>,
    service: web::Data<Arc<ChamadaService>>,
) -> ActixResult<impl Responder> {
    Ok(api_result(
        Recurso::Aula,
        service.update(path.into_inner(), body.into_inner()).await,
    ))
}

pub async fn delete_aula(
    path: web::Path<i32>,
    service: web::Data<Arc<ChamadaService>>,
) -> ActixResult<impl Responder> {
    Ok(deleted_result(
        Recurso::Aula,
        service.delete(path.into_inner()).await,
    ))
}
