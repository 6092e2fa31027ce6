//! Cursos endpoints `/cursos`

use actix_web::{Responder, Result as ActixResult, web};
use std::sync::Arc;
use tracing::trace;

use crate::services::{CreateCursoRequest, CursoFilter, CursoInput, CursoService};

use super::error_code::Recurso;
use super::helpers::{api_result, created_result, deleted_result};

pub async fn list_cursos(
    query: web::Query<CursoFilter>,
    service: web::Data<Arc<CursoService>>,
) -> ActixResult<impl Responder> {
    trace!("REST API: list cursos with filters: {:?}", query);
    Ok(api_result(Recurso::Curso, service.list(&query).await))
}

pub async fn get_curso(
    path: web::Path<i32>,
    service: web::Data<Arc<CursoService>>,
) -> ActixResult<impl Responder> {
    Ok(api_result(Recurso::Curso, service.get(path.into_inner()).await))
}

/// 课程 + 下属班级
pub async fn get_curso_com_turmas(
    path: web::Path<i32>,
    service: web::Data<Arc<CursoService>>,
) -> ActixResult<impl Responder> {
    Ok(api_result(
        Recurso::Curso,
        service.com_turmas(path.into_inner()).await,
    ))
}

pub async fn get_curso_turmas(
    path: web::Path<i32>,
    service: web::Data<Arc<CursoService>>,
) -> ActixResult<impl Responder> {
    Ok(api_result(Recurso::Curso, service.turmas(path.into_inner()).await))
}

pub async fn create_curso(
    body: web::Json<CreateCursoRequest>,
    service: web::Data<Arc<CursoService>>,
) -> ActixResult<impl Responder> {
    Ok(created_result(
        Recurso::Curso,
        service.create(body.into_inner()).await,
    ))
}

pub async fn update_curso(
    path: web::Path<i32>,
    body: web::Json<CursoInput>,
    service: web::Data<Arc<CursoService>>,
) -> ActixResult<impl Responder> {
    Ok(api_result(
        Recurso::Curso,
        service.update(path.into_inner(), body.into_inner()).await,
    ))
}

pub async fn delete_curso(
    path: web::Path<i32>,
    service: web::Data<Arc<CursoService>>,
) -> ActixResult<impl Responder> {
    Ok(deleted_result(
        Recurso::Curso,
        service.delete(path.into_inner()).await,
    ))
}
