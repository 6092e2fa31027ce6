//! Matrículas endpoints `/matriculas`

use actix_web::{Responder, Result as ActixResult, web};
use std::sync::Arc;
use tracing::trace;

use crate::services::{
    CursosDisponiveisFilter, MatriculaFilter, MatriculaRequest, MatriculaService,
};

use super::error_code::Recurso;
use super::helpers::{api_result, created_result, deleted_result};

pub async fn list_matriculas(
    query: web::Query<MatriculaFilter>,
    service: web::Data<Arc<MatriculaService>>,
) -> ActixResult<impl Responder> {
    trace!("REST API: list matriculas with filters: {:?}", query);
    Ok(api_result(Recurso::Matricula, service.list(&query).await))
}

/// 按学生在校时段列出可报名的课程与班级
pub async fn cursos_disponiveis(
    query: web::Query<CursosDisponiveisFilter>,
    service: web::Data<Arc<MatriculaService>>,
) -> ActixResult<impl Responder> {
    trace!("REST API: cursos disponiveis para turno {:?}", query.turno);
    Ok(api_result(
        Recurso::Matricula,
        service.cursos_disponiveis(&query).await,
    ))
}

/// 报名详情：学生、课程、班级、监护人与文件
pub async fn get_matricula(
    path: web::Path<i32>,
    service: web::Data<Arc<MatriculaService>>,
) -> ActixResult<impl Responder> {
    Ok(api_result(
        Recurso::Matricula,
        service.get(path.into_inner()).await,
    ))
}

/// 学生 + 监护人 + 报名 + 文件，全部成功或全部回滚
pub async fn create_matricula(
    body: web::Json<MatriculaRequest>,
    service: web::Data<Arc<MatriculaService>>,
) -> ActixResult<impl Responder> {
    Ok(created_result(
        Recurso::Matricula,
        service.create(body.into_inner()).await,
    ))
}

pub async fn update_matricula(
    path: web::Path<i32>,
    body: web::Json<MatriculaRequest>,
    service: web::Data<Arc<MatriculaService>>,
) -> ActixResult<impl Responder> {
    Ok(api_result(
        Recurso::Matricula,
        service.update(path.into_inner(), body.into_inner()).await,
    ))
}

pub async fn delete_matricula(
    path: web::Path<i32>,
    service: web::Data<Arc<MatriculaService>>,
) -> ActixResult<impl Responder> {
    Ok(deleted_result(
        Recurso::Matricula,
        service.delete(path.into_inner()).await,
    ))
}
