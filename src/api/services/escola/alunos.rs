//! Alunos endpoints `/alunos`

use actix_web::{Responder, Result as ActixResult, web};
use std::sync::Arc;
use tracing::trace;

use crate::services::{AlunoFilter, AlunoInput, AlunoService, CreateAlunoRequest};

use super::error_code::Recurso;
use super::helpers::{api_result, created_result, deleted_result, paginated_result};

/// 学生列表（分页 + 过滤）
pub async fn list_alunos(
    query: web::Query<AlunoFilter>,
    service: web::Data<Arc<AlunoService>>,
) -> ActixResult<impl Responder> {
    trace!("REST API: list alunos with filters: {:?}", query);
    Ok(paginated_result(Recurso::Aluno, service.list(&query).await))
}

/// 每条报名的学生与主监护人
pub async fn resumo_alunos(service: web::Data<Arc<AlunoService>>) -> ActixResult<impl Responder> {
    Ok(api_result(Recurso::Aluno, service.resumo().await))
}

pub async fn verificar_cpf(
    path: web::Path<String>,
    service: web::Data<Arc<AlunoService>>,
) -> ActixResult<impl Responder> {
    Ok(api_result(
        Recurso::Aluno,
        service.verificar_cpf(&path.into_inner()).await,
    ))
}

pub async fn get_aluno(
    path: web::Path<i32>,
    service: web::Data<Arc<AlunoService>>,
) -> ActixResult<impl Responder> {
    let id = path.into_inner();
    trace!("REST API: get aluno {}", id);
    Ok(api_result(Recurso::Aluno, service.get(id).await))
}

/// 学生与监护人在同一事务内创建
pub async fn create_aluno(
    body: web::Json<CreateAlunoRequest>,
    service: web::Data<Arc<AlunoService>>,
) -> ActixResult<impl Responder> {
    Ok(created_result(
        Recurso::Aluno,
        service.create(body.into_inner()).await,
    ))
}

pub async fn update_aluno(
    path: web::Path<i32>,
    body: web::Json<AlunoInput>,
    service: web::Data<Arc<AlunoService>>,
) -> ActixResult<impl Responder> {
    Ok(api_result(
        Recurso::Aluno,
        service.update(path.into_inner(), body.into_inner()).await,
    ))
}

pub async fn delete_aluno(
    path: web::Path<i32>,
    service: web::Data<Arc<AlunoService>>,
) -> ActixResult<impl Responder> {
    Ok(deleted_result(
        Recurso::Aluno,
        service.delete(path.into_inner()).await,
    ))
}
