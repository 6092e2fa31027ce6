//! Usuários endpoints `/usuarios`

use actix_web::{Responder, Result as ActixResult, web};
use std::sync::Arc;

use crate::services::{UsuarioInput, UsuarioService};

use super::error_code::Recurso;
use super::helpers::{api_result, created_result, deleted_result, paginated_result};
use super::types::PageQuery;

pub async fn list_usuarios(
    query: web::Query<PageQuery>,
    service: web::Data<Arc<UsuarioService>>,
) -> ActixResult<impl Responder> {
    Ok(paginated_result(
        Recurso::Usuario,
        service.list(query.page, query.limit).await,
    ))
}

pub async fn get_usuario(
    path: web::Path<i32>,
    service: web::Data<Arc<UsuarioService>>,
) -> ActixResult<impl Responder> {
    Ok(api_result(Recurso::Usuario, service.get(path.into_inner()).await))
}

pub async fn create_usuario(
    body: web::Json<UsuarioInput>,
    service: web::Data<Arc<UsuarioService>>,
) -> ActixResult<impl Responder> {
    Ok(created_result(
        Recurso::Usuario,
        service.create(body.into_inner()).await,
    ))
}

pub async fn update_usuario(
    path: web::Path<i32>,
    body: web::Json<UsuarioInput>,
    service: web::Data<Arc<UsuarioService>>,
) -> ActixResult<impl Responder> {
    Ok(api_result(
        Recurso::Usuario,
        service.update(path.into_inner(), body.into_inner()).await,
    ))
}

pub async fn delete_usuario(
    path: web::Path<i32>,
    service: web::Data<Arc<UsuarioService>>,
) -> ActixResult<impl Responder> {
    Ok(deleted_result(
        Recurso::Usuario,
        service.delete(path.into_inner()).await,
    ))
}
