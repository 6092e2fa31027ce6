//! REST API 帮助函数

use actix_web::error::{InternalError, JsonPayloadError, PathError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpMessage, HttpRequest, HttpResponse};
use serde::Serialize;
use tracing::{debug, error};

use crate::api::jwt::AccessClaims;
use crate::api::middleware::AuthUser;
use crate::errors::{Result, SysocialError};
use crate::services::Page;

use super::error_code::{ErrorCode, Recurso};
use super::types::{ApiResponse, CamposFaltantes, PaginatedResponse};

/// 构建 JSON 响应
pub fn json_response<T: Serialize>(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
    data: Option<T>,
) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ApiResponse {
            code: code as i32,
            message: message.into(),
            data,
        })
}

/// 构建成功响应
pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(data))
}

/// 201 Created
pub fn created_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::CREATED, ErrorCode::Success, "Criado", Some(data))
}

/// 分页列表响应
pub fn paginated_response<T: Serialize>(page: Page<T>) -> HttpResponse {
    HttpResponse::Ok()
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(PaginatedResponse {
            code: ErrorCode::Success as i32,
            message: "OK".to_string(),
            data: page.items,
            pagination: page.pagination,
        })
}

/// 构建错误响应
pub fn error_response(status: StatusCode, error_code: ErrorCode, message: &str) -> HttpResponse {
    json_response::<()>(status, error_code, message, None)
}

/// 从 SysocialError 构建错误响应（自动映射 HTTP 状态码和 ErrorCode）
pub fn error_from_sysocial(recurso: Recurso, err: &SysocialError) -> HttpResponse {
    let status = err.http_status();
    let code = ErrorCode::scoped(recurso, err);

    if status.is_server_error() {
        error!("{:?} request failed: {}", recurso, err);
    } else {
        debug!("{:?} request rejected: {}", recurso, err);
    }

    match err {
        SysocialError::MissingFields { message, campos } => json_response(
            status,
            code,
            message.as_str(),
            Some(CamposFaltantes {
                campos: campos.clone(),
            }),
        ),
        _ => error_response(status, code, err.message()),
    }
}

/// 统一 Result → HttpResponse 转换
///
/// 成功时返回 200 OK + JSON 数据，失败时自动映射 SysocialError。
pub fn api_result<T: Serialize>(recurso: Recurso, result: Result<T>) -> HttpResponse {
    match result {
        Ok(data) => success_response(data),
        Err(e) => error_from_sysocial(recurso, &e),
    }
}

/// 创建类接口：成功时返回 201
pub fn created_result<T: Serialize>(recurso: Recurso, result: Result<T>) -> HttpResponse {
    match result {
        Ok(data) => created_response(data),
        Err(e) => error_from_sysocial(recurso, &e),
    }
}

/// 分页列表接口
pub fn paginated_result<T: Serialize>(recurso: Recurso, result: Result<Page<T>>) -> HttpResponse {
    match result {
        Ok(page) => paginated_response(page),
        Err(e) => error_from_sysocial(recurso, &e),
    }
}

/// 删除类接口：成功时返回 204 空响应
pub fn deleted_result<T>(recurso: Recurso, result: Result<T>) -> HttpResponse {
    match result {
        Ok(_) => HttpResponse::NoContent().finish(),
        Err(e) => error_from_sysocial(recurso, &e),
    }
}

/// 取出认证中间件放入 extensions 的 claims
pub fn auth_user(req: &HttpRequest) -> Result<AccessClaims> {
    req.extensions()
        .get::<AuthUser>()
        .map(|user| user.0.clone())
        .ok_or_else(|| SysocialError::token_invalid("Token ausente ou inválido"))
}

// ============================================================
// actix 提取器错误处理：统一返回 JSON 信封
// ============================================================

fn bad_request<E>(err: E, message: String) -> actix_web::Error
where
    E: std::fmt::Debug + std::fmt::Display + 'static,
{
    let response = error_response(StatusCode::BAD_REQUEST, ErrorCode::BadRequest, &message);
    InternalError::from_response(err, response).into()
}

pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = format!("JSON inválido: {}", err);
    bad_request(err, message)
}

pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = format!("Parâmetros de consulta inválidos: {}", err);
    bad_request(err, message)
}

pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    let message = format!("Parâmetro de rota inválido: {}", err);
    bad_request(err, message)
}

/// 未匹配路由的 JSON 404
pub async fn not_found() -> HttpResponse {
    error_response(
        StatusCode::NOT_FOUND,
        ErrorCode::NotFound,
        "Rota não encontrada",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_json(response: HttpResponse) -> serde_json::Value {
        let bytes = to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[actix_rt::test]
    async fn test_success_response_envelope() {
        let response = success_response(vec![1, 2, 3]);
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["code"], 0);
        assert_eq!(body["message"], "OK");
        assert_eq!(body["data"], serde_json::json!([1, 2, 3]));
    }

    #[actix_rt::test]
    async fn test_missing_fields_carry_campos() {
        let err = SysocialError::missing_fields(
            "Campos obrigatórios ausentes",
            vec!["cpf".into(), "responsavel.telefone".into()],
        );
        let response = error_from_sysocial(Recurso::Aluno, &err);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["code"], ErrorCode::MissingFields as i32);
        assert_eq!(
            body["data"]["campos"],
            serde_json::json!(["cpf", "responsavel.telefone"])
        );
    }

    #[actix_rt::test]
    async fn test_error_without_data_is_null() {
        let response = error_from_sysocial(
            Recurso::Matricula,
            &SysocialError::not_found("Matrícula não encontrada"),
        );
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["code"], ErrorCode::MatriculaNotFound as i32);
        assert_eq!(body["message"], "Matrícula não encontrada");
        assert!(body["data"].is_null());
    }

    #[test]
    fn test_created_and_deleted_status() {
        assert_eq!(
            created_result(Recurso::Curso, Ok("x")).status(),
            StatusCode::CREATED
        );
        assert_eq!(
            deleted_result(Recurso::Curso, Ok(())).status(),
            StatusCode::NO_CONTENT
        );
        assert_eq!(
            deleted_result::<()>(Recurso::Curso, Err(SysocialError::conflict("em uso"))).status(),
            StatusCode::CONFLICT
        );
    }
}
