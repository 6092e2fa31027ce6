//! Auth endpoints `/auth`
//!
//! 登录、注册、刷新、登出与 token 校验。

use actix_governor::{Governor, GovernorConfigBuilder, KeyExtractor, SimpleKeyExtractionError};
use actix_web::dev::ServiceRequest;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, Responder, Result as ActixResult, web};
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tracing::debug;

use crate::services::{LoginRequest, RefreshRequest, UsuarioInput, UsuarioService};

use super::error_code::{ErrorCode, Recurso};
use super::helpers::{
    api_result, auth_user, created_result, error_from_sysocial, json_response, success_response,
};

/// 基于连接 IP 的限流 key 提取器
///
/// 只使用 TCP peer address，不读取 X-Forwarded-For。
#[derive(Clone, Copy, Debug)]
pub struct LoginKeyExtractor;

impl KeyExtractor for LoginKeyExtractor {
    type Key = String;
    type KeyExtractionError = SimpleKeyExtractionError<&'static str>;

    fn extract(&self, req: &ServiceRequest) -> Result<Self::Key, Self::KeyExtractionError> {
        // 测试请求等场景没有 peer address，归入同一个桶
        Ok(req
            .peer_addr()
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| "desconhecido".to_string()))
    }
}

/// 登录限流：每秒补充 1 个令牌，突发 5 次
pub fn login_rate_limiter() -> Governor<LoginKeyExtractor, NoOpMiddleware> {
    let config = GovernorConfigBuilder::default()
        .seconds_per_request(1)
        .burst_size(5)
        .key_extractor(LoginKeyExtractor)
        .finish()
        .expect("Invalid rate limit config");

    debug!("Login rate limiter created: 1 req/s, burst 5");
    Governor::new(&config)
}

pub async fn login(
    body: web::Json<LoginRequest>,
    service: web::Data<Arc<UsuarioService>>,
) -> ActixResult<impl Responder> {
    Ok(api_result(
        Recurso::Usuario,
        service.login(body.into_inner()).await,
    ))
}

/// 注册与 `POST /usuarios` 使用相同的校验
pub async fn register(
    body: web::Json<UsuarioInput>,
    service: web::Data<Arc<UsuarioService>>,
) -> ActixResult<impl Responder> {
    Ok(created_result(
        Recurso::Usuario,
        service.create(body.into_inner()).await,
    ))
}

pub async fn refresh_token(
    body: web::Json<RefreshRequest>,
    service: web::Data<Arc<UsuarioService>>,
) -> ActixResult<impl Responder> {
    Ok(api_result(
        Recurso::Usuario,
        service.refresh(body.into_inner()).await,
    ))
}

/// 注销当前会话，之后同一会话的 access 与 refresh token 均返回 401
pub async fn logout(
    req: HttpRequest,
    service: web::Data<Arc<UsuarioService>>,
) -> ActixResult<impl Responder> {
    let claims = match auth_user(&req) {
        Ok(claims) => claims,
        Err(e) => return Ok(error_from_sysocial(Recurso::Geral, &e)),
    };

    service.logout(&claims);
    Ok(json_response::<()>(
        StatusCode::OK,
        ErrorCode::Success,
        "Sessão encerrada",
        None,
    ))
}

pub async fn validate_token(
    req: HttpRequest,
    service: web::Data<Arc<UsuarioService>>,
) -> ActixResult<impl Responder> {
    Ok(match auth_user(&req) {
        Ok(claims) => success_response(service.validate(&claims)),
        Err(e) => error_from_sysocial(Recurso::Geral, &e),
    })
}
