use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::{Method, header::CONTENT_TYPE},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::{info, trace};

use crate::api::jwt::{AccessClaims, get_jwt_service};
use crate::api::services::escola::{ApiResponse, ErrorCode};
use crate::config::get_config;
use crate::errors::SysocialError;

/// 无需 access token 的端点（相对 `{api_prefix}/v1`）
const PUBLIC_ENDPOINTS: [&str; 3] = ["/auth/login", "/auth/register", "/auth/refresh"];

/// 已认证用户，由 `ApiAuth` 写入 request extensions
#[derive(Clone, Debug)]
pub struct AuthUser(pub AccessClaims);

/// API authentication middleware
#[derive(Clone)]
pub struct ApiAuth;

impl<S, B> Transform<S, ServiceRequest> for ApiAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = ApiAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        let config = get_config();
        let base = format!("{}/v1", config.server.api_prefix.trim_end_matches('/'));
        ready(Ok(ApiAuthMiddleware {
            service: Rc::new(service),
            public_paths: Rc::new(
                PUBLIC_ENDPOINTS
                    .iter()
                    .map(|p| format!("{}{}", base, p))
                    .collect(),
            ),
            enabled: config.auth.enabled,
        }))
    }
}

pub struct ApiAuthMiddleware<S> {
    service: Rc<S>,
    public_paths: Rc<Vec<String>>,
    enabled: bool,
}

impl<S, B> ApiAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    /// Handle OPTIONS requests for CORS preflight
    fn handle_options_request(req: ServiceRequest) -> ServiceResponse<EitherBody<B>> {
        req.into_response(
            HttpResponse::NoContent()
                .insert_header((CONTENT_TYPE, "text/plain; charset=utf-8"))
                .finish()
                .map_into_right_body(),
        )
    }

    /// Handle unauthorized requests
    fn handle_unauthorized(
        req: ServiceRequest,
        err: &SysocialError,
    ) -> ServiceResponse<EitherBody<B>> {
        info!("API authentication failed: {}", err.message());
        let code = match err {
            SysocialError::TokenExpired(_) => ErrorCode::TokenExpired,
            SysocialError::TokenInvalid(_) => ErrorCode::TokenInvalid,
            _ => ErrorCode::Unauthorized,
        };
        req.into_response(
            HttpResponse::Unauthorized()
                .insert_header((CONTENT_TYPE, "application/json; charset=utf-8"))
                .json(ApiResponse::<()> {
                    code: code as i32,
                    message: err.message().to_string(),
                    data: None,
                })
                .map_into_right_body(),
        )
    }

    /// 从 Authorization header 提取 Bearer token
    fn extract_bearer_token(req: &ServiceRequest) -> Option<String> {
        req.headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn authenticate(req: &ServiceRequest) -> Result<AccessClaims, SysocialError> {
        let token = Self::extract_bearer_token(req)
            .ok_or_else(|| SysocialError::auth_failed("Token de acesso não informado"))?;
        get_jwt_service().validate_access_token(&token)
    }
}

impl<S, B> Service<ServiceRequest> for ApiAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let public_paths = self.public_paths.clone();
        let enabled = self.enabled;

        Box::pin(async move {
            // Handle CORS preflight requests
            if req.method() == Method::OPTIONS {
                return Ok(Self::handle_options_request(req));
            }

            let is_public = public_paths.iter().any(|p| p == req.path());

            match Self::authenticate(&req) {
                Ok(claims) => {
                    trace!("API authentication successful for {}", claims.username);
                    req.extensions_mut().insert(AuthUser(claims));
                }
                // 公开端点与关闭认证时放行，claims 有效则照常注入
                Err(_) if is_public || !enabled => {
                    trace!("{} accessed without authentication", req.path());
                }
                Err(e) => return Ok(Self::handle_unauthorized(req, &e)),
            }

            let response = srv.call(req).await?.map_into_left_body();
            Ok(response)
        })
    }
}
