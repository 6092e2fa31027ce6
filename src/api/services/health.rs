use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, trace};
use ts_rs::TS;

use crate::api::services::escola::{ErrorCode, TS_EXPORT_PATH, error_response, success_response};
use crate::storage::SeaOrmStorage;

const PING_TIMEOUT: Duration = Duration::from_secs(5);

// 应用启动时间结构体
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

impl AppStartTime {
    pub fn now() -> Self {
        Self {
            start_datetime: chrono::Utc::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        (chrono::Utc::now() - self.start_datetime)
            .num_seconds()
            .max(0) as u64
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct HealthResponse {
    pub ok: bool,
    /// `healthy` / `unhealthy`
    pub database: String,
    pub uptime_secs: u64,
}

/// Health Service
///
/// 直接调用 storage 的 ping，不经过业务 service。
pub struct HealthService;

impl HealthService {
    /// 带超时的数据库 ping
    async fn database_healthy(storage: &SeaOrmStorage) -> bool {
        match tokio::time::timeout(PING_TIMEOUT, storage.ping()).await {
            Ok(true) => true,
            Ok(false) => {
                error!("Database health check failed");
                false
            }
            Err(_) => {
                error!("Database health check timeout");
                false
            }
        }
    }

    pub async fn health_check(
        storage: web::Data<Arc<SeaOrmStorage>>,
        app_start_time: web::Data<AppStartTime>,
    ) -> impl Responder {
        let start_time = Instant::now();
        trace!("Received health check request");

        let healthy = Self::database_healthy(&storage).await;
        let response = HealthResponse {
            ok: true,
            database: if healthy { "healthy" } else { "unhealthy" }.to_string(),
            uptime_secs: app_start_time.uptime_secs(),
        };

        trace!(
            "Health check completed in {:?}, database: {}",
            start_time.elapsed(),
            response.database
        );
        success_response(response)
    }

    /// 数据库可用时才算就绪
    pub async fn readiness_check(storage: web::Data<Arc<SeaOrmStorage>>) -> impl Responder {
        trace!("Received readiness check request");

        if Self::database_healthy(&storage).await {
            HttpResponse::Ok()
                .append_header(("Content-Type", "text/plain"))
                .body("OK")
        } else {
            error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorCode::ServiceUnavailable,
                "Banco de dados indisponível",
            )
        }
    }

    // 活跃性检查，进程存活即返回 200
    pub async fn liveness_check() -> impl Responder {
        trace!("Received liveness check request");

        HttpResponse::Ok()
            .append_header(("Content-Type", "text/plain"))
            .body("OK")
    }
}

/// Health 路由配置（不经过认证，也不在 API 前缀下）
pub fn health_routes() -> actix_web::Scope {
    web::scope("/health")
        .route("", web::get().to(HealthService::health_check))
        .route("", web::head().to(HealthService::health_check))
        .route("/ready", web::get().to(HealthService::readiness_check))
        .route("/ready", web::head().to(HealthService::readiness_check))
        .route("/live", web::get().to(HealthService::liveness_check))
        .route("/live", web::head().to(HealthService::liveness_check))
}
