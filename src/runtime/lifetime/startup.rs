use crate::api::jwt::get_jwt_service;
use crate::api::services::{AppServices, AppStartTime};
use crate::storage::{SeaOrmStorage, StorageFactory};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

/// 启动后各 worker 共享的组件
#[derive(Clone)]
pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    pub services: AppServices,
    pub api_prefix: String,
    pub start_time: AppStartTime,
}

impl StartupContext {
    /// 基于已连接的存储组装 service（测试直接使用）
    pub fn from_storage(storage: Arc<SeaOrmStorage>, api_prefix: impl Into<String>) -> Self {
        Self {
            services: AppServices::new(storage.clone()),
            storage,
            api_prefix: api_prefix.into(),
            start_time: AppStartTime::now(),
        }
    }
}

/// 安装 rustls 的默认加密后端（Postgres TLS 连接需要）
pub fn install_crypto_provider() -> Result<()> {
    // 已安装时返回 Err，重复调用视为成功
    if rustls::crypto::CryptoProvider::get_default().is_some() {
        return Ok(());
    }
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|e| anyhow::anyhow!("Failed to install rustls crypto provider: {:?}", e))
}

/// 准备服务器启动的上下文
/// 包括存储连接、数据库迁移与业务 service
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    install_crypto_provider()?;

    let storage = StorageFactory::create()
        .await
        .context("Failed to create storage backend")?;
    info!("Using storage backend: {}", storage.backend_name());

    // 提前初始化 JWT 服务，密钥缺失的警告在启动阶段输出
    let access_minutes = get_jwt_service().access_token_minutes();
    debug!("JWT service ready, access token lifetime {} min", access_minutes);

    let config = crate::config::get_config();
    let context = StartupContext::from_storage(storage, config.server.api_prefix.clone());

    info!("Pre-startup completed in {:?}", start_time.elapsed());
    Ok(context)
}

/// `sysocial migrate`：只运行迁移后退出
pub async fn run_migrations() -> Result<()> {
    install_crypto_provider()?;

    let storage = StorageFactory::create()
        .await
        .context("Failed to run database migrations")?;
    info!("Migrations applied on {}", storage.backend_name());

    storage.close().await.context("Failed to close database")?;
    Ok(())
}
