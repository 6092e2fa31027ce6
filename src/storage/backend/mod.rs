//! SeaORM storage backend
//!
//! PostgreSQL in production, SQLite for local runs and tests.
//! MySQL/MariaDB URLs are accepted as well.

mod connection;
pub mod retry;

use std::future::Future;

use sea_orm::{DatabaseConnection, DbErr};
use strum::{AsRefStr, Display};
use tracing::{error, warn};

use crate::config::DatabaseConfig;
use crate::errors::{Result, SysocialError};

pub use connection::{connect_pooled, connect_sqlite, run_migrations};
pub use retry::{RetryConfig, with_retry};

/// 数据库类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display)]
#[strum(serialize_all = "lowercase")]
pub enum DbBackendKind {
    Sqlite,
    Mysql,
    Postgres,
}

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<DbBackendKind> {
    if database_url.starts_with("sqlite:")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok(DbBackendKind::Sqlite)
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok(DbBackendKind::Mysql)
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok(DbBackendKind::Postgres)
    } else {
        Err(SysocialError::database_config(format!(
            "无法从 URL 推断数据库类型: {}. 支持的 URL 格式: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend: DbBackendKind,
    retry_config: RetryConfig,
}

impl SeaOrmStorage {
    /// 连接数据库（不运行迁移）
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        if config.database_url.is_empty() {
            return Err(SysocialError::database_config("DATABASE_URL 未设置"));
        }

        let backend = infer_backend_from_url(&config.database_url)?;
        let db = match backend {
            DbBackendKind::Sqlite => connect_sqlite(&config.database_url).await?,
            _ => connect_pooled(config, backend).await?,
        };

        Ok(SeaOrmStorage {
            db,
            backend,
            retry_config: RetryConfig::from(config),
        })
    }

    /// 连接数据库并运行迁移
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let storage = Self::connect(config).await?;
        run_migrations(&storage.db).await?;

        warn!("{} Storage initialized.", storage.backend_name().to_uppercase());
        Ok(storage)
    }

    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn backend(&self) -> DbBackendKind {
        self.backend
    }

    pub fn backend_name(&self) -> &str {
        self.backend.as_ref()
    }

    pub fn retry_config(&self) -> RetryConfig {
        self.retry_config
    }

    /// 带重试的只读查询，错误统一转换为 `SysocialError`
    pub async fn read<T, F, Fut>(&self, operation_name: &str, operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, DbErr>>,
    {
        with_retry(operation_name, self.retry_config, operation)
            .await
            .map_err(|e| {
                error!("{} failed: {}", operation_name, e);
                SysocialError::from(e)
            })
    }

    /// 健康检查
    pub async fn ping(&self) -> bool {
        self.db.ping().await.is_ok()
    }

    /// 关闭连接池
    pub async fn close(&self) -> Result<()> {
        self.db
            .clone()
            .close()
            .await
            .map_err(|e| SysocialError::database_operation(format!("关闭数据库连接失败: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_backend_from_url() {
        assert_eq!(
            infer_backend_from_url("sqlite://data.db?mode=rwc").unwrap(),
            DbBackendKind::Sqlite
        );
        assert_eq!(
            infer_backend_from_url("sqlite::memory:").unwrap(),
            DbBackendKind::Sqlite
        );
        assert_eq!(
            infer_backend_from_url("postgres://u:p@localhost/escola").unwrap(),
            DbBackendKind::Postgres
        );
        assert_eq!(
            infer_backend_from_url("mariadb://localhost/escola").unwrap(),
            DbBackendKind::Mysql
        );
        assert!(infer_backend_from_url("redis://localhost").is_err());
    }

    #[test]
    fn test_backend_name() {
        assert_eq!(DbBackendKind::Postgres.as_ref(), "postgres");
        assert_eq!(DbBackendKind::Sqlite.to_string(), "sqlite");
    }

    #[tokio::test]
    async fn test_sqlite_storage_runs_migrations() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            database_url: format!("sqlite://{}?mode=rwc", dir.path().join("t.db").display()),
            ..DatabaseConfig::default()
        };

        let storage = SeaOrmStorage::new(&config).await.unwrap();
        assert_eq!(storage.backend(), DbBackendKind::Sqlite);
        assert!(storage.ping().await);
        storage.close().await.unwrap();
    }
}
