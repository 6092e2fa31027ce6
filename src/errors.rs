use std::fmt;

use actix_web::http::StatusCode;
use sea_orm::{DbErr, SqlErr};

#[derive(Debug, Clone)]
pub enum SysocialError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    Validation(String),
    /// 必填字段缺失，`campos` 原样返回给客户端
    MissingFields {
        message: String,
        campos: Vec<String>,
    },
    InvalidDate(String),
    NotFound(String),
    Conflict(String),
    MethodNotAllowed(String),
    AuthFailed(String),
    TokenInvalid(String),
    TokenExpired(String),
    PasswordHash(String),
    Serialization(String),
}

impl SysocialError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            SysocialError::DatabaseConfig(_) => "E001",
            SysocialError::DatabaseConnection(_) => "E002",
            SysocialError::DatabaseOperation(_) => "E003",
            SysocialError::Validation(_) => "E004",
            SysocialError::MissingFields { .. } => "E005",
            SysocialError::InvalidDate(_) => "E006",
            SysocialError::NotFound(_) => "E007",
            SysocialError::Conflict(_) => "E008",
            SysocialError::MethodNotAllowed(_) => "E009",
            SysocialError::AuthFailed(_) => "E010",
            SysocialError::TokenInvalid(_) => "E011",
            SysocialError::TokenExpired(_) => "E012",
            SysocialError::PasswordHash(_) => "E013",
            SysocialError::Serialization(_) => "E014",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            SysocialError::DatabaseConfig(_) => "Database Configuration Error",
            SysocialError::DatabaseConnection(_) => "Database Connection Error",
            SysocialError::DatabaseOperation(_) => "Database Operation Error",
            SysocialError::Validation(_) => "Validation Error",
            SysocialError::MissingFields { .. } => "Missing Required Fields",
            SysocialError::InvalidDate(_) => "Invalid Date",
            SysocialError::NotFound(_) => "Resource Not Found",
            SysocialError::Conflict(_) => "Conflict",
            SysocialError::MethodNotAllowed(_) => "Method Not Allowed",
            SysocialError::AuthFailed(_) => "Authentication Failed",
            SysocialError::TokenInvalid(_) => "Invalid Token",
            SysocialError::TokenExpired(_) => "Token Expired",
            SysocialError::PasswordHash(_) => "Password Hash Error",
            SysocialError::Serialization(_) => "Serialization Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            SysocialError::DatabaseConfig(msg)
            | SysocialError::DatabaseConnection(msg)
            | SysocialError::DatabaseOperation(msg)
            | SysocialError::Validation(msg)
            | SysocialError::InvalidDate(msg)
            | SysocialError::NotFound(msg)
            | SysocialError::Conflict(msg)
            | SysocialError::MethodNotAllowed(msg)
            | SysocialError::AuthFailed(msg)
            | SysocialError::TokenInvalid(msg)
            | SysocialError::TokenExpired(msg)
            | SysocialError::PasswordHash(msg)
            | SysocialError::Serialization(msg) => msg,
            SysocialError::MissingFields { message, .. } => message,
        }
    }

    /// HTTP 状态码映射
    pub fn http_status(&self) -> StatusCode {
        match self {
            SysocialError::Validation(_)
            | SysocialError::MissingFields { .. }
            | SysocialError::InvalidDate(_) => StatusCode::BAD_REQUEST,
            SysocialError::NotFound(_) => StatusCode::NOT_FOUND,
            SysocialError::Conflict(_) => StatusCode::CONFLICT,
            SysocialError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            SysocialError::AuthFailed(_)
            | SysocialError::TokenInvalid(_)
            | SysocialError::TokenExpired(_) => StatusCode::UNAUTHORIZED,
            SysocialError::DatabaseConnection(_) => StatusCode::SERVICE_UNAVAILABLE,
            SysocialError::DatabaseConfig(_)
            | SysocialError::DatabaseOperation(_)
            | SysocialError::PasswordHash(_)
            | SysocialError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为彩色输出（用于启动失败时的终端提示）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for SysocialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for SysocialError {}

// 便捷的构造函数
impl SysocialError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        SysocialError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        SysocialError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        SysocialError::DatabaseOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        SysocialError::Validation(msg.into())
    }

    pub fn missing_fields<T: Into<String>>(msg: T, campos: Vec<String>) -> Self {
        SysocialError::MissingFields {
            message: msg.into(),
            campos,
        }
    }

    pub fn invalid_date<T: Into<String>>(msg: T) -> Self {
        SysocialError::InvalidDate(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        SysocialError::NotFound(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        SysocialError::Conflict(msg.into())
    }

    pub fn method_not_allowed<T: Into<String>>(msg: T) -> Self {
        SysocialError::MethodNotAllowed(msg.into())
    }

    pub fn auth_failed<T: Into<String>>(msg: T) -> Self {
        SysocialError::AuthFailed(msg.into())
    }

    pub fn token_invalid<T: Into<String>>(msg: T) -> Self {
        SysocialError::TokenInvalid(msg.into())
    }

    pub fn token_expired<T: Into<String>>(msg: T) -> Self {
        SysocialError::TokenExpired(msg.into())
    }

    pub fn password_hash<T: Into<String>>(msg: T) -> Self {
        SysocialError::PasswordHash(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        SysocialError::Serialization(msg.into())
    }
}

/// 唯一约束（23505）和外键约束（23503）冲突映射为 409，
/// 通过 `DbErr::sql_err()` 识别，SQLite/PostgreSQL/MySQL 通用
impl From<DbErr> for SysocialError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                return SysocialError::Conflict(format!("Registro duplicado: {}", detail));
            }
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                return SysocialError::Conflict(format!(
                    "Violação de integridade referencial: {}",
                    detail
                ));
            }
            _ => {}
        }

        match err {
            DbErr::RecordNotFound(msg) => SysocialError::NotFound(msg),
            DbErr::ConnectionAcquire(e) => SysocialError::DatabaseConnection(e.to_string()),
            DbErr::Conn(e) => SysocialError::DatabaseConnection(e.to_string()),
            other => SysocialError::DatabaseOperation(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for SysocialError {
    fn from(err: serde_json::Error) -> Self {
        SysocialError::Serialization(err.to_string())
    }
}

impl From<crate::utils::password::PasswordError> for SysocialError {
    fn from(err: crate::utils::password::PasswordError) -> Self {
        SysocialError::PasswordHash(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for SysocialError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => SysocialError::TokenExpired("Token expirado".into()),
            _ => SysocialError::TokenInvalid(format!("Token inválido: {}", err)),
        }
    }
}

pub type Result<T> = std::result::Result<T, SysocialError>;
