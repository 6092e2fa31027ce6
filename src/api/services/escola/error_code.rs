//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};
use ts_rs::TS;

use crate::errors::SysocialError;

use super::types::TS_EXPORT_PATH;

/// API 错误码枚举
///
/// 使用 serde_repr 序列化为数字，ts-rs 自动生成 TypeScript 类型。
/// 按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 2000-2099: 认证与用户
/// - 3000-3099: 学生与监护人
/// - 4000-4099: 课程与班级
/// - 5000-5099: 报名
/// - 6000-6099: 审计
/// - 7000-7099: 点名与出勤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[ts(rename = "ErrorCode")]
#[ts(repr(enum))]
#[repr(i32)]
pub enum ErrorCode {
    // 成功
    Success = 0,

    // 通用错误 1000-1099
    BadRequest = 1000,
    MissingFields = 1001,
    InvalidDateFormat = 1002,
    NotFound = 1004,
    MethodNotAllowed = 1005,
    Conflict = 1009,
    InternalServerError = 1010,
    ServiceUnavailable = 1030,

    // 认证错误 2000-2099
    AuthFailed = 2000,
    TokenExpired = 2001,
    TokenInvalid = 2002,
    Unauthorized = 2003,
    RateLimitExceeded = 2004,
    UsuarioNotFound = 2010,
    UsuarioAlreadyExists = 2011,
    UsuarioInvalid = 2012,

    // 学生与监护人 3000-3099
    AlunoNotFound = 3000,
    AlunoAlreadyExists = 3001,
    AlunoInvalid = 3002,

    // 课程与班级 4000-4099
    CursoNotFound = 4000,
    CursoConflict = 4001,
    CursoInvalid = 4002,
    TurmaNotFound = 4010,
    TurmaConflict = 4011,
    TurmaInvalid = 4012,

    // 报名 5000-5099
    MatriculaNotFound = 5000,
    MatriculaConflict = 5001,
    MatriculaInvalid = 5002,

    // 审计 6000-6099
    AuditoriaNotFound = 6000,
    AuditoriaImmutable = 6001,
    AuditoriaInvalid = 6002,

    // 点名与出勤 7000-7099
    AulaNotFound = 7000,
    AulaConflict = 7001,
    AulaInvalid = 7002,
    PresencaNotFound = 7010,
    PresencaConflict = 7011,
    PresencaInvalid = 7012,
}

/// 错误所属的资源，决定域内错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recurso {
    Geral,
    Usuario,
    Aluno,
    Curso,
    Turma,
    Matricula,
    Auditoria,
    Aula,
    Presenca,
}

impl From<&SysocialError> for ErrorCode {
    fn from(err: &SysocialError) -> Self {
        match err {
            SysocialError::Validation(_) => ErrorCode::BadRequest,
            SysocialError::MissingFields { .. } => ErrorCode::MissingFields,
            SysocialError::InvalidDate(_) => ErrorCode::InvalidDateFormat,
            SysocialError::NotFound(_) => ErrorCode::NotFound,
            SysocialError::Conflict(_) => ErrorCode::Conflict,
            SysocialError::MethodNotAllowed(_) => ErrorCode::MethodNotAllowed,
            SysocialError::AuthFailed(_) => ErrorCode::AuthFailed,
            SysocialError::TokenInvalid(_) => ErrorCode::TokenInvalid,
            SysocialError::TokenExpired(_) => ErrorCode::TokenExpired,
            SysocialError::DatabaseConnection(_) => ErrorCode::ServiceUnavailable,
            SysocialError::DatabaseConfig(_)
            | SysocialError::DatabaseOperation(_)
            | SysocialError::PasswordHash(_)
            | SysocialError::Serialization(_) => ErrorCode::InternalServerError,
        }
    }
}

impl ErrorCode {
    /// 按资源细化错误码；没有域内对应项时退回通用错误码
    pub fn scoped(recurso: Recurso, err: &SysocialError) -> Self {
        use ErrorCode::*;

        let generic = ErrorCode::from(err);
        match (recurso, generic) {
            (Recurso::Usuario, NotFound) => UsuarioNotFound,
            (Recurso::Usuario, Conflict) => UsuarioAlreadyExists,
            (Recurso::Usuario, BadRequest) => UsuarioInvalid,

            (Recurso::Aluno, NotFound) => AlunoNotFound,
            (Recurso::Aluno, Conflict) => AlunoAlreadyExists,
            (Recurso::Aluno, BadRequest) => AlunoInvalid,

            (Recurso::Curso, NotFound) => CursoNotFound,
            (Recurso::Curso, Conflict) => CursoConflict,
            (Recurso::Curso, BadRequest) => CursoInvalid,

            (Recurso::Turma, NotFound) => TurmaNotFound,
            (Recurso::Turma, Conflict) => TurmaConflict,
            (Recurso::Turma, BadRequest) => TurmaInvalid,

            (Recurso::Matricula, NotFound) => MatriculaNotFound,
            (Recurso::Matricula, Conflict) => MatriculaConflict,
            (Recurso::Matricula, BadRequest) => MatriculaInvalid,

            (Recurso::Auditoria, NotFound) => AuditoriaNotFound,
            (Recurso::Auditoria, MethodNotAllowed) => AuditoriaImmutable,
            (Recurso::Auditoria, BadRequest) => AuditoriaInvalid,

            (Recurso::Aula, NotFound) => AulaNotFound,
            (Recurso::Aula, Conflict) => AulaConflict,
            (Recurso::Aula, BadRequest) => AulaInvalid,

            (Recurso::Presenca, NotFound) => PresencaNotFound,
            (Recurso::Presenca, Conflict) => PresencaConflict,
            (Recurso::Presenca, BadRequest) => PresencaInvalid,

            (_, other) => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_number() {
        let json = serde_json::to_string(&ErrorCode::MatriculaNotFound).unwrap();
        assert_eq!(json, "5000");
        let back: ErrorCode = serde_json::from_str("6001").unwrap();
        assert_eq!(back, ErrorCode::AuditoriaImmutable);
    }

    #[test]
    fn test_generic_mapping() {
        assert_eq!(
            ErrorCode::from(&SysocialError::missing_fields("x", vec![])),
            ErrorCode::MissingFields
        );
        assert_eq!(
            ErrorCode::from(&SysocialError::invalid_date("x")),
            ErrorCode::InvalidDateFormat
        );
        assert_eq!(
            ErrorCode::from(&SysocialError::database_operation("x")),
            ErrorCode::InternalServerError
        );
    }

    #[test]
    fn test_scoped_mapping() {
        let not_found = SysocialError::not_found("x");
        assert_eq!(
            ErrorCode::scoped(Recurso::Aluno, &not_found),
            ErrorCode::AlunoNotFound
        );
        assert_eq!(
            ErrorCode::scoped(Recurso::Geral, &not_found),
            ErrorCode::NotFound
        );
        assert_eq!(
            ErrorCode::scoped(Recurso::Auditoria, &SysocialError::method_not_allowed("x")),
            ErrorCode::AuditoriaImmutable
        );
        // 缺字段在所有资源下都保持通用错误码
        assert_eq!(
            ErrorCode::scoped(Recurso::Curso, &SysocialError::missing_fields("x", vec![])),
            ErrorCode::MissingFields
        );
    }
}
