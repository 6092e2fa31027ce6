use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use moka::sync::Cache;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::warn;

use crate::errors::SysocialError;

/// Global cached JwtService instance
static JWT_SERVICE: OnceLock<JwtService> = OnceLock::new();

/// Get the cached JwtService instance
pub fn get_jwt_service() -> &'static JwtService {
    JWT_SERVICE.get_or_init(JwtService::from_config)
}

pub const TOKEN_TYPE_ACCESS: &str = "access";
pub const TOKEN_TYPE_REFRESH: &str = "refresh";

/// Access Token Claims
///
/// 同时作为 `AuthUser` 存入 request extensions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// 用户 id
    pub sub: String,
    pub username: String,
    pub email: String,
    pub tipo: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    pub token_type: String,
    /// 登录会话 id，与配对的 refresh token 相同
    #[serde(default)]
    pub sid: String,
}

impl AccessClaims {
    pub fn user_id(&self) -> Option<i32> {
        self.sub.parse().ok()
    }
}

/// Refresh Token Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    pub token_type: String,
    #[serde(default)]
    pub sid: String,
}

/// 同一会话的 access + refresh token
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub expires_at: i64,
    pub refresh_token: String,
}

/// 签发 token 所需的用户信息
#[derive(Debug, Clone)]
pub struct TokenSubject<'a> {
    pub id: i32,
    pub username: &'a str,
    pub email: &'a str,
    pub tipo: &'a str,
}

/// JWT Service for generating and validating tokens
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_minutes: u64,
    refresh_token_days: u64,
    /// 已注销的 access token jti，TTL 与 access token 有效期相同
    revoked: Cache<String, ()>,
    /// 已注销的会话 id，TTL 与 refresh token 有效期相同
    revoked_sessions: Cache<String, ()>,
}

fn generate_secret() -> String {
    use rand::RngExt;
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

impl JwtService {
    pub fn new(secret: &str, access_token_minutes: u64, refresh_token_days: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_minutes,
            refresh_token_days,
            revoked: Cache::builder()
                .time_to_live(std::time::Duration::from_secs(
                    access_token_minutes.max(1) * 60,
                ))
                .max_capacity(100_000)
                .build(),
            revoked_sessions: Cache::builder()
                .time_to_live(std::time::Duration::from_secs(
                    refresh_token_days.max(1) * 24 * 3600,
                ))
                .max_capacity(100_000)
                .build(),
        }
    }

    /// Create JwtService from config
    pub fn from_config() -> Self {
        let config = crate::config::get_config();

        let secret = if config.auth.jwt_secret.is_empty() {
            warn!("JWT secret not configured, generating random secret (tokens will not survive restarts)");
            generate_secret()
        } else {
            config.auth.jwt_secret.clone()
        };

        Self::new(
            &secret,
            config.auth.access_token_minutes,
            config.auth.refresh_token_days,
        )
    }

    pub fn access_token_minutes(&self) -> u64 {
        self.access_token_minutes
    }

    /// Generate Access Token（新会话），返回 token 与过期时间戳
    pub fn generate_access_token(
        &self,
        subject: &TokenSubject<'_>,
    ) -> Result<(String, i64), jsonwebtoken::errors::Error> {
        self.encode_access(subject, &new_id())
    }

    /// Generate Refresh Token（新会话）
    pub fn generate_refresh_token(&self, user_id: i32) -> Result<String, jsonwebtoken::errors::Error> {
        self.encode_refresh(user_id, &new_id())
    }

    /// 签发共用会话 id 的 token 对；`session` 为空时开启新会话
    pub fn generate_token_pair(
        &self,
        subject: &TokenSubject<'_>,
        session: Option<&str>,
    ) -> Result<TokenPair, jsonwebtoken::errors::Error> {
        let sid = session
            .filter(|sid| !sid.is_empty())
            .map_or_else(new_id, str::to_string);
        let (access_token, expires_at) = self.encode_access(subject, &sid)?;
        let refresh_token = self.encode_refresh(subject.id, &sid)?;
        Ok(TokenPair {
            access_token,
            expires_at,
            refresh_token,
        })
    }

    fn encode_access(
        &self,
        subject: &TokenSubject<'_>,
        sid: &str,
    ) -> Result<(String, i64), jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let exp = (now + Duration::minutes(self.access_token_minutes as i64)).timestamp();
        let claims = AccessClaims {
            sub: subject.id.to_string(),
            username: subject.username.to_string(),
            email: subject.email.to_string(),
            tipo: subject.tipo.to_string(),
            iat: now.timestamp(),
            exp,
            jti: new_id(),
            token_type: TOKEN_TYPE_ACCESS.to_string(),
            sid: sid.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map(|token| (token, exp))
    }

    fn encode_refresh(&self, user_id: i32, sid: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = RefreshClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::days(self.refresh_token_days as i64)).timestamp(),
            jti: new_id(),
            token_type: TOKEN_TYPE_REFRESH.to_string(),
            sid: sid.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
    }

    /// Validate Access Token（包括注销检查）
    pub fn validate_access_token(&self, token: &str) -> Result<AccessClaims, SysocialError> {
        let token_data = decode::<AccessClaims>(token, &self.decoding_key, &Validation::default())?;

        if token_data.claims.token_type != TOKEN_TYPE_ACCESS {
            return Err(SysocialError::token_invalid("Tipo de token inválido"));
        }
        if self.revoked.contains_key(&token_data.claims.jti)
            || self.session_revoked(&token_data.claims.sid)
        {
            return Err(SysocialError::token_invalid("Token revogado"));
        }

        Ok(token_data.claims)
    }

    /// Validate Refresh Token
    pub fn validate_refresh_token(&self, token: &str) -> Result<RefreshClaims, SysocialError> {
        let token_data =
            decode::<RefreshClaims>(token, &self.decoding_key, &Validation::default())?;

        if token_data.claims.token_type != TOKEN_TYPE_REFRESH {
            return Err(SysocialError::token_invalid("Tipo de token inválido"));
        }
        if self.session_revoked(&token_data.claims.sid) {
            return Err(SysocialError::token_invalid("Sessão encerrada"));
        }

        Ok(token_data.claims)
    }

    fn session_revoked(&self, sid: &str) -> bool {
        !sid.is_empty() && self.revoked_sessions.contains_key(sid)
    }

    /// 注销 access token
    pub fn revoke(&self, jti: &str) {
        self.revoked.insert(jti.to_string(), ());
    }

    /// 注销 access token 及其会话，配对的 refresh token 随之失效
    pub fn revoke_session(&self, claims: &AccessClaims) {
        self.revoke(&claims.jti);
        if !claims.sid.is_empty() {
            self.revoked_sessions.insert(claims.sid.clone(), ());
        }
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_service() -> JwtService {
        JwtService::new("test_secret_key_32_bytes_long!!", 15, 7)
    }

    fn subject() -> TokenSubject<'static> {
        TokenSubject {
            id: 42,
            username: "secretaria",
            email: "secretaria@escola.org",
            tipo: "admin",
        }
    }

    #[test]
    fn test_generate_and_validate_access_token() {
        let service = create_test_service();
        let (token, exp) = service.generate_access_token(&subject()).unwrap();
        let claims = service.validate_access_token(&token).unwrap();

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.user_id(), Some(42));
        assert_eq!(claims.username, "secretaria");
        assert_eq!(claims.tipo, "admin");
        assert_eq!(claims.token_type, TOKEN_TYPE_ACCESS);
        assert_eq!(claims.exp, exp);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_generate_and_validate_refresh_token() {
        let service = create_test_service();
        let token = service.generate_refresh_token(42).unwrap();
        let claims = service.validate_refresh_token(&token).unwrap();

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.token_type, TOKEN_TYPE_REFRESH);
    }

    #[test]
    fn test_token_types_are_not_interchangeable() {
        let service = create_test_service();
        let (access, _) = service.generate_access_token(&subject()).unwrap();
        let refresh = service.generate_refresh_token(42).unwrap();

        assert!(service.validate_refresh_token(&access).is_err());
        assert!(service.validate_access_token(&refresh).is_err());
    }

    #[test]
    fn test_revoked_token_rejected() {
        let service = create_test_service();
        let (token, _) = service.generate_access_token(&subject()).unwrap();
        let claims = service.validate_access_token(&token).unwrap();

        service.revoke(&claims.jti);
        assert!(matches!(
            service.validate_access_token(&token),
            Err(SysocialError::TokenInvalid(_))
        ));
    }

    #[test]
    fn test_revoke_session_invalidates_refresh_token() {
        let service = create_test_service();
        let pair = service.generate_token_pair(&subject(), None).unwrap();
        let claims = service.validate_access_token(&pair.access_token).unwrap();
        let refresh = service.validate_refresh_token(&pair.refresh_token).unwrap();
        assert_eq!(claims.sid, refresh.sid);

        // 刷新后沿用同一会话
        let renewed = service
            .generate_token_pair(&subject(), Some(&refresh.sid))
            .unwrap();

        service.revoke_session(&claims);
        assert!(service.validate_access_token(&pair.access_token).is_err());
        assert!(matches!(
            service.validate_refresh_token(&pair.refresh_token),
            Err(SysocialError::TokenInvalid(_))
        ));
        assert!(service.validate_refresh_token(&renewed.refresh_token).is_err());
        assert!(service.validate_access_token(&renewed.access_token).is_err());

        // 其他会话不受影响
        let other = service.generate_token_pair(&subject(), None).unwrap();
        assert!(service.validate_refresh_token(&other.refresh_token).is_ok());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let service1 = create_test_service();
        let service2 = JwtService::new("different_secret_key_32_bytes!!", 15, 7);

        let (token, _) = service1.generate_access_token(&subject()).unwrap();
        assert!(service2.validate_access_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = create_test_service();

        let now = Utc::now();
        let claims = AccessClaims {
            sub: "1".to_string(),
            username: "x".to_string(),
            email: "x@x".to_string(),
            tipo: "user".to_string(),
            iat: (now - Duration::hours(2)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
            token_type: TOKEN_TYPE_ACCESS.to_string(),
            sid: String::new(),
        };
        let encoding_key = EncodingKey::from_secret(b"test_secret_key_32_bytes_long!!");
        let token = encode(&Header::default(), &claims, &encoding_key).unwrap();

        assert!(matches!(
            service.validate_access_token(&token),
            Err(SysocialError::TokenExpired(_))
        ));
    }

    #[test]
    fn test_generated_secret_is_hex() {
        let secret = generate_secret();
        assert_eq!(secret.len(), 64);
        assert!(secret.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
