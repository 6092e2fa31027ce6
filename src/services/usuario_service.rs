//! User accounts and authentication
//!
//! 登录、刷新、注销与用户 CRUD。密码哈希永不出现在响应中。

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};
use tracing::{info, warn};
use ts_rs::TS;

use crate::api::jwt::{AccessClaims, TokenSubject, get_jwt_service};
use crate::errors::{Result, SysocialError};
use crate::services::Page;
use crate::services::validation::Required;
use crate::storage::SeaOrmStorage;
use crate::utils::password::{
    MIN_PASSWORD_LEN, hash_password, process_update_password, verify_password,
};
use crate::utils::{PageRequest, non_empty};
use migration::entities::usuario;

const INVALID_CREDENTIALS: &str = "Usuário ou senha inválidos";

/// 用户类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum TipoUsuario {
    Admin,
    User,
    Moderator,
}

/// 对外可见的用户信息
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/app/services/types.generated.ts")]
pub struct UsuarioPublico {
    pub id_usuario: i32,
    pub username: String,
    pub nome: String,
    pub telefone: Option<String>,
    pub email: String,
    pub tipo: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<usuario::Model> for UsuarioPublico {
    fn from(m: usuario::Model) -> Self {
        Self {
            id_usuario: m.id_usuario,
            username: m.username,
            nome: m.nome,
            telefone: m.telefone,
            email: m.email,
            tipo: m.tipo,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/app/services/types.generated.ts")]
pub struct UsuarioInput {
    pub username: Option<String>,
    pub nome: Option<String>,
    pub telefone: Option<String>,
    pub email: Option<String>,
    pub senha: Option<String>,
    pub tipo: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/app/services/types.generated.ts")]
pub struct LoginRequest {
    pub username: Option<String>,
    pub senha: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/app/services/types.generated.ts")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/app/services/types.generated.ts")]
pub struct UserInfo {
    pub id: i32,
    pub username: String,
    pub nome: String,
    pub email: String,
    pub tipo: String,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/app/services/types.generated.ts")]
pub struct LoginResponse {
    pub token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserInfo,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/app/services/types.generated.ts")]
pub struct ValidateResponse {
    pub valid: bool,
    pub user_id: Option<i32>,
    pub username: String,
    pub expires_at: Option<DateTime<Utc>>,
}

fn check_len(field: &str, value: &str, min: usize, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(SysocialError::validation(format!(
            "{} deve ter entre {} e {} caracteres",
            field, min, max
        )));
    }
    Ok(())
}

fn check_email(email: &str) -> Result<()> {
    if !email.contains('@') {
        return Err(SysocialError::validation("email inválido"));
    }
    Ok(())
}

fn check_senha(senha: &str) -> Result<()> {
    if senha.chars().count() < MIN_PASSWORD_LEN {
        return Err(SysocialError::validation(format!(
            "senha deve ter no mínimo {} caracteres",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

fn check_tipo(tipo: &str) -> Result<String> {
    tipo.parse::<TipoUsuario>()
        .map(|t| t.as_ref().to_string())
        .map_err(|_| SysocialError::validation("tipo deve ser admin, user ou moderator"))
}

fn timestamp(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

/// 签发同一会话的 access + refresh token；`session` 为空时开启新会话
fn issue_tokens(user: &usuario::Model, session: Option<&str>) -> Result<LoginResponse> {
    let pair = get_jwt_service().generate_token_pair(
        &TokenSubject {
            id: user.id_usuario,
            username: &user.username,
            email: &user.email,
            tipo: &user.tipo,
        },
        session,
    )?;

    Ok(LoginResponse {
        token: pair.access_token,
        refresh_token: pair.refresh_token,
        expires_at: timestamp(pair.expires_at).unwrap_or_else(Utc::now),
        user: UserInfo {
            id: user.id_usuario,
            username: user.username.clone(),
            nome: user.nome.clone(),
            email: user.email.clone(),
            tipo: user.tipo.clone(),
        },
    })
}

pub struct UsuarioService {
    storage: Arc<SeaOrmStorage>,
}

impl UsuarioService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    async fn find(&self, id: i32) -> Result<usuario::Model> {
        let db = self.storage.get_db();
        self.storage
            .read("get_usuario", || usuario::Entity::find_by_id(id).one(db))
            .await?
            .ok_or_else(|| SysocialError::not_found("Usuário não encontrado"))
    }

    pub async fn list(
        &self,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> Result<Page<UsuarioPublico>> {
        let page = PageRequest::new(page, limit);
        let db = self.storage.get_db();

        let (items, total) = self
            .storage
            .read("list_usuarios", || async move {
                let paginator = usuario::Entity::find()
                    .order_by_asc(usuario::Column::IdUsuario)
                    .paginate(db, page.limit);
                let total = paginator.num_items().await?;
                let items = paginator.fetch_page(page.zero_based()).await?;
                Ok((items, total))
            })
            .await?;

        Ok(Page::new(
            items.into_iter().map(UsuarioPublico::from).collect(),
            page.info(total),
        ))
    }

    pub async fn get(&self, id: i32) -> Result<UsuarioPublico> {
        self.find(id).await.map(UsuarioPublico::from)
    }

    /// 注册与管理员创建共用
    pub async fn create(&self, input: UsuarioInput) -> Result<UsuarioPublico> {
        let mut req = Required::new();
        let username = req.text("username", &input.username).to_string();
        let nome = req.text("nome", &input.nome).to_string();
        let email = req.text("email", &input.email).to_string();
        let senha = req.text("senha", &input.senha).to_string();
        let tipo = req.text("tipo", &input.tipo).to_string();
        req.finish()?;

        check_len("username", &username, 3, 20)?;
        check_len("nome", &nome, 2, 50)?;
        check_email(&email)?;
        check_senha(&senha)?;
        let tipo = check_tipo(&tipo)?;

        let now = Utc::now();
        let model = usuario::ActiveModel {
            username: Set(username),
            nome: Set(nome),
            telefone: Set(non_empty(input.telefone.as_deref()).map(str::to_string)),
            email: Set(email),
            tipo: Set(tipo),
            senha_hash: Set(hash_password(&senha)?),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.storage.get_db())
        .await?;

        info!("Usuário {} ({}) criado", model.id_usuario, model.username);
        Ok(model.into())
    }

    /// 部分更新：nome / telefone / email / tipo / senha
    pub async fn update(&self, id: i32, input: UsuarioInput) -> Result<UsuarioPublico> {
        let existing = self.find(id).await?;
        let mut model: usuario::ActiveModel = existing.clone().into();

        if let Some(nome) = non_empty(input.nome.as_deref()) {
            check_len("nome", nome, 2, 50)?;
            model.nome = Set(nome.to_string());
        }
        if let Some(telefone) = &input.telefone {
            model.telefone = Set(non_empty(Some(telefone)).map(str::to_string));
        }
        if let Some(email) = non_empty(input.email.as_deref()) {
            check_email(email)?;
            model.email = Set(email.to_string());
        }
        if let Some(tipo) = non_empty(input.tipo.as_deref()) {
            model.tipo = Set(check_tipo(tipo)?);
        }
        if let Some(senha) = non_empty(input.senha.as_deref()) {
            check_senha(senha)?;
        }
        model.senha_hash = Set(process_update_password(
            non_empty(input.senha.as_deref()),
            existing.senha_hash,
        )?);
        model.updated_at = Set(Utc::now());

        let updated = model.update(self.storage.get_db()).await?;
        info!("Usuário {} atualizado", id);
        Ok(updated.into())
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        let result = usuario::Entity::delete_by_id(id)
            .exec(self.storage.get_db())
            .await?;

        if result.rows_affected == 0 {
            return Err(SysocialError::not_found("Usuário não encontrado"));
        }
        info!("Usuário {} removido", id);
        Ok(())
    }

    /// 用户名或密码错误返回同一条消息
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse> {
        let mut required = Required::new();
        let username = required.text("username", &req.username).to_string();
        let senha = required.present("senha", &req.senha).to_string();
        required.finish()?;

        let db = self.storage.get_db();
        let user = self
            .storage
            .read("find_usuario_by_username", || {
                usuario::Entity::find()
                    .filter(usuario::Column::Username.eq(username.as_str()))
                    .one(db)
            })
            .await?;

        let Some(user) = user else {
            warn!("Login failed: unknown username '{}'", username);
            return Err(SysocialError::auth_failed(INVALID_CREDENTIALS));
        };
        if !verify_password(&senha, &user.senha_hash)? {
            warn!("Login failed: wrong password for '{}'", username);
            return Err(SysocialError::auth_failed(INVALID_CREDENTIALS));
        }

        info!("Usuário {} autenticado", user.username);
        issue_tokens(&user, None)
    }

    pub async fn refresh(&self, req: RefreshRequest) -> Result<LoginResponse> {
        let mut required = Required::new();
        let token = required.text("refresh_token", &req.refresh_token).to_string();
        required.finish()?;

        let claims = get_jwt_service().validate_refresh_token(&token)?;
        let user_id: i32 = claims
            .sub
            .parse()
            .map_err(|_| SysocialError::token_invalid("Token inválido"))?;

        let user = match self.find(user_id).await {
            Ok(user) => user,
            Err(SysocialError::NotFound(_)) => {
                return Err(SysocialError::token_invalid("Usuário do token não existe"));
            }
            Err(e) => return Err(e),
        };

        issue_tokens(&user, Some(&claims.sid))
    }

    /// 注销当前 access token 及同一会话的 refresh token
    pub fn logout(&self, claims: &AccessClaims) {
        get_jwt_service().revoke_session(claims);
        info!("Usuário {} encerrou a sessão", claims.username);
    }

    pub fn validate(&self, claims: &AccessClaims) -> ValidateResponse {
        ValidateResponse {
            valid: true,
            user_id: claims.user_id(),
            username: claims.username.clone(),
            expires_at: timestamp(claims.exp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_tipo() {
        assert_eq!(check_tipo("admin").unwrap(), "admin");
        assert_eq!(check_tipo("moderator").unwrap(), "moderator");
        assert!(check_tipo("root").is_err());
    }

    #[test]
    fn test_field_rules() {
        assert!(check_len("username", "ab", 3, 20).is_err());
        assert!(check_len("username", "abc", 3, 20).is_ok());
        assert!(check_len("username", &"x".repeat(21), 3, 20).is_err());
        assert!(check_email("sem-arroba").is_err());
        assert!(check_email("a@b").is_ok());
        assert!(check_senha("12345").is_err());
        assert!(check_senha("123456").is_ok());
    }
}
