//! Shared setup for the HTTP integration tests
//!
//! 每个测试使用独立的 SQLite 文件，互不干扰。

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use serde_json::{Value, json};
use tempfile::TempDir;

use sysocial::api::jwt::{TokenSubject, get_jwt_service};
use sysocial::config::{DatabaseConfig, init_config};
use sysocial::runtime::lifetime::startup::StartupContext;
use sysocial::services::UsuarioInput;
use sysocial::storage::SeaOrmStorage;

static CONFIG_INIT: tokio::sync::OnceCell<()> = tokio::sync::OnceCell::const_new();
static SEQ: AtomicU32 = AtomicU32::new(1);

/// 进程内唯一的序号，用于生成不重复的 CPF / 用户名
pub fn next_seq() -> u32 {
    SEQ.fetch_add(1, Ordering::SeqCst)
}

pub fn unique_cpf() -> String {
    format!("{:011}", 10_000_000_000u64 + next_seq() as u64)
}

pub struct TestEnv {
    _dir: TempDir,
    pub ctx: StartupContext,
}

impl TestEnv {
    pub async fn new() -> Self {
        CONFIG_INIT.get_or_init(|| async { init_config() }).await;

        let dir = TempDir::new().expect("Failed to create temp dir");
        let database_url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
        let storage = SeaOrmStorage::new(&DatabaseConfig {
            database_url,
            ..Default::default()
        })
        .await
        .expect("Failed to create storage");

        Self {
            _dir: dir,
            ctx: StartupContext::from_storage(Arc::new(storage), "/api"),
        }
    }

    /// 创建用户并返回 (用户 id, `Bearer ...` 头)
    pub async fn user_with_token(&self) -> (i32, String) {
        let n = next_seq();
        let user = self
            .ctx
            .services
            .usuarios
            .create(UsuarioInput {
                username: Some(format!("prof{}", n)),
                nome: Some(format!("Professor {}", n)),
                email: Some(format!("prof{}@escola.org", n)),
                senha: Some("segredo123".into()),
                tipo: Some("admin".into()),
                ..Default::default()
            })
            .await
            .expect("Failed to create user");

        let (token, _) = get_jwt_service()
            .generate_access_token(&TokenSubject {
                id: user.id_usuario,
                username: &user.username,
                email: &user.email,
                tipo: &user.tipo,
            })
            .expect("Failed to sign token");

        (user.id_usuario, format!("Bearer {}", token))
    }
}

/// 构建完整应用（与 `run_server` 相同的路由与 app_data）
#[macro_export]
macro_rules! escola_app {
    ($env:expr) => {{
        let ctx = $env.ctx.clone();
        actix_web::test::init_service(
            actix_web::App::new()
                .configure(|cfg| sysocial::runtime::modes::configure_app(cfg, &ctx))
                .default_service(actix_web::web::to(sysocial::api::services::escola::not_found)),
        )
        .await
    }};
}

/// 发送请求，返回 (状态码, JSON body)
#[macro_export]
macro_rules! send {
    ($app:expr, $req:expr) => {{
        let resp = actix_web::test::call_service(&$app, $req.to_request()).await;
        let status = resp.status();
        let bytes = actix_web::test::read_body(resp).await;
        let body: serde_json::Value = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response is not JSON")
        };
        (status, body)
    }};
}

pub fn aluno_json(cpf: &str) -> Value {
    json!({
        "nome_completo": "Ana Souza",
        "data_nascimento": "2012-03-15",
        "sexo": "F",
        "cpf": cpf,
        "telefone": "11999990000",
        "escola_atual": "EE Central",
        "serie_atual": 6,
        "periodo_escolar": "manha",
        "nome_rua": "Rua das Flores",
        "numero_endereco": 120,
        "bairro": "Centro",
        "data_matricula": "2024-02-01",
        "observacoes": ""
    })
}

pub fn responsavel_json(cpf: &str) -> Value {
    json!({
        "nome_completo": "Maria Souza",
        "cpf": cpf,
        "telefone": "11988887777",
        "telefone_recado1": "1133334444",
        "telefone_recado2": "1133335555",
        "parentesco": "mae"
    })
}

pub fn curso_json(nome: &str) -> Value {
    json!({
        "nome": nome,
        "vagas_totais": 30,
        "turmas": [{
            "nome_turma": "Turma A",
            "dia_semana": "segunda-feira",
            "hora_inicio": "14:00",
            "hora_fim": "16:00",
            "vagas_turma": 15
        }]
    })
}
