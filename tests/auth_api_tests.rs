//! Auth, health and routing integration tests

#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use serde_json::json;

use common::{TestEnv, next_seq};

#[actix_rt::test]
async fn test_register_login_validate_logout() {
    let env = TestEnv::new().await;
    let app = escola_app!(env);

    let username = format!("secretaria{}", next_seq());
    let registro = json!({
        "username": username,
        "nome": "Secretaria",
        "email": format!("{}@escola.org", username),
        "senha": "senha-forte",
        "tipo": "user"
    });

    let (status, body) = send!(
        app,
        TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(&registro)
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["username"], username.as_str());
    assert!(body["data"].get("senha_hash").is_none());

    let (status, body) = send!(
        app,
        TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(&registro)
    );
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 2011);

    let (status, body) = send!(
        app,
        TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "username": username, "senha": "errada" }))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 2000);
    assert_eq!(body["message"], "Usuário ou senha inválidos");

    let (status, body) = send!(
        app,
        TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "username": username, "senha": "senha-forte" }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["tipo"], "user");
    let bearer = format!("Bearer {}", body["data"]["token"].as_str().unwrap());
    let refresh = body["data"]["refresh_token"].as_str().unwrap().to_string();

    let (status, body) = send!(
        app,
        TestRequest::get()
            .uri("/api/v1/auth/validate")
            .insert_header(("Authorization", bearer.as_str()))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["valid"], true);
    assert_eq!(body["data"]["username"], username.as_str());

    let (status, body) = send!(
        app,
        TestRequest::post()
            .uri("/api/v1/auth/refresh")
            .set_json(json!({ "refresh_token": refresh }))
    );
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["token"].is_string());
    let renovado = body["data"]["refresh_token"].as_str().unwrap().to_string();

    let (status, body) = send!(
        app,
        TestRequest::post()
            .uri("/api/v1/auth/logout")
            .insert_header(("Authorization", bearer.as_str()))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Sessão encerrada");

    let (status, body) = send!(
        app,
        TestRequest::get()
            .uri("/api/v1/auth/validate")
            .insert_header(("Authorization", bearer.as_str()))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 2002);

    // 注销后同一会话的 refresh token 全部失效
    for token in [&refresh, &renovado] {
        let (status, body) = send!(
            app,
            TestRequest::post()
                .uri("/api/v1/auth/refresh")
                .set_json(json!({ "refresh_token": token }))
        );
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], 2002);
    }

    // 新登录开启新会话
    let (status, body) = send!(
        app,
        TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "username": username, "senha": "senha-forte" }))
    );
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send!(
        app,
        TestRequest::post()
            .uri("/api/v1/auth/refresh")
            .set_json(json!({ "refresh_token": body["data"]["refresh_token"] }))
    );
    assert_eq!(status, StatusCode::OK);
}

#[actix_rt::test]
async fn test_register_reports_missing_fields() {
    let env = TestEnv::new().await;
    let app = escola_app!(env);

    let (status, body) = send!(
        app,
        TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(json!({ "username": "ab" }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1001);
    let campos = body["data"]["campos"].as_array().unwrap();
    assert!(campos.contains(&json!("nome")));
    assert!(campos.contains(&json!("senha")));
    assert!(!campos.contains(&json!("username")));
}

#[actix_rt::test]
async fn test_protected_routes_require_token() {
    let env = TestEnv::new().await;
    let app = escola_app!(env);

    let (status, body) = send!(app, TestRequest::get().uri("/api/v1/alunos"));
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 2003);
    assert!(body["data"].is_null());

    let (status, body) = send!(
        app,
        TestRequest::get()
            .uri("/api/v1/cursos")
            .insert_header(("Authorization", "Bearer nao.e.um.jwt"))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 2002);

    // 预检请求不需要 token
    let resp = test::call_service(
        &app,
        TestRequest::default()
            .method(actix_web::http::Method::OPTIONS)
            .uri("/api/v1/alunos")
            .to_request(),
    )
    .await;
    assert_ne!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_malformed_json_uses_envelope() {
    let env = TestEnv::new().await;
    let (_, token) = env.user_with_token().await;
    let app = escola_app!(env);

    let (status, body) = send!(
        app,
        TestRequest::post()
            .uri("/api/v1/cursos")
            .insert_header(("Authorization", token.as_str()))
            .insert_header(("Content-Type", "application/json"))
            .set_payload("{\"nome\": ")
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1000);
    assert!(body["data"].is_null());

    let (status, body) = send!(
        app,
        TestRequest::get()
            .uri("/api/v1/alunos/abc")
            .insert_header(("Authorization", token.as_str()))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1000);
}

#[actix_rt::test]
async fn test_health_and_unknown_routes() {
    let env = TestEnv::new().await;
    let app = escola_app!(env);

    let (status, body) = send!(app, TestRequest::get().uri("/health"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["database"], "healthy");
    assert_eq!(body["data"]["ok"], true);

    for uri in ["/health/ready", "/health/live"] {
        let resp = test::call_service(&app, TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = test::call_service(
        &app,
        TestRequest::default()
            .method(actix_web::http::Method::HEAD)
            .uri("/health")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let (status, body) = send!(app, TestRequest::get().uri("/nao-existe"));
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 1004);
    assert_eq!(body["message"], "Rota não encontrada");
}
