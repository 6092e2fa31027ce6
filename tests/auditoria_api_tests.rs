//! Audit trail API integration tests

#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use serde_json::{Value, json};

use common::{TestEnv, aluno_json, curso_json, responsavel_json, unique_cpf};

/// 列表中的 campo_alterado，按返回顺序
fn campos(body: &Value) -> Vec<&str> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|r| r["campo_alterado"].as_str())
        .collect()
}

#[actix_rt::test]
async fn test_auditoria_filters_and_resumo() {
    let env = TestEnv::new().await;
    let (secretaria, token) = env.user_with_token().await;
    let (coordenacao, _) = env.user_with_token().await;
    let app = escola_app!(env);

    let (_, body) = send!(
        app,
        TestRequest::post()
            .uri("/api/v1/cursos")
            .insert_header(("Authorization", token.as_str()))
            .set_json(curso_json("Canto"))
    );
    let turma_id = body["data"]["turmas"][0]["id_turma"].as_i64().unwrap();

    let (_, body) = send!(
        app,
        TestRequest::post()
            .uri("/api/v1/matriculas")
            .insert_header(("Authorization", token.as_str()))
            .set_json(json!({
                "aluno": aluno_json(&unique_cpf()),
                "responsavel": responsavel_json(&unique_cpf()),
                "matricula": { "turmas_id_turma": turma_id }
            }))
    );
    let matricula_id = body["data"]["matricula"]["id_matricula"].as_i64().unwrap();

    let registros = [
        (secretaria, "status", json!("ativo"), json!("trancado"), "2024-03-10T23:30:00Z"),
        (secretaria, "turma", json!("1"), json!("2"), "2024-03-11T00:00:00Z"),
        (coordenacao, "status", json!("trancado"), json!("ativo"), "2024-03-01 08:00"),
        (secretaria, "observacoes", Value::Null, json!("desconto 50%"), "2024-02-01"),
    ];
    for (usuario, campo, antigo, novo, data_hora) in registros {
        let (status, _) = send!(
            app,
            TestRequest::post()
                .uri("/api/v1/auditoria")
                .insert_header(("Authorization", token.as_str()))
                .set_json(json!({
                    "users_id_usuario": usuario,
                    "matricula_id_matricula": matricula_id,
                    "campo_alterado": campo,
                    "valor_antigo": antigo,
                    "valor_novo": novo,
                    "data_hora": data_hora
                }))
        );
        assert_eq!(status, StatusCode::CREATED);
    }

    let listar = |query: &str| {
        TestRequest::get()
            .uri(&format!("/api/v1/auditoria?{}", query))
            .insert_header(("Authorization", token.as_str()))
    };

    let (status, body) = send!(app, listar(""));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 4);
    // 最新在前
    assert_eq!(campos(&body), vec!["turma", "status", "status", "observacoes"]);

    // 只有日期的 ate 包含当天全部时间
    let (_, body) = send!(app, listar("ate=2024-03-10"));
    assert_eq!(body["pagination"]["total"], 3);
    assert!(!campos(&body).contains(&"turma"));

    let (_, body) = send!(app, listar("de=2024-03-10&ate=2024-03-10"));
    assert_eq!(campos(&body), vec!["status"]);
    assert_eq!(body["data"][0]["valor_novo"], "trancado");

    let (_, body) = send!(app, listar("campo=STATUS"));
    assert_eq!(body["pagination"]["total"], 2);

    let (_, body) = send!(app, listar("q=trancado"));
    assert_eq!(body["pagination"]["total"], 2);

    // % 按字面匹配
    let (_, body) = send!(app, listar("q=%25"));
    assert_eq!(campos(&body), vec!["observacoes"]);
    assert!(body["data"][0]["valor_antigo"].is_null());

    let (_, body) = send!(app, listar(&format!("usuario={}", coordenacao)));
    assert_eq!(body["pagination"]["total"], 1);

    let (status, body) = send!(app, listar("ate=10/03/2024"));
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("ate"));

    let (status, body) = send!(
        app,
        TestRequest::get()
            .uri("/api/v1/auditoria/resumo")
            .insert_header(("Authorization", token.as_str()))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"]["por_campo"][0],
        json!({ "campo_alterado": "status", "total": 2 })
    );
    assert_eq!(body["data"]["por_campo"].as_array().unwrap().len(), 3);
    assert_eq!(
        body["data"]["por_usuario"],
        json!([
            { "users_id_usuario": secretaria, "total": 3 },
            { "users_id_usuario": coordenacao, "total": 1 }
        ])
    );

    let (_, body) = send!(
        app,
        TestRequest::get()
            .uri("/api/v1/auditoria/resumo?de=2024-03-01&ate=2024-03-10")
            .insert_header(("Authorization", token.as_str()))
    );
    assert_eq!(
        body["data"]["por_campo"],
        json!([{ "campo_alterado": "status", "total": 2 }])
    );

    let (status, body) = send!(
        app,
        TestRequest::get()
            .uri(&format!("/api/v1/auditoria/matricula/{}", matricula_id))
            .insert_header(("Authorization", token.as_str()))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 4);
}
