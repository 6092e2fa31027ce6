//! Student and enrollment API integration tests

#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use serde_json::{Value, json};

use common::{TestEnv, aluno_json, curso_json, responsavel_json, unique_cpf};

fn aluno_body(cpf: &str, resp_cpf: &str) -> Value {
    let mut body = aluno_json(cpf);
    body["responsavel"] = responsavel_json(resp_cpf);
    body
}

#[actix_rt::test]
async fn test_create_aluno_links_guardian() {
    let env = TestEnv::new().await;
    let (_, token) = env.user_with_token().await;
    let app = escola_app!(env);

    let cpf = unique_cpf();
    let resp_cpf = unique_cpf();
    let (status, body) = send!(
        app,
        TestRequest::post()
            .uri("/api/v1/alunos")
            .insert_header(("Authorization", token.as_str()))
            .set_json(aluno_body(&cpf, &resp_cpf))
    );

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["cpf"], cpf.as_str());
    assert_eq!(body["data"]["observacoes"], "");
    assert_eq!(body["data"]["responsavel"]["cpf"], resp_cpf.as_str());
    assert_eq!(body["data"]["responsavel"]["tipo"], "principal");

    let id = body["data"]["id_aluno"].as_i64().unwrap();
    let (status, body) = send!(
        app,
        TestRequest::get()
            .uri(&format!("/api/v1/alunos/{}", id))
            .insert_header(("Authorization", token.as_str()))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["nome_completo"], "Ana Souza");
}

#[actix_rt::test]
async fn test_create_aluno_reports_missing_fields() {
    let env = TestEnv::new().await;
    let (_, token) = env.user_with_token().await;
    let app = escola_app!(env);

    let mut body = aluno_json(&unique_cpf());
    body.as_object_mut().unwrap().remove("cpf");
    body["responsavel"] = json!({ "nome_completo": "Maria" });

    let (status, body) = send!(
        app,
        TestRequest::post()
            .uri("/api/v1/alunos")
            .insert_header(("Authorization", token.as_str()))
            .set_json(body)
    );

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1001);
    let campos: Vec<&str> = body["data"]["campos"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert!(campos.contains(&"cpf"));
    assert!(campos.contains(&"responsavel.cpf"));
    assert!(campos.contains(&"responsavel.parentesco"));
    assert!(!campos.contains(&"nome_completo"));
}

#[actix_rt::test]
async fn test_create_aluno_without_guardian() {
    let env = TestEnv::new().await;
    let (_, token) = env.user_with_token().await;
    let app = escola_app!(env);

    let (status, body) = send!(
        app,
        TestRequest::post()
            .uri("/api/v1/alunos")
            .insert_header(("Authorization", token.as_str()))
            .set_json(aluno_json(&unique_cpf()))
    );

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["data"]["campos"], json!(["responsavel"]));
}

#[actix_rt::test]
async fn test_duplicate_cpf_is_conflict() {
    let env = TestEnv::new().await;
    let (_, token) = env.user_with_token().await;
    let app = escola_app!(env);

    let cpf = unique_cpf();
    let (status, _) = send!(
        app,
        TestRequest::post()
            .uri("/api/v1/alunos")
            .insert_header(("Authorization", token.as_str()))
            .set_json(aluno_body(&cpf, &unique_cpf()))
    );
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send!(
        app,
        TestRequest::post()
            .uri("/api/v1/alunos")
            .insert_header(("Authorization", token.as_str()))
            .set_json(aluno_body(&cpf, &unique_cpf()))
    );
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 3001);
}

#[actix_rt::test]
async fn test_guardian_reused_by_cpf() {
    let env = TestEnv::new().await;
    let (_, token) = env.user_with_token().await;
    let app = escola_app!(env);

    let resp_cpf = unique_cpf();
    let mut ids = Vec::new();
    for _ in 0..2 {
        let (status, body) = send!(
            app,
            TestRequest::post()
                .uri("/api/v1/alunos")
                .insert_header(("Authorization", token.as_str()))
                .set_json(aluno_body(&unique_cpf(), &resp_cpf))
        );
        assert_eq!(status, StatusCode::CREATED);
        ids.push(body["data"]["responsavel"]["id_responsavel"].as_i64().unwrap());
    }
    assert_eq!(ids[0], ids[1]);
}

#[actix_rt::test]
async fn test_aluno_not_found_and_pagination_clamp() {
    let env = TestEnv::new().await;
    let (_, token) = env.user_with_token().await;
    let app = escola_app!(env);

    let (status, body) = send!(
        app,
        TestRequest::get()
            .uri("/api/v1/alunos/999999")
            .insert_header(("Authorization", token.as_str()))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 3000);
    assert_eq!(body["message"], "Aluno não encontrado");

    let (status, body) = send!(
        app,
        TestRequest::get()
            .uri("/api/v1/alunos?page=0&limit=1000")
            .insert_header(("Authorization", token.as_str()))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["limit"], 100);
    assert!(body["data"].is_array());
}

#[actix_rt::test]
async fn test_update_and_delete_aluno() {
    let env = TestEnv::new().await;
    let (_, token) = env.user_with_token().await;
    let app = escola_app!(env);

    let (_, body) = send!(
        app,
        TestRequest::post()
            .uri("/api/v1/alunos")
            .insert_header(("Authorization", token.as_str()))
            .set_json(aluno_body(&unique_cpf(), &unique_cpf()))
    );
    let id = body["data"]["id_aluno"].as_i64().unwrap();

    let (status, body) = send!(
        app,
        TestRequest::put()
            .uri(&format!("/api/v1/alunos/{}", id))
            .insert_header(("Authorization", token.as_str()))
            .set_json(json!({ "serie_atual": 7, "bairro": "Vila Nova" }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["serie_atual"], 7);
    assert_eq!(body["data"]["bairro"], "Vila Nova");
    assert_eq!(body["data"]["nome_completo"], "Ana Souza");

    let (status, _) = send!(
        app,
        TestRequest::delete()
            .uri(&format!("/api/v1/alunos/{}", id))
            .insert_header(("Authorization", token.as_str()))
    );
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send!(
        app,
        TestRequest::delete()
            .uri(&format!("/api/v1/alunos/{}", id))
            .insert_header(("Authorization", token.as_str()))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_matricula_create_is_all_or_nothing() {
    let env = TestEnv::new().await;
    let (_, token) = env.user_with_token().await;
    let app = escola_app!(env);

    let cpf = unique_cpf();
    let (status, body) = send!(
        app,
        TestRequest::post()
            .uri("/api/v1/matriculas")
            .insert_header(("Authorization", token.as_str()))
            .set_json(json!({
                "aluno": aluno_json(&cpf),
                "responsavel": responsavel_json(&unique_cpf()),
                "matricula": { "turmas_id_turma": 987654 }
            }))
    );
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 5001);

    let (status, body) = send!(
        app,
        TestRequest::get()
            .uri(&format!("/api/v1/alunos?cpf={}", cpf))
            .insert_header(("Authorization", token.as_str()))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 0);
}

#[actix_rt::test]
async fn test_matricula_lifecycle() {
    let env = TestEnv::new().await;
    let (usuario_id, token) = env.user_with_token().await;
    let app = escola_app!(env);

    let (status, body) = send!(
        app,
        TestRequest::post()
            .uri("/api/v1/cursos")
            .insert_header(("Authorization", token.as_str()))
            .set_json(curso_json("Informática"))
    );
    assert_eq!(status, StatusCode::CREATED);
    let turma_id = body["data"]["turmas"][0]["id_turma"].as_i64().unwrap();

    let (status, body) = send!(
        app,
        TestRequest::post()
            .uri("/api/v1/matriculas")
            .insert_header(("Authorization", token.as_str()))
            .set_json(json!({
                "aluno": aluno_json(&unique_cpf()),
                "responsavel": responsavel_json(&unique_cpf()),
                "matricula": { "turmas_id_turma": turma_id },
                "documentos": [
                    { "tipo_documento": "rg", "caminho_arquivo": "/docs/rg.pdf" }
                ]
            }))
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["matricula"]["status"], "ativo");
    assert_eq!(body["data"]["documentos"].as_array().unwrap().len(), 1);
    let matricula_id = body["data"]["matricula"]["id_matricula"].as_i64().unwrap();

    let (status, body) = send!(
        app,
        TestRequest::get()
            .uri(&format!("/api/v1/matriculas/{}", matricula_id))
            .insert_header(("Authorization", token.as_str()))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["curso"]["nome"], "Informática");
    assert_eq!(body["data"]["turma"]["id_turma"], turma_id);
    assert_eq!(body["data"]["responsaveis"].as_array().unwrap().len(), 1);

    let (status, body) = send!(
        app,
        TestRequest::get()
            .uri("/api/v1/alunos/resumo")
            .insert_header(("Authorization", token.as_str()))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["id_matricula"], matricula_id);
    assert_eq!(body["data"][0]["nome_responsavel"], "Maria Souza");

    let (status, _) = send!(
        app,
        TestRequest::post()
            .uri("/api/v1/auditoria")
            .insert_header(("Authorization", token.as_str()))
            .set_json(json!({
                "users_id_usuario": usuario_id,
                "matricula_id_matricula": matricula_id,
                "campo_alterado": "status",
                "valor_antigo": "ativo",
                "valor_novo": "trancado"
            }))
    );
    assert_eq!(status, StatusCode::CREATED);

    // 存在审计记录时不能删除
    let (status, _) = send!(
        app,
        TestRequest::delete()
            .uri(&format!("/api/v1/matriculas/{}", matricula_id))
            .insert_header(("Authorization", token.as_str()))
    );
    assert_eq!(status, StatusCode::CONFLICT);
}

#[actix_rt::test]
async fn test_matricula_missing_sections() {
    let env = TestEnv::new().await;
    let (_, token) = env.user_with_token().await;
    let app = escola_app!(env);

    let (status, body) = send!(
        app,
        TestRequest::post()
            .uri("/api/v1/matriculas")
            .insert_header(("Authorization", token.as_str()))
            .set_json(json!({
                "aluno": aluno_json(&unique_cpf()),
                "matricula": {},
                "documentos": [{ "tipo_documento": "rg" }]
            }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let campos = body["data"]["campos"].as_array().unwrap();
    assert!(campos.contains(&json!("responsavel")));
    assert!(campos.contains(&json!("matricula.turmas_id_turma")));
    assert!(campos.iter().any(|c| c.as_str().unwrap().starts_with("documentos[0]")));
}

#[actix_rt::test]
async fn test_matricula_update_swaps_guardian_and_replaces_documents() {
    let env = TestEnv::new().await;
    let (_, token) = env.user_with_token().await;
    let app = escola_app!(env);

    let (_, body) = send!(
        app,
        TestRequest::post()
            .uri("/api/v1/cursos")
            .insert_header(("Authorization", token.as_str()))
            .set_json(curso_json("Inglês"))
    );
    let turma_id = body["data"]["turmas"][0]["id_turma"].as_i64().unwrap();

    let resp_cpf = unique_cpf();
    let (status, body) = send!(
        app,
        TestRequest::post()
            .uri("/api/v1/matriculas")
            .insert_header(("Authorization", token.as_str()))
            .set_json(json!({
                "aluno": aluno_json(&unique_cpf()),
                "responsavel": responsavel_json(&resp_cpf),
                "matricula": { "turmas_id_turma": turma_id },
                "documentos": [
                    { "tipo_documento": "rg", "caminho_arquivo": "/docs/rg.pdf" }
                ]
            }))
    );
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!(
        "/api/v1/matriculas/{}",
        body["data"]["matricula"]["id_matricula"]
    );

    // 已有 CPF：只覆盖出现的字段
    let (status, body) = send!(
        app,
        TestRequest::put()
            .uri(&uri)
            .insert_header(("Authorization", token.as_str()))
            .set_json(json!({
                "responsavel": { "cpf": resp_cpf, "telefone": "11900001111" }
            }))
    );
    assert_eq!(status, StatusCode::OK);
    let responsaveis = body["data"]["responsaveis"].as_array().unwrap();
    assert_eq!(responsaveis.len(), 1);
    assert_eq!(responsaveis[0]["telefone"], "11900001111");
    assert_eq!(responsaveis[0]["nome_completo"], "Maria Souza");

    // 新 CPF：创建监护人并关联
    let mut novo = responsavel_json(&unique_cpf());
    novo["nome_completo"] = json!("João Souza");
    novo["parentesco"] = json!("pai");
    novo["tipo"] = json!("secundario");
    let (status, body) = send!(
        app,
        TestRequest::put()
            .uri(&uri)
            .insert_header(("Authorization", token.as_str()))
            .set_json(json!({
                "responsavel": novo,
                "documentos": [
                    { "tipo_documento": "cpf", "caminho_arquivo": "/docs/cpf.pdf" },
                    { "tipo_documento": "comprovante", "caminho_arquivo": "/docs/luz.pdf" }
                ]
            }))
    );
    assert_eq!(status, StatusCode::OK);
    let responsaveis = body["data"]["responsaveis"].as_array().unwrap();
    assert_eq!(responsaveis.len(), 2);
    assert_eq!(responsaveis[0]["tipo"], "principal");
    assert_eq!(responsaveis[1]["nome_completo"], "João Souza");
    assert_eq!(responsaveis[1]["tipo"], "secundario");

    let caminhos: Vec<&str> = body["data"]["documentos"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|d| d["caminho_arquivo"].as_str())
        .collect();
    assert_eq!(caminhos.len(), 2);
    assert!(caminhos.contains(&"/docs/cpf.pdf"));
    assert!(!caminhos.contains(&"/docs/rg.pdf"));

    // 新 CPF 但字段不全
    let (status, body) = send!(
        app,
        TestRequest::put()
            .uri(&uri)
            .insert_header(("Authorization", token.as_str()))
            .set_json(json!({ "responsavel": { "cpf": unique_cpf() } }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["data"]["campos"]
        .as_array()
        .unwrap()
        .contains(&json!("responsavel.nome_completo")));
}

#[actix_rt::test]
async fn test_cursos_disponiveis_by_turno() {
    let env = TestEnv::new().await;
    let (_, token) = env.user_with_token().await;
    let app = escola_app!(env);

    let curso = |nome: &str, vagas: i32, hora_inicio: &str, hora_fim: &str| {
        json!({
            "nome": nome,
            "vagas_totais": vagas,
            "turmas": [{
                "nome_turma": format!("{} A", nome),
                "dia_semana": "terça-feira",
                "hora_inicio": hora_inicio,
                "hora_fim": hora_fim,
                "vagas_turma": 10
            }]
        })
    };
    for body in [
        curso("Violão", 20, "14:00", "16:00"),
        curso("Judô", 20, "08:00", "10:00"),
        curso("Balé", 0, "15:00", "17:00"),
    ] {
        let (status, _) = send!(
            app,
            TestRequest::post()
                .uri("/api/v1/cursos")
                .insert_header(("Authorization", token.as_str()))
                .set_json(body)
        );
        assert_eq!(status, StatusCode::CREATED);
    }

    let disponiveis = |turno: &str| {
        TestRequest::get()
            .uri(&format!("/api/v1/matriculas/cursos-disponiveis?turno={}", turno))
            .insert_header(("Authorization", token.as_str()))
    };

    // 上午上学：只有下午的班级，且排除无名额课程
    let (status, body) = send!(app, disponiveis("manha"));
    assert_eq!(status, StatusCode::OK);
    let cursos = body["data"].as_array().unwrap();
    assert_eq!(cursos.len(), 1);
    assert_eq!(cursos[0]["nome"], "Violão");
    assert_eq!(cursos[0]["turmas"][0]["hora_inicio"], "14:00");

    let (_, body) = send!(app, disponiveis("tarde"));
    assert_eq!(body["data"][0]["nome"], "Judô");
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = send!(app, disponiveis("integral"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));

    let (status, body) = send!(app, disponiveis("noite"));
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 5002);

    let (status, body) = send!(
        app,
        TestRequest::get()
            .uri("/api/v1/matriculas/cursos-disponiveis")
            .insert_header(("Authorization", token.as_str()))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["data"]["campos"], json!(["turno"]));
}

#[actix_rt::test]
async fn test_verificar_cpf() {
    let env = TestEnv::new().await;
    let (_, token) = env.user_with_token().await;
    let app = escola_app!(env);

    let cpf = unique_cpf();
    let (_, body) = send!(
        app,
        TestRequest::post()
            .uri("/api/v1/alunos")
            .insert_header(("Authorization", token.as_str()))
            .set_json(aluno_body(&cpf, &unique_cpf()))
    );
    let id = body["data"]["id_aluno"].clone();

    let (status, body) = send!(
        app,
        TestRequest::get()
            .uri(&format!("/api/v1/alunos/cpf/{}", cpf))
            .insert_header(("Authorization", token.as_str()))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["disponivel"], false);
    assert_eq!(body["data"]["id_aluno"], id);

    let livre = unique_cpf();
    let (status, body) = send!(
        app,
        TestRequest::get()
            .uri(&format!("/api/v1/alunos/cpf/{}", livre))
            .insert_header(("Authorization", token.as_str()))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!({ "cpf": livre, "disponivel": true, "id_aluno": null })
    );
}

#[actix_rt::test]
async fn test_required_fields_check_presence_not_truthiness() {
    let env = TestEnv::new().await;
    let (_, token) = env.user_with_token().await;
    let app = escola_app!(env);

    // 0 与空 observacoes 视为已提供
    let mut body = aluno_body(&unique_cpf(), &unique_cpf());
    body["serie_atual"] = json!(0);
    body["numero_endereco"] = json!(0);
    body["observacoes"] = json!("");
    let (status, resp) = send!(
        app,
        TestRequest::post()
            .uri("/api/v1/alunos")
            .insert_header(("Authorization", token.as_str()))
            .set_json(body)
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(resp["data"]["serie_atual"], 0);
    assert_eq!(resp["data"]["numero_endereco"], 0);

    // 缺失或空白文本仍然报告
    let mut body = aluno_body(&unique_cpf(), &unique_cpf());
    let obj = body.as_object_mut().unwrap();
    obj.remove("observacoes");
    obj.remove("serie_atual");
    obj.insert("bairro".into(), json!("   "));
    let (status, resp) = send!(
        app,
        TestRequest::post()
            .uri("/api/v1/alunos")
            .insert_header(("Authorization", token.as_str()))
            .set_json(body)
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let mut campos: Vec<&str> = resp["data"]["campos"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    campos.sort_unstable();
    assert_eq!(campos, vec!["bairro", "observacoes", "serie_atual"]);
}
