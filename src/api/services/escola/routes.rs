//! REST API 路由配置
//!
//! 将 /v1 下的路由按资源拆分。固定路径（如 `/resumo`、`/lote`）必须注册在 `/{id}` 之前。

use actix_web::web;

use super::alunos::{
    create_aluno, delete_aluno, get_aluno, list_alunos, resumo_alunos, update_aluno,
    verificar_cpf,
};
use super::auditoria::{
    create_auditoria, get_auditoria, list_auditoria, reject_mutation, resumo_auditoria,
    trilha_matricula,
};
use super::auth::{login, login_rate_limiter, logout, refresh_token, register, validate_token};
use super::aulas::{
    create_aula, delete_aula, get_aula, get_aula_presencas, list_aulas, update_aula,
};
use super::cursos::{
    create_curso, delete_curso, get_curso, get_curso_com_turmas, get_curso_turmas, list_cursos,
    update_curso,
};
use super::matriculas::{
    create_matricula, cursos_disponiveis, delete_matricula, get_matricula, list_matriculas,
    update_matricula,
};
use super::presencas::{
    create_presenca, delete_presenca, delete_presencas_chamada, get_presenca, list_presencas,
    lote_presencas, update_presenca,
};
use super::turmas::{
    create_turma, delete_turma, get_chamada_mensal, get_turma, get_turma_alunos, get_turma_aulas,
    list_turmas, update_turma,
};
use super::usuarios::{
    create_usuario, delete_usuario, get_usuario, list_usuarios, update_usuario,
};

/// 认证路由 `/auth`
///
/// 包含：
/// - POST /auth/login - 登录（带限流）
/// - POST /auth/register - 注册
/// - POST /auth/refresh - 刷新 token
/// - POST /auth/logout - 注销当前 token
/// - GET /auth/validate - 校验 token
pub fn auth_routes() -> actix_web::Scope {
    web::scope("/auth")
        .route("/login", web::post().to(login).wrap(login_rate_limiter()))
        .route("/register", web::post().to(register))
        .route("/refresh", web::post().to(refresh_token))
        .route("/logout", web::post().to(logout))
        .route("/validate", web::get().to(validate_token))
}

pub fn usuarios_routes() -> actix_web::Scope {
    web::scope("/usuarios")
        .route("", web::get().to(list_usuarios))
        .route("", web::post().to(create_usuario))
        .route("/{id}", web::get().to(get_usuario))
        .route("/{id}", web::put().to(update_usuario))
        .route("/{id}", web::delete().to(delete_usuario))
}

/// 学生路由 `/alunos`
pub fn alunos_routes() -> actix_web::Scope {
    web::scope("/alunos")
        .route("", web::get().to(list_alunos))
        .route("", web::post().to(create_aluno))
        // must be before /{id}
        .route("/resumo", web::get().to(resumo_alunos))
        .route("/cpf/{cpf}", web::get().to(verificar_cpf))
        .route("/{id}", web::get().to(get_aluno))
        .route("/{id}", web::put().to(update_aluno))
        .route("/{id}", web::delete().to(delete_aluno))
}

/// 课程路由 `/cursos`
pub fn cursos_routes() -> actix_web::Scope {
    web::scope("/cursos")
        .route("", web::get().to(list_cursos))
        .route("", web::post().to(create_curso))
        .route("/{id}/com-turmas", web::get().to(get_curso_com_turmas))
        .route("/{id}/turmas", web::get().to(get_curso_turmas))
        .route("/{id}", web::get().to(get_curso))
        .route("/{id}", web::put().to(update_curso))
        .route("/{id}", web::delete().to(delete_curso))
}

/// 班级路由 `/turmas`
///
/// 包含：
/// - GET /turmas/{id}/alunos - 班级学生
/// - GET /turmas/{id}/aulas - 班级点名列表
/// - GET /turmas/{id}/chamadas/{ano_mes} - 月度点名表
pub fn turmas_routes() -> actix_web::Scope {
    web::scope("/turmas")
        .route("", web::get().to(list_turmas))
        .route("", web::post().to(create_turma))
        .route("/{id}/alunos", web::get().to(get_turma_alunos))
        .route("/{id}/aulas", web::get().to(get_turma_aulas))
        .route("/{id}/chamadas/{ano_mes}", web::get().to(get_chamada_mensal))
        .route("/{id}", web::get().to(get_turma))
        .route("/{id}", web::put().to(update_turma))
        .route("/{id}", web::delete().to(delete_turma))
}

pub fn matriculas_routes() -> actix_web::Scope {
    web::scope("/matriculas")
        .route("", web::get().to(list_matriculas))
        .route("", web::post().to(create_matricula))
        // must be before /{id}
        .route("/cursos-disponiveis", web::get().to(cursos_disponiveis))
        .route("/{id}", web::get().to(get_matricula))
        .route("/{id}", web::put().to(update_matricula))
        .route("/{id}", web::delete().to(delete_matricula))
}

/// 审计路由 `/auditoria`（只读，PUT/DELETE 返回 405）
pub fn auditoria_routes() -> actix_web::Scope {
    web::scope("/auditoria")
        .route("", web::get().to(list_auditoria))
        .route("", web::post().to(create_auditoria))
        .route("/resumo", web::get().to(resumo_auditoria))
        .route("/matricula/{id}", web::get().to(trilha_matricula))
        .route("/{id}", web::get().to(get_auditoria))
        .route("/{id}", web::put().to(reject_mutation))
        .route("/{id}", web::delete().to(reject_mutation))
}

pub fn aulas_routes() -> actix_web::Scope {
    web::scope("/aulas")
        .route("", web::get().to(list_aulas))
        .route("", web::post().to(create_aula))
        .route("/{id}/presencas", web::get().to(get_aula_presencas))
        .route("/{id}", web::get().to(get_aula))
        .route("/{id}", web::put().to(update_aula))
        .route("/{id}", web::delete().to(delete_aula))
}

/// 出勤路由 `/presencas`
pub fn presencas_routes() -> actix_web::Scope {
    web::scope("/presencas")
        .route("", web::get().to(list_presencas))
        .route("", web::post().to(create_presenca))
        // 固定路径 must be before /{id}
        .route("/lote", web::post().to(lote_presencas))
        .route("/aula/{id}", web::get().to(get_aula_presencas))
        .route("/chamada/{id}", web::delete().to(delete_presencas_chamada))
        .route("/{id}", web::get().to(get_presenca))
        .route("/{id}", web::put().to(update_presenca))
        .route("/{id}", web::delete().to(delete_presenca))
}

/// REST API v1 路由
///
/// 组合所有资源路由
pub fn v1_routes() -> actix_web::Scope {
    web::scope("/v1")
        .service(auth_routes())
        .service(usuarios_routes())
        .service(alunos_routes())
        .service(cursos_routes())
        .service(turmas_routes())
        .service(matriculas_routes())
        .service(auditoria_routes())
        .service(aulas_routes())
        .service(presencas_routes())
}
