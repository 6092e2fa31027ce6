//! REST API 服务模块
//!
//! 该模块包含业务 API 的所有端点，包括：
//! - 认证与用户管理
//! - 学生、监护人
//! - 课程、班级
//! - 报名
//! - 审计（只读）
//! - 点名与出勤

mod alunos;
mod auditoria;
pub mod auth;
mod aulas;
mod cursos;
pub mod error_code;
mod helpers;
mod matriculas;
mod presencas;
pub mod routes;
mod turmas;
mod types;
mod usuarios;

use actix_web::web;
use std::sync::Arc;

use crate::services::{
    AlunoService, AuditoriaService, ChamadaService, CursoService, MatriculaService,
    PresencaService, TurmaService, UsuarioService,
};
use crate::storage::SeaOrmStorage;

// 重新导出类型
pub use types::*;

// 重新导出帮助函数
pub use helpers::{
    api_result, error_from_sysocial, error_response, json_error_handler, not_found,
    path_error_handler, query_error_handler, success_response,
};

// 重新导出错误码
pub use error_code::{ErrorCode, Recurso};

pub use routes::v1_routes;

/// handler 依赖的全部 service，以 `web::Data<Arc<_>>` 注入
#[derive(Clone)]
pub struct AppServices {
    pub usuarios: Arc<UsuarioService>,
    pub alunos: Arc<AlunoService>,
    pub cursos: Arc<CursoService>,
    pub turmas: Arc<TurmaService>,
    pub matriculas: Arc<MatriculaService>,
    pub auditoria: Arc<AuditoriaService>,
    pub chamadas: Arc<ChamadaService>,
    pub presencas: Arc<PresencaService>,
}

impl AppServices {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self {
            usuarios: Arc::new(UsuarioService::new(storage.clone())),
            alunos: Arc::new(AlunoService::new(storage.clone())),
            cursos: Arc::new(CursoService::new(storage.clone())),
            turmas: Arc::new(TurmaService::new(storage.clone())),
            matriculas: Arc::new(MatriculaService::new(storage.clone())),
            auditoria: Arc::new(AuditoriaService::new(storage.clone())),
            chamadas: Arc::new(ChamadaService::new(storage.clone())),
            presencas: Arc::new(PresencaService::new(storage)),
        }
    }

    /// 注册为 app data，配合 `App::configure` 使用
    pub fn register(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.usuarios.clone()))
            .app_data(web::Data::new(self.alunos.clone()))
            .app_data(web::Data::new(self.cursos.clone()))
            .app_data(web::Data::new(self.turmas.clone()))
            .app_data(web::Data::new(self.matriculas.clone()))
            .app_data(web::Data::new(self.auditoria.clone()))
            .app_data(web::Data::new(self.chamadas.clone()))
            .app_data(web::Data::new(self.presencas.clone()));
    }
}
