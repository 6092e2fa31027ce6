//! Service layer for business logic
//!
//! 每个资源一个 service，HTTP handler 只负责参数提取与响应封装。

mod aluno_service;
mod auditoria_service;
mod chamada_service;
mod curso_service;
mod matricula_service;
mod presenca_service;
pub mod responsavel;
mod turma_service;
mod usuario_service;
pub mod validation;

pub use aluno_service::*;
pub use auditoria_service::*;
pub use chamada_service::*;
pub use curso_service::*;
pub use matricula_service::*;
pub use presenca_service::*;
pub use responsavel::{ResponsavelInput, ResponsavelVinculado};
pub use turma_service::*;
pub use usuario_service::*;

use sea_orm::ColumnTrait;
use sea_orm::sea_query::{Expr, ExprTrait, Func, LikeExpr};

use crate::utils::{LIKE_ESCAPE, PaginationInfo, contains_pattern, like_pattern};

/// 分页查询结果
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: PaginationInfo,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, pagination: PaginationInfo) -> Self {
        Self { items, pagination }
    }
}

/// `LOWER(table.col) LIKE '%value%' ESCAPE '\'`
pub(crate) fn ilike<C: ColumnTrait>(col: C, value: &str) -> Expr {
    Expr::expr(Func::lower(Expr::col((col.entity_name(), col))))
        .like(LikeExpr::new(like_pattern(value)).escape(LIKE_ESCAPE))
}

/// `table.col LIKE '%value%' ESCAPE '\'`，区分大小写
pub(crate) fn contains<C: ColumnTrait>(col: C, value: &str) -> Expr {
    Expr::col((col.entity_name(), col))
        .like(LikeExpr::new(contains_pattern(value)).escape(LIKE_ESCAPE))
}
