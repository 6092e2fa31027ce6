//! REST API 类型定义

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::utils::PaginationInfo;

/// 输出目录常量
pub const TS_EXPORT_PATH: &str = "../frontend/src/app/services/types.generated.ts";

/// 统一响应信封 `{ code, message, data }`
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    pub data: Option<T>,
}

/// 分页列表响应
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PaginatedResponse<T> {
    pub code: i32,
    pub message: String,
    pub data: Vec<T>,
    pub pagination: PaginationInfo,
}

/// 缺失必填字段时的 `data`
#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct CamposFaltantes {
    pub campos: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// `GET /turmas/{id}/chamadas/{ano_mes}` 的查询参数
#[derive(Serialize, Deserialize, Clone, Debug, Default, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct MensalQuery {
    /// 补建点名的负责人，缺省为当前登录用户
    pub usuario: Option<i32>,
}
