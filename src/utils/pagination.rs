use serde::{Deserialize, Serialize};
use ts_rs::TS;

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

/// 规范化后的分页参数（page 从 1 开始）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    pub fn new(page: Option<u64>, limit: Option<u64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// SeaORM `fetch_page` 使用从 0 开始的页码
    pub fn zero_based(&self) -> u64 {
        self.page - 1
    }

    pub fn info(&self, total: u64) -> PaginationInfo {
        PaginationInfo {
            page: self.page,
            limit: self.limit,
            total,
            total_pages: total.div_ceil(self.limit),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, TS)]
#[ts(export, export_to = "../frontend/src/app/services/types.generated.ts")]
pub struct PaginationInfo {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = PageRequest::new(None, None);
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, DEFAULT_PAGE_SIZE);
        assert_eq!(p.zero_based(), 0);
    }

    #[test]
    fn test_clamping() {
        assert_eq!(PageRequest::new(Some(0), Some(0)), PageRequest { page: 1, limit: 1 });
        assert_eq!(PageRequest::new(Some(3), Some(1000)).limit, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_total_pages() {
        let p = PageRequest::new(Some(1), Some(20));
        assert_eq!(p.info(0).total_pages, 0);
        assert_eq!(p.info(20).total_pages, 1);
        assert_eq!(p.info(21).total_pages, 2);
    }
}
