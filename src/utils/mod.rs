pub mod dates;
pub mod pagination;
pub mod password;

pub use pagination::{PageRequest, PaginationInfo};

/// 去掉首尾空白，空字符串视为未提供
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// `true` / `1`（不区分大小写）视为真，其余为假
pub fn parse_bool_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1")
}

/// LIKE 转义字符
pub const LIKE_ESCAPE: char = '\\';

/// 转义 `%`、`_` 与转义字符本身，使用户输入按字面匹配
pub fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            out.push(LIKE_ESCAPE);
        }
        out.push(c);
    }
    out
}

/// 子串匹配模式（配合 `LIKE ... ESCAPE '\'`）
pub fn contains_pattern(value: &str) -> String {
    format!("%{}%", escape_like(value.trim()))
}

/// 不区分大小写的子串匹配模式（配合 `LOWER(col) LIKE`）
pub fn like_pattern(value: &str) -> String {
    contains_pattern(&value.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("  ana ")), Some("ana"));
        assert_eq!(non_empty(Some("   ")), None);
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn test_parse_bool_flag() {
        assert!(parse_bool_flag("true"));
        assert!(parse_bool_flag("TRUE"));
        assert!(parse_bool_flag("1"));
        assert!(!parse_bool_flag("false"));
        assert!(!parse_bool_flag("sim"));
        assert!(!parse_bool_flag(""));
    }

    #[test]
    fn test_like_pattern() {
        assert_eq!(like_pattern("Maria"), "%maria%");
        assert_eq!(like_pattern("  SILVA "), "%silva%");
    }

    #[test]
    fn test_like_wildcards_are_escaped() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("c:\\tmp"), "c:\\\\tmp");
        assert_eq!(like_pattern("%"), "%\\%%");
        assert_eq!(contains_pattern(" 123_ "), "%123\\_%");
    }
}
