//! 必填字段校验
//!
//! 先收集所有缺失字段，最后一次性返回 `MissingFields`。

use crate::errors::{Result, SysocialError};

pub const MISSING_FIELDS_MESSAGE: &str = "Campos obrigatórios ausentes";

#[derive(Debug, Default)]
pub struct Required {
    prefix: Option<String>,
    campos: Vec<String>,
}

impl Required {
    pub fn new() -> Self {
        Self::default()
    }

    /// 嵌套对象的字段，报告为 `prefix.campo`
    pub fn nested(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            campos: Vec::new(),
        }
    }

    fn record(&mut self, name: &str) {
        match &self.prefix {
            Some(prefix) => self.campos.push(format!("{}.{}", prefix, name)),
            None => self.campos.push(name.to_string()),
        }
    }

    /// 非空字符串
    pub fn text<'a>(&mut self, name: &str, value: &'a Option<String>) -> &'a str {
        match value.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s,
            _ => {
                self.record(name);
                ""
            }
        }
    }

    /// 必须出现，但允许为空字符串
    pub fn present<'a>(&mut self, name: &str, value: &'a Option<String>) -> &'a str {
        match value.as_deref() {
            Some(s) => s,
            None => {
                self.record(name);
                ""
            }
        }
    }

    pub fn value<T: Copy + Default>(&mut self, name: &str, value: Option<T>) -> T {
        value.unwrap_or_else(|| {
            self.record(name);
            T::default()
        })
    }

    /// 整个嵌套对象缺失
    pub fn object<T>(&mut self, name: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.record(name);
        }
        value
    }

    /// 合并另一个收集器的结果
    pub fn merge(&mut self, other: Required) {
        self.campos.extend(other.campos);
    }

    pub fn is_empty(&self) -> bool {
        self.campos.is_empty()
    }

    pub fn finish(self) -> Result<()> {
        if self.campos.is_empty() {
            Ok(())
        } else {
            Err(SysocialError::missing_fields(
                MISSING_FIELDS_MESSAGE,
                self.campos,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_all_missing_fields() {
        let nome = Some("Ana".to_string());
        let cpf: Option<String> = Some("   ".to_string());
        let obs: Option<String> = Some(String::new());

        let mut req = Required::new();
        assert_eq!(req.text("nome_completo", &nome), "Ana");
        req.text("cpf", &cpf);
        req.value::<i32>("serie_atual", None);
        assert_eq!(req.present("observacoes", &obs), "");

        match req.finish() {
            Err(SysocialError::MissingFields { campos, .. }) => {
                assert_eq!(campos, vec!["cpf", "serie_atual"]);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_nested_prefix() {
        let mut outer = Required::new();
        let mut inner = Required::nested("responsavel");
        inner.text("parentesco", &None);
        outer.merge(inner);

        match outer.finish() {
            Err(SysocialError::MissingFields { campos, .. }) => {
                assert_eq!(campos, vec!["responsavel.parentesco"]);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_nothing_missing() {
        let mut req = Required::new();
        req.value("vagas", Some(10));
        assert!(req.is_empty());
        assert!(req.finish().is_ok());
    }
}
