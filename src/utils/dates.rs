//! 日期 / 时间解析工具
//!
//! 接口中的日期统一为 `YYYY-MM-DD`，时间为 `HH:MM`，月份为 `AAAAMM`。

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday};

use crate::errors::{Result, SysocialError};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// 解析 `YYYY-MM-DD`
pub fn parse_date(field: &str, input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).map_err(|_| {
        SysocialError::invalid_date(format!(
            "Data inválida em '{}': esperado AAAA-MM-DD, recebido '{}'",
            field, input
        ))
    })
}

/// 可选日期参数，空字符串视为未提供
pub fn parse_optional_date(field: &str, input: Option<&str>) -> Result<Option<NaiveDate>> {
    match input.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => parse_date(field, s).map(Some),
        None => Ok(None),
    }
}

/// 当天 00:00:00 UTC
pub fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// 解析日期时间：RFC 3339、`YYYY-MM-DD HH:MM[:SS]`、`YYYY-MM-DDTHH:MM[:SS]` 或纯日期
pub fn parse_datetime(field: &str, input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, fmt) {
            return Ok(dt.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, DATE_FORMAT) {
        return Ok(day_start(date));
    }

    Err(SysocialError::invalid_date(format!(
        "Data/hora inválida em '{}': use AAAA-MM-DD ou ISO 8601, recebido '{}'",
        field, input
    )))
}

/// 时间区间边界
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBound {
    /// `>=` / `<=`
    Inclusive(DateTime<Utc>),
    /// `<`，用于纯日期的 `ate`（包含当天全天）
    Exclusive(DateTime<Utc>),
}

/// 必须以 `YYYY-MM-DD` 开头
fn require_date_prefix(field: &str, input: &str) -> Result<NaiveDate> {
    input
        .get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, DATE_FORMAT).ok())
        .ok_or_else(|| {
            SysocialError::invalid_date(format!(
                "Parâmetro '{}' deve começar com AAAA-MM-DD",
                field
            ))
        })
}

/// 解析区间下界 `de`
pub fn parse_range_start(field: &str, input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();
    let date = require_date_prefix(field, input)?;
    if input.len() == 10 {
        return Ok(day_start(date));
    }
    parse_datetime(field, input)
}

/// 解析区间上界 `ate`
pub fn parse_range_end(field: &str, input: &str) -> Result<DateBound> {
    let input = input.trim();
    let date = require_date_prefix(field, input)?;
    if input.len() == 10 {
        return Ok(DateBound::Exclusive(day_start(date) + Duration::days(1)));
    }
    parse_datetime(field, input).map(DateBound::Inclusive)
}

/// 解析 `HH:MM` / `HH:MM:SS`，统一返回 `HH:MM`
pub fn parse_hora(field: &str, input: &str) -> Result<String> {
    let input = input.trim();
    NaiveTime::parse_from_str(input, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M:%S"))
        .map(|t| t.format("%H:%M").to_string())
        .map_err(|_| {
            SysocialError::validation(format!(
                "Horário inválido em '{}': esperado HH:MM, recebido '{}'",
                field, input
            ))
        })
}

/// 解析 `AAAAMM`
pub fn parse_ano_mes(input: &str) -> Result<(i32, u32)> {
    let invalid = || {
        SysocialError::validation(format!(
            "Parâmetro ano_mes inválido: esperado AAAAMM, recebido '{}'",
            input
        ))
    };

    if input.len() != 6 || !input.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let year: i32 = input[..4].parse().map_err(|_| invalid())?;
    let month: u32 = input[4..].parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok((year, month))
}

fn strip_accents(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        other => other,
    }
}

/// 星期名称 → `Weekday`
///
/// 接受 `Segunda-feira` / `Segunda` 等写法，不区分大小写与重音。
pub fn parse_dia_semana(input: &str) -> Option<Weekday> {
    let normalized: String = input
        .trim()
        .to_lowercase()
        .chars()
        .map(strip_accents)
        .collect();
    let base = normalized
        .strip_suffix("-feira")
        .or_else(|| normalized.strip_suffix(" feira"))
        .unwrap_or(&normalized);

    match base {
        "domingo" => Some(Weekday::Sun),
        "segunda" => Some(Weekday::Mon),
        "terca" => Some(Weekday::Tue),
        "quarta" => Some(Weekday::Wed),
        "quinta" => Some(Weekday::Thu),
        "sexta" => Some(Weekday::Fri),
        "sabado" => Some(Weekday::Sat),
        _ => None,
    }
}

/// 某月内落在指定星期的所有日期
pub fn dates_in_month(year: i32, month: u32, weekday: Weekday) -> Vec<NaiveDate> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };

    let offset = (7 + weekday.num_days_from_monday() as i64
        - first.weekday().num_days_from_monday() as i64)
        % 7;

    std::iter::successors(Some(first + Duration::days(offset)), |d| {
        Some(*d + Duration::days(7))
    })
    .take_while(|d| d.month() == month)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("data", "2024-03-05").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );
        assert!(parse_date("data", "05/03/2024").is_err());
        assert!(parse_date("data", "2024-02-30").is_err());
        assert!(parse_optional_date("data", Some("")).unwrap().is_none());
    }

    #[test]
    fn test_parse_datetime_variants() {
        let a = parse_datetime("data_hora", "2024-03-05T10:20:30Z").unwrap();
        let b = parse_datetime("data_hora", "2024-03-05 10:20:30").unwrap();
        assert_eq!(a, b);

        let c = parse_datetime("data_hora", "2024-03-05").unwrap();
        assert_eq!(c.to_rfc3339(), "2024-03-05T00:00:00+00:00");

        assert!(parse_datetime("data_hora", "ontem").is_err());
    }

    #[test]
    fn test_range_bounds() {
        let start = parse_range_start("de", "2024-01-10").unwrap();
        assert_eq!(start.to_rfc3339(), "2024-01-10T00:00:00+00:00");

        match parse_range_end("ate", "2024-01-10").unwrap() {
            DateBound::Exclusive(dt) => assert_eq!(dt.to_rfc3339(), "2024-01-11T00:00:00+00:00"),
            other => panic!("unexpected bound {:?}", other),
        }
        match parse_range_end("ate", "2024-01-10T12:00:00Z").unwrap() {
            DateBound::Inclusive(dt) => assert_eq!(dt.to_rfc3339(), "2024-01-10T12:00:00+00:00"),
            other => panic!("unexpected bound {:?}", other),
        }

        assert!(parse_range_start("de", "10-01-2024").is_err());
        assert!(parse_range_end("ate", "2024").is_err());
    }

    #[test]
    fn test_parse_hora() {
        assert_eq!(parse_hora("hora_inicio", "08:00").unwrap(), "08:00");
        assert_eq!(parse_hora("hora_inicio", "14:30:00").unwrap(), "14:30");
        assert!(parse_hora("hora_inicio", "25:00").is_err());
        assert!(parse_hora("hora_inicio", "8h").is_err());
    }

    #[test]
    fn test_parse_ano_mes() {
        assert_eq!(parse_ano_mes("202403").unwrap(), (2024, 3));
        assert!(parse_ano_mes("202413").is_err());
        assert!(parse_ano_mes("202400").is_err());
        assert!(parse_ano_mes("2024-3").is_err());
        assert!(parse_ano_mes("20243").is_err());
    }

    #[test]
    fn test_parse_dia_semana() {
        assert_eq!(parse_dia_semana("Segunda-feira"), Some(Weekday::Mon));
        assert_eq!(parse_dia_semana("segunda"), Some(Weekday::Mon));
        assert_eq!(parse_dia_semana("Terça-feira"), Some(Weekday::Tue));
        assert_eq!(parse_dia_semana("TERCA"), Some(Weekday::Tue));
        assert_eq!(parse_dia_semana("Sábado"), Some(Weekday::Sat));
        assert_eq!(parse_dia_semana("sabado"), Some(Weekday::Sat));
        assert_eq!(parse_dia_semana(" Domingo "), Some(Weekday::Sun));
        assert_eq!(parse_dia_semana("Funday"), None);
    }

    #[test]
    fn test_dates_in_month() {
        // 2024-03-01 是星期五
        let fridays = dates_in_month(2024, 3, Weekday::Fri);
        assert_eq!(fridays.len(), 5);
        assert_eq!(fridays[0], NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(fridays[4], NaiveDate::from_ymd_opt(2024, 3, 29).unwrap());

        let mondays = dates_in_month(2024, 3, Weekday::Mon);
        assert_eq!(mondays.len(), 4);
        assert_eq!(mondays[0], NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());

        // 闰年二月
        assert_eq!(dates_in_month(2024, 2, Weekday::Thu).len(), 5);
        assert!(dates_in_month(2024, 13, Weekday::Mon).is_empty());
    }
}
