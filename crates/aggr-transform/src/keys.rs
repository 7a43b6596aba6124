//! Entity and period key normalization.
//!
//! Tabs key their rows on (entity, period). Exports disagree on how both are
//! written: ids arrive as `101` or `101.0`, periods as full dates, month
//! strings or compact day codes. Keys are rewritten into one text form per
//! platform before grouping so joins compare like with like.

use aggr_common::{any_to_string, parse_f64};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::{AnyValue, DataFrame, NamedFrom, PolarsResult, Series};

use crate::frame::TabFrame;

/// Rendering of a normalized period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodFormat {
    /// `2023-01`
    YearMonth,
    /// `01-2023`
    MonthYear,
    /// `20230105`
    Compact,
}

impl PeriodFormat {
    pub fn pattern(self) -> &'static str {
        match self {
            Self::YearMonth => "%Y-%m",
            Self::MonthYear => "%m-%Y",
            Self::Compact => "%Y%m%d",
        }
    }

    /// Renders a raw period cell. Values that do not parse as a date are
    /// returned trimmed but otherwise untouched.
    pub fn render(self, raw: &str) -> String {
        match parse_period(raw) {
            Some(date) => date.format(self.pattern()).to_string(),
            None => raw.trim().to_string(),
        }
    }
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y", "%Y/%m/%d", "%d %b %Y", "%d %B %Y",
];

/// Month-only layouts, parsed by pinning the day to the first.
const MONTH_FORMATS: &[(&str, &str)] = &[
    ("%Y-%m-%d", "-01"),
    ("%Y/%m/%d", "/01"),
];

const MONTH_FIRST_FORMATS: &[&str] = &["%d-%m-%Y", "%d/%m/%Y", "%d %b %Y", "%d %B %Y", "%d %b-%Y"];

/// Parses a period cell into a calendar date.
///
/// Accepts ISO dates and datetimes, day-first dates, `YYYY-MM`, `MM-YYYY`,
/// `Mon YYYY` and compact `YYYYMMDD` codes.
pub fn parse_period(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.date());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }
    if value.len() == 8 && value.chars().all(|ch| ch.is_ascii_digit()) {
        if let Ok(date) = NaiveDate::parse_from_str(value, "%Y%m%d") {
            return Some(date);
        }
    }
    for (format, day) in MONTH_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&format!("{value}{day}"), format) {
            return Some(date);
        }
    }
    let separator = if value.contains('/') { "/" } else if value.contains('-') { "-" } else { " " };
    for format in MONTH_FIRST_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&format!("01{separator}{value}"), format) {
            return Some(date);
        }
    }
    None
}

/// Canonical text form of an entity id: integral numbers lose any decimal
/// part (`101.0` -> `101`), everything else is trimmed.
pub fn normalize_entity_id(raw: &str) -> String {
    let trimmed = raw.trim();
    match parse_f64(trimmed) {
        Some(value) if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15 => {
            format!("{}", value as i64)
        }
        _ => trimmed.to_string(),
    }
}

fn rewrite_text_column<F>(df: &mut DataFrame, name: &str, rewrite: F) -> PolarsResult<()>
where
    F: Fn(&str) -> String,
{
    let column = df.column(name)?;
    let mut values: Vec<Option<String>> = Vec::with_capacity(column.len());
    for idx in 0..column.len() {
        let raw = any_to_string(column.get(idx).unwrap_or(AnyValue::Null));
        let rewritten = rewrite(&raw);
        values.push(if rewritten.is_empty() {
            None
        } else {
            Some(rewritten)
        });
    }
    df.with_column(Series::new(name.into(), values))?;
    Ok(())
}

impl TabFrame {
    /// Rewrites the key columns that exist into their canonical text form.
    pub fn normalize_keys(&mut self, format: PeriodFormat) -> PolarsResult<()> {
        let entity = self.entity_column();
        if self.data.column(&entity).is_ok() {
            rewrite_text_column(&mut self.data, &entity, normalize_entity_id)?;
        }
        let period = self.period_column();
        if self.data.column(&period).is_ok() {
            rewrite_text_column(&mut self.data, &period, |raw| format.render(raw))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn parses_common_layouts() {
        assert_eq!(parse_period("2023-01-15"), date(2023, 1, 15));
        assert_eq!(parse_period("2023-01-15 10:30:00"), date(2023, 1, 15));
        assert_eq!(parse_period("2023-01-15T10:30:00"), date(2023, 1, 15));
        assert_eq!(parse_period("15/01/2023"), date(2023, 1, 15));
        assert_eq!(parse_period("15-01-2023"), date(2023, 1, 15));
        assert_eq!(parse_period("20230115"), date(2023, 1, 15));
        assert_eq!(parse_period("2023-01"), date(2023, 1, 1));
        assert_eq!(parse_period("01-2023"), date(2023, 1, 1));
        assert_eq!(parse_period("Jan 2023"), date(2023, 1, 1));
        assert_eq!(parse_period("not a date"), None);
        assert_eq!(parse_period(""), None);
    }

    #[test]
    fn renders_per_platform() {
        assert_eq!(PeriodFormat::YearMonth.render("2023-01-15"), "2023-01");
        assert_eq!(PeriodFormat::MonthYear.render("2023-01-15"), "01-2023");
        assert_eq!(PeriodFormat::Compact.render("2023-01-15 08:00:00"), "20230115");
        assert_eq!(PeriodFormat::YearMonth.render(" week 3 "), "week 3");
    }

    #[test]
    fn rendering_is_stable() {
        for format in [PeriodFormat::YearMonth, PeriodFormat::MonthYear, PeriodFormat::Compact] {
            let once = format.render("2023-11-05");
            assert_eq!(format.render(&once), once);
        }
    }

    #[test]
    fn entity_ids_drop_integral_decimals() {
        assert_eq!(normalize_entity_id("101.0"), "101");
        assert_eq!(normalize_entity_id(" 101 "), "101");
        assert_eq!(normalize_entity_id("101.5"), "101.5");
        assert_eq!(normalize_entity_id("RES-9"), "RES-9");
    }

    #[test]
    fn normalizes_tab_key_columns() {
        let data = DataFrame::new(vec![
            Series::new("res_id_tm".into(), vec!["101.0", "102"]).into(),
            Series::new("period_tm".into(), vec!["2023-01-15", "2023-02-01"]).into(),
        ])
        .unwrap();
        let mut frame = TabFrame::new("txn_metrics", "_tm", data);
        frame.normalize_keys(PeriodFormat::YearMonth).unwrap();
        let ids = aggr_common::column_strings(&frame.data, "res_id_tm").unwrap();
        let periods = aggr_common::column_strings(&frame.data, "period_tm").unwrap();
        assert_eq!(ids, vec![Some("101".to_string()), Some("102".to_string())]);
        assert_eq!(
            periods,
            vec![Some("2023-01".to_string()), Some("2023-02".to_string())]
        );
    }
}
