//! Numeric coercion for noisy metric columns.
//!
//! Ads exports write budget and count figures with thousands separators and
//! placeholder text. The normalizer converts a fixed allow-list of metrics to
//! integer or float columns. A column is converted only when every non-blank
//! cell parses; otherwise it is left exactly as read.

use aggr_common::{ColumnKind, any_to_f64, any_to_string, column_kind};
use polars::prelude::{AnyValue, Column, DataFrame, IntoColumn, NamedFrom, PolarsResult, Series};
use tracing::debug;

/// Target numeric type of a coerced column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericTarget {
    Integer,
    Float,
}

const DEFAULT_SUFFIXES: &[&str] = &["_ads", "_tm", "_funnel", "_raw_data", "_grid"];

const DEFAULT_INTEGER_COLUMNS: &[&str] = &[
    "orders",
    "ad_orders",
    "inorganic_menu_opens",
    "ad_impression",
    "menu_opens",
    "ads_new_users",
    "new_users_overall",
    "total_user_base",
];

const DEFAULT_FLOAT_COLUMNS: &[&str] = &[
    "ads_consumed",
    "rejection",
    "grid_visibility",
    "sales_generated",
    "kpt_actual_new",
];

#[derive(Debug, Clone)]
pub struct DtypeNormalizer {
    suffixes: Vec<String>,
    integers: Vec<String>,
    floats: Vec<String>,
}

impl Default for DtypeNormalizer {
    fn default() -> Self {
        Self {
            suffixes: DEFAULT_SUFFIXES.iter().map(|s| (*s).to_string()).collect(),
            integers: DEFAULT_INTEGER_COLUMNS.iter().map(|s| (*s).to_string()).collect(),
            floats: DEFAULT_FLOAT_COLUMNS.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl DtypeNormalizer {
    pub fn new(suffixes: Vec<String>, integers: Vec<String>, floats: Vec<String>) -> Self {
        Self {
            suffixes,
            integers,
            floats,
        }
    }

    /// Strips at most one known tab suffix.
    pub fn base_name<'a>(&self, column: &'a str) -> &'a str {
        self.suffixes
            .iter()
            .find_map(|suffix| column.strip_suffix(suffix.as_str()))
            .filter(|base| !base.is_empty())
            .unwrap_or(column)
    }

    pub fn target_for(&self, column: &str) -> Option<NumericTarget> {
        let base = self.base_name(column);
        if self.integers.iter().any(|name| name == base) {
            Some(NumericTarget::Integer)
        } else if self.floats.iter().any(|name| name == base) {
            Some(NumericTarget::Float)
        } else {
            None
        }
    }

    /// Returns the coerced frame and the names of the columns that changed.
    pub fn normalize(&self, df: &DataFrame) -> PolarsResult<(DataFrame, Vec<String>)> {
        let mut out = df.clone();
        let mut converted = Vec::new();
        for column in df.get_columns() {
            let name = column.name().to_string();
            let Some(target) = self.target_for(&name) else {
                continue;
            };
            if let Some(coerced) = coerce_column(column, target) {
                out.with_column(coerced)?;
                converted.push(name);
            } else {
                debug!(column = %name, "left unconverted, non-numeric values present");
            }
        }
        Ok((out, converted))
    }
}

/// Coerces `df` with the default allow-list.
pub fn normalize_dtypes(df: &DataFrame) -> PolarsResult<(DataFrame, Vec<String>)> {
    DtypeNormalizer::default().normalize(df)
}

fn coerce_column(column: &Column, target: NumericTarget) -> Option<Column> {
    let kind = column_kind(column);
    match (kind, target) {
        (ColumnKind::Int, NumericTarget::Integer) | (ColumnKind::Float, NumericTarget::Float) => {
            return None;
        }
        (ColumnKind::Bool, _) => return None,
        _ => {}
    }
    let mut parsed: Vec<Option<f64>> = Vec::with_capacity(column.len());
    for idx in 0..column.len() {
        let value = column.get(idx).unwrap_or(AnyValue::Null);
        if matches!(value, AnyValue::Null) || any_to_string(value.clone()).trim().is_empty() {
            parsed.push(None);
            continue;
        }
        parsed.push(Some(any_to_f64(value)?));
    }
    // Integer text with a fractional part is not an integer; keep the text.
    if target == NumericTarget::Integer
        && kind == ColumnKind::Text
        && parsed.iter().flatten().any(|v| v.fract() != 0.0)
    {
        return None;
    }
    let name = column.name().clone();
    let series = match target {
        NumericTarget::Integer => {
            let values: Vec<Option<i64>> = parsed
                .into_iter()
                .map(|v| v.map(|v| v.trunc() as i64))
                .collect();
            Series::new(name, values)
        }
        NumericTarget::Float => Series::new(name, parsed),
    };
    Some(series.into_column())
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::DataType;

    #[test]
    fn strips_one_known_suffix() {
        let normalizer = DtypeNormalizer::default();
        assert_eq!(normalizer.base_name("ads_consumed_ads"), "ads_consumed");
        assert_eq!(normalizer.base_name("orders_raw_data"), "orders");
        assert_eq!(normalizer.base_name("orders_pro"), "orders_pro");
        assert_eq!(normalizer.target_for("ad_orders_ads"), Some(NumericTarget::Integer));
        assert_eq!(normalizer.target_for("sales_generated_ads"), Some(NumericTarget::Float));
        assert_eq!(normalizer.target_for("ctr_ads"), None);
    }

    #[test]
    fn coerces_separated_figures() {
        let df = DataFrame::new(vec![
            Series::new("ads_consumed_ads".into(), vec![Some("1,200.50"), None, Some("30")]).into(),
            Series::new(
                "ad_orders_ads".into(),
                vec![Some("1,000"), Some("12.0"), Some(" ")],
            )
            .into(),
            Series::new("campaign_ads".into(), vec!["a", "b", "c"]).into(),
        ])
        .unwrap();
        let (out, converted) = normalize_dtypes(&df).unwrap();
        assert_eq!(converted, vec!["ads_consumed_ads", "ad_orders_ads"]);

        let spend = out.column("ads_consumed_ads").unwrap();
        assert_eq!(spend.dtype(), &DataType::Float64);
        assert_eq!(spend.get(0).unwrap(), AnyValue::Float64(1200.5));
        assert_eq!(spend.get(1).unwrap(), AnyValue::Null);

        let orders = out.column("ad_orders_ads").unwrap();
        assert_eq!(orders.dtype(), &DataType::Int64);
        assert_eq!(orders.get(0).unwrap(), AnyValue::Int64(1000));
        assert_eq!(orders.get(2).unwrap(), AnyValue::Null);

        assert_eq!(out.column("campaign_ads").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn placeholder_text_leaves_column_untouched() {
        let df = DataFrame::new(vec![
            Series::new("ad_impression_ads".into(), vec!["1,000", "N/A"]).into(),
        ])
        .unwrap();
        let (out, converted) = normalize_dtypes(&df).unwrap();
        assert!(converted.is_empty());
        let column = out.column("ad_impression_ads").unwrap();
        assert_eq!(column.dtype(), &DataType::String);
        assert_eq!(column.get(1).unwrap(), AnyValue::String("N/A"));
    }

    #[test]
    fn fractional_text_stays_out_of_integer_columns() {
        let df = DataFrame::new(vec![
            Series::new("orders_tm".into(), vec!["12.7", "3"]).into(),
        ])
        .unwrap();
        let (out, converted) = normalize_dtypes(&df).unwrap();
        assert!(converted.is_empty());
        let column = out.column("orders_tm").unwrap();
        assert_eq!(column.dtype(), &DataType::String);
        assert_eq!(column.get(0).unwrap(), AnyValue::String("12.7"));
    }
}
