//! Row gather helpers.
//!
//! Aggregation, joins and gap filling rebuild frames row by row. These
//! helpers copy cells out of a source column by index while keeping the
//! column's broad type, so integer metrics stay integers through a join.

use polars::prelude::{
    AnyValue, Column, DataFrame, DataType, IntoColumn, NamedFrom, PolarsResult, Series,
};

use crate::polars::{any_to_f64, any_to_i64, any_to_string};

/// Broad storage class of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Int,
    Float,
    Bool,
    Text,
}

pub fn column_kind(column: &Column) -> ColumnKind {
    let dtype = column.dtype();
    if dtype.is_integer() {
        ColumnKind::Int
    } else if dtype.is_float() {
        ColumnKind::Float
    } else if matches!(dtype, DataType::Boolean) {
        ColumnKind::Bool
    } else {
        ColumnKind::Text
    }
}

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.column(name).is_ok()
}

/// Builds a column holding `source[idx]` for each `Some(idx)` and null for
/// each `None`.
pub fn gather_column(source: &Column, indices: &[Option<usize>]) -> PolarsResult<Column> {
    let name = source.name().clone();
    let series = match column_kind(source) {
        ColumnKind::Int => {
            let mut values: Vec<Option<i64>> = Vec::with_capacity(indices.len());
            for idx in indices {
                values.push(match idx {
                    Some(idx) => any_to_i64(source.get(*idx)?),
                    None => None,
                });
            }
            Series::new(name, values)
        }
        ColumnKind::Float => {
            let mut values: Vec<Option<f64>> = Vec::with_capacity(indices.len());
            for idx in indices {
                values.push(match idx {
                    Some(idx) => any_to_f64(source.get(*idx)?),
                    None => None,
                });
            }
            Series::new(name, values)
        }
        ColumnKind::Bool => {
            let mut values: Vec<Option<bool>> = Vec::with_capacity(indices.len());
            for idx in indices {
                values.push(match idx {
                    Some(idx) => match source.get(*idx)? {
                        AnyValue::Boolean(b) => Some(b),
                        _ => None,
                    },
                    None => None,
                });
            }
            Series::new(name, values)
        }
        ColumnKind::Text => {
            let mut values: Vec<Option<String>> = Vec::with_capacity(indices.len());
            for idx in indices {
                values.push(match idx {
                    Some(idx) => match source.get(*idx)? {
                        AnyValue::Null => None,
                        value => Some(any_to_string(value)),
                    },
                    None => None,
                });
            }
            Series::new(name, values)
        }
    };
    Ok(series.into_column())
}

/// Reads a column as trimmed strings, `None` for null or blank cells.
pub fn column_strings(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    let column = df.column(name)?;
    let mut values = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let value = any_to_string(column.get(idx).unwrap_or(AnyValue::Null));
        let trimmed = value.trim();
        values.push(if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        });
    }
    Ok(values)
}

/// Projects `df` onto the listed columns that exist, in list order.
pub fn select_existing<S: AsRef<str>>(df: &DataFrame, names: &[S]) -> PolarsResult<DataFrame> {
    let mut columns = Vec::new();
    for name in names {
        if let Ok(column) = df.column(name.as_ref()) {
            columns.push(column.clone());
        }
    }
    DataFrame::new(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        DataFrame::new(vec![
            Series::new("res_id".into(), vec!["1", "2", "3"]).into(),
            Series::new("orders".into(), vec![Some(10i64), None, Some(30)]).into(),
            Series::new("aov".into(), vec![1.5f64, 2.5, 3.5]).into(),
        ])
        .unwrap()
    }

    #[test]
    fn gather_keeps_integer_type_and_inserts_nulls() {
        let df = frame();
        let gathered = gather_column(df.column("orders").unwrap(), &[Some(2), None, Some(0)])
            .expect("gather");
        assert_eq!(gathered.dtype(), &DataType::Int64);
        assert_eq!(gathered.get(0).unwrap(), AnyValue::Int64(30));
        assert_eq!(gathered.get(1).unwrap(), AnyValue::Null);
        assert_eq!(gathered.get(2).unwrap(), AnyValue::Int64(10));
    }

    #[test]
    fn gather_text_column() {
        let df = frame();
        let gathered = gather_column(df.column("res_id").unwrap(), &[None, Some(1)]).unwrap();
        assert_eq!(column_kind(&gathered), ColumnKind::Text);
        assert_eq!(gathered.get(0).unwrap(), AnyValue::Null);
        assert_eq!(any_to_string(gathered.get(1).unwrap()), "2");
    }

    #[test]
    fn select_existing_skips_missing_columns() {
        let df = frame();
        let selected = select_existing(&df, &["aov", "missing", "res_id"]).unwrap();
        let names: Vec<String> = selected
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        assert_eq!(names, vec!["aov", "res_id"]);
    }

    #[test]
    fn column_strings_treats_blank_as_none() {
        let df = DataFrame::new(vec![
            Series::new("period".into(), vec![Some(" 2023-01 "), Some(""), None]).into(),
        ])
        .unwrap();
        let values = column_strings(&df, "period").unwrap();
        assert_eq!(values, vec![Some("2023-01".to_string()), None, None]);
    }
}
