//! Shared utilities for the aggregator reconciliation crates.
//!
//! Cell-level conversions over Polars `AnyValue` plus the row gather helpers
//! the aggregation and join stages build their output columns with.

pub mod frame;
pub mod polars;

pub use frame::{
    ColumnKind, column_kind, column_strings, gather_column, has_column, select_existing,
};
pub use polars::{
    any_to_f64, any_to_i64, any_to_string, any_to_string_non_empty, format_numeric, parse_f64,
    parse_f64_lenient, parse_i64, parse_i64_lenient,
};
