//! Per-tab aggregation.
//!
//! Collapses a standardized tab to one row per (entity, period) pair. Each
//! metric named in the effective aggregation spec is reduced with its
//! declared function; metrics without a declared function are dropped.

use std::collections::BTreeMap;
use std::time::Instant;

use aggr_common::{
    ColumnKind, any_to_f64, any_to_i64, any_to_string, column_kind, column_strings, gather_column,
    parse_i64_lenient,
};
use aggr_model::{AggFn, AggregationSpec, PipelineError};
use polars::prelude::{AnyValue, Column, DataFrame, IntoColumn, NamedFrom, PolarsResult, Series};
use tracing::{debug, info_span};

use crate::frame::TabFrame;

type GroupKey = (String, String);

/// Aggregates `frame` by its entity and period columns.
///
/// Missing key columns are a hard column-missing error. Spec entries for
/// columns the tab does not carry are ignored. Rows with a blank key are
/// dropped. Output rows are ordered by key.
pub fn aggregate_tab(frame: &TabFrame, spec: &AggregationSpec) -> Result<TabFrame, PipelineError> {
    let span = info_span!("aggregate", tab = %frame.tab);
    let _guard = span.enter();
    let start = Instant::now();

    let missing = frame.missing_keys();
    if !missing.is_empty() {
        return Err(PipelineError::column_missing(missing));
    }
    let entity_col = frame.entity_column();
    let period_col = frame.period_column();

    let groups = group_rows(&frame.data, &entity_col, &period_col)?;
    let columns = frame.column_names();
    let effective = spec.effective(&columns);

    let mut out: Vec<Column> = Vec::with_capacity(effective.len() + 2);
    let (entities, periods): (Vec<String>, Vec<String>) = groups.keys().cloned().unzip();
    out.push(Series::new(entity_col.as_str().into(), entities).into_column());
    out.push(Series::new(period_col.as_str().into(), periods).into_column());

    let members: Vec<&Vec<usize>> = groups.values().collect();
    for (name, agg) in effective.iter() {
        if name == entity_col || name == period_col {
            continue;
        }
        let source = frame.data.column(name)?;
        let column = match agg {
            AggFn::Sum => sum_column(source, &members)?,
            AggFn::Mean => mean_column(source, &members)?,
            AggFn::First => first_column(source, &members)?,
        };
        out.push(column);
    }

    let data = DataFrame::new(out)?;
    debug!(
        input_rows = frame.data.height(),
        output_rows = data.height(),
        metrics = effective.len(),
        duration_ms = start.elapsed().as_millis(),
        "aggregated tab"
    );
    Ok(TabFrame::new(frame.tab.clone(), frame.suffix.clone(), data))
}

fn group_rows(
    df: &DataFrame,
    entity_col: &str,
    period_col: &str,
) -> PolarsResult<BTreeMap<GroupKey, Vec<usize>>> {
    let entities = column_strings(df, entity_col)?;
    let periods = column_strings(df, period_col)?;
    let mut groups: BTreeMap<GroupKey, Vec<usize>> = BTreeMap::new();
    let mut dropped = 0usize;
    for (idx, (entity, period)) in entities.into_iter().zip(periods).enumerate() {
        match (entity, period) {
            (Some(entity), Some(period)) => groups.entry((entity, period)).or_default().push(idx),
            _ => dropped += 1,
        }
    }
    if dropped > 0 {
        debug!(dropped, "rows without entity or period skipped");
    }
    Ok(groups)
}

fn cell(source: &Column, idx: usize) -> AnyValue<'_> {
    source.get(idx).unwrap_or(AnyValue::Null)
}

/// Sums each group. Integer columns, and text columns whose every value is
/// an integer, stay integral; everything else sums as floats. A group with
/// no numeric value sums to null.
fn sum_column(source: &Column, members: &[&Vec<usize>]) -> PolarsResult<Column> {
    let name = source.name().clone();
    if sums_as_integer(source) {
        let values: Vec<Option<i64>> = members
            .iter()
            .map(|rows| {
                let mut total: Option<i64> = None;
                for idx in rows.iter() {
                    if let Some(value) = integer_cell(source, *idx) {
                        total = Some(total.unwrap_or(0).saturating_add(value));
                    }
                }
                total
            })
            .collect();
        return Ok(Series::new(name, values).into_column());
    }
    let values: Vec<Option<f64>> = members
        .iter()
        .map(|rows| {
            let mut total: Option<f64> = None;
            for idx in rows.iter() {
                if let Some(value) = any_to_f64(cell(source, *idx)) {
                    total = Some(total.unwrap_or(0.0) + value);
                }
            }
            total
        })
        .collect();
    Ok(Series::new(name, values).into_column())
}

fn integer_cell(source: &Column, idx: usize) -> Option<i64> {
    match cell(source, idx) {
        AnyValue::Null => None,
        value if column_kind(source) == ColumnKind::Int => any_to_i64(value),
        value => parse_i64_lenient(&any_to_string(value)),
    }
}

fn sums_as_integer(source: &Column) -> bool {
    match column_kind(source) {
        ColumnKind::Int => true,
        ColumnKind::Float | ColumnKind::Bool => false,
        ColumnKind::Text => {
            let mut seen = false;
            for idx in 0..source.len() {
                let text = any_to_string(cell(source, idx));
                if text.trim().is_empty() {
                    continue;
                }
                if parse_i64_lenient(&text).is_none() {
                    return false;
                }
                seen = true;
            }
            seen
        }
    }
}

fn mean_column(source: &Column, members: &[&Vec<usize>]) -> PolarsResult<Column> {
    let values: Vec<Option<f64>> = members
        .iter()
        .map(|rows| {
            let parsed: Vec<f64> = rows
                .iter()
                .filter_map(|idx| any_to_f64(cell(source, *idx)))
                .collect();
            if parsed.is_empty() {
                None
            } else {
                Some(parsed.iter().sum::<f64>() / parsed.len() as f64)
            }
        })
        .collect();
    Ok(Series::new(source.name().clone(), values).into_column())
}

/// First non-blank value per group, keeping the source column type.
fn first_column(source: &Column, members: &[&Vec<usize>]) -> PolarsResult<Column> {
    let picks: Vec<Option<usize>> = members
        .iter()
        .map(|rows| {
            rows.iter().copied().find(|idx| {
                let value = cell(source, *idx);
                !matches!(value, AnyValue::Null) && !any_to_string(value).trim().is_empty()
            })
        })
        .collect();
    gather_column(source, &picks)
}
