//! Review-file standardization.
//!
//! A review export is a single sheet of order-level ratings. It is reduced
//! to a fixed set of lower-cased text columns.

use aggr_common::column_strings;
use aggr_ingest::Workbook;
use aggr_map::standardize_column_names;
use aggr_model::{AliasMapping, ErrorKind, PipelineError, Platform};
use aggr_transform::{PeriodFormat, normalize_entity_id};
use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};
use tracing::{debug, info_span};

use crate::pipeline::ingest_error;

pub const REVIEW_COLUMNS: [&str; 5] = ["order_rating", "comments", "res_id", "order_id", "period"];
pub const REVIEW_MISSING_MESSAGE: &str = "Review data missing";

const MISSING_COMMENT: &str = "-";
const MISSING_RATING: &str = "0";

pub fn standardize_review_file(
    workbook: &Workbook,
    aliases: &AliasMapping,
    platform: Platform,
) -> Result<DataFrame, PipelineError> {
    let span = info_span!("review", platform = %platform);
    let _guard = span.enter();

    let sheet = match workbook.sheets() {
        [] => return Err(PipelineError::new(ErrorKind::TabMissing, REVIEW_MISSING_MESSAGE)),
        [sheet] => sheet,
        _ => return Err(PipelineError::multiple_sheets()),
    };

    let labels = standardize_column_names(&sheet.headers, aliases, None, "");
    let data = sheet.to_frame_with_labels(&labels).map_err(ingest_error)?;
    let missing: Vec<&str> = REVIEW_COLUMNS
        .into_iter()
        .filter(|name| data.column(name).is_err())
        .collect();
    if !missing.is_empty() {
        return Err(PipelineError::column_missing(missing));
    }

    let mut columns: Vec<Column> = Vec::with_capacity(REVIEW_COLUMNS.len());
    for name in REVIEW_COLUMNS {
        let values: Vec<Option<String>> = column_strings(&data, name)?
            .into_iter()
            .map(|value| review_value(name, value, platform))
            .collect();
        columns.push(Series::new(name.into(), values).into_column());
    }
    let out = DataFrame::new(columns)?;
    debug!(rows = out.height(), "standardized review file");
    Ok(out)
}

fn review_value(column: &str, value: Option<String>, platform: Platform) -> Option<String> {
    let value = match (column, value) {
        ("comments", None) => Some(MISSING_COMMENT.to_string()),
        ("order_rating", None) => Some(MISSING_RATING.to_string()),
        ("res_id", Some(id)) => Some(normalize_entity_id(&id)),
        ("period", Some(period)) if platform == Platform::Swiggy => {
            Some(PeriodFormat::Compact.render(&period))
        }
        (_, value) => value,
    };
    value.map(|v| v.to_lowercase())
}
