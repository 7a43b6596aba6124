//! Entity/period gap filling.
//!
//! Every tab should end up describing the same (entity, period) index: the
//! cross product of all entities and all periods observed in any tab. Pairs
//! a tab lacks are appended as placeholder rows carrying a comment, so a
//! reviewer can tell "reported as zero" apart from "never reported".

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::iter;

use aggr_common::{column_strings, gather_column};
use aggr_transform::TabFrame;
use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, PolarsResult, Series};
use tracing::{debug, info_span};

pub const COMMENTS_COLUMN: &str = "comments";
pub const GAP_COMMENT: &str = "Add data for this res_id and period";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GapReport {
    /// True when at least one row was appended to any tab.
    pub modified: bool,
    /// Rows appended per tab key.
    pub added: BTreeMap<String, usize>,
    pub entities: usize,
    pub periods: usize,
}

impl GapReport {
    pub fn total_added(&self) -> usize {
        self.added.values().sum()
    }
}

#[derive(Debug, Clone)]
pub struct GapFiller {
    comment: String,
}

impl Default for GapFiller {
    fn default() -> Self {
        Self {
            comment: GAP_COMMENT.to_string(),
        }
    }
}

impl GapFiller {
    pub fn with_comment(comment: impl Into<String>) -> Self {
        Self {
            comment: comment.into(),
        }
    }

    /// Completes every tab to the full entity × period index.
    ///
    /// Each tab gains a `comments` column; existing rows carry an empty
    /// comment. Missing pairs are appended in sorted order with every
    /// metric null. Tabs without both key columns are left untouched.
    pub fn fill(&self, tabs: &mut [TabFrame]) -> PolarsResult<GapReport> {
        let span = info_span!("gap_fill", tabs = tabs.len());
        let _guard = span.enter();

        let mut entities: BTreeSet<String> = BTreeSet::new();
        let mut periods: BTreeSet<String> = BTreeSet::new();
        let mut observed: Vec<Option<HashSet<(String, String)>>> = Vec::with_capacity(tabs.len());
        for tab in tabs.iter() {
            if !tab.has_keys() {
                observed.push(None);
                continue;
            }
            let ids = column_strings(&tab.data, &tab.entity_column())?;
            let dates = column_strings(&tab.data, &tab.period_column())?;
            let mut pairs = HashSet::new();
            for (id, date) in ids.into_iter().zip(dates) {
                if let Some(id) = &id {
                    entities.insert(id.clone());
                }
                if let Some(date) = &date {
                    periods.insert(date.clone());
                }
                if let (Some(id), Some(date)) = (id, date) {
                    pairs.insert((id, date));
                }
            }
            observed.push(Some(pairs));
        }

        let mut report = GapReport {
            entities: entities.len(),
            periods: periods.len(),
            ..GapReport::default()
        };
        for (tab, pairs) in tabs.iter_mut().zip(observed) {
            let Some(pairs) = pairs else {
                continue;
            };
            let missing: Vec<(&String, &String)> = entities
                .iter()
                .flat_map(|id| periods.iter().map(move |date| (id, date)))
                .filter(|(id, date)| !pairs.contains(&((*id).clone(), (*date).clone())))
                .collect();
            append_rows(tab, &missing, &self.comment)?;
            if !missing.is_empty() {
                debug!(tab = %tab.tab, added = missing.len(), "appended gap rows");
                report.modified = true;
                report.added.insert(tab.tab.clone(), missing.len());
            }
        }
        Ok(report)
    }
}

/// Runs the default [`GapFiller`].
pub fn fill_gaps(tabs: &mut [TabFrame]) -> PolarsResult<GapReport> {
    GapFiller::default().fill(tabs)
}

fn append_rows(
    tab: &mut TabFrame,
    missing: &[(&String, &String)],
    comment: &str,
) -> PolarsResult<()> {
    let height = tab.data.height();
    let entity_col = tab.entity_column();
    let period_col = tab.period_column();
    let indices: Vec<Option<usize>> = (0..height)
        .map(Some)
        .chain(iter::repeat_n(None, missing.len()))
        .collect();

    let mut columns: Vec<Column> = Vec::with_capacity(tab.data.width() + 1);
    for column in tab.data.get_columns() {
        let name = column.name().as_str();
        if name == COMMENTS_COLUMN {
            continue;
        }
        if name == entity_col || name == period_col {
            let mut values = column_strings(&tab.data, name)?;
            values.extend(missing.iter().map(|(id, date)| {
                let value = if name == entity_col { *id } else { *date };
                Some(value.clone())
            }));
            columns.push(Series::new(name.into(), values).into_column());
        } else {
            columns.push(gather_column(column, &indices)?);
        }
    }

    let mut comments: Vec<String> = match tab.data.column(COMMENTS_COLUMN) {
        Ok(_) => column_strings(&tab.data, COMMENTS_COLUMN)?
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect(),
        Err(_) => vec![String::new(); height],
    };
    comments.extend(iter::repeat_n(comment.to_string(), missing.len()));
    columns.push(Series::new(COMMENTS_COLUMN.into(), comments).into_column());

    tab.data = DataFrame::new(columns)?;
    Ok(())
}
