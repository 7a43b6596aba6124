//! Sequential reconciliation of per-tab tables.
//!
//! Tabs are merged one at a time onto a growing table, keyed on the
//! (entity, period) pair each merged row currently carries. Rows keep every
//! tab's suffixed key columns; [`coalesce_keys`] resolves them into one
//! `res_id` and one `period` column once all merges are done.

use std::collections::{HashMap, HashSet};
use std::fmt;

use aggr_common::{column_strings, gather_column};
use aggr_model::Objective;
use aggr_transform::{ENTITY_COLUMN, PERIOD_COLUMN, TabFrame};
use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, PolarsResult, Series};
use tracing::{debug, warn};

type RowKey = Option<(String, String)>;

/// How a supplementary tab is merged onto the table built so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinMode {
    /// Keep exactly the rows already merged.
    Left,
    /// Also keep supplementary rows whose key matched nothing.
    Outer,
}

impl JoinMode {
    pub fn for_objective(objective: Objective) -> Self {
        if objective.is_ads_optimization() {
            Self::Left
        } else {
            Self::Outer
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Outer => "outer",
        }
    }
}

impl fmt::Display for JoinMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a completed join sequence.
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    /// Merged table with coalesced `res_id` and `period` as its first columns.
    pub table: DataFrame,
    /// Tabs merged, in merge order.
    pub merged_tabs: Vec<String>,
    /// Soft failures recorded while merging.
    pub warnings: Vec<String>,
}

#[derive(Debug)]
pub struct ReconciliationJoiner {
    mode: JoinMode,
    merged: Option<DataFrame>,
    row_keys: Vec<RowKey>,
    merged_tabs: Vec<String>,
    warnings: Vec<String>,
}

impl ReconciliationJoiner {
    pub fn new(mode: JoinMode) -> Self {
        Self {
            mode,
            merged: None,
            row_keys: Vec::new(),
            merged_tabs: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn mode(&self) -> JoinMode {
        self.mode
    }

    pub fn merged_tabs(&self) -> &[String] {
        &self.merged_tabs
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn row_count(&self) -> usize {
        self.row_keys.len()
    }

    /// Records a soft failure and leaves the merged table untouched.
    pub fn skip(&mut self, warning: impl Into<String>) {
        let warning = warning.into();
        warn!(warning = %warning, "skipping tab");
        self.warnings.push(warning);
    }

    /// Merges `frame` onto the table. The first frame merged becomes the
    /// anchor population.
    ///
    /// Right-hand columns whose name is already taken get `_{tab}` appended.
    pub fn merge(&mut self, frame: &TabFrame) -> PolarsResult<()> {
        let right_keys = frame_keys(frame)?;
        let Some(left) = self.merged.take() else {
            debug!(tab = %frame.tab, rows = frame.record_count(), "anchor tab");
            self.merged = Some(frame.data.clone());
            self.row_keys = right_keys;
            self.merged_tabs.push(frame.tab.clone());
            return Ok(());
        };

        let mut index: HashMap<&(String, String), Vec<usize>> = HashMap::new();
        for (idx, key) in right_keys.iter().enumerate() {
            if let Some(key) = key {
                index.entry(key).or_default().push(idx);
            }
        }

        let mut left_rows: Vec<Option<usize>> = Vec::with_capacity(self.row_keys.len());
        let mut right_rows: Vec<Option<usize>> = Vec::with_capacity(self.row_keys.len());
        let mut keys: Vec<RowKey> = Vec::with_capacity(self.row_keys.len());
        let mut matched = vec![false; right_keys.len()];
        for (row, key) in self.row_keys.iter().enumerate() {
            match key.as_ref().and_then(|key| index.get(key)) {
                Some(hits) => {
                    for hit in hits {
                        left_rows.push(Some(row));
                        right_rows.push(Some(*hit));
                        keys.push(key.clone());
                        matched[*hit] = true;
                    }
                }
                None => {
                    left_rows.push(Some(row));
                    right_rows.push(None);
                    keys.push(key.clone());
                }
            }
        }
        let mut appended = 0usize;
        if self.mode == JoinMode::Outer {
            for (idx, key) in right_keys.iter().enumerate() {
                if !matched[idx] {
                    left_rows.push(None);
                    right_rows.push(Some(idx));
                    keys.push(key.clone());
                    appended += 1;
                }
            }
        }

        let mut columns: Vec<Column> = Vec::with_capacity(left.width() + frame.data.width());
        let mut names: HashSet<String> = HashSet::new();
        for column in left.get_columns() {
            names.insert(column.name().to_string());
            columns.push(gather_column(column, &left_rows)?);
        }
        for column in frame.data.get_columns() {
            let mut gathered = gather_column(column, &right_rows)?;
            let name = column.name().to_string();
            if names.contains(&name) {
                let renamed = format!("{name}_{}", frame.tab);
                debug!(column = %name, renamed = %renamed, "column name collision");
                gathered.rename(renamed.as_str().into());
                names.insert(renamed);
            } else {
                names.insert(name);
            }
            columns.push(gathered);
        }

        debug!(
            tab = %frame.tab,
            mode = %self.mode,
            rows = keys.len(),
            appended,
            "merged tab"
        );
        self.merged = Some(DataFrame::new(columns)?);
        self.row_keys = keys;
        self.merged_tabs.push(frame.tab.clone());
        Ok(())
    }

    pub fn finish(self) -> PolarsResult<JoinOutcome> {
        let merged = match self.merged {
            Some(df) => df,
            None => DataFrame::empty(),
        };
        Ok(JoinOutcome {
            table: coalesce_keys(&merged)?,
            merged_tabs: self.merged_tabs,
            warnings: self.warnings,
        })
    }
}

fn frame_keys(frame: &TabFrame) -> PolarsResult<Vec<RowKey>> {
    let entities = column_strings(&frame.data, &frame.entity_column())?;
    let periods = column_strings(&frame.data, &frame.period_column())?;
    Ok(entities
        .into_iter()
        .zip(periods)
        .map(|pair| match pair {
            (Some(entity), Some(period)) => Some((entity, period)),
            _ => None,
        })
        .collect())
}

fn is_key_column(name: &str, base: &str) -> bool {
    name == base || name.strip_prefix(base).is_some_and(|rest| rest.starts_with('_'))
}

/// Adds coalesced `res_id` and `period` columns in front of `df`.
///
/// Each takes, per row, the first non-empty value among the columns named
/// `res_id`/`res_id_*` (resp. `period`/`period_*`) in column order. Sources
/// that disagree are counted and logged; the first value still wins.
pub fn coalesce_keys(df: &DataFrame) -> PolarsResult<DataFrame> {
    let entity = coalesce_column(df, ENTITY_COLUMN)?;
    let period = coalesce_column(df, PERIOD_COLUMN)?;
    let mut columns = vec![entity, period];
    columns.extend(
        df.get_columns()
            .iter()
            .filter(|column| {
                let name = column.name().as_str();
                name != ENTITY_COLUMN && name != PERIOD_COLUMN
            })
            .cloned(),
    );
    DataFrame::new(columns)
}

fn coalesce_column(df: &DataFrame, base: &str) -> PolarsResult<Column> {
    let sources: Vec<Vec<Option<String>>> = df
        .get_column_names()
        .iter()
        .filter(|name| is_key_column(name.as_str(), base))
        .map(|name| column_strings(df, name.as_str()))
        .collect::<PolarsResult<_>>()?;
    let mut conflicts = 0usize;
    let values: Vec<Option<String>> = (0..df.height())
        .map(|row| {
            let mut picked: Option<&String> = None;
            for source in &sources {
                if let Some(value) = &source[row] {
                    match picked {
                        None => picked = Some(value),
                        Some(first) if first != value => conflicts += 1,
                        Some(_) => {}
                    }
                }
            }
            picked.cloned()
        })
        .collect();
    if conflicts > 0 {
        debug!(column = base, conflicts, "key sources disagree, kept first non-empty value");
    }
    Ok(Series::new(base.into(), values).into_column())
}
