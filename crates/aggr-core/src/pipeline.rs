//! Platform standardization pipeline.
//!
//! One call turns a parsed workbook into a [`PipelineResult`]. Stages run
//! in a fixed order:
//!
//! 1. **Parsed** - sheets keyed by normalized tab name
//! 2. **TabsValidated** - mandatory tabs present
//! 3. **PerTabProcessed** - standardize, normalize keys, coerce, aggregate
//! 4. **Joined** - tabs merged in catalogue order
//! 5. **DerivedComputed** - platform metrics added
//! 6. **OutputValidated** - mandatory output columns present
//! 7. **GapFilled** - per-tab tables completed to the full index
//! 8. **Reordered** - canonical column order applied
//!
//! Hard failures abort with a [`PipelineError`]. Missing optional data is
//! recorded as a warning and the run continues.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Instant;

use aggr_common::select_existing;
use aggr_ingest::{IngestError, RawSheet, Workbook};
use aggr_map::ColumnStandardizer;
use aggr_model::{AliasMapping, Objective, PipelineError, Platform};
use aggr_transform::{PeriodFormat, TabFrame, aggregate_tab, normalize_dtypes};
use polars::prelude::DataFrame;
use tracing::{debug, info, info_span, warn};

use crate::gap::fill_gaps;
use crate::join::{JoinMode, ReconciliationJoiner};
use crate::platforms::{PlatformProcessor, TabSpec, processor_for};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Parsed,
    TabsValidated,
    PerTabProcessed,
    Joined,
    DerivedComputed,
    OutputValidated,
    GapFilled,
    Reordered,
}

impl PipelineStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Parsed => "parsed",
            Self::TabsValidated => "tabs_validated",
            Self::PerTabProcessed => "per_tab_processed",
            Self::Joined => "joined",
            Self::DerivedComputed => "derived_computed",
            Self::OutputValidated => "output_validated",
            Self::GapFilled => "gap_filled",
            Self::Reordered => "reordered",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    pub objective: Objective,
    /// Replaces the platform's default mandatory tab list.
    pub mandatory_tabs: Option<Vec<String>>,
}

impl PipelineOptions {
    pub fn new(objective: Objective) -> Self {
        Self {
            objective,
            mandatory_tabs: None,
        }
    }

    pub fn with_mandatory_tabs<I, S>(mut self, tabs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mandatory_tabs = Some(tabs.into_iter().map(Into::into).collect());
        self
    }

    /// Mandatory tabs for this run. The anchor tab is always included.
    pub fn mandatory_tabs_for(&self, processor: &dyn PlatformProcessor) -> Vec<String> {
        let mut tabs: Vec<String> = match &self.mandatory_tabs {
            Some(tabs) => tabs.clone(),
            None => processor
                .default_mandatory_tabs(self.objective)
                .iter()
                .map(|tab| (*tab).to_string())
                .collect(),
        };
        let anchor = processor.anchor().key;
        if !tabs.iter().any(|tab| tab == anchor) {
            tabs.insert(0, anchor.to_string());
        }
        tabs
    }
}

#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub platform: Platform,
    pub objective: Objective,
    /// Canonical merged table; `res_id` and `period` come first.
    pub table: DataFrame,
    /// Per-tab tables after gap filling, keyed by tab.
    pub tabs: BTreeMap<String, TabFrame>,
    /// Tabs merged into `table`, in merge order.
    pub merged_tabs: Vec<String>,
    /// True when gap filling appended any row.
    pub modified: bool,
    pub warnings: Vec<String>,
}

enum TabState {
    Processed(TabFrame),
    MissingKeys(Vec<String>),
    Absent,
}

pub(crate) fn ingest_error(err: IngestError) -> PipelineError {
    PipelineError::ingest(err)
}

/// Standardizes `workbook` with the built-in behaviour of `platform`.
pub fn standardize_workbook(
    workbook: &Workbook,
    aliases: &AliasMapping,
    platform: Platform,
    options: &PipelineOptions,
) -> Result<PipelineResult, PipelineError> {
    run_pipeline(processor_for(platform), workbook, aliases, options)
}

pub fn run_pipeline(
    processor: &dyn PlatformProcessor,
    workbook: &Workbook,
    aliases: &AliasMapping,
    options: &PipelineOptions,
) -> Result<PipelineResult, PipelineError> {
    let span = info_span!(
        "standardize",
        platform = %processor.platform(),
        objective = %options.objective
    );
    let _guard = span.enter();
    let start = Instant::now();

    let mut sheets: BTreeMap<String, &RawSheet> = BTreeMap::new();
    for sheet in workbook.sheets() {
        let key = processor.sheet_key(&sheet.name);
        if sheets.contains_key(&key) {
            warn!(sheet = %sheet.name, tab = %key, "duplicate tab, keeping the first sheet");
            continue;
        }
        sheets.insert(key, sheet);
    }
    debug!(stage = %PipelineStage::Parsed, sheets = workbook.len());

    let mandatory = options.mandatory_tabs_for(processor);
    let missing: Vec<&str> = mandatory
        .iter()
        .map(String::as_str)
        .filter(|tab| !sheets.contains_key(*tab))
        .collect();
    if !missing.is_empty() {
        return Err(PipelineError::tab_missing(missing));
    }
    debug!(stage = %PipelineStage::TabsValidated, mandatory = ?mandatory);

    let standardizer = ColumnStandardizer::new(aliases);
    let mut states: Vec<(&TabSpec, TabState)> = Vec::with_capacity(processor.tabs().len());
    for spec in processor.tabs() {
        let state = match sheets.get(spec.key) {
            Some(sheet) => process_tab(spec, sheet, &standardizer, processor.period_format())?,
            None => TabState::Absent,
        };
        if let TabState::MissingKeys(keys) = &state
            && mandatory.iter().any(|tab| tab == spec.key)
        {
            return Err(PipelineError::column_missing(keys));
        }
        states.push((spec, state));
    }
    debug!(stage = %PipelineStage::PerTabProcessed, tabs = states.len());

    let mut joiner = ReconciliationJoiner::new(JoinMode::for_objective(options.objective));
    for (spec, state) in &states {
        if !spec.joins_for(options.objective) {
            if let TabState::MissingKeys(_) = state {
                joiner.skip(spec.missing_keys_warning());
            }
            continue;
        }
        match state {
            TabState::Processed(frame) => joiner.merge(frame)?,
            TabState::MissingKeys(_) => joiner.skip(spec.missing_keys_warning()),
            TabState::Absent => joiner.skip(spec.missing_warning()),
        }
    }
    let joined = joiner.finish()?;
    debug!(
        stage = %PipelineStage::Joined,
        rows = joined.table.height(),
        merged = ?joined.merged_tabs
    );

    let table = processor.derive_columns(joined.table)?;
    debug!(stage = %PipelineStage::DerivedComputed, columns = table.width());

    let ads_merged = joined.merged_tabs.iter().any(|tab| tab == "ads");
    let missing = processor.missing_output_columns(&table, ads_merged);
    if !missing.is_empty() {
        return Err(PipelineError::column_missing(missing));
    }
    debug!(stage = %PipelineStage::OutputValidated);

    let mut frames: Vec<TabFrame> = states
        .into_iter()
        .filter_map(|(_, state)| match state {
            TabState::Processed(frame) => Some(frame),
            TabState::MissingKeys(_) | TabState::Absent => None,
        })
        .collect();
    let report = fill_gaps(&mut frames)?;
    debug!(
        stage = %PipelineStage::GapFilled,
        modified = report.modified,
        added = report.total_added()
    );

    let table = select_existing(&table, processor.canonical_columns())?;
    debug!(stage = %PipelineStage::Reordered, columns = table.width());

    info!(
        rows = table.height(),
        columns = table.width(),
        warnings = joined.warnings.len(),
        modified = report.modified,
        duration_ms = start.elapsed().as_millis(),
        "standardization complete"
    );
    Ok(PipelineResult {
        platform: processor.platform(),
        objective: options.objective,
        table,
        tabs: frames
            .into_iter()
            .map(|frame| (frame.tab.clone(), frame))
            .collect(),
        merged_tabs: joined.merged_tabs,
        modified: report.modified,
        warnings: joined.warnings,
    })
}

fn process_tab(
    spec: &TabSpec,
    sheet: &RawSheet,
    standardizer: &ColumnStandardizer,
    period_format: PeriodFormat,
) -> Result<TabState, PipelineError> {
    let span = info_span!("tab", tab = spec.key, sheet = %sheet.name);
    let _guard = span.enter();

    let mut sheet = sheet.clone();
    if spec.promote_header && sheet.promote_header_row() {
        debug!("promoted first data row to header");
    }
    if spec.drop_empty_columns {
        let dropped = sheet.drop_empty_columns();
        if !dropped.is_empty() {
            debug!(dropped = ?dropped, "dropped empty columns");
        }
    }
    if let Some(junk) = spec.junk_columns {
        let dropped = sheet.drop_junk_columns(junk);
        if !dropped.is_empty() {
            debug!(dropped = ?dropped, "dropped junk columns");
        }
    }

    let labels = standardizer.standardize(&sheet.headers, Some(spec.key), &spec.column_suffix());
    let data = sheet.to_frame_with_labels(&labels).map_err(ingest_error)?;
    let mut frame = TabFrame::new(spec.key, spec.column_suffix(), data);
    let missing = frame.missing_keys();
    if !missing.is_empty() {
        debug!(missing = ?missing, "key columns missing");
        return Ok(TabState::MissingKeys(missing));
    }

    frame.normalize_keys(period_format)?;
    if spec.normalize_dtypes {
        let (data, converted) = normalize_dtypes(&frame.data)?;
        frame.data = data;
        debug!(converted = ?converted, "coerced numeric columns");
    }
    let aggregated = aggregate_tab(&frame, &spec.aggregation_spec())?;
    Ok(TabState::Processed(aggregated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aggr_model::ErrorKind;

    #[test]
    fn unreadable_sheets_surface_as_ingest_errors() {
        let err = ingest_error(IngestError::DataFrame {
            message: "sheet Pro has 3 columns but 2 labels were supplied".to_string(),
        });
        assert_eq!(err.kind(), ErrorKind::Ingest);
        assert_eq!(err.status(), 400);
        assert!(err.message().contains("sheet Pro"));
    }

    #[test]
    fn anchor_is_always_mandatory() {
        let processor = processor_for(Platform::Zomato);
        let options = PipelineOptions::new(Objective::Visualization).with_mandatory_tabs(["ads"]);
        assert_eq!(options.mandatory_tabs_for(processor), vec!["txn_metrics", "ads"]);

        let defaults = PipelineOptions::default();
        assert_eq!(
            defaults.mandatory_tabs_for(processor),
            vec!["txn_metrics", "funnel", "ads"]
        );
    }

    #[test]
    fn stage_names() {
        assert_eq!(PipelineStage::OutputValidated.to_string(), "output_validated");
    }
}
