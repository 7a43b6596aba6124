//! Output writing for standardization and review runs.
//!
//! A standardization run writes the canonical table plus one CSV per
//! gap-filled tab (the rows a user fills in by hand). A review run writes a
//! single CSV.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use aggr_core::PipelineResult;
use anyhow::{Context, Result};
use polars::prelude::{CsvWriter, DataFrame, SerWriter};
use tracing::{debug, info};

pub const CANONICAL_FILE: &str = "canonical.csv";
pub const TABS_DIR: &str = "tabs";
pub const REVIEWS_FILE: &str = "reviews.csv";

/// Files written by a standardization run.
#[derive(Debug, Clone, Default)]
pub struct WrittenOutputs {
    pub canonical: PathBuf,
    /// Per-tab CSVs keyed by tab.
    pub tabs: BTreeMap<String, PathBuf>,
}

/// `output` inside a workbook folder, or next to a workbook file.
pub fn default_output_dir(workbook: &Path) -> PathBuf {
    if workbook.is_dir() {
        return workbook.join("output");
    }
    workbook
        .parent()
        .map_or_else(|| PathBuf::from("output"), |parent| parent.join("output"))
}

pub fn write_csv(df: &DataFrame, path: &Path) -> Result<()> {
    let mut df = df.clone();
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    CsvWriter::new(file)
        .include_header(true)
        .finish(&mut df)
        .with_context(|| format!("write {}", path.display()))?;
    debug!(path = %path.display(), rows = df.height(), "wrote csv");
    Ok(())
}

/// Writes `table` as the canonical CSV and every per-tab frame of `result`.
///
/// `table` is passed separately because master data may have been joined
/// onto the pipeline's table.
pub fn write_standardize_outputs(
    result: &PipelineResult,
    table: &DataFrame,
    dir: &Path,
) -> Result<WrittenOutputs> {
    let tabs_dir = dir.join(TABS_DIR);
    fs::create_dir_all(&tabs_dir).with_context(|| format!("create {}", tabs_dir.display()))?;

    let canonical = dir.join(CANONICAL_FILE);
    write_csv(table, &canonical)?;

    let mut tabs = BTreeMap::new();
    for (tab, frame) in &result.tabs {
        let path = tabs_dir.join(format!("{tab}.csv"));
        write_csv(&frame.data, &path)?;
        tabs.insert(tab.clone(), path);
    }
    info!(
        output_dir = %dir.display(),
        tabs = tabs.len(),
        "wrote standardization outputs"
    );
    Ok(WrittenOutputs { canonical, tabs })
}

pub fn write_review_output(table: &DataFrame, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let path = dir.join(REVIEWS_FILE);
    write_csv(table, &path)?;
    Ok(path)
}
