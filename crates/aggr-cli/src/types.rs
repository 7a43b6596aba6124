use std::path::PathBuf;

use aggr_model::{Objective, Platform};

#[derive(Debug)]
pub struct StandardizeResult {
    pub platform: Platform,
    pub objective: Objective,
    pub rows: usize,
    pub columns: usize,
    pub tabs: Vec<TabSummary>,
    pub warnings: Vec<String>,
    /// True when gap filling appended rows to any tab.
    pub modified: bool,
    /// Restaurants matched from master data, when it was joined.
    pub master_rows: Option<usize>,
    pub output_dir: Option<PathBuf>,
    pub canonical: Option<PathBuf>,
}

#[derive(Debug)]
pub struct TabSummary {
    pub tab: String,
    pub label: String,
    pub records: usize,
    /// Rows appended by gap filling.
    pub gap_rows: usize,
    pub merged: bool,
    pub output: Option<PathBuf>,
}

#[derive(Debug)]
pub struct ReviewResult {
    pub platform: Platform,
    pub rows: usize,
    pub output: Option<PathBuf>,
}
