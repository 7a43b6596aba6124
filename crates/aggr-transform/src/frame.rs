//! Tab frame type.
//!
//! A [`TabFrame`] is one standardized sheet: its tab key, the suffix every
//! column carries, and the data. Each tab has exactly one entity-id column
//! (`res_id{suffix}`) and one period column (`period{suffix}`).

use polars::prelude::DataFrame;

pub const ENTITY_COLUMN: &str = "res_id";
pub const PERIOD_COLUMN: &str = "period";

#[derive(Debug, Clone)]
pub struct TabFrame {
    /// Normalized tab key (e.g. "txn_metrics", "raw_data").
    pub tab: String,
    /// Column suffix including the leading underscore (e.g. "_tm").
    pub suffix: String,
    pub data: DataFrame,
}

impl TabFrame {
    pub fn new(tab: impl Into<String>, suffix: impl Into<String>, data: DataFrame) -> Self {
        Self {
            tab: tab.into(),
            suffix: suffix.into(),
            data,
        }
    }

    pub fn entity_column(&self) -> String {
        format!("{ENTITY_COLUMN}{}", self.suffix)
    }

    pub fn period_column(&self) -> String {
        format!("{PERIOD_COLUMN}{}", self.suffix)
    }

    /// Key columns absent from the data, entity first.
    pub fn missing_keys(&self) -> Vec<String> {
        [self.entity_column(), self.period_column()]
            .into_iter()
            .filter(|name| self.data.column(name).is_err())
            .collect()
    }

    pub fn has_keys(&self) -> bool {
        self.missing_keys().is_empty()
    }

    pub fn record_count(&self) -> usize {
        self.data.height()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.data
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect()
    }
}
