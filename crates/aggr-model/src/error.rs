//! Error taxonomy for the reconciliation pipeline.
//!
//! Every hard failure surfaces as a single [`PipelineError`] carrying an
//! [`ErrorKind`], a human readable message and the status code callers
//! report upstream. Soft failures never become errors; they are returned as
//! warning strings alongside the result.

use std::fmt;

use polars::prelude::PolarsError;
use thiserror::Error;

pub const MISSING_TABS_PREFIX: &str = "following tabs are missing in file";
pub const MISSING_COLUMNS_PREFIX: &str = "following columns are missing in file";
pub const MULTIPLE_SHEETS_MESSAGE: &str = "Aggregator review file should have only one tab";
pub const MASTER_DATA_UNDEFINED_MESSAGE: &str = "Master data is not defined for the client";

/// Category of a hard pipeline failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A mandatory sheet is absent from the workbook.
    TabMissing,
    /// A mandatory key or output column is absent.
    ColumnMissing,
    /// More than one sheet where exactly one is expected.
    MultipleSheets,
    /// The reference master data has no rows for the client.
    MasterDataUndefined,
    /// The reference master data could not be fetched.
    MasterDataLookup,
    /// A sheet could not be read into a table.
    Ingest,
    /// A dataframe operation failed.
    Frame,
}

impl ErrorKind {
    pub fn status(self) -> u16 {
        match self {
            Self::TabMissing | Self::ColumnMissing | Self::MultipleSheets | Self::Ingest => {
                400
            }
            Self::MasterDataUndefined | Self::MasterDataLookup | Self::Frame => 500,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TabMissing => "tab_missing",
            Self::ColumnMissing => "column_missing",
            Self::MultipleSheets => "multiple_sheets",
            Self::MasterDataUndefined => "master_data_undefined",
            Self::MasterDataLookup => "master_data_lookup",
            Self::Ingest => "ingest",
            Self::Frame => "frame",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A hard failure that aborts the pipeline.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct PipelineError {
    kind: ErrorKind,
    message: String,
    status: u16,
}

impl PipelineError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: kind.status(),
        }
    }

    /// Mandatory tabs missing from the workbook, named in the given order.
    pub fn tab_missing<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(
            ErrorKind::TabMissing,
            format!("{MISSING_TABS_PREFIX}: {}", join_names(names)),
        )
    }

    /// Mandatory columns missing from a tab or from the merged table.
    pub fn column_missing<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(
            ErrorKind::ColumnMissing,
            format!("{MISSING_COLUMNS_PREFIX}: {}", join_names(names)),
        )
    }

    pub fn multiple_sheets() -> Self {
        Self::new(ErrorKind::MultipleSheets, MULTIPLE_SHEETS_MESSAGE)
    }

    pub fn master_data_undefined() -> Self {
        Self::new(ErrorKind::MasterDataUndefined, MASTER_DATA_UNDEFINED_MESSAGE)
    }

    pub fn master_data_lookup(detail: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::MasterDataLookup,
            format!("failed to fetch restaurant master data: {detail}"),
        )
    }

    /// A workbook sheet that cannot be turned into a table.
    pub fn ingest(detail: impl fmt::Display) -> Self {
        Self::new(ErrorKind::Ingest, detail.to_string())
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> u16 {
        self.status
    }
}

impl From<PolarsError> for PipelineError {
    fn from(err: PolarsError) -> Self {
        Self::new(ErrorKind::Frame, format!("dataframe operation failed: {err}"))
    }
}

fn join_names<I, S>(names: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|name| name.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_missing_lists_names_in_order() {
        let err = PipelineError::tab_missing(["txn_metrics", "funnel"]);
        assert_eq!(err.kind(), ErrorKind::TabMissing);
        assert_eq!(err.status(), 400);
        assert_eq!(
            err.to_string(),
            "following tabs are missing in file: txn_metrics, funnel"
        );
    }

    #[test]
    fn column_missing_is_bad_request() {
        let err = PipelineError::column_missing(vec!["res_id_tm".to_string()]);
        assert_eq!(err.kind(), ErrorKind::ColumnMissing);
        assert_eq!(err.status(), 400);
        assert!(err.message().ends_with("res_id_tm"));
    }

    #[test]
    fn master_data_errors_are_server_side() {
        assert_eq!(PipelineError::master_data_undefined().status(), 500);
        let err = PipelineError::master_data_lookup("connection refused");
        assert_eq!(err.kind(), ErrorKind::MasterDataLookup);
        assert_eq!(err.status(), 500);
        assert!(err.message().contains("connection refused"));
    }

    #[test]
    fn multiple_sheets_message() {
        let err = PipelineError::multiple_sheets();
        assert_eq!(err.status(), 400);
        assert_eq!(err.message(), MULTIPLE_SHEETS_MESSAGE);
    }

    #[test]
    fn unreadable_sheets_are_bad_request() {
        let err = PipelineError::ingest("duplicate column 'orders_tm'");
        assert_eq!(err.kind(), ErrorKind::Ingest);
        assert_eq!(err.status(), 400);
        assert_eq!(err.kind().to_string(), "ingest");
        assert!(err.message().contains("orders_tm"));
    }

    #[test]
    fn polars_errors_map_to_frame_kind() {
        let err: PipelineError = PolarsError::ColumnNotFound("orders_tm".into()).into();
        assert_eq!(err.kind(), ErrorKind::Frame);
        assert_eq!(err.status(), 500);
    }
}
