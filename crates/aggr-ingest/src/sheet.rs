//! Raw sheet model.
//!
//! A [`RawSheet`] is one parsed sheet: a header row plus data rows of trimmed
//! text cells, every row padded to the header width. Empty header cells get a
//! positional `Unnamed: N` label so junk columns can be recognized and
//! dropped later.

use std::collections::HashSet;

use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};
use tracing::warn;

use crate::error::{IngestError, Result};

const UNNAMED_MARKER: &str = "unnamed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

pub(crate) fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

fn unnamed_label(idx: usize) -> String {
    format!("Unnamed: {idx}")
}

fn is_unnamed(label: &str) -> bool {
    label.to_lowercase().contains(UNNAMED_MARKER)
}

impl RawSheet {
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let headers: Vec<String> = headers
            .iter()
            .enumerate()
            .map(|(idx, raw)| {
                let header = normalize_header(raw);
                if header.is_empty() {
                    unnamed_label(idx)
                } else {
                    header
                }
            })
            .collect();
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|row| {
                let mut cells: Vec<String> = row.iter().map(|cell| normalize_cell(cell)).collect();
                cells.resize(width, String::new());
                cells
            })
            .collect();
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    /// Builds a sheet from a raw grid: the first non-blank row is the header.
    ///
    /// Blank rows are skipped. Data rows wider than the header widen it with
    /// unnamed columns rather than losing cells.
    pub fn from_grid(name: impl Into<String>, grid: Vec<Vec<String>>) -> Self {
        let mut rows = grid
            .into_iter()
            .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()));
        let Some(mut headers) = rows.next() else {
            return Self::new(name, Vec::new(), Vec::new());
        };
        let rows: Vec<Vec<String>> = rows.collect();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        if width > headers.len() {
            headers.resize(width, String::new());
        }
        Self::new(name, headers, rows)
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.rows.is_empty()
    }

    /// Promotes the first data row to the header when it carries more real
    /// labels than the current header does.
    ///
    /// Exports that open with a banner row parse with a mostly unnamed
    /// header and the true labels in the first data row. Returns whether the
    /// header was replaced.
    pub fn promote_header_row(&mut self) -> bool {
        let Some(first) = self.rows.first() else {
            return false;
        };
        let current = self.headers.iter().filter(|h| !is_unnamed(h)).count();
        let candidate = first
            .iter()
            .filter(|cell| !cell.trim().is_empty() && !is_unnamed(cell))
            .count();
        if candidate <= current {
            return false;
        }
        let promoted = self.rows.remove(0);
        self.headers = promoted
            .iter()
            .enumerate()
            .map(|(idx, raw)| {
                let header = normalize_header(raw);
                if header.is_empty() {
                    unnamed_label(idx)
                } else {
                    header
                }
            })
            .collect();
        true
    }

    /// Drops columns whose every data cell is blank. A sheet without data
    /// rows is left as is.
    pub fn drop_empty_columns(&mut self) -> Vec<String> {
        if self.rows.is_empty() {
            return Vec::new();
        }
        let keep: Vec<bool> = (0..self.width())
            .map(|idx| self.rows.iter().any(|row| !row[idx].trim().is_empty()))
            .collect();
        self.retain_columns(&keep)
    }

    /// Drops unnamed columns and columns whose label matches one of `junk`
    /// (case-insensitive).
    pub fn drop_junk_columns(&mut self, junk: &[&str]) -> Vec<String> {
        let keep: Vec<bool> = self
            .headers
            .iter()
            .map(|header| {
                !is_unnamed(header) && !junk.iter().any(|j| header.eq_ignore_ascii_case(j))
            })
            .collect();
        self.retain_columns(&keep)
    }

    fn retain_columns(&mut self, keep: &[bool]) -> Vec<String> {
        let dropped: Vec<String> = self
            .headers
            .iter()
            .zip(keep)
            .filter(|(_, keep)| !**keep)
            .map(|(header, _)| header.clone())
            .collect();
        if dropped.is_empty() {
            return dropped;
        }
        self.headers = retain_by_mask(&self.headers, keep);
        for row in &mut self.rows {
            *row = retain_by_mask(row, keep);
        }
        dropped
    }

    /// Builds an all-text frame using the sheet's own header labels.
    pub fn to_frame(&self) -> Result<DataFrame> {
        self.to_frame_with_labels(&self.headers)
    }

    /// Builds an all-text frame with `labels` as column names.
    ///
    /// Blank cells become nulls. When two labels collide only the first
    /// column is kept.
    pub fn to_frame_with_labels(&self, labels: &[String]) -> Result<DataFrame> {
        if labels.len() != self.width() {
            return Err(IngestError::DataFrame {
                message: format!(
                    "sheet {} has {} columns but {} labels were supplied",
                    self.name,
                    self.width(),
                    labels.len()
                ),
            });
        }
        let mut seen = HashSet::new();
        let mut columns: Vec<Column> = Vec::with_capacity(labels.len());
        for (idx, label) in labels.iter().enumerate() {
            if !seen.insert(label.as_str()) {
                warn!(
                    sheet = %self.name,
                    column = %label,
                    source = %self.headers[idx],
                    "duplicate column label, keeping first occurrence"
                );
                continue;
            }
            let values: Vec<Option<String>> = self
                .rows
                .iter()
                .map(|row| {
                    let cell = row[idx].trim();
                    if cell.is_empty() {
                        None
                    } else {
                        Some(cell.to_string())
                    }
                })
                .collect();
            columns.push(Series::new(label.as_str().into(), values).into_column());
        }
        Ok(DataFrame::new(columns)?)
    }
}

fn retain_by_mask(values: &[String], keep: &[bool]) -> Vec<String> {
    values
        .iter()
        .zip(keep)
        .filter(|(_, keep)| **keep)
        .map(|(value, _)| value.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|cell| (*cell).to_string()).collect())
            .collect()
    }

    #[test]
    fn from_grid_skips_blank_rows_and_pads() {
        let sheet = RawSheet::from_grid(
            "Funnel",
            grid(&[&["", ""], &["Res ID", "  Menu   Opens "], &["1"], &["2", "40", "x"]]),
        );
        assert_eq!(sheet.headers, vec!["Res ID", "Menu Opens", "Unnamed: 2"]);
        assert_eq!(sheet.rows[0], vec!["1", "", ""]);
        assert_eq!(sheet.rows[1], vec!["2", "40", "x"]);
    }

    #[test]
    fn promotes_banner_row() {
        let mut sheet = RawSheet::from_grid(
            "raw data",
            grid(&[
                &["Swiggy", "", "", ""],
                &["Res Id", "Period", "Orders", "Aov"],
                &["1", "2023-01-01", "10", "200"],
            ]),
        );
        assert!(sheet.promote_header_row());
        assert_eq!(sheet.headers, vec!["Res Id", "Period", "Orders", "Aov"]);
        assert_eq!(sheet.height(), 1);
    }

    #[test]
    fn keeps_header_when_first_row_is_data() {
        let mut sheet = RawSheet::from_grid(
            "raw data",
            grid(&[&["Res Id", "Orders"], &["1", "10"]]),
        );
        assert!(!sheet.promote_header_row());
        assert_eq!(sheet.headers, vec!["Res Id", "Orders"]);
    }

    #[test]
    fn drops_empty_and_junk_columns() {
        let mut sheet = RawSheet::from_grid(
            "raw data",
            grid(&[
                &["Res Id", "", "Swiggy", "Blank", "Orders"],
                &["1", "x", "y", "", "10"],
            ]),
        );
        let empty = sheet.drop_empty_columns();
        assert_eq!(empty, vec!["Blank"]);
        let junk = sheet.drop_junk_columns(&["swiggy"]);
        assert_eq!(junk, vec!["Unnamed: 1", "Swiggy"]);
        assert_eq!(sheet.headers, vec!["Res Id", "Orders"]);
        assert_eq!(sheet.rows[0], vec!["1", "10"]);
    }

    #[test]
    fn frame_keeps_first_duplicate_and_nulls_blanks() {
        let sheet = RawSheet::from_grid(
            "ads",
            grid(&[&["Orders", "Order", "Spend"], &["5", "6", ""]]),
        );
        let labels = vec![
            "orders_ads".to_string(),
            "orders_ads".to_string(),
            "spend_ads".to_string(),
        ];
        let df = sheet.to_frame_with_labels(&labels).expect("frame");
        assert_eq!(df.width(), 2);
        let orders = df.column("orders_ads").unwrap();
        assert_eq!(
            aggr_common::any_to_string(orders.get(0).unwrap()),
            "5".to_string()
        );
        assert_eq!(df.column("spend_ads").unwrap().null_count(), 1);
    }

    #[test]
    fn frame_rejects_label_count_mismatch() {
        let sheet = RawSheet::from_grid("ads", grid(&[&["a", "b"], &["1", "2"]]));
        assert!(sheet.to_frame_with_labels(&["a".to_string()]).is_err());
    }
}
