//! Excel and OpenDocument workbook reading.

use std::path::Path;

use aggr_common::format_numeric;
use calamine::{Data, Reader, Sheets, open_workbook_auto};
use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::sheet::RawSheet;
use crate::workbook::Workbook;

/// Reads every worksheet of an Excel-family file.
pub fn read_excel_workbook(path: &Path) -> Result<Workbook> {
    let mut workbook: Sheets<_> = open_workbook_auto(path).map_err(|e| IngestError::Excel {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();

    let mut sheets = Vec::with_capacity(sheet_names.len());
    for sheet_name in &sheet_names {
        let range = workbook
            .worksheet_range(sheet_name)
            .map_err(|e| IngestError::Excel {
                path: path.to_path_buf(),
                message: format!("sheet '{sheet_name}': {e}"),
            })?;
        // Ranges may start past A1; pad so column positions survive.
        let (_, start_col) = range.start().unwrap_or((0, 0));
        let mut grid: Vec<Vec<String>> = Vec::new();
        for row in range.rows() {
            let mut cells = vec![String::new(); start_col as usize];
            cells.extend(row.iter().map(cell_to_string));
            grid.push(cells);
        }
        let sheet = RawSheet::from_grid(sheet_name.clone(), grid);
        debug!(
            sheet = %sheet.name,
            columns = sheet.width(),
            rows = sheet.height(),
            "read worksheet"
        );
        sheets.push(sheet);
    }
    Ok(Workbook::new(sheets))
}

pub(crate) fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format_numeric(*n)
            }
        }
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        // Formula errors carry no value.
        Data::Error(_) => String::new(),
        Data::DateTime(dt) => excel_serial_to_string(dt.as_f64()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Renders an Excel serial date (1900 system) as `YYYY-MM-DD`, with a time
/// part only when the serial carries one.
pub(crate) fn excel_serial_to_string(serial: f64) -> String {
    let Some(epoch) = NaiveDate::from_ymd_opt(1899, 12, 30) else {
        return format_numeric(serial);
    };
    let days = serial.floor();
    let Some(date) = Duration::try_days(days as i64).and_then(|d| epoch.checked_add_signed(d))
    else {
        return format_numeric(serial);
    };
    let seconds = ((serial - days) * 86_400.0).round() as i64;
    if seconds == 0 {
        return date.format("%Y-%m-%d").to_string();
    }
    let datetime = date.and_hms_opt(0, 0, 0).map(|dt| dt + Duration::seconds(seconds));
    match datetime {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => date.format("%Y-%m-%d").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_numeric_cells() {
        assert_eq!(cell_to_string(&Data::Float(101.0)), "101");
        assert_eq!(cell_to_string(&Data::Float(12.5)), "12.5");
        assert_eq!(cell_to_string(&Data::Int(7)), "7");
        assert_eq!(cell_to_string(&Data::String("  Orders ".into())), "Orders");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }

    #[test]
    fn converts_excel_serial_dates() {
        // 44927 is 2023-01-01 in the 1900 date system.
        assert_eq!(excel_serial_to_string(44927.0), "2023-01-01");
        assert_eq!(excel_serial_to_string(44927.5), "2023-01-01 12:00:00");
    }
}
