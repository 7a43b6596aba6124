use std::path::Path;

use csv::ReaderBuilder;
use tracing::{debug, info_span};

use crate::discovery::list_csv_files;
use crate::error::{IngestError, Result};
use crate::excel::read_excel_workbook;
use crate::sheet::{RawSheet, normalize_cell};
use crate::workbook::Workbook;

const EXCEL_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Reads a workbook from disk.
///
/// A directory is read as one sheet per `*.csv` file, named by file stem. A
/// `.csv` file is a single-sheet workbook. Excel and OpenDocument files are
/// read sheet by sheet.
pub fn read_workbook(path: &Path) -> Result<Workbook> {
    let span = info_span!("read_workbook", path = %path.display());
    let _guard = span.enter();
    if !path.exists() {
        return Err(IngestError::NotFound {
            path: path.to_path_buf(),
        });
    }
    if path.is_dir() {
        let mut workbook = Workbook::default();
        for file in list_csv_files(path)? {
            workbook.push(read_csv_sheet(&file)?);
        }
        debug!(sheets = workbook.len(), "read csv sheet folder");
        return Ok(workbook);
    }
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if extension == "csv" {
        return Ok(Workbook::new(vec![read_csv_sheet(path)?]));
    }
    if EXCEL_EXTENSIONS.contains(&extension.as_str()) {
        return read_excel_workbook(path);
    }
    Err(IngestError::UnsupportedFormat {
        path: path.to_path_buf(),
    })
}

/// Reads one CSV file as a sheet named after the file stem.
pub fn read_csv_sheet(path: &Path) -> Result<RawSheet> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|source| IngestError::CsvParse {
            path: path.to_path_buf(),
            source,
        })?;
    let mut grid: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| IngestError::CsvParse {
            path: path.to_path_buf(),
            source,
        })?;
        grid.push(record.iter().map(normalize_cell).collect());
    }
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default();
    let sheet = RawSheet::from_grid(name, grid);
    debug!(
        sheet = %sheet.name,
        columns = sheet.width(),
        rows = sheet.height(),
        "read csv sheet"
    );
    Ok(sheet)
}
