//! Workbook ingestion for aggregator exports.
//!
//! A workbook is an ordered set of named sheets of untyped cells. It is read
//! either from an Excel file or from a directory holding one CSV per sheet.

pub mod discovery;
pub mod error;
pub mod excel;
pub mod reader;
pub mod sheet;
pub mod workbook;

pub use discovery::list_csv_files;
pub use error::{IngestError, Result};
pub use excel::read_excel_workbook;
pub use reader::{read_csv_sheet, read_workbook};
pub use sheet::RawSheet;
pub use workbook::Workbook;
