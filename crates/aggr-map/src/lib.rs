#![deny(unsafe_code)]

pub mod defaults;
pub mod error;
pub mod repository;
pub mod standardize;

pub use defaults::default_aliases;
pub use error::{MappingError, Result};
pub use repository::{AliasRepository, load_alias_file};
pub use standardize::{ColumnStandardizer, normalize_label, standardize_column_names};
