use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("failed to read alias mapping {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write alias mapping {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid alias mapping {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, MappingError>;
