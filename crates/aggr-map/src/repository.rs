//! File-system repository for per-platform alias mappings.
//!
//! Mappings are stored as JSON objects named `{platform}.json`. A stored
//! mapping overlays the built-in defaults: it adds aliases to known
//! canonical names and may introduce new ones.

use std::fs;
use std::path::{Path, PathBuf};

use aggr_model::{AliasMapping, Platform};
use tracing::debug;

use crate::defaults::default_aliases;
use crate::error::{MappingError, Result};

#[derive(Debug, Clone)]
pub struct AliasRepository {
    base_dir: PathBuf,
}

impl AliasRepository {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn path_for(&self, platform: Platform) -> PathBuf {
        self.base_dir.join(format!("{platform}.json"))
    }

    /// Loads the stored mapping for a platform, `None` when there is none.
    pub fn load(&self, platform: Platform) -> Result<Option<AliasMapping>> {
        let path = self.path_for(platform);
        if !path.exists() {
            return Ok(None);
        }
        load_alias_file(&path).map(Some)
    }

    /// Built-in defaults with the stored mapping, if any, laid over them.
    pub fn load_effective(&self, platform: Platform) -> Result<AliasMapping> {
        let mut mapping = default_aliases(platform)?;
        if let Some(stored) = self.load(platform)? {
            debug!(
                platform = %platform,
                entries = stored.len(),
                "applying stored alias overrides"
            );
            mapping.merge(&stored);
        }
        Ok(mapping)
    }

    /// Writes a platform mapping, creating the repository directory if needed.
    pub fn save(&self, platform: Platform, mapping: &AliasMapping) -> Result<PathBuf> {
        fs::create_dir_all(&self.base_dir).map_err(|source| MappingError::Write {
            path: self.base_dir.clone(),
            source,
        })?;
        let path = self.path_for(platform);
        let json = serde_json::to_string_pretty(mapping).map_err(|source| MappingError::Parse {
            origin: path.display().to_string(),
            source,
        })?;
        fs::write(&path, json).map_err(|source| MappingError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// Reads one alias mapping JSON file.
pub fn load_alias_file(path: &Path) -> Result<AliasMapping> {
    let contents = fs::read_to_string(path).map_err(|source| MappingError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| MappingError::Parse {
        origin: path.display().to_string(),
        source,
    })
}
