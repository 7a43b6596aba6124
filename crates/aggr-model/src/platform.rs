use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Aggregator platform a workbook was exported from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Zomato,
    Swiggy,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Zomato, Platform::Swiggy];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Zomato => "zomato",
            Self::Swiggy => "swiggy",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "zomato" => Ok(Self::Zomato),
            "swiggy" => Ok(Self::Swiggy),
            other => Err(format!("unsupported aggregator platform: {other}")),
        }
    }
}

/// Why the caller is standardizing a file. Selects the join semantics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// The anchor tab defines the population; supplementary tabs never add rows.
    #[default]
    AdsOptimization,
    /// Every (entity, period) pair seen in any tab survives.
    Visualization,
}

impl Objective {
    /// Maps a caller tag onto an objective. Only `ads_optimization` is
    /// special; every other tag means a full visualization run.
    pub fn from_tag(tag: &str) -> Self {
        let normalized = tag.trim().to_ascii_lowercase().replace('-', "_");
        if normalized == "ads_optimization" {
            Self::AdsOptimization
        } else {
            Self::Visualization
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::AdsOptimization => "ads_optimization",
            Self::Visualization => "visualization",
        }
    }

    pub fn is_ads_optimization(self) -> bool {
        matches!(self, Self::AdsOptimization)
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
