//! Platform-specific pipeline configuration.
//!
//! Each aggregator platform is described by a [`PlatformProcessor`]: its tab
//! catalogue in join order, how sheet names map to tab keys, which tabs are
//! mandatory per objective, the derived columns it computes, and the fixed
//! column order of its canonical table.
//!
//! | Platform | Anchor        | Supplementary tabs                                      |
//! |----------|---------------|---------------------------------------------------------|
//! | Zomato   | `txn_metrics` | funnel, grid, pro, new_user, for, ors, promo, ads       |
//! | Swiggy   | `raw_data`    | ads                                                     |

mod swiggy;
mod zomato;

pub use swiggy::SwiggyProcessor;
pub use zomato::ZomatoProcessor;

use aggr_model::{AggFn, AggregationSpec, Objective, Platform};
use aggr_transform::PeriodFormat;
use polars::prelude::{DataFrame, PolarsResult};

/// One tab a platform knows how to process.
#[derive(Debug, Clone, Copy)]
pub struct TabSpec {
    /// Normalized sheet key.
    pub key: &'static str,
    /// Column tag without the leading underscore.
    pub suffix: &'static str,
    /// Name used in diagnostics.
    pub label: &'static str,
    /// Only merged for visualization runs.
    pub visualization_only: bool,
    /// Promote the first data row to the header when it looks like one.
    pub promote_header: bool,
    pub drop_empty_columns: bool,
    /// Column labels dropped before standardization, on top of unnamed ones.
    pub junk_columns: Option<&'static [&'static str]>,
    pub normalize_dtypes: bool,
    /// Unsuffixed metric name to aggregation function, in output order.
    pub aggregation: &'static [(&'static str, AggFn)],
}

impl TabSpec {
    pub const fn new(key: &'static str, suffix: &'static str) -> Self {
        Self {
            key,
            suffix,
            label: key,
            visualization_only: false,
            promote_header: false,
            drop_empty_columns: false,
            junk_columns: None,
            normalize_dtypes: false,
            aggregation: &[],
        }
    }

    pub fn column_suffix(&self) -> String {
        format!("_{}", self.suffix)
    }

    pub fn aggregation_spec(&self) -> AggregationSpec {
        AggregationSpec::from_pairs(self.aggregation).suffixed(&self.column_suffix())
    }

    /// Whether this tab takes part in the join for `objective`.
    pub fn joins_for(&self, objective: Objective) -> bool {
        !(self.visualization_only && objective.is_ads_optimization())
    }

    pub fn missing_warning(&self) -> String {
        format!("{} data missing in the input", self.label)
    }

    pub fn missing_keys_warning(&self) -> String {
        format!("res_id or period_id missing in {} data", self.label)
    }
}

/// Platform-specific behaviour of the standardization pipeline.
pub trait PlatformProcessor: Send + Sync {
    fn platform(&self) -> Platform;

    /// Tab catalogue in join order. The anchor comes first.
    fn tabs(&self) -> &'static [TabSpec];

    fn anchor(&self) -> &'static TabSpec;

    fn period_format(&self) -> PeriodFormat;

    /// Maps a workbook sheet name onto a tab key.
    fn sheet_key(&self, sheet_name: &str) -> String;

    fn default_mandatory_tabs(&self, objective: Objective) -> &'static [&'static str];

    /// Adds the platform's derived metrics to the merged table.
    fn derive_columns(&self, table: DataFrame) -> PolarsResult<DataFrame>;

    /// Mandatory output columns absent from the merged table.
    fn missing_output_columns(&self, table: &DataFrame, ads_merged: bool) -> Vec<String>;

    /// Canonical column order of the final table.
    fn canonical_columns(&self) -> &'static [&'static str];

    fn tab(&self, key: &str) -> Option<&'static TabSpec> {
        self.tabs().iter().find(|tab| tab.key == key)
    }
}

pub fn processor_for(platform: Platform) -> &'static dyn PlatformProcessor {
    match platform {
        Platform::Zomato => &ZomatoProcessor,
        Platform::Swiggy => &SwiggyProcessor,
    }
}

/// Lower-cases, trims and joins words with `_` (`"Raw Data"` -> `raw_data`).
pub(crate) fn sheet_key(raw: &str) -> String {
    raw.to_lowercase().split_whitespace().collect::<Vec<_>>().join("_")
}

pub(crate) fn missing_columns(table: &DataFrame, required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|name| table.column(name).is_err())
        .map(|name| (*name).to_string())
        .collect()
}

/// Ads metrics every merged ads tab must provide.
pub(crate) const ADS_OUTPUT_COLUMNS: &[&str] = &[
    "sales_generated_ads",
    "ads_consumed_ads",
    "inorganic_menu_opens_ads",
    "ad_impression_ads",
    "ad_orders_ads",
];
