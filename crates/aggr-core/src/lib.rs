//! Reconciliation pipelines for food-delivery aggregator exports.
//!
//! Standardizes Zomato and Swiggy workbooks into one canonical
//! restaurant × period table, with per-tab tables completed to a uniform
//! index for manual correction.

pub mod gap;
pub mod join;
pub mod master_data;
pub mod pipeline;
pub mod platforms;
pub mod review;

pub use gap::{COMMENTS_COLUMN, GAP_COMMENT, GapFiller, GapReport, fill_gaps};
pub use join::{JoinMode, JoinOutcome, ReconciliationJoiner, coalesce_keys};
pub use master_data::{
    InMemoryMasterData, MasterDataError, MasterDataRepository, MasterJoin, RestaurantRecord,
    standardize_restaurant_master_data,
};
pub use pipeline::{
    PipelineOptions, PipelineResult, PipelineStage, run_pipeline, standardize_workbook,
};
pub use platforms::{PlatformProcessor, SwiggyProcessor, TabSpec, ZomatoProcessor, processor_for};
pub use review::{REVIEW_COLUMNS, standardize_review_file};
