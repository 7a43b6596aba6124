//! Per-tab transformations: key normalization, aggregation, dtype coercion
//! and the derived metrics computed on merged tables.

pub mod aggregate;
pub mod derived;
pub mod dtypes;
pub mod frame;
pub mod keys;

pub use aggregate::aggregate_tab;
pub use dtypes::{DtypeNormalizer, NumericTarget, normalize_dtypes};
pub use frame::{ENTITY_COLUMN, PERIOD_COLUMN, TabFrame};
pub use keys::{PeriodFormat, normalize_entity_id, parse_period};
