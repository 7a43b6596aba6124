pub mod aggregation;
pub mod alias;
pub mod error;
pub mod platform;

pub use aggregation::{AggFn, AggregationSpec};
pub use alias::AliasMapping;
pub use error::{ErrorKind, PipelineError, Result};
pub use platform::{Objective, Platform};
