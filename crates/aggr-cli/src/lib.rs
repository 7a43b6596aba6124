//! Library side of the `aggr` binary: logging setup and output writing.

pub mod logging;
pub mod output;
