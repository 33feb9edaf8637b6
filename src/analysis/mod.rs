//! Result aggregation and scoring modules
//!
//! Combines the pipeline stage outputs into the final report:
//! - Timing accuracy scoring
//! - Report and summary types

pub mod result;
pub mod timing;
