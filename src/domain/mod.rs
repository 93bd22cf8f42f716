//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the canonical calendar-month table (`months`)
//! - uniform series points (`TimePoint`) and grouping keys (`YearMonth`)
//! - normalized samples produced from the raw tables
//! - the resolved run configuration (`PipelineConfig`)

pub mod months;
pub mod types;

pub use months::*;
pub use types::*;
