//! Series extraction and aggregation.
//!
//! Each submodule turns one raw table shape into a uniform series:
//!
//! - `temperature`: wide table, one labeled row -> 12 monthly points
//! - `climate`: long indicator table -> canonical `IndicatorSample`s
//! - `monthly`: indicator samples -> calendar-month averages
//! - `bloom`: point-sampled satellite table -> year-month and month averages
//! - `fallback`: literal default series substituted when a source is unusable

pub mod bloom;
pub mod climate;
pub mod fallback;
pub mod monthly;
pub mod temperature;

pub use bloom::*;
pub use climate::*;
pub use fallback::*;
pub use monthly::*;
pub use temperature::*;
