//! Terminal reports for the CLI.
//!
//! Formatting lives here so the pipeline and HTTP code never build display
//! strings themselves.

pub mod format;

pub use format::*;
