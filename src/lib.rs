//! `bloomcast` library crate.
//!
//! The binary (`bloom`) is a thin wrapper around this library so that:
//!
//! - the CSV/series pipeline is testable without spawning processes
//! - the CLI and the HTTP server share one code path
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod identify;
pub mod io;
pub mod math;
pub mod report;
pub mod series;
pub mod server;
