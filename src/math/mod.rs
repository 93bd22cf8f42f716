//! Mathematical utilities: the least-squares trend line.

pub mod ols;

pub use ols::*;
