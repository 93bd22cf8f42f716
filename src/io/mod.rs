//! Input/output helpers.
//!
//! - CSV parsing into grids and header-keyed records (`table`)
//! - loading raw text from files or URLs (`source`)
//! - series/forecast exports (CSV/JSON) (`export`)

pub mod export;
pub mod source;
pub mod table;

pub use export::*;
pub use source::*;
pub use table::*;
