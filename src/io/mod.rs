//! Input/output helpers.
//!
//! - CSV / spreadsheet ingest into raw rows (`table`)
//! - splitting rows into data groups (`groups`)
//! - result exports (CSV/JSON) (`export`)

pub mod export;
pub mod groups;
pub mod table;

pub use export::*;
pub use groups::*;
pub use table::*;
