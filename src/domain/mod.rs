//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - raw tabular cells and rows (`Cell`, `Row`)
//! - fit inputs (`DataGroup`, `Point`, `Target`, `AnalysisConfig`)
//! - fit outputs (`FitResult`, `RankedReport`, `Summary`)

pub mod types;

pub use types::*;
