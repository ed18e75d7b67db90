//! Curve fitting orchestration.
//!
//! Responsibilities:
//!
//! - fit one catalog model to one group (`fitter`)
//! - pick the model closest to the target for each group (`selection`)
//! - fit the groups of a file in parallel

pub mod fitter;
pub mod selection;

pub use fitter::*;
pub use selection::*;
