//! `fitrank` library crate.
//!
//! The binary (`fitrank`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the CLI and the TUI share one analysis pipeline
//! - code stays easy to navigate as the project grows

pub mod advisor;
pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
pub mod tui;
