//! Command-line parsing for the fit ranker.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fitting code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::data::SampleConfig;
use crate::domain::{AnalysisConfig, DEFAULT_MAX_EVALS, MIN_GROUP_POINTS};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "fitrank",
    version,
    about = "Rank data files by how closely their best-fit curve passes a target point"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit every group of every file, print the ranking and summary.
    Rank(RankArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same analysis pipeline as `fitrank rank`, but renders the
    /// ranking, summary and a chart in a terminal UI using Ratatui.
    Tui(TuiArgs),
    /// Write a synthetic multi-group CSV to try the tool on.
    Sample(SampleArgs),
    /// Print the model catalog.
    Models,
}

/// Fitting knobs shared by `rank` and `tui`.
#[derive(Debug, Args, Clone)]
pub struct FitOptions {
    /// Evaluation budget for each model fit.
    #[arg(long, default_value_t = DEFAULT_MAX_EVALS)]
    pub max_evals: usize,

    /// Skip groups with fewer valid (x, y) pairs than this.
    #[arg(long, default_value_t = MIN_GROUP_POINTS)]
    pub min_points: usize,
}

impl FitOptions {
    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            // Fewer points than the largest model has parameters never fits anything.
            min_points: self.min_points.max(MIN_GROUP_POINTS),
            max_evals: self.max_evals.max(1),
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct RankArgs {
    /// CSV or spreadsheet files to analyse.
    #[arg(required = true, value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Target x value.
    #[arg(long, value_name = "X", allow_hyphen_values = true)]
    pub target_x: String,

    /// Target y value.
    #[arg(long, value_name = "Y", allow_hyphen_values = true)]
    pub target_y: String,

    /// Do not request advisory text.
    #[arg(long)]
    pub no_advice: bool,

    #[command(flatten)]
    pub fit: FitOptions,

    /// Export the ranking to CSV.
    #[arg(long, value_name = "PATH")]
    pub export_csv: Option<PathBuf>,

    /// Export the full report to JSON.
    #[arg(long, value_name = "PATH")]
    pub export_json: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    /// Files to preselect.
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Prefill the target x input.
    #[arg(long, value_name = "X", allow_hyphen_values = true)]
    pub target_x: Option<String>,

    /// Prefill the target y input.
    #[arg(long, value_name = "Y", allow_hyphen_values = true)]
    pub target_y: Option<String>,

    /// Do not request advisory text.
    #[arg(long)]
    pub no_advice: bool,

    #[command(flatten)]
    pub fit: FitOptions,
}

#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Output CSV path.
    #[arg(long, value_name = "PATH")]
    pub out: PathBuf,

    /// Number of groups.
    #[arg(long, default_value_t = 3)]
    pub groups: usize,

    /// Points per group.
    #[arg(long, default_value_t = 12)]
    pub points: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Standard deviation of the noise added to y.
    #[arg(long, default_value_t = 0.05)]
    pub noise: f64,

    /// Smallest x value.
    #[arg(long, default_value_t = 0.5, allow_hyphen_values = true)]
    pub x_min: f64,

    /// Largest x value.
    #[arg(long, default_value_t = 10.0, allow_hyphen_values = true)]
    pub x_max: f64,
}

impl SampleArgs {
    pub fn sample_config(&self) -> SampleConfig {
        SampleConfig {
            groups: self.groups,
            points: self.points,
            seed: self.seed,
            noise: self.noise,
            x_min: self.x_min,
            x_max: self.x_max,
        }
    }
}
