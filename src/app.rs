//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - installs logging
//! - runs the analysis pipeline
//! - prints the ranking and summary
//! - writes optional exports

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::advisor::{Advisor, ChatAdvisor};
use crate::cli::{Command, RankArgs, SampleArgs, TuiArgs};
use crate::domain::Target;
use crate::error::AppError;
use crate::report::{
    NO_RESULTS_SUMMARY, NO_RESULTS_TABLE, format_catalog, format_file_issues, format_ranked_table,
    format_summary,
};

pub mod pipeline;

/// Entry point for the `fitrank` binary.
pub fn run() -> Result<(), AppError> {
    // We want `fitrank` and `fitrank a.csv b.csv` to behave like `fitrank tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Rank(args) => {
            init_logging(true);
            handle_rank(args)
        }
        Command::Tui(args) => {
            init_logging(false);
            handle_tui(args)
        }
        Command::Sample(args) => {
            init_logging(true);
            handle_sample(args)
        }
        Command::Models => {
            print!("{}", format_catalog());
            Ok(())
        }
    }
}

/// Log to stderr, filtered by `RUST_LOG`.
///
/// The TUI owns the terminal, so it only gets a subscriber when `RUST_LOG`
/// is set explicitly.
fn init_logging(default_on: bool) {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) if default_on => EnvFilter::new("warn"),
        Err(_) => return,
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_rank(args: RankArgs) -> Result<(), AppError> {
    let target = Target::parse(&args.target_x, &args.target_y)?;
    let config = args.fit.analysis_config();

    let chat = if args.no_advice {
        None
    } else {
        Some(ChatAdvisor::from_env()?)
    };
    let advisor = chat.as_ref().map(|a| a as &dyn Advisor);

    let out = pipeline::run_analysis(&args.files, target, &config, advisor);

    let issues = format_file_issues(&out.issues);
    if !issues.is_empty() {
        eprint!("{issues}");
    }

    let Some(report) = out.report else {
        println!("{NO_RESULTS_TABLE}");
        println!();
        println!("{NO_RESULTS_SUMMARY}");
        return Err(AppError::new(3, "No data group produced a fit."));
    };

    println!("{}", format_ranked_table(&report));
    print!("{}", format_summary(&report, out.advisory.as_deref()));

    if let Some(path) = &args.export_csv {
        crate::io::write_ranking_csv(path, &report)?;
    }
    if let Some(path) = &args.export_json {
        crate::io::write_report_json(path, &report)?;
    }

    Ok(())
}

fn handle_tui(args: TuiArgs) -> Result<(), AppError> {
    crate::tui::run(args)
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let sample = crate::data::write_sample_csv(&args.out, &args.sample_config())?;
    println!(
        "Wrote {} group(s) to {}",
        sample.groups.len(),
        args.out.display()
    );
    for (i, group) in sample.groups.iter().enumerate() {
        println!(
            "  group {}: {} ({} points)",
            i + 1,
            group.model.format_equation(&group.params),
            group.points.len()
        );
    }
    Ok(())
}

/// Rewrite argv so `fitrank` defaults to `fitrank tui`.
///
/// Rules:
/// - `fitrank`                      -> `fitrank tui`
/// - `fitrank a.csv b.csv`          -> `fitrank tui a.csv b.csv`
/// - `fitrank --target-x 1 ...`     -> `fitrank tui --target-x 1 ...`
/// - `fitrank --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "rank" | "tui" | "sample" | "models");
    if is_subcommand {
        return argv;
    }

    // Anything else is a file or a tui flag.
    argv.insert(1, "tui".to_string());
    argv
}
