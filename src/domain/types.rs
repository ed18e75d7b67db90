//! Shared domain types.
//!
//! These types are intentionally kept lightweight so they can be:
//!
//! - passed between the reader, fitter and ranker without conversion
//! - exported to JSON/CSV
//! - rendered by any front-end (CLI or TUI)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::ModelKind;

/// Minimum number of valid `(x, y)` pairs a group needs before fitting.
pub const MIN_GROUP_POINTS: usize = 4;

/// Default evaluation budget per model fit.
pub const DEFAULT_MAX_EVALS: usize = 10_000;

/// One cell of a tabular input row.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Interpret a raw text cell.
    ///
    /// Blank strings and the usual missing-value markers map to `Empty`;
    /// anything that parses as `f64` maps to `Number`.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim().trim_start_matches('\u{feff}').trim();
        if trimmed.is_empty() || is_missing_marker(trimmed) {
            return Cell::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(v) => Cell::Number(v),
            Err(_) => Cell::Text(trimmed.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// The cell as a finite float, if it holds one.
    pub fn as_f64(&self) -> Option<f64> {
        let v = match self {
            Cell::Number(v) => *v,
            Cell::Text(s) => s.parse::<f64>().ok()?,
            Cell::Empty => return None,
        };
        if v.is_finite() { Some(v) } else { None }
    }
}

fn is_missing_marker(s: &str) -> bool {
    const MARKERS: [&str; 5] = ["nan", "na", "n/a", "null", "none"];
    MARKERS.iter().any(|m| s.eq_ignore_ascii_case(m))
}

/// A raw row of cells, in file order. Rows may be ragged.
pub type Row = Vec<Cell>;

/// An observation used for fitting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A contiguous block of rows from one source file, reduced to valid points.
#[derive(Debug, Clone)]
pub struct DataGroup {
    /// 0-based position of the group inside its file.
    pub index: usize,
    pub points: Vec<Point>,
}

impl DataGroup {
    /// Build a group from raw rows, keeping only rows whose first two cells
    /// are both finite numbers.
    pub fn from_rows(index: usize, rows: &[Row]) -> Self {
        let points = rows
            .iter()
            .filter_map(|row| {
                let x = row.first()?.as_f64()?;
                let y = row.get(1)?.as_f64()?;
                Some(Point { x, y })
            })
            .collect();
        Self { index, points }
    }

    pub fn xs(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x).collect()
    }

    pub fn ys(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }
}

/// User-supplied target coordinate used to score every model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub x: f64,
    pub y: f64,
}

impl Target {
    /// Parse two free-form numeric entries.
    pub fn parse(x: &str, y: &str) -> Result<Self, AppError> {
        Ok(Self {
            x: parse_coordinate("X", x)?,
            y: parse_coordinate("Y", y)?,
        })
    }
}

fn parse_coordinate(label: &str, raw: &str) -> Result<f64, AppError> {
    let trimmed = raw.trim();
    let v = trimmed.parse::<f64>().map_err(|_| {
        AppError::new(
            2,
            format!("Invalid target {label} '{trimmed}': enter a valid number."),
        )
    })?;
    if !v.is_finite() {
        return Err(AppError::new(
            2,
            format!("Invalid target {label} '{trimmed}': value must be finite."),
        ));
    }
    Ok(v)
}

/// The best model for one data group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitResult {
    pub source: PathBuf,
    /// 0-based group index within `source`.
    pub group: usize,
    pub model: ModelKind,
    pub params: Vec<f64>,
    /// `|f(target.x) - target.y|` for the winning model.
    pub distance: f64,
    pub n_points: usize,
    /// Observations the model was fitted on (kept for charting).
    #[serde(skip)]
    pub points: Vec<Point>,
}

impl FitResult {
    /// File name without directories, as shown in tables.
    pub fn source_name(&self) -> String {
        display_name(&self.source)
    }

    pub fn equation(&self) -> String {
        self.model.format_equation(&self.params)
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.model.eval(x, &self.params)
    }
}

/// Base name of a path, falling back to the full display form.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Aggregates over a non-empty ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub best_source: PathBuf,
    pub worst_source: PathBuf,
    pub mean_distance: f64,
    pub modal_model: ModelKind,
    pub n_results: usize,
}

/// All fit results sorted by distance, plus their aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedReport {
    pub target: Target,
    pub entries: Vec<FitResult>,
    pub summary: Summary,
}

/// A file that could not be read or parsed.
#[derive(Debug, Clone)]
pub struct FileIssue {
    pub path: PathBuf,
    pub message: String,
}

/// Knobs for a single analysis run.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Groups with fewer valid points are skipped.
    pub min_points: usize,
    /// Evaluation budget for each model fit.
    pub max_evals: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_points: MIN_GROUP_POINTS,
            max_evals: DEFAULT_MAX_EVALS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_parse_recognizes_missing_markers() {
        assert_eq!(Cell::parse(""), Cell::Empty);
        assert_eq!(Cell::parse("  "), Cell::Empty);
        assert_eq!(Cell::parse("NaN"), Cell::Empty);
        assert_eq!(Cell::parse("n/a"), Cell::Empty);
        assert_eq!(Cell::parse("1.5"), Cell::Number(1.5));
        assert_eq!(Cell::parse("abc"), Cell::Text("abc".to_string()));
    }

    #[test]
    fn group_drops_rows_pairwise() {
        let rows = vec![
            vec![Cell::Number(1.0), Cell::Number(2.0)],
            vec![Cell::Number(2.0), Cell::Empty],
            vec![Cell::Text("x".into()), Cell::Number(3.0)],
            vec![Cell::Number(3.0)],
            vec![Cell::Text("4".into()), Cell::Number(8.0), Cell::Text("note".into())],
        ];
        let group = DataGroup::from_rows(0, &rows);
        assert_eq!(group.points, vec![Point { x: 1.0, y: 2.0 }, Point { x: 4.0, y: 8.0 }]);
    }

    #[test]
    fn target_parse_rejects_garbage() {
        let t = Target::parse(" 3 ", "-1e2").unwrap();
        assert_eq!(t, Target { x: 3.0, y: -100.0 });

        let err = Target::parse("abc", "1").unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(Target::parse("1", "inf").is_err());
        assert!(Target::parse("", "1").is_err());
    }
}
