//! Export ranked results to CSV or JSON.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;

use crate::domain::RankedReport;
use crate::error::AppError;

#[derive(Debug, Serialize)]
struct RankingRow<'a> {
    rank: usize,
    file: String,
    /// 1-based, in file order.
    group: usize,
    model: &'a str,
    distance: f64,
    equation: String,
    /// Fitted parameters joined with `;`.
    params: String,
}

/// Write one CSV row per ranked entry.
pub fn write_ranking_csv(path: &Path, report: &RankedReport) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    for (i, entry) in report.entries.iter().enumerate() {
        let params: Vec<String> = entry.params.iter().map(|p| format!("{p}")).collect();
        writer
            .serialize(RankingRow {
                rank: i + 1,
                file: entry.source_name(),
                group: entry.group + 1,
                model: entry.model.display_name(),
                distance: entry.distance,
                equation: entry.equation(),
                params: params.join(";"),
            })
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV '{}': {e}", path.display())))
}

/// Write the full report as pretty-printed JSON.
pub fn write_report_json(path: &Path, report: &RankedReport) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(BufWriter::new(file), report)
        .map_err(|e| AppError::new(2, format!("Failed to write export JSON '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitResult, Target};
    use crate::models::ModelKind;
    use crate::report::rank_results;
    use std::path::PathBuf;

    fn report() -> RankedReport {
        let entries = vec![FitResult {
            source: PathBuf::from("dir/first.csv"),
            group: 2,
            model: ModelKind::Exponential,
            params: vec![1.0, 0.5, -2.0],
            distance: 0.25,
            n_points: 9,
            points: Vec::new(),
        }];
        rank_results(Target { x: 1.0, y: 2.0 }, entries).unwrap()
    }

    #[test]
    fn csv_export_has_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_ranking_csv(&path, &report()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("rank,file,group,model,distance,equation,params"));
        assert_eq!(
            lines.next(),
            Some("1,first.csv,3,Exponential,0.25,1.0000 * exp(0.5000x) + -2.0000,1;0.5;-2")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn json_export_round_trips_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_report_json(&path, &report()).unwrap();

        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["entries"][0]["model"], "exponential");
        assert_eq!(value["summary"]["n_results"], 1);
        assert_eq!(value["target"]["y"], 2.0);
    }
}
