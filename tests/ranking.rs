use std::fs;
use std::path::{Path, PathBuf};

use approx::assert_relative_eq;

use fitrank::advisor::StaticAdvisor;
use fitrank::app::pipeline::run_analysis;
use fitrank::domain::{AnalysisConfig, Target};
use fitrank::io::{load_groups, write_ranking_csv, write_report_json};
use fitrank::report::{format_ranked_table, format_summary};

fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
}

fn line_csv(offset: f64) -> String {
    (0..=10)
        .map(|i| {
            let x = i as f64;
            format!("{x},{}\n", 2.0 * x + 1.0 + offset)
        })
        .collect()
}

#[test]
fn closer_file_ranks_first() {
    let dir = tempfile::tempdir().unwrap();
    let near = write(dir.path(), "near.csv", &line_csv(0.0));
    let far = write(dir.path(), "far.csv", &line_csv(50.0));

    let out = run_analysis(
        &[far, near],
        Target { x: 5.0, y: 11.0 },
        &AnalysisConfig::default(),
        Some(&StaticAdvisor::new("Use near.csv.")),
    );
    assert!(out.issues.is_empty());
    assert_eq!(out.files_read, 2);

    let report = out.report.expect("both files have a fittable group");
    assert_eq!(report.entries.len(), 2);
    assert_eq!(report.entries[0].source_name(), "near.csv");
    assert_eq!(report.entries[1].source_name(), "far.csv");
    assert!(report.entries[0].distance < 1e-6);
    assert!(report.entries[1].distance > 40.0);
    assert_relative_eq!(
        report.summary.mean_distance,
        (report.entries[0].distance + report.entries[1].distance) / 2.0,
        max_relative = 1e-12
    );

    let table = format_ranked_table(&report);
    assert!(table.lines().nth(2).unwrap().starts_with("1     near.csv"));

    let summary = format_summary(&report, out.advisory.as_deref());
    assert!(summary.contains("Best fitting file: near.csv"));
    assert!(summary.contains("Worst fitting file: far.csv"));
    assert!(summary.ends_with("Advisory:\nUse near.csv.\n"));
}

fn level_csv(y: f64) -> String {
    (1..=10).map(|x| format!("{x},{y}\n")).collect()
}

#[test]
fn two_files_aggregate_to_the_expected_mean() {
    // Every catalog model reproduces a constant, so each file's distance is
    // exactly how far its level sits from the target.
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "A.csv", &level_csv(9.5));
    let b = write(dir.path(), "B.csv", &level_csv(8.0));

    let out = run_analysis(
        &[b.clone(), a.clone()],
        Target { x: 3.0, y: 10.0 },
        &AnalysisConfig::default(),
        None,
    );
    let report = out.report.expect("both files fit");
    assert_eq!(report.entries.len(), 2);
    assert_eq!(report.entries[0].source_name(), "A.csv");
    assert_eq!(report.entries[1].source_name(), "B.csv");
    assert_relative_eq!(report.entries[0].distance, 0.5, epsilon = 1e-6);
    assert_relative_eq!(report.entries[1].distance, 2.0, epsilon = 1e-6);

    assert_eq!(report.summary.best_source, a);
    assert_eq!(report.summary.worst_source, b);
    assert_relative_eq!(report.summary.mean_distance, 1.25, epsilon = 1e-6);
    assert_eq!(report.summary.n_results, 2);

    let summary = format_summary(&report, None);
    assert!(summary.contains("Mean distance: 1.2500"));
    assert!(summary.contains("Recommendation: use the target corresponding to A.csv"));
}

#[test]
fn blank_rows_split_groups_and_short_groups_drop_out() {
    let dir = tempfile::tempdir().unwrap();
    let body = format!(
        "\u{feff}{}\n\n,,\n1,5\n2,6\n3,n/a\n\n{}",
        line_csv(0.0).trim_end(),
        line_csv(3.0)
    );
    let path = write(dir.path(), "groups.csv", &body);

    let groups = load_groups(&path).unwrap();
    assert_eq!(groups.len(), 3);
    assert_eq!(groups[0].points.len(), 11);
    assert_eq!(groups[1].points.len(), 2);
    assert_eq!(groups[2].points.len(), 11);

    let out = run_analysis(&[path], Target { x: 5.0, y: 11.0 }, &AnalysisConfig::default(), None);
    let report = out.report.unwrap();
    let groups: Vec<usize> = report.entries.iter().map(|e| e.group).collect();
    assert_eq!(groups, vec![0, 2]);
    // A cubic passes through the shifted line exactly, so the winner is at most 3 away.
    assert!(report.entries[1].distance <= 3.0 + 1e-6);
    assert!(out.advisory.is_none());
}

#[test]
fn no_usable_groups_is_the_no_results_condition() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "short.csv", "1,1\n2,2\n3,3\n");
    let missing = dir.path().join("missing.xlsx");

    let out = run_analysis(
        &[path, missing],
        Target { x: 1.0, y: 1.0 },
        &AnalysisConfig::default(),
        Some(&StaticAdvisor::new("unused")),
    );
    assert!(out.report.is_none());
    assert!(out.advisory.is_none());
    assert_eq!(out.issues.len(), 1);
    assert_eq!(out.files_read, 1);
}

#[test]
fn exports_are_written_for_a_report() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "data.csv", &line_csv(0.0));
    let report = run_analysis(&[path], Target { x: 5.0, y: 11.0 }, &AnalysisConfig::default(), None)
        .report
        .unwrap();

    let csv_path = dir.path().join("ranking.csv");
    write_ranking_csv(&csv_path, &report).unwrap();
    let text = fs::read_to_string(&csv_path).unwrap();
    assert_eq!(text.lines().count(), 2);
    assert!(text.lines().nth(1).unwrap().starts_with("1,data.csv,1,"));

    let json_path = dir.path().join("report.json");
    write_report_json(&json_path, &report).unwrap();
    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(value["entries"].as_array().unwrap().len(), 1);
    assert_eq!(value["summary"]["best_source"], value["summary"]["worst_source"]);
}
