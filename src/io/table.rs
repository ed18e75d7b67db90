//! Headerless table ingest (CSV and spreadsheets).
//!
//! This module turns a file into raw rows of typed cells and nothing more:
//! - no header row, every line is data
//! - rows may be ragged
//! - physically blank lines are kept as empty rows (they separate groups)
//! - no numeric validation here (deferred to the fitter)

use std::fs;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};

use crate::domain::{Cell, Row};
use crate::error::AppError;

/// Spreadsheet extensions handled by `calamine`; everything else is read as CSV.
const SPREADSHEET_EXTS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Delimited,
    Spreadsheet,
}

impl TableFormat {
    pub fn from_path(path: &Path) -> Self {
        let is_sheet = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| SPREADSHEET_EXTS.iter().any(|s| ext.eq_ignore_ascii_case(s)))
            .unwrap_or(false);
        if is_sheet {
            TableFormat::Spreadsheet
        } else {
            TableFormat::Delimited
        }
    }
}

/// Read every row of `path`.
pub fn read_table(path: &Path) -> Result<Vec<Row>, AppError> {
    match TableFormat::from_path(path) {
        TableFormat::Delimited => {
            let text = fs::read_to_string(path)
                .map_err(|e| AppError::new(2, format!("Failed to read '{}': {e}", path.display())))?;
            parse_delimited(&text)
                .map_err(|e| AppError::new(2, format!("Failed to parse '{}': {e}", path.display())))
        }
        TableFormat::Spreadsheet => read_spreadsheet(path),
    }
}

/// Parse comma-separated text into rows.
///
/// The `csv` reader silently drops blank lines, so the text is split into
/// blocks on blank lines first and an empty row is emitted for each one.
pub fn parse_delimited(text: &str) -> Result<Vec<Row>, AppError> {
    let text = text.trim_start_matches('\u{feff}');
    let mut rows = Vec::new();
    let mut block = String::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            flush_block(&mut block, &mut rows)?;
            rows.push(Vec::new());
        } else {
            block.push_str(line);
            block.push('\n');
        }
    }
    flush_block(&mut block, &mut rows)?;

    Ok(rows)
}

fn flush_block(block: &mut String, rows: &mut Vec<Row>) -> Result<(), AppError> {
    if block.is_empty() {
        return Ok(());
    }
    {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(block.as_bytes());

        for result in reader.records() {
            let record = result.map_err(|e| AppError::new(2, format!("CSV parse error: {e}")))?;
            rows.push(record.iter().map(Cell::parse).collect());
        }
    }
    block.clear();
    Ok(())
}

fn read_spreadsheet(path: &Path) -> Result<Vec<Row>, AppError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| {
        AppError::new(2, format!("Failed to open spreadsheet '{}': {e}", path.display()))
    })?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::new(2, format!("Spreadsheet '{}' has no worksheets.", path.display())))?
        .map_err(|e| {
            AppError::new(
                2,
                format!("Failed to read first worksheet of '{}': {e}", path.display()),
            )
        })?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect())
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::Float(v) => Cell::Number(*v),
        Data::Int(v) => Cell::Number(*v as f64),
        Data::String(s) => Cell::parse(s),
        other => Cell::Text(other.to_string()),
    }
}
