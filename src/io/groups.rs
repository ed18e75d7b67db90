//! Splitting a table into blank-row-separated data groups.

use std::path::Path;

use crate::domain::{DataGroup, Row};
use crate::error::AppError;
use crate::io::table::read_table;

/// A row separates groups when it has no cells or every cell is empty.
pub fn is_separator(row: &Row) -> bool {
    row.iter().all(|c| c.is_empty())
}

/// Split rows into contiguous runs of non-separator rows, in file order.
///
/// Separator rows never appear in the output, and runs of several separators
/// do not create empty groups.
pub fn split_groups(rows: Vec<Row>) -> Vec<Vec<Row>> {
    let mut groups = Vec::new();
    let mut current = Vec::new();

    for row in rows {
        if is_separator(&row) {
            if !current.is_empty() {
                groups.push(std::mem::take(&mut current));
            }
        } else {
            current.push(row);
        }
    }
    if !current.is_empty() {
        groups.push(current);
    }

    groups
}

/// Read `path` and reduce each group to its valid `(x, y)` pairs.
pub fn load_groups(path: &Path) -> Result<Vec<DataGroup>, AppError> {
    let rows = read_table(path)?;
    Ok(split_groups(rows)
        .iter()
        .enumerate()
        .map(|(i, rows)| DataGroup::from_rows(i, rows))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Cell;

    fn row(x: f64, y: f64) -> Row {
        vec![Cell::Number(x), Cell::Number(y)]
    }

    #[test]
    fn no_separators_yield_one_group() {
        let rows = vec![row(1.0, 1.0), row(2.0, 2.0), row(3.0, 3.0)];
        let groups = split_groups(rows.clone());
        assert_eq!(groups, vec![rows]);
    }

    #[test]
    fn separators_split_runs_in_order() {
        let rows = vec![
            vec![Cell::Empty, Cell::Empty],
            row(1.0, 1.0),
            row(2.0, 2.0),
            Vec::new(),
            Vec::new(),
            row(3.0, 3.0),
            vec![Cell::Empty],
            row(4.0, 4.0),
            row(5.0, 5.0),
            Vec::new(),
        ];
        let groups = split_groups(rows);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0], vec![row(1.0, 1.0), row(2.0, 2.0)]);
        assert_eq!(groups[1], vec![row(3.0, 3.0)]);
        assert_eq!(groups[2], vec![row(4.0, 4.0), row(5.0, 5.0)]);
        assert!(groups.iter().flatten().all(|r| !is_separator(r)));
    }

    #[test]
    fn empty_input_has_no_groups() {
        assert!(split_groups(Vec::new()).is_empty());
    }

    #[test]
    fn partially_filled_row_is_not_a_separator() {
        assert!(!is_separator(&vec![Cell::Empty, Cell::Text("x".into())]));
        assert!(is_separator(&Vec::new()));
    }
}
