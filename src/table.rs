//! # Tables
//!
//! Everything the store hands back is a table: row 0 is the header, every row after
//! that is data. Rows can be ragged, a trailing empty cell is simply not sent.
//!
//! ## Queries
//!
//! - Columns are found by name through the header, never by position
//! - Comparisons always go through [`normalize`], output always keeps the raw cells
//! - A column that does not exist reads as an empty result, not an error
//!
//! ## Departments
//!
//! Challenges reference a department by name. There is no constraint in the sheet
//! itself, so the Students `Department` column acts as the list of known departments
//! and is checked with [`cross_validate`] on every write and department read.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::utils::{normalize, resolve_column};

pub type Row = Vec<String>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Table {
    rows: Vec<Row>,
}

impl Table {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn header(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// Every row after the header.
    pub fn data_rows(&self) -> &[Row] {
        self.rows.get(1..).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.header().and_then(|header| resolve_column(header, name))
    }
}

impl From<Vec<Row>> for Table {
    fn from(rows: Vec<Row>) -> Self {
        Self::new(rows)
    }
}

pub fn cell(row: &[String], index: usize) -> Option<&str> {
    row.get(index).map(String::as_str)
}

/// Header plus every data row whose `column` cell matches `value`.
pub fn filter_by_column(table: &Table, column: &str, value: &str) -> Table {
    if table.len() <= 1 {
        return Table::default();
    }

    let (Some(header), Some(index)) = (table.header(), table.column(column)) else {
        return Table::default();
    };

    let target = normalize(Some(value));
    let mut rows = vec![header.clone()];

    rows.extend(
        table
            .data_rows()
            .iter()
            .filter(|row| normalize(cell(row, index)) == target)
            .cloned(),
    );

    Table::new(rows)
}

/// Distinct values of `column`, keyed by their normalized form.
///
/// Each key maps to the raw cell of its first occurrence. Blank cells are skipped.
pub fn distinct_column_values(table: &Table, column: &str) -> IndexMap<String, String> {
    let mut values = IndexMap::new();

    let Some(index) = table.column(column) else {
        return values;
    };

    for row in table.data_rows() {
        let key = normalize(cell(row, index));
        if key.is_empty() {
            continue;
        }

        values
            .entry(key)
            .or_insert_with(|| cell(row, index).unwrap_or_default().to_string());
    }

    values
}

pub fn cross_validate(table: &Table, column: &str, candidate: &str) -> bool {
    distinct_column_values(table, column).contains_key(&normalize(Some(candidate)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[&[&str]]) -> Table {
        rows.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect::<Vec<Row>>()
            .into()
    }

    fn students() -> Table {
        table(&[
            &["Name", "Email", "Phone", "RegNo", " class ", "Department"],
            &["A", "a@x.com", "1", "R1", "10A", "CS"],
            &["B", "b@x.com", "2", "R2", "10b", "ee"],
            &["C", "c@x.com", "3", "R3", " 10a", "cs "],
            &["D", "d@x.com", "4", "R4"],
        ])
    }

    #[test]
    fn filter_matches_normalized_and_keeps_raw_cells() {
        let out = filter_by_column(&students(), "Class", "10a");

        assert_eq!(
            out,
            table(&[
                &["Name", "Email", "Phone", "RegNo", " class ", "Department"],
                &["A", "a@x.com", "1", "R1", "10A", "CS"],
                &["C", "c@x.com", "3", "R3", " 10a", "cs "],
            ])
        );
    }

    #[test]
    fn filter_missing_column_is_empty() {
        assert!(filter_by_column(&students(), "Grade", "10a").is_empty());
    }

    #[test]
    fn filter_header_only_or_empty_is_empty() {
        assert!(filter_by_column(&Table::default(), "Class", "10a").is_empty());
        assert!(filter_by_column(&table(&[&["Class"]]), "Class", "10a").is_empty());
    }

    #[test]
    fn filter_without_matches_keeps_header() {
        let out = filter_by_column(&students(), "Class", "12z");

        assert_eq!(out.len(), 1);
        assert_eq!(out.header(), students().header());
    }

    #[test]
    fn filter_short_rows_never_match_non_empty_value() {
        let out = filter_by_column(&students(), "Department", "cs");

        assert_eq!(out.data_rows().len(), 2);
        assert!(out.data_rows().iter().all(|row| row[3] != "R4"));
    }

    #[test]
    fn filter_is_idempotent() {
        let once = filter_by_column(&students(), "class", " 10A ");
        let twice = filter_by_column(&once, "class", " 10A ");

        assert_eq!(once, twice);
    }

    #[test]
    fn distinct_values_dedupe_by_normalized_key() {
        let values = distinct_column_values(&students(), "department");

        assert_eq!(values.keys().collect::<Vec<_>>(), vec!["cs", "ee"]);
        assert_eq!(values.values().collect::<Vec<_>>(), vec!["CS", "ee"]);
    }

    #[test]
    fn distinct_values_skip_blank_cells() {
        let t = table(&[&["Class"], &[""], &["  "], &["9C"], &[]]);
        let values = distinct_column_values(&t, "Class");

        assert_eq!(values.len(), 1);
        assert!(values.keys().all(|key| !key.is_empty()));
    }

    #[test]
    fn distinct_values_missing_column_is_empty() {
        assert!(distinct_column_values(&students(), "Grade").is_empty());
        assert!(distinct_column_values(&Table::default(), "Class").is_empty());
    }

    #[test]
    fn cross_validate_uses_normalized_membership() {
        let t = students();

        assert!(cross_validate(&t, "Department", "CS "));
        assert!(cross_validate(&t, "Department", "EE"));
        assert!(!cross_validate(&t, "Department", "Math"));
        assert!(!cross_validate(&t, "Department", ""));
        assert!(!cross_validate(&t, "Faculty", "cs"));
    }

    #[test]
    fn table_serializes_as_rows() {
        let json = serde_json::to_value(table(&[&["Title"], &["Two Sum"]])).unwrap();

        assert_eq!(json, serde_json::json!([["Title"], ["Two Sum"]]));
    }
}
