//! Fixed-shape output tables.
//!
//! The mapped table always has exactly the canonical bulk-import columns in
//! canonical order, whatever the records contain. The error table keeps
//! failures in encounter order.

use serde::{Deserialize, Serialize};

use crate::models::{output_columns, ErrorRecord, OutputRecord, OUTPUT_COLUMN_COUNT};

/// Mapped bulk-import rows, one `Vec<String>` per row in column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappedTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl MappedTable {
    /// Table with the canonical header and no rows.
    pub fn empty() -> Self {
        Self {
            columns: output_columns().map(String::from).collect(),
            rows: Vec::new(),
        }
    }

    /// Pad every record to the canonical columns.
    pub fn from_records(records: &[OutputRecord]) -> Self {
        let mut table = Self::empty();
        table.rows = records
            .iter()
            .map(|record| {
                output_columns()
                    .map(|column| record.get(column).unwrap_or("").to_string())
                    .collect()
            })
            .collect();
        table
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Values of one column, top to bottom.
    pub fn column_values<'a>(&'a self, column: &str) -> impl Iterator<Item = &'a str> + 'a {
        let index = self.column_index(column);
        self.rows
            .iter()
            .filter_map(move |row| index.and_then(|i| row.get(i)).map(String::as_str))
    }

    /// Cell lookup by row index and column name.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index).map(String::as_str)
    }
}

impl Default for MappedTable {
    fn default() -> Self {
        Self::empty()
    }
}

/// Error table with columns `row, field, error`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorTable {
    pub errors: Vec<ErrorRecord>,
}

impl ErrorTable {
    pub const COLUMNS: [&'static str; 3] = ["row", "field", "error"];

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ErrorRecord> {
        self.errors.iter()
    }
}

/// Both outputs of one transform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformOutput {
    pub mapped: MappedTable,
    pub errors: ErrorTable,
}

impl TransformOutput {
    /// True when no row failed.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Assemble the two output tables.
pub fn assemble(records: &[OutputRecord], errors: Vec<ErrorRecord>) -> TransformOutput {
    let mapped = MappedTable::from_records(records);
    debug_assert!(mapped.rows.iter().all(|r| r.len() == OUTPUT_COLUMN_COUNT));
    TransformOutput {
        mapped,
        errors: ErrorTable { errors },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::columns::*;

    #[test]
    fn test_empty_table_has_canonical_header() {
        let table = MappedTable::empty();
        assert_eq!(table.columns.len(), OUTPUT_COLUMN_COUNT);
        assert_eq!(table.columns[0], CAMPAIGN_NAME);
        assert!(table.is_empty());
    }

    #[test]
    fn test_records_are_padded() {
        let mut record = OutputRecord::new();
        record.set(CAMPAIGN_NAME, "Spring");
        record.set(GENDER, "All");

        let output = assemble(&[record, OutputRecord::new()], Vec::new());
        let table = &output.mapped;

        assert_eq!(table.len(), 2);
        assert!(table.rows.iter().all(|r| r.len() == OUTPUT_COLUMN_COUNT));
        assert_eq!(table.cell(0, CAMPAIGN_NAME), Some("Spring"));
        assert_eq!(table.cell(0, GENDER), Some("All"));
        assert_eq!(table.cell(0, TITLE), Some(""));
        assert!(table.rows[1].iter().all(String::is_empty));
        assert!(output.is_clean());
    }

    #[test]
    fn test_column_values() {
        let names = ["A", "B"];
        let records: Vec<OutputRecord> = names
            .iter()
            .map(|n| {
                let mut r = OutputRecord::new();
                r.set(AD_NAME, *n);
                r
            })
            .collect();
        let table = MappedTable::from_records(&records);
        let values: Vec<&str> = table.column_values(AD_NAME).collect();
        assert_eq!(values, vec!["A", "B"]);
        assert_eq!(table.column_values("Nope").count(), 0);
    }

    #[test]
    fn test_errors_keep_order() {
        let errors = vec![
            ErrorRecord::new(4, "adset", "second"),
            ErrorRecord::new(2, "Input Level", "first"),
        ];
        let output = assemble(&[], errors);
        let rows: Vec<usize> = output.errors.iter().map(|e| e.row).collect();
        assert_eq!(rows, vec![4, 2]);
        assert!(!output.is_clean());
    }
}
