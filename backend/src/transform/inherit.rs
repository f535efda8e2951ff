//! Row classification and campaign inheritance.
//!
//! A campaign row sets context; following rows may leave campaign columns
//! blank and inherit them. The inheritance is a strictly ordered fold: a
//! [`CampaignContext`] holds the last non-blank value of every campaign-scoped
//! column and fills the blanks of each row it visits.
//!
//! ```text
//! Input Level | Campaign Name | Ad Set Name        Input Level | Campaign Name | Ad Set Name
//! campaign    | Spring        |                    campaign    | Spring        |
//! adset       |               | Young         →    adset       | Spring        | Young
//! adset       |               | Old                adset       | Spring        | Old
//! campaign    | Summer        |                    campaign    | Summer        |
//! ```

use std::collections::HashMap;

use crate::error::RowError;
use crate::models::{columns, ErrorRecord, InputLevel, InputRow, INHERITED_COLUMNS};

/// Last non-blank value of each campaign-scoped column.
#[derive(Debug, Clone, Default)]
pub struct CampaignContext {
    values: HashMap<&'static str, String>,
}

impl CampaignContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill the row's blank campaign cells from the context and record its
    /// non-blank ones for the rows that follow.
    pub fn fill(&mut self, row: &mut InputRow) {
        for column in INHERITED_COLUMNS {
            match row.get(column) {
                Some(value) => {
                    self.values.insert(column, value.to_string());
                }
                None => {
                    if let Some(value) = self.values.get(column) {
                        row.set(column, value.clone());
                    }
                }
            }
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }
}

/// An inherited row with a known level.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRow {
    pub level: InputLevel,
    pub row: InputRow,
}

/// Forward-fill campaign columns, then classify every row.
///
/// Rows with an unknown `Input Level` become error records; they still feed
/// the context since the fill runs first.
pub fn classify_rows(rows: &[InputRow]) -> Vec<Result<ClassifiedRow, ErrorRecord>> {
    let mut context = CampaignContext::new();

    rows.iter()
        .map(|row| {
            let mut row = row.clone();
            context.fill(&mut row);

            let raw_level = row.text(columns::INPUT_LEVEL).to_string();
            match InputLevel::parse(&raw_level) {
                Some(level) => Ok(ClassifiedRow { level, row }),
                None => {
                    let err = RowError::InvalidInputLevel { value: raw_level };
                    Err(ErrorRecord::new(
                        row.number,
                        columns::INPUT_LEVEL,
                        err.to_string(),
                    ))
                }
            }
        })
        .collect()
}
