//! Domain models for the Bulkmap transformation pipeline.
//!
//! - [`InputRow`] - One simple-mode spreadsheet row with its data row number
//! - [`InputLevel`] - Whether a row sets campaign context or emits an ad set
//! - [`OutputRecord`] - Partially filled bulk-import record built for one row
//! - [`ErrorRecord`] - One entry of the error table
//! - [`columns`] - Exact bulk-import header names

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

// =============================================================================
// Column Names
// =============================================================================

/// Header names of the bulk-import format. These are contract strings and are
/// case-sensitive.
pub mod columns {
    pub const INPUT_LEVEL: &str = "Input Level";
    pub const PLACEMENTS: &str = "Placements";

    // Campaign
    pub const CAMPAIGN_NAME: &str = "Campaign Name";
    pub const CAMPAIGN_STATUS: &str = "Campaign Status";
    pub const SPECIAL_AD_CATEGORIES: &str = "Special Ad Categories";
    pub const SPECIAL_AD_CATEGORY_COUNTRY: &str = "Special Ad Category Country";
    pub const BUYING_TYPE: &str = "Buying Type";
    pub const CAMPAIGN_OBJECTIVE: &str = "Campaign Objective";
    pub const CAMPAIGN_BID_STRATEGY: &str = "Campaign Bid Strategy";
    pub const CAMPAIGN_DAILY_BUDGET: &str = "Campaign Daily Budget";
    pub const CAMPAIGN_START_TIME: &str = "Campaign Start Time";
    pub const CAMPAIGN_STOP_TIME: &str = "Campaign Stop Time";
    pub const ADVANTAGE_PLACEMENTS: &str = "Advantage+ placements";

    // Ad set
    pub const AD_SET_NAME: &str = "Ad Set Name";
    pub const AD_SET_RUN_STATUS: &str = "Ad Set Run Status";
    pub const AD_SET_DAILY_BUDGET: &str = "Ad Set Daily Budget";
    pub const AD_SET_TIME_START: &str = "Ad Set Time Start";
    pub const AD_SET_TIME_STOP: &str = "Ad Set Time Stop";
    pub const COUNTRIES: &str = "Countries";
    pub const AGE_MIN: &str = "Age Min";
    pub const AGE_MAX: &str = "Age Max";
    pub const GENDER: &str = "Gender";
    pub const CUSTOM_AUDIENCES: &str = "Custom Audiences";
    pub const EXCLUDED_CUSTOM_AUDIENCES: &str = "Excluded Custom Audiences";
    pub const OPTIMISATION_GOAL: &str = "Optimisation Goal";

    // Creative
    pub const AD_NAME: &str = "Ad Name";
    pub const AD_STATUS: &str = "Ad Status";
    pub const TITLE: &str = "Title";
    pub const BODY: &str = "Body";
    pub const LINK: &str = "Link";
    pub const URL_TAGS: &str = "URL Tags";
    pub const CALL_TO_ACTION: &str = "Call to Action";
    pub const IMAGE_FILE_NAME: &str = "Image File Name";
}

use columns::*;

/// Campaign-scoped columns, forward-filled into following rows.
pub const INHERITED_COLUMNS: [&str; 10] = [
    CAMPAIGN_NAME,
    CAMPAIGN_STATUS,
    SPECIAL_AD_CATEGORIES,
    SPECIAL_AD_CATEGORY_COUNTRY,
    CAMPAIGN_OBJECTIVE,
    BUYING_TYPE,
    CAMPAIGN_BID_STRATEGY,
    CAMPAIGN_DAILY_BUDGET,
    CAMPAIGN_START_TIME,
    CAMPAIGN_STOP_TIME,
];

/// Campaign block of the output, in canonical order.
pub const CAMPAIGN_COLUMNS: [&str; 11] = [
    CAMPAIGN_NAME,
    CAMPAIGN_STATUS,
    SPECIAL_AD_CATEGORIES,
    SPECIAL_AD_CATEGORY_COUNTRY,
    BUYING_TYPE,
    CAMPAIGN_OBJECTIVE,
    CAMPAIGN_BID_STRATEGY,
    CAMPAIGN_DAILY_BUDGET,
    CAMPAIGN_START_TIME,
    CAMPAIGN_STOP_TIME,
    ADVANTAGE_PLACEMENTS,
];

/// Ad set block of the output, in canonical order.
pub const AD_SET_COLUMNS: [&str; 12] = [
    AD_SET_NAME,
    AD_SET_RUN_STATUS,
    AD_SET_DAILY_BUDGET,
    AD_SET_TIME_START,
    AD_SET_TIME_STOP,
    COUNTRIES,
    AGE_MIN,
    AGE_MAX,
    GENDER,
    CUSTOM_AUDIENCES,
    EXCLUDED_CUSTOM_AUDIENCES,
    OPTIMISATION_GOAL,
];

/// Creative block of the output, in canonical order.
pub const CREATIVE_COLUMNS: [&str; 8] = [
    AD_NAME,
    AD_STATUS,
    TITLE,
    BODY,
    LINK,
    URL_TAGS,
    CALL_TO_ACTION,
    IMAGE_FILE_NAME,
];

/// Every output column: campaign, then ad set, then creative.
pub fn output_columns() -> impl Iterator<Item = &'static str> {
    CAMPAIGN_COLUMNS
        .into_iter()
        .chain(AD_SET_COLUMNS)
        .chain(CREATIVE_COLUMNS)
}

/// Number of canonical output columns.
pub const OUTPUT_COLUMN_COUNT: usize =
    CAMPAIGN_COLUMNS.len() + AD_SET_COLUMNS.len() + CREATIVE_COLUMNS.len();

// =============================================================================
// Input
// =============================================================================

/// One row of the simple-mode sheet.
///
/// Cells are kept as raw text; blank and missing columns are indistinguishable
/// through [`InputRow::get`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputRow {
    /// 1-based data row number (the first row after the header is 1).
    pub number: usize,
    cells: HashMap<String, String>,
}

impl InputRow {
    pub fn new(number: usize) -> Self {
        Self {
            number,
            cells: HashMap::new(),
        }
    }

    /// Build a row from `(column, value)` pairs.
    pub fn from_pairs<K, V>(number: usize, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let cells = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self { number, cells }
    }

    /// Build a row from a JSON object. Numbers and booleans keep their text
    /// form, `null` is blank, nested values are ignored.
    pub fn from_json(number: usize, value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let mut row = Self::new(number);
        for (key, cell) in obj {
            let text = match cell {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => continue,
            };
            row.cells.insert(key.clone(), text);
        }
        Some(row)
    }

    /// Trimmed cell text, `None` when the column is missing or blank.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .get(column)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    /// Trimmed cell text, `""` when missing or blank.
    pub fn text(&self, column: &str) -> &str {
        self.get(column).unwrap_or("")
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.cells.insert(column.into(), value.into());
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }
}

/// Row classification read from the `Input Level` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputLevel {
    Campaign,
    Adset,
}

impl InputLevel {
    /// Case-insensitive, whitespace-tolerant parse.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "campaign" => Some(Self::Campaign),
            "adset" => Some(Self::Adset),
            _ => None,
        }
    }

    /// Tag used in the `field` column of the error table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Campaign => "campaign",
            Self::Adset => "adset",
        }
    }
}

// =============================================================================
// Output
// =============================================================================

/// Output fields produced for one row. Only canonical columns are kept; the
/// assembler pads the rest with empty strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputRecord {
    fields: HashMap<&'static str, String>,
}

impl OutputRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field. Names outside the canonical column set are ignored.
    pub fn set(&mut self, column: &str, value: impl Into<String>) {
        if let Some(name) = output_columns().find(|c| *c == column) {
            self.fields.insert(name, value.into());
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// One row of the error table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// 1-based data row number.
    pub row: usize,
    /// `Input Level`, `campaign` or `adset`.
    pub field: String,
    /// Human-readable message.
    pub error: String,
}

impl ErrorRecord {
    pub fn new(row: usize, field: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            row,
            field: field.into(),
            error: error.into(),
        }
    }
}
