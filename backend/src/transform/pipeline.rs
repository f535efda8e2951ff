//! High-level pipeline API for simple-mode CSV to bulk-import transformation.
//!
//! Combines parsing, profile resolution, the transform engine and summary
//! statistics, logging progress through the log broadcaster.
//!
//! # Example
//!
//! ```rust,ignore
//! use bulkmap::pipeline::{transform_csv, TransformOptions};
//! use std::path::Path;
//!
//! let result = transform_csv(Path::new("campaigns.csv"), &TransformOptions::default())?;
//! if result.output.is_clean() {
//!     let bytes = bulkmap::mapped_table_to_csv(&result.output.mapped)?;
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use super::assembler::{MappedTable, TransformOutput};
use super::engine::transform;
use super::profile::MappingProfile;
use crate::api::logs::{log_error, log_error_indent, log_info, log_success, log_warning};
use crate::error::{PipelineError, PipelineResult as Result};
use crate::models::columns::*;
use crate::models::InputRow;
use crate::parser::{parse_bytes_auto, parse_csv_file_auto, ParseResult};

/// Environment variable naming the default profile (built-in name or path).
pub const PROFILE_ENV: &str = "BULKMAP_PROFILE";

/// Options for the transformation pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformOptions {
    /// Built-in profile name or path to a JSON profile
    pub profile: String,

    /// Number of row errors echoed to the log
    pub max_logged_errors: usize,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            profile: "revised".to_string(),
            max_logged_errors: 5,
        }
    }
}

impl TransformOptions {
    /// Defaults, with the profile taken from `BULKMAP_PROFILE` when set.
    pub fn from_env() -> Self {
        let mut options = Self::default();
        if let Ok(profile) = std::env::var(PROFILE_ENV) {
            if !profile.trim().is_empty() {
                options.profile = profile;
            }
        }
        options
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }
}

/// Result of a complete transformation pipeline
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    /// Mapped table and error table
    pub output: TransformOutput,

    /// Name of the profile used
    pub profile: String,

    /// Summary derived from the mapped table
    pub stats: TableStats,

    /// CSV parsing metadata
    pub csv_info: CsvInfo,
}

/// CSV file information
#[derive(Debug, Clone, Serialize)]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

/// Summary of a mapped table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableStats {
    /// Distinct campaign names
    pub campaigns: usize,
    /// Distinct (campaign, ad set) names
    pub ad_sets: usize,
    /// Rows with an ad name
    pub ads: usize,
    /// Sum of campaign daily budgets, once per campaign (saturating)
    pub campaign_budget_total: u64,
    /// Sum of ad set daily budgets (saturating)
    pub ad_set_budget_total: u64,
    pub mapped_rows: usize,
    pub error_rows: usize,
}

impl TableStats {
    /// Re-derive the summary by scanning the table's fixed columns.
    pub fn from_table(table: &MappedTable, error_rows: usize) -> Self {
        let mut campaigns = HashSet::new();
        let mut budgeted_campaigns = HashSet::new();
        let mut ad_sets = HashSet::new();
        let mut stats = TableStats {
            mapped_rows: table.len(),
            error_rows,
            ..Default::default()
        };

        for i in 0..table.len() {
            let campaign = table.cell(i, CAMPAIGN_NAME).unwrap_or("");
            if !campaign.is_empty() {
                campaigns.insert(campaign);
            }

            let campaign_budget = parse_budget(table.cell(i, CAMPAIGN_DAILY_BUDGET));
            if campaign_budget > 0 && budgeted_campaigns.insert(campaign) {
                stats.campaign_budget_total =
                    stats.campaign_budget_total.saturating_add(campaign_budget);
            }

            let ad_set = table.cell(i, AD_SET_NAME).unwrap_or("");
            if !ad_set.is_empty() {
                ad_sets.insert((campaign, ad_set));
            }
            let ad_set_budget = parse_budget(table.cell(i, AD_SET_DAILY_BUDGET));
            stats.ad_set_budget_total = stats.ad_set_budget_total.saturating_add(ad_set_budget);

            if table.cell(i, AD_NAME).is_some_and(|n| !n.is_empty()) {
                stats.ads += 1;
            }
        }

        stats.campaigns = campaigns.len();
        stats.ad_sets = ad_sets.len();
        stats
    }
}

/// Whole-number budget cell; amounts past `u64::MAX` saturate.
fn parse_budget(cell: Option<&str>) -> u64 {
    match cell {
        Some(c) if !c.is_empty() && c.bytes().all(|b| b.is_ascii_digit()) => {
            c.parse().unwrap_or(u64::MAX)
        }
        _ => 0,
    }
}

/// Transform a simple-mode CSV file.
///
/// 1. Parses the CSV with encoding/delimiter auto-detection
/// 2. Resolves the mapping profile
/// 3. Runs the transform engine
/// 4. Derives summary statistics
pub fn transform_csv(path: &Path, options: &TransformOptions) -> Result<PipelineResult> {
    log_info(format!("📖 Reading {}", path.display()));
    let parse_result = parse_csv_file_auto(path)?;
    transform_parsed(parse_result, options)
}

/// Transform simple-mode CSV bytes (uploads, pasted text).
pub fn transform_bytes(bytes: &[u8], options: &TransformOptions) -> Result<PipelineResult> {
    log_info(format!("📖 Reading {} bytes of CSV", bytes.len()));
    let parse_result = parse_bytes_auto(bytes)?;
    transform_parsed(parse_result, options)
}

/// Transform rows that were parsed elsewhere (e.g. JSON from the API).
pub fn transform_records(
    rows: Vec<InputRow>,
    options: &TransformOptions,
) -> Result<PipelineResult> {
    let mut headers: Vec<String> = Vec::new();
    for row in &rows {
        for column in row.columns() {
            if !headers.iter().any(|h| h == column) {
                headers.push(column.to_string());
            }
        }
    }
    headers.sort();

    let parse_result = ParseResult {
        rows,
        encoding: "utf-8".to_string(),
        delimiter: ',',
        headers,
    };
    transform_parsed(parse_result, options)
}

/// Internal: transform parsed rows
fn transform_parsed(
    parse_result: ParseResult,
    options: &TransformOptions,
) -> Result<PipelineResult> {
    log_success(format!("Detected encoding: {}", parse_result.encoding));
    log_success(format!(
        "Detected separator: '{}'",
        format_delimiter(parse_result.delimiter)
    ));
    log_success(format!("Read {} rows", parse_result.rows.len()));

    if parse_result.rows.is_empty() {
        log_error("No rows to transform");
        return Err(PipelineError::EmptyInput);
    }

    let csv_info = CsvInfo {
        encoding: parse_result.encoding.clone(),
        delimiter: parse_result.delimiter,
        headers: parse_result.headers.clone(),
        row_count: parse_result.rows.len(),
    };

    if !parse_result.headers.iter().any(|h| h == INPUT_LEVEL) {
        log_warning(format!("No '{}' column: every row will be rejected", INPUT_LEVEL));
    }

    let profile = MappingProfile::load(&options.profile)?;
    log_info(format!("📋 Using profile: {}", profile.name));

    log_info("⚙️  Mapping rows...");
    let output = transform(&parse_result.rows, &profile);
    let stats = TableStats::from_table(&output.mapped, output.errors.len());
    print_transform_result(&output, &stats, options);

    Ok(PipelineResult {
        output,
        profile: profile.name,
        stats,
        csv_info,
    })
}

/// Format delimiter for display
fn format_delimiter(d: char) -> &'static str {
    match d {
        ';' => ";",
        ',' => ",",
        '\t' => "TAB",
        '|' => "|",
        _ => "?",
    }
}

/// Print transformation result details
fn print_transform_result(
    output: &TransformOutput,
    stats: &TableStats,
    options: &TransformOptions,
) {
    log_success(format!(
        "Mapped {} rows ({} campaigns, {} ad sets, {} ads)",
        stats.mapped_rows, stats.campaigns, stats.ad_sets, stats.ads
    ));

    if output.is_clean() {
        log_success("All rows valid!");
        return;
    }

    log_warning(format!("{} rows failed validation", output.errors.len()));
    for err in output.errors.iter().take(options.max_logged_errors) {
        log_error_indent(format!("Row {} [{}]: {}", err.row, err.field, err.error), 1);
    }
    if output.errors.len() > options.max_logged_errors {
        log_warning(format!(
            "... +{} more",
            output.errors.len() - options.max_logged_errors
        ));
    }
}
