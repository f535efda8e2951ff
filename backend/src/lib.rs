//! # Bulkmap - simple-mode campaign sheets to bulk-import CSV
//!
//! Bulkmap turns a hand-edited campaign spreadsheet (one `campaign` row
//! followed by its `adset` rows) into the flat bulk-import format of the ad
//! platform, plus an error table listing every row that was rejected.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Simple CSV │────▶│   Parser    │────▶│  Transform  │────▶│ Bulk CSV +  │
//! │  (ISO/UTF8) │     │  (auto-enc) │     │  (profile)  │     │ error table │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bulkmap::{transform_csv, mapped_table_to_csv, TransformOptions};
//! use std::path::Path;
//!
//! let result = transform_csv(Path::new("campaigns.csv"), &TransformOptions::default())?;
//! for err in result.output.errors.iter() {
//!     eprintln!("row {}: {}", err.row, err.error);
//! }
//! std::fs::write("bulk.csv", mapped_table_to_csv(&result.output.mapped)?)?;
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Column names, input rows, output and error records
//! - [`parser`] - CSV parsing with auto-detection, CSV export
//! - [`validation`] - Field validators
//! - [`transform`] - Profiles, inheritance, row mapping and pipeline
//! - [`api`] - HTTP API server and log stream

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Validation
pub mod validation;

// Transformation
pub mod transform;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{CsvError, PipelineError, ProfileError, RowError, ServerError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    columns, output_columns, ErrorRecord, InputLevel, InputRow, OutputRecord,
    INHERITED_COLUMNS, OUTPUT_COLUMN_COUNT,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{
    coerce_datetime, normalize_gender, resolve_age_range, validate_enum, validate_list,
    validate_positive_number, DATETIME_FORMAT,
};

// =============================================================================
// Re-exports - CSV Parsing and Export
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, error_table_to_csv, input_template_csv,
    mapped_table_to_csv, parse_bytes_auto, parse_csv_file_auto, parse_str, ParseResult,
};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{transform, ErrorTable, MappedTable, MappingProfile, TransformOutput};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    transform_bytes, transform_csv, transform_records, CsvInfo, PipelineResult, TableStats,
    TransformOptions, PROFILE_ENV,
};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, TransformRequest, TransformResponse};

// Server
pub mod server {
    pub use crate::api::server::{port_from_env, start_server, DEFAULT_PORT};
}
