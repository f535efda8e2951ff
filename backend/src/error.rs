//! Error types for the Bulkmap transformation pipeline.
//!
//! - [`RowError`] - Row-scoped validation failures (recoverable, become error records)
//! - [`CsvError`] - CSV parsing errors
//! - [`ProfileError`] - Mapping profile loading errors
//! - [`PipelineError`] - Top-level orchestration errors
//! - [`ServerError`] - HTTP layer errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Row Errors
// =============================================================================

/// A validation failure scoped to a single input row.
///
/// None of these abort a transform: the offending row is dropped from the
/// mapped table and its message is recorded in the error table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    /// `Input Level` is neither `campaign` nor `adset`.
    #[error("Must be 'campaign' or 'adset'")]
    InvalidInputLevel { value: String },

    /// Value outside a closed enumeration.
    #[error("{field}: '{value}' not in [{}]", .allowed.join(", "))]
    InvalidEnumValue {
        field: String,
        value: String,
        allowed: Vec<String>,
    },

    /// Non-numeric, non-finite or non-positive number.
    #[error("{field}: invalid positive number '{value}'")]
    InvalidNumber { field: String, value: String },

    /// Date/time that no supported layout could parse.
    #[error("{field}: invalid time format '{value}'")]
    InvalidDateTime { field: String, value: String },

    /// Gender outside All/Male/Female.
    #[error("Gender: '{value}' invalid")]
    InvalidGender { value: String },

    /// Age Min greater than Age Max.
    #[error("Invalid age range: Age Min ({min}) must be <= Age Max ({max})")]
    InvalidAgeRange { min: i64, max: i64 },

    /// Tracking parameters without `=` or `utm_`.
    #[error("URL Tags: '{value}' must be key=value pairs containing utm_ parameters")]
    InvalidTrackingFormat { value: String },
}

impl RowError {
    /// Stable name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInputLevel { .. } => "InvalidInputLevel",
            Self::InvalidEnumValue { .. } => "InvalidEnumValue",
            Self::InvalidNumber { .. } => "InvalidNumber",
            Self::InvalidDateTime { .. } => "InvalidDateTime",
            Self::InvalidGender { .. } => "InvalidGender",
            Self::InvalidAgeRange { .. } => "InvalidAgeRange",
            Self::InvalidTrackingFormat { .. } => "InvalidTrackingFormat",
        }
    }
}

// =============================================================================
// CSV Parsing Errors
// =============================================================================

/// Errors during CSV parsing.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Malformed record.
    #[error("Invalid CSV format at line {line}: {message}")]
    ParseError { line: u64, message: String },

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,
}

impl From<csv::Error> for CsvError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        CsvError::ParseError {
            line,
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Profile Errors
// =============================================================================

/// Errors while loading a mapping profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// Unknown built-in profile name.
    #[error("Unknown profile '{0}' (built-in profiles: revised, legacy)")]
    UnknownBuiltin(String),

    /// Profile does not match the embedded schema.
    #[error("Profile failed schema validation: {}", .errors.join("; "))]
    SchemaError { errors: Vec<String> },

    /// IO error.
    #[error("Profile IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error.
    #[error("Profile JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// Row validation failures never surface here; they are part of the
/// successful [`crate::transform::pipeline::PipelineResult`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// CSV parsing error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Profile error.
    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    /// Failed to encode an output table.
    #[error("Export error: {0}")]
    Export(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No rows to transform.
    #[error("No rows to transform")]
    EmptyInput,
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Rows failed validation, export refused.
    #[error("{0} row(s) failed validation")]
    Unprocessable(usize),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for single-field validation.
pub type RowResult<T> = Result<T, RowError>;

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for profile operations.
pub type ProfileResult<T> = Result<T, ProfileError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
