//! REST API types for the web UI.
//!
//! The mapped table is sent as `columns` plus row arrays so the client can
//! render it as a grid without knowing the bulk-import column set.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::models::{ErrorRecord, InputRow};
use crate::transform::pipeline::{PipelineResult, TableStats};

/// Response sent after an upload or a JSON transform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformResponse {
    /// Unique job identifier
    pub job_id: String,

    /// "ready" when every row mapped, "warning" otherwise
    pub status: String,

    /// Profile used for the transform
    pub profile: String,

    /// Canonical bulk-import columns
    pub columns: Vec<String>,

    /// Mapped rows, cells in `columns` order
    pub rows: Vec<Vec<String>>,

    /// Rejected rows
    pub errors: Vec<ErrorRecord>,

    pub stats: TableStats,

    pub csv_info: CsvMetadata,
}

/// CSV file metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvMetadata {
    pub encoding: String,
    pub delimiter: String,
    pub row_count: usize,
    pub columns: Vec<String>,
}

/// Body of `POST /api/transform`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformRequest {
    /// One object per sheet row, keyed by column name
    pub rows: Vec<Map<String, Value>>,

    /// Built-in profile name or profile path; server default when absent
    #[serde(default)]
    pub profile: Option<String>,
}

impl TransformRequest {
    /// Rows numbered from 1 in request order.
    pub fn input_rows(&self) -> Vec<InputRow> {
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(i, cells)| InputRow::from_json(i + 1, &Value::Object(cells.clone())))
            .collect()
    }
}

impl From<PipelineResult> for TransformResponse {
    fn from(result: PipelineResult) -> Self {
        let status = if result.output.is_clean() { "ready" } else { "warning" };
        TransformResponse {
            job_id: Uuid::new_v4().to_string(),
            status: status.to_string(),
            profile: result.profile,
            columns: result.output.mapped.columns,
            rows: result.output.mapped.rows,
            errors: result.output.errors.errors,
            stats: result.stats,
            csv_info: CsvMetadata {
                encoding: result.csv_info.encoding,
                delimiter: result.csv_info.delimiter.to_string(),
                row_count: result.csv_info.row_count,
                columns: result.csv_info.headers,
            },
        }
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
        "columns": [],
        "rows": [],
        "errors": []
    })
}
