//! HTTP server for the bulkmap API.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                               |
//! |--------|-------------------|-------------------------------------------|
//! | GET    | `/health`         | Health check                              |
//! | POST   | `/api/upload`     | Upload simple-mode CSV, get mapped JSON   |
//! | POST   | `/api/transform`  | Transform JSON rows                       |
//! | POST   | `/api/export`     | Upload CSV, download bulk-import CSV      |
//! | GET    | `/api/template`   | Download the input template               |
//! | GET    | `/api/logs`       | SSE stream for real-time logs             |

use axum::{
    extract::{Multipart, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, log_info, LOG_BROADCASTER};
use super::types::{error_response, TransformRequest, TransformResponse};
use crate::error::{PipelineError, ServerError, ServerResult};
use crate::parser::{input_template_csv, mapped_table_to_csv};
use crate::transform::pipeline::{transform_bytes, transform_records, TransformOptions};
use crate::transform::MappingProfile;

/// Environment variable for the listening port.
pub const PORT_ENV: &str = "BULKMAP_PORT";

pub const DEFAULT_PORT: u16 = 3000;

/// Shared handler state: the server-wide transform defaults.
#[derive(Debug, Clone)]
struct AppState {
    options: Arc<TransformOptions>,
}

impl AppState {
    /// Server defaults, with the profile overridden per request when given.
    ///
    /// Requests may only name built-in profiles; profile files are an
    /// operator setting chosen at `serve` time.
    fn options_for(&self, profile: Option<String>) -> ServerResult<TransformOptions> {
        match profile.filter(|p| !p.trim().is_empty()) {
            Some(profile) => {
                if MappingProfile::builtin(&profile).is_err() {
                    return Err(ServerError::BadRequest(format!(
                        "Unknown profile (built-in profiles: {})",
                        MappingProfile::builtin_names().join(", ")
                    )));
                }
                Ok((*self.options).clone().with_profile(profile.trim()))
            }
            None => Ok((*self.options).clone()),
        }
    }
}

/// Port from `BULKMAP_PORT`, or the default.
pub fn port_from_env() -> u16 {
    std::env::var(PORT_ENV)
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

/// Build the router.
pub fn router(options: TransformOptions) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    let state = AppState {
        options: Arc::new(options),
    };

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/upload", post(upload_csv))
        .route("/api/transform", post(transform_json))
        .route("/api/export", post(export_csv))
        .route("/api/template", get(template))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(port: u16, options: TransformOptions) -> ServerResult<()> {
    let app = router(options);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    eprintln!("🚀 Bulkmap server running on http://localhost:{}", port);
    eprintln!("   POST /api/upload    - Upload simple-mode CSV");
    eprintln!("   POST /api/transform - Transform JSON rows");
    eprintln!("   POST /api/export    - Download bulk-import CSV");
    eprintln!("   GET  /api/template  - Input template");
    eprintln!("   GET  /api/logs      - SSE log stream");
    eprintln!("   GET  /health        - Health check");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Internal(format!("bind {}: {}", addr, e)))?;
    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?;

    Ok(())
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::Pipeline(PipelineError::Csv(_))
            | ServerError::Pipeline(PipelineError::Profile(_))
            | ServerError::Pipeline(PipelineError::EmptyInput) => StatusCode::BAD_REQUEST,
            ServerError::Pipeline(_) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        log_error(format!("Request failed: {}", self));
        (status, Json(error_response(&self.to_string()))).into_response()
    }
}

/// Health check endpoint
async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "bulkmap",
        "version": env!("CARGO_PKG_VERSION"),
        "profile": state.options.profile,
        "endpoints": {
            "upload": "POST /api/upload",
            "transform": "POST /api/transform",
            "export": "POST /api/export",
            "template": "GET /api/template",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    // Lagged receivers skip the entries they missed.
    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Uploaded CSV plus the optional `profile` form field.
struct Upload {
    file_name: Option<String>,
    bytes: Vec<u8>,
    profile: Option<String>,
}

async fn read_upload(mut multipart: Multipart) -> ServerResult<Upload> {
    let mut bytes: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut profile: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                file_name = field.file_name().map(|s| s.to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
                bytes = Some(data.to_vec());
            }
            "profile" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
                profile = Some(text);
            }
            _ => {}
        }
    }

    let bytes = bytes.ok_or_else(|| ServerError::BadRequest("No file provided".to_string()))?;
    log_info(format!(
        "📄 Upload: {} ({} bytes)",
        file_name.as_deref().unwrap_or("unknown"),
        bytes.len()
    ));

    Ok(Upload {
        file_name,
        bytes,
        profile,
    })
}

/// Upload CSV endpoint
async fn upload_csv(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ServerResult<Json<TransformResponse>> {
    let upload = read_upload(multipart).await?;
    let options = state.options_for(upload.profile)?;
    let result = transform_bytes(&upload.bytes, &options)?;
    Ok(Json(TransformResponse::from(result)))
}

/// JSON rows endpoint
async fn transform_json(
    State(state): State<AppState>,
    Json(request): Json<TransformRequest>,
) -> ServerResult<Json<TransformResponse>> {
    log_info(format!("📄 JSON transform: {} rows", request.rows.len()));
    let rows = request.input_rows();
    let options = state.options_for(request.profile)?;
    let result = transform_records(rows, &options)?;
    Ok(Json(TransformResponse::from(result)))
}

/// Bulk-import CSV download. Refused with 422 and the error table when any
/// row failed.
async fn export_csv(State(state): State<AppState>, multipart: Multipart) -> ServerResult<Response> {
    let upload = read_upload(multipart).await?;
    let options = state.options_for(upload.profile)?;
    let result = transform_bytes(&upload.bytes, &options)?;

    if !result.output.is_clean() {
        let refusal = ServerError::Unprocessable(result.output.errors.len());
        log_error(refusal.to_string());
        let mut body = error_response(&refusal.to_string());
        body["errors"] = serde_json::to_value(&result.output.errors.errors)
            .map_err(|e| ServerError::Internal(e.to_string()))?;
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response());
    }

    let bytes = mapped_table_to_csv(&result.output.mapped)?;
    let stem = upload
        .file_name
        .as_deref()
        .and_then(|n| n.rsplit_once('.').map(|(stem, _)| stem).or(Some(n)))
        .filter(|s| !s.is_empty())
        .unwrap_or("campaigns");
    Ok(csv_download(bytes, &format!("{}_bulk_import.csv", stem)))
}

/// Input template download
async fn template() -> ServerResult<Response> {
    let bytes = input_template_csv()?;
    Ok(csv_download(bytes, "simple_mode_template.csv"))
}

fn csv_download(bytes: Vec<u8>, file_name: &str) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", file_name.replace('"', ""));
    let mut response = (
        [(header::CONTENT_TYPE, HeaderValue::from_static("text/csv; charset=utf-8"))],
        bytes,
    )
        .into_response();
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        response.headers_mut().insert(header::CONTENT_DISPOSITION, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_override() {
        let state = AppState {
            options: Arc::new(TransformOptions::default()),
        };
        assert_eq!(state.options_for(None).unwrap().profile, "revised");
        assert_eq!(state.options_for(Some("  ".into())).unwrap().profile, "revised");
        assert_eq!(state.options_for(Some("legacy".into())).unwrap().profile, "legacy");
    }

    #[test]
    fn test_request_cannot_load_profile_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.json");
        std::fs::write(&path, r#"{"db_password":"hunter2"}"#).unwrap();

        let state = AppState {
            options: Arc::new(TransformOptions::default()),
        };
        let err = state
            .options_for(Some(path.to_string_lossy().into_owned()))
            .unwrap_err();

        assert!(matches!(err, ServerError::BadRequest(_)));
        let message = err.to_string();
        assert!(!message.contains("db_password"));
        assert!(!message.contains("secrets.json"));
    }

    #[test]
    fn test_error_status_codes() {
        let bad = ServerError::BadRequest("x".into()).into_response();
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

        let empty = ServerError::Pipeline(PipelineError::EmptyInput).into_response();
        assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

        let refused = ServerError::Unprocessable(2).into_response();
        assert_eq!(refused.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let export = ServerError::Pipeline(PipelineError::Export("x".into())).into_response();
        assert_eq!(export.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_csv_download_headers() {
        let response = csv_download(b"a,b\n".to_vec(), "out.csv");
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/csv; charset=utf-8"
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"out.csv\""
        );
    }
}
