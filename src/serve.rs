//! Optional Axum routes: the PDF export endpoint, the stylesheet and the
//! copy-button script.
//!
//! Enable with `features = ["axum"]` in Cargo.toml.
//!
//! # Usage
//!
//! ```ignore
//! let state = blogmark::serve::ExportState::new(ContentStore::new("content"), PdfConfig::default());
//! let app = blogmark::serve::router(state);
//! ```

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde_json::{Value, json};
use tracing::{error, info, warn};

use crate::BLOGMARK_CSS;
use crate::copy::COPY_SCRIPT;
use crate::content::ContentStore;
use crate::error::ExportError;
use crate::render_pdf::{PdfConfig, export_markdown};

pub const EXPORT_PATH: &str = "/api/markdown-to-pdf";
pub const CSS_PATH: &str = "/static/css/blogmark.css";
pub const COPY_JS_PATH: &str = "/static/js/blogmark-copy.js";

#[derive(Debug, Clone)]
struct Inner {
    store: ContentStore,
    default_dir: Option<String>,
    pdf: PdfConfig,
}

/// Shared state of the export endpoint.
#[derive(Debug, Clone)]
pub struct ExportState(Arc<Inner>);

impl ExportState {
    pub fn new(store: ContentStore, pdf: PdfConfig) -> Self {
        Self(Arc::new(Inner {
            store,
            default_dir: None,
            pdf,
        }))
    }

    /// Directory used when a request does not name one.
    pub fn with_default_dir(self, dir: Option<String>) -> Self {
        let inner = Arc::unwrap_or_clone(self.0);
        Self(Arc::new(Inner { default_dir: dir, ..inner }))
    }
}

/// Router with the export endpoint and the static asset routes.
pub fn router(state: ExportState) -> Router {
    Router::new()
        .route(EXPORT_PATH, post(export_pdf))
        .route(CSS_PATH, get(blogmark_css))
        .route(COPY_JS_PATH, get(blogmark_copy_js))
        .with_state(state)
}

/// `POST /api/markdown-to-pdf` with `{ "filename": "...", "directory": "..." }`.
///
/// Responds with the PDF as an attachment, or `{ "error": "..." }` and a
/// 400/404/500 status.
pub async fn export_pdf(State(state): State<ExportState>, body: Bytes) -> Response {
    let (filename, directory) = match parse_request(&body) {
        Ok(req) => req,
        Err(err) => return error_response(&err),
    };
    let directory = directory.or_else(|| state.0.default_dir.clone());

    match export_markdown(&state.0.store, &filename, directory.as_deref(), &state.0.pdf).await {
        Ok(pdf) => {
            info!(filename = %filename, bytes = pdf.len(), "served pdf export");
            pdf_response(&filename, pdf)
        }
        Err(err) => error_response(&err),
    }
}

fn parse_request(body: &[u8]) -> Result<(String, Option<String>), ExportError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ExportError::InvalidInput(format!("malformed JSON body: {e}")))?;

    let filename = match value.get("filename") {
        Some(Value::String(name)) if !name.trim().is_empty() => name.clone(),
        _ => return Err(ExportError::InvalidInput("filename missing or not a string".into())),
    };
    let directory = match value.get("directory") {
        None | Some(Value::Null) => None,
        Some(Value::String(dir)) => Some(dir.clone()),
        Some(_) => return Err(ExportError::InvalidInput("directory is not a string".into())),
    };
    Ok((filename, directory))
}

fn pdf_response(filename: &str, pdf: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(filename)),
            (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate".to_string()),
        ],
        pdf,
    )
        .into_response()
}

/// `attachment; filename="<name>.pdf"`, with characters that would break
/// the quoted string dropped.
fn content_disposition(filename: &str) -> String {
    let name: String = filename
        .chars()
        .filter(|c| !matches!(c, '"' | '\\') && !c.is_control())
        .collect();
    format!("attachment; filename=\"{name}.pdf\"")
}

fn error_response(err: &ExportError) -> Response {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if err.is_client_error() {
        warn!(error = %err, status = status.as_u16(), "rejected pdf export");
    } else {
        error!(error = %err, "pdf export failed");
    }
    (status, Json(json!({ "error": err.public_message() }))).into_response()
}

/// Serve the blogmark stylesheet with correct Content-Type and cache headers.
pub async fn blogmark_css() -> Response {
    static_response("text/css; charset=utf-8", BLOGMARK_CSS)
}

/// Serve the script that drives the code block copy buttons.
pub async fn blogmark_copy_js() -> Response {
    static_response("text/javascript; charset=utf-8", COPY_SCRIPT)
}

fn static_response(content_type: &'static str, body: &'static str) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, "public, max-age=86400"),
        ],
        body,
    )
        .into_response()
}
