//! Error types for content loading and PDF export.

use std::path::PathBuf;

#[cfg(feature = "pdf")]
use crate::render_pdf::PdfError;

/// Message returned to clients for any failure inside the render pipeline.
pub const GENERIC_EXPORT_MESSAGE: &str =
    "An error occurred while generating the PDF. Please try again later.";

/// Failures reading markdown sources from disk.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// The requested id or directory is not a plain relative name.
    #[error("invalid content name {0:?}")]
    InvalidName(String),

    #[error("markdown source not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures of the markdown-to-PDF export operation.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Content(ContentError),

    #[cfg(feature = "pdf")]
    #[error(transparent)]
    Render(#[from] PdfError),
}

impl From<ContentError> for ExportError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::InvalidName(name) => Self::InvalidInput(format!("invalid filename {name:?}")),
            ContentError::NotFound(path) => Self::NotFound(format!(
                "Markdown file {} was not found.",
                path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default()
            )),
            other => Self::Content(other),
        }
    }
}

impl ExportError {
    /// HTTP status equivalent of this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput(_) => 400,
            Self::NotFound(_) => 404,
            Self::Content(_) => 500,
            #[cfg(feature = "pdf")]
            Self::Render(_) => 500,
        }
    }

    /// Text that is safe to show to the requester.
    ///
    /// Internal failures collapse to [`GENERIC_EXPORT_MESSAGE`].
    pub fn public_message(&self) -> String {
        match self {
            Self::InvalidInput(_) => {
                "Invalid filename provided. Please provide a valid filename.".to_string()
            }
            Self::NotFound(msg) => msg.clone(),
            _ => GENERIC_EXPORT_MESSAGE.to_string(),
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}
