//! Error types for the export pipeline.

use thiserror::Error;

/// Errors that can occur while exporting the wiki calendar.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse query response as JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for export operations.
pub type ExportResult<T> = Result<T, ExportError>;
