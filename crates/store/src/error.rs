use std::path::PathBuf;

use candidates_core::sheet::SheetError;

/// Errors raised by the persistence backends.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The data file exists but could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The data file could not be written or replaced.
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Records could not be encoded as JSON.
    #[error("Failed to encode candidates: {0}")]
    Encode(#[from] serde_json::Error),

    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The spreadsheet API returned a non-2xx status code.
    #[error("Sheets API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The sheet's rows do not match the expected shape.
    #[error("Sheet data rejected: {0}")]
    Sheet(#[from] SheetError),

    /// Signing or exchanging the service-account assertion failed.
    #[error("Service account token error: {0}")]
    Token(String),

    /// The configured API base URL is malformed.
    #[error("Invalid sheets API URL: {0}")]
    InvalidUrl(String),

    /// The operation needs service-account credentials that are not configured.
    #[error("Sheets service account is not configured")]
    NotConfigured,
}
