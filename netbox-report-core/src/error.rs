//! Error types for the report pipeline.
//!
//! [`ReportError`] wraps the stage errors so the pipeline can use `?`
//! throughout and the CLI can surface a single message.

use std::path::PathBuf;

/// Failure while talking to the NetBox API.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("NetBox API error {status} for {url}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("could not decode NetBox response from {url}: {message}")]
    Decode { url: String, message: String },
}

/// Top-level error returned by the report pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("failed to build spreadsheet: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("failed to write report to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
