//! Error types for sampling, export and session setup.

use std::path::PathBuf;

use thiserror::Error;

/// The sensor page did not contain enough readings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected 3 readings in response, found {found}")]
pub struct ParseError {
    /// Number of `<value> <unit>` tokens that were recovered.
    pub found: usize,
}

/// Errors that can occur when fetching a reading from a sample source.
///
/// Every variant is recoverable: the acquisition loop logs it and skips
/// the tick.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The sensor answered with a non-success status.
    #[error("sensor returned status {0}")]
    Status(u16),

    /// Timeout waiting for response.
    #[error("request timed out")]
    Timeout,

    /// Could not read a local page.
    #[error("read error: {0}")]
    Io(#[from] std::io::Error),

    /// The response did not contain a full reading.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = err.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Http(err.to_string())
        }
    }
}

/// Errors raised while writing the final CSV dump or plots.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The target file could not be created or written.
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV serialization failed.
    #[error("failed to write CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The plotting backend failed to draw or encode the image.
    #[error("failed to render {path}: {message}")]
    Plot { path: PathBuf, message: String },
}

/// Errors raised while preparing a run session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The output directory could not be created.
    #[error("error creating directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
