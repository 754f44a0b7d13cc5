//! Error types for photo-uploader
//!
//! Two layers of errors exist:
//! - [`Error`] covers failures that abort an operation as a whole (configuration,
//!   discovery, ledger access, album resolution, remote API calls).
//! - [`AddError`] is the per-item outcome recorded in an
//!   [`AddResult`](crate::types::AddResult). It never aborts sibling items.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for photo-uploader operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for photo-uploader
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "upload.batch_size")
        key: Option<String>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Finding upload candidates failed (bad URL, unreadable directory, ...)
    #[error("discovery error: {0}")]
    Discovery(String),

    /// The completion ledger could not be read or written
    #[error("ledger error at {path}: {source}")]
    Ledger {
        /// Path of the ledger file
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The remote API answered with a non-success HTTP status
    #[error("API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code returned by the service
        status: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// Album lookup or creation failed
    #[error("album error: {0}")]
    Album(String),

    /// Nothing left to upload after discovery
    #[error("nothing to upload{0}")]
    NothingToUpload(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error bound to a specific key
    pub fn config(message: impl Into<String>, key: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Wrap an I/O failure on the ledger file
    pub fn ledger(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Ledger {
            path: path.into(),
            source,
        }
    }
}

/// Per-item failure recorded in an add result
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AddError {
    /// Uploading the raw bytes failed, so no token was produced
    #[error("error while upload: {0}")]
    Upload(String),

    /// The whole batch commit call failed
    #[error("error while batch create: {0}")]
    BatchCreate(String),

    /// The service rejected this item inside an otherwise successful batch
    #[error("{message} (code={code})")]
    Status {
        /// Non-zero status code reported for the token
        code: i32,
        /// Status message reported for the token
        message: String,
    },

    /// The commit response carried no entry for this item's token
    #[error("no result returned for upload token")]
    MissingResult,

    /// The worker holding this item stopped before reporting an outcome
    #[error("upload worker exited before reporting a result")]
    WorkerLost,
}
