//! Error types for package downloads.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while downloading packages.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The destination directory could not be created.
    #[error("creating output dir {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request failed or the body could not be read.
    #[error("downloading {filename}: {source}")]
    Request {
        filename: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status.
    #[error("downloading {filename}: HTTP {status}: {body}")]
    Status {
        filename: String,
        status: u16,
        body: String,
    },

    /// Writing the destination file failed.
    #[error("writing {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The download was cancelled.
    #[error("download cancelled")]
    Cancelled,

    /// A download task panicked or was aborted.
    #[error("download task failed: {0}")]
    Task(String),
}

impl FetchError {
    /// Whether this error is the result of cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
