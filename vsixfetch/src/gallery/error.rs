//! Error types for gallery queries.

use thiserror::Error;

/// Result type for gallery operations.
pub type GalleryResult<T> = Result<T, GalleryError>;

/// A single failed HTTP exchange with the gallery.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, timeout or body transfer failure.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The gallery answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The payload could not be encoded or decoded as JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl TransportError {
    /// Whether retrying the exchange could plausibly succeed.
    ///
    /// Server errors, request timeouts (408), throttling (429) and transport
    /// failures are transient; other 4xx responses and malformed payloads
    /// are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Status { status, .. } => *status >= 500 || *status == 408 || *status == 429,
            Self::Json(_) => false,
        }
    }
}

/// Errors surfaced by the gallery client and the resolver pipeline.
#[derive(Debug, Error)]
pub enum GalleryError {
    /// The query failed after all retry attempts.
    #[error("querying {id}: {source}")]
    Query {
        id: String,
        #[source]
        source: TransportError,
    },

    /// The gallery returned no matching extension.
    #[error("extension {id:?} not found")]
    NotFound { id: String },

    /// Resolving a request failed; wraps the underlying query error.
    #[error("resolving {id}: {source}")]
    Resolve {
        id: String,
        #[source]
        source: Box<GalleryError>,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}
