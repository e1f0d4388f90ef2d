//! Error types for manifest loading and validation.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or validating a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("reading manifest {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    /// The manifest is not valid INI.
    #[error("parsing manifest: {0}")]
    Parse(String),

    /// The manifest lists no extensions.
    #[error("manifest: no extensions defined")]
    Empty,

    /// An extension section has a blank identifier.
    #[error("manifest: extension {index} has no id")]
    MissingId { index: usize },

    /// An identifier is not in `publisher.name` form.
    #[error("manifest: extension {id:?} must be in publisher.name format")]
    InvalidId { id: String },

    /// A pinned version is blank.
    #[error("manifest: extension {id:?} pins an empty version")]
    EmptyVersion { id: String },

    /// The same identifier is listed twice.
    #[error("manifest: duplicate extension {id:?}")]
    Duplicate { id: String },

    /// A requested platform tag is not one the gallery publishes.
    #[error("manifest: extension {id:?} has invalid platform {platform:?}")]
    InvalidPlatform { id: String, platform: String },
}
