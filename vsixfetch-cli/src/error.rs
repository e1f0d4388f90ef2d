//! CLI error type.

use std::fmt;

use vsixfetch::logging::LoggingError;
use vsixfetch::{ConfigError, FetchError, GalleryError, ManifestError};

/// Errors surfaced to the user by `main`.
#[derive(Debug)]
pub enum CliError {
    /// Invalid configuration or arguments.
    Config(String),
    Manifest(ManifestError),
    Gallery(GalleryError),
    Fetch(FetchError),
    Logging(LoggingError),
    /// The async runtime or signal handler could not be set up.
    Runtime(String),
    /// Interrupted by Ctrl-C before downloads started.
    Interrupted,
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "{}", msg),
            CliError::Manifest(e) => write!(f, "{}", e),
            CliError::Gallery(e) => write!(f, "{}", e),
            CliError::Fetch(e) => write!(f, "{}", e),
            CliError::Logging(e) => write!(f, "{}", e),
            CliError::Runtime(msg) => write!(f, "{}", msg),
            CliError::Interrupted => write!(f, "interrupted"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Manifest(e) => Some(e),
            CliError::Gallery(e) => Some(e),
            CliError::Fetch(e) => Some(e),
            CliError::Logging(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<ManifestError> for CliError {
    fn from(e: ManifestError) -> Self {
        CliError::Manifest(e)
    }
}

impl From<GalleryError> for CliError {
    fn from(e: GalleryError) -> Self {
        CliError::Gallery(e)
    }
}

impl From<FetchError> for CliError {
    fn from(e: FetchError) -> Self {
        CliError::Fetch(e)
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}
