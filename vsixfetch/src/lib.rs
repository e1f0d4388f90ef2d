//! vsixfetch - VS Code extension downloader
//!
//! This library resolves a declarative list of extensions against the
//! marketplace gallery and downloads the matching `.vsix` packages for
//! offline installation.
//!
//! # Architecture
//!
//! ```text
//! Manifest (extensions.ini)
//!         │
//!         ▼
//! GalleryClient::query ── one query per extension, retried with backoff
//!         │
//!         ▼
//! resolve ── pinned / latest / per-platform selection + FallbackPolicy
//!         │
//!         ▼
//! FetchEngine::fetch_all ── bounded concurrent downloads to disk
//! ```

pub mod config;
pub mod fetch;
pub mod gallery;
pub mod logging;
pub mod manifest;
pub mod resolve;
pub mod target;

use std::future::Future;
use std::pin::Pin;

pub use config::{ConfigError, ConfigFile};
pub use fetch::{ArtifactFetcher, FetchEngine, FetchError, FetchSummary, HttpFetcher};
pub use gallery::{GalleryClient, GalleryEndpoints, GalleryError, PackageQuery, QueryResult};
pub use manifest::{ExtensionId, ExtensionRequest, Manifest, ManifestError, Platform};
pub use resolve::{resolve, resolve_all, FallbackPolicy};
pub use target::Target;

/// Library version, as declared in Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Boxed future type for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Maximum number of characters of an error response body kept for context.
pub(crate) const MAX_ERROR_BODY_CHARS: usize = 200;

/// Truncate `s` to at most `max` characters, appending `...` when cut.
pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
