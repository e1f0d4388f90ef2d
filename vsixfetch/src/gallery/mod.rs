//! Marketplace gallery access.
//!
//! The gallery answers one `extensionquery` POST per extension with the list
//! of published builds. [`GalleryClient`] sends those queries with retry and
//! backoff and normalizes the response into a [`QueryResult`], ordered newest
//! first according to its [`VersionOrder`].
//!
//! The rest of the crate talks to the gallery through the [`PackageQuery`]
//! trait.

mod client;
mod endpoints;
mod error;
mod ordering;
mod result;
mod retry;
mod types;

pub use client::{GalleryClient, PackageQuery, API_VERSION, DEFAULT_TIMEOUT_SECS};
pub use endpoints::{GalleryEndpoints, DEFAULT_DOWNLOAD_BASE, DEFAULT_QUERY_URL};
pub use error::{GalleryError, GalleryResult, TransportError};
pub use ordering::VersionOrder;
pub use result::{QueryResult, VersionEntry};
pub use retry::{RetryPolicy, RetryScope, DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_ATTEMPTS};
pub use types::{QueryRequest, QueryResponse, FLAGS_ALL_VERSIONS, FLAGS_LATEST};
