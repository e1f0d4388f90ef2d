//! Package downloads.
//!
//! ```text
//! Vec<Target> ──► FetchEngine ──► Semaphore (K permits)
//!                     │                 │
//!                     │           ArtifactFetcher::fetch (one task each)
//!                     │                 │
//!                     ▼                 ▼
//!               FetchSummary      dest_dir/{filename}.vsix
//! ```
//!
//! [`HttpFetcher`] performs a single GET per target and streams the body to
//! disk. Non-2xx answers create no file, and a transfer that fails midway
//! removes what it wrote.

mod engine;
mod error;
mod http;
mod progress;

pub use engine::{FetchEngine, FetchSummary, FetchedFile, DEFAULT_CONCURRENCY};
pub use error::FetchError;
pub use http::{ArtifactFetcher, HttpFetcher};
pub use progress::{FetchEvent, FetchProgressCallback};
