//! Progress events emitted by the fetch engine.

use std::sync::Arc;

/// A change in the state of one download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchEvent {
    /// A download acquired a slot and started.
    Started { filename: String },
    /// A download completed.
    Finished { filename: String, bytes: u64 },
    /// A download failed.
    Failed { filename: String, error: String },
}

impl FetchEvent {
    /// File the event refers to.
    pub fn filename(&self) -> &str {
        match self {
            Self::Started { filename }
            | Self::Finished { filename, .. }
            | Self::Failed { filename, .. } => filename,
        }
    }
}

/// Callback invoked from download tasks for every [`FetchEvent`].
///
/// Called concurrently from several tasks; must not block.
pub type FetchProgressCallback = Arc<dyn Fn(&FetchEvent) + Send + Sync>;
