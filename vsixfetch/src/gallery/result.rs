//! Query results as seen by the resolver.

use crate::manifest::Platform;

use super::types::ExtensionRecord;

/// One published build of an extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionEntry {
    /// Version string as published.
    pub version: String,
    /// Platform tag; `None` for a universal build.
    pub target_platform: Option<String>,
}

impl VersionEntry {
    /// A universal build.
    pub fn universal(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            target_platform: None,
        }
    }

    /// A platform-specific build.
    pub fn for_platform(version: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            target_platform: Some(platform.into()),
        }
    }

    /// Whether this build has no platform restriction.
    pub fn is_universal(&self) -> bool {
        self.target_platform.is_none()
    }

    /// Whether this build targets `platform`.
    pub fn matches_platform(&self, platform: &Platform) -> bool {
        self.target_platform.as_deref() == Some(platform.as_str())
    }
}

/// Known versions of one extension, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResult {
    /// Publisher name reported by the gallery.
    pub publisher: String,
    /// Extension name reported by the gallery.
    pub name: String,
    /// Published builds, ordered newest first.
    pub versions: Vec<VersionEntry>,
}

impl QueryResult {
    /// Create a result from version entries only.
    pub fn from_versions(versions: Vec<VersionEntry>) -> Self {
        Self {
            versions,
            ..Default::default()
        }
    }

    /// The newest build, if any.
    pub fn newest(&self) -> Option<&VersionEntry> {
        self.versions.first()
    }
}

impl From<ExtensionRecord> for QueryResult {
    /// Entries without a version are dropped; an empty platform tag means
    /// a universal build.
    fn from(record: ExtensionRecord) -> Self {
        let versions = record
            .versions
            .into_iter()
            .filter(|v| !v.version.is_empty())
            .map(|v| VersionEntry {
                version: v.version,
                target_platform: v.target_platform.filter(|p| !p.is_empty()),
            })
            .collect();

        Self {
            publisher: record.publisher.name,
            name: record.extension_name,
            versions,
        }
    }
}
