//! Extension identifiers and download requests.

use std::fmt;
use std::str::FromStr;

use super::error::ManifestError;
use super::platform::Platform;

/// Publisher-qualified extension identifier, `publisher.name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExtensionId {
    publisher: String,
    name: String,
}

impl ExtensionId {
    /// Create an identifier from its parts.
    pub fn new(publisher: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            publisher: publisher.into(),
            name: name.into(),
        }
    }

    /// The publisher part (before the first dot).
    pub fn publisher(&self) -> &str {
        &self.publisher
    }

    /// The extension name part (after the first dot).
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FromStr for ExtensionId {
    type Err = ManifestError;

    /// Parse `publisher.name`, splitting on the first dot.
    ///
    /// # Examples
    ///
    /// ```
    /// use vsixfetch::ExtensionId;
    ///
    /// let id: ExtensionId = "ms-vscode.cpptools.extra".parse().unwrap();
    /// assert_eq!(id.publisher(), "ms-vscode");
    /// assert_eq!(id.name(), "cpptools.extra");
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((publisher, name)) if !publisher.is_empty() && !name.is_empty() => {
                Ok(Self::new(publisher, name))
            }
            _ => Err(ManifestError::InvalidId { id: s.to_string() }),
        }
    }
}

impl fmt::Display for ExtensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.publisher, self.name)
    }
}

/// A validated request for one extension.
///
/// No version means "latest"; no platforms means the universal build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionRequest {
    /// Extension identifier.
    pub id: ExtensionId,
    /// Pinned version, if any.
    pub version: Option<String>,
    /// Requested platform tags.
    pub platforms: Vec<Platform>,
}

impl ExtensionRequest {
    /// Request the latest universal build.
    pub fn latest(id: ExtensionId) -> Self {
        Self {
            id,
            version: None,
            platforms: Vec::new(),
        }
    }

    /// Request an exact version.
    pub fn pinned(id: ExtensionId, version: impl Into<String>) -> Self {
        Self {
            id,
            version: Some(version.into()),
            platforms: Vec::new(),
        }
    }

    /// Restrict the request to the given platforms.
    pub fn with_platforms(mut self, platforms: impl IntoIterator<Item = Platform>) -> Self {
        self.platforms = platforms.into_iter().collect();
        self
    }

    /// Whether an exact version was requested.
    pub fn is_pinned(&self) -> bool {
        self.version.is_some()
    }

    /// Whether specific platforms were requested.
    pub fn wants_platforms(&self) -> bool {
        !self.platforms.is_empty()
    }
}
