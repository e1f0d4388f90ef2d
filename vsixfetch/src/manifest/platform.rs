//! Target platform tags for platform-specific extension builds.

use std::fmt;

/// Platform tags the marketplace publishes platform-specific builds for.
pub const KNOWN_PLATFORMS: &[&str] = &[
    "win32-x64",
    "win32-arm64",
    "linux-x64",
    "linux-arm64",
    "linux-armhf",
    "alpine-x64",
    "alpine-arm64",
    "darwin-x64",
    "darwin-arm64",
    "web",
];

/// A gallery target platform tag, e.g. `linux-x64`.
///
/// Tags coming back from the gallery are kept verbatim (the server may add
/// platforms before this list learns about them); tags written by users go
/// through [`Platform::known`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Platform(String);

impl Platform {
    /// Wrap a tag without validation.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Parse a user-supplied tag, accepting only [`KNOWN_PLATFORMS`].
    ///
    /// Surrounding whitespace is ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use vsixfetch::Platform;
    ///
    /// assert_eq!(Platform::known(" linux-x64 ").unwrap().as_str(), "linux-x64");
    /// assert!(Platform::known("beos-x86").is_none());
    /// ```
    pub fn known(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        KNOWN_PLATFORMS
            .contains(&tag)
            .then(|| Self(tag.to_string()))
    }

    /// Get the tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this tag is in [`KNOWN_PLATFORMS`].
    pub fn is_known(&self) -> bool {
        KNOWN_PLATFORMS.contains(&self.0.as_str())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Platform {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Platform {
    fn from(s: String) -> Self {
        Self(s)
    }
}
