//! Resolved download targets.

use std::fmt;

use crate::gallery::GalleryEndpoints;
use crate::manifest::{ExtensionId, Platform};

/// One concrete package to download: identifier, version and optional
/// platform.
///
/// Two targets are equal when all three parts match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    id: ExtensionId,
    version: String,
    platform: Option<Platform>,
}

impl Target {
    /// Create a target.
    pub fn new(id: ExtensionId, version: impl Into<String>, platform: Option<Platform>) -> Self {
        Self {
            id,
            version: version.into(),
            platform,
        }
    }

    /// A target for the universal build.
    pub fn universal(id: ExtensionId, version: impl Into<String>) -> Self {
        Self::new(id, version, None)
    }

    /// A target for a platform-specific build.
    pub fn for_platform(id: ExtensionId, version: impl Into<String>, platform: Platform) -> Self {
        Self::new(id, version, Some(platform))
    }

    pub fn id(&self) -> &ExtensionId {
        &self.id
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn platform(&self) -> Option<&Platform> {
        self.platform.as_ref()
    }

    /// Local file name: `{publisher.name}-{version}[@{platform}].vsix`.
    pub fn filename(&self) -> String {
        match &self.platform {
            Some(platform) => format!("{}-{}@{}.vsix", self.id, self.version, platform),
            None => format!("{}-{}.vsix", self.id, self.version),
        }
    }

    /// Package download URL under `endpoints`.
    pub fn url(&self, endpoints: &GalleryEndpoints) -> String {
        endpoints.package_url(&self.id, &self.version, self.platform.as_ref())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.version)?;
        if let Some(platform) = &self.platform {
            write!(f, " ({})", platform)?;
        }
        Ok(())
    }
}
