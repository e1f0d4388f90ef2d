//! Declarative extension manifest.
//!
//! The manifest lists the extensions to download, one INI section per
//! extension identifier:
//!
//! ```ini
//! [ms-python.python]
//! version = 2024.2.0
//! platforms = linux-x64, darwin-arm64
//!
//! [esbenp.prettier-vscode]
//! ```
//!
//! `version` pins an exact release (omit it for the latest), `platforms`
//! selects platform-specific builds (omit it for the universal build).
//! Section order is preserved.

mod error;
mod platform;
mod request;

pub use error::ManifestError;
pub use platform::{Platform, KNOWN_PLATFORMS};
pub use request::{ExtensionId, ExtensionRequest};

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use ini::{Ini, Properties};

/// Manifest key holding the pinned version.
const KEY_VERSION: &str = "version";

/// Manifest key holding the comma-separated platform list.
const KEY_PLATFORMS: &str = "platforms";

/// A validated, ordered list of extension requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    extensions: Vec<ExtensionRequest>,
}

impl Manifest {
    /// Load and validate a manifest file.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse and validate manifest content.
    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        let ini = Ini::load_from_str(content).map_err(|e| ManifestError::Parse(e.to_string()))?;

        let mut requests = Vec::new();
        let sections = ini
            .iter()
            .filter(|(section, props)| section.is_some() || !props.is_empty());

        for (index, (section, props)) in sections.enumerate() {
            let Some(section) = section else {
                return Err(ManifestError::Parse(
                    "properties outside of an extension section".to_string(),
                ));
            };
            requests.push(parse_section(index, section, props)?);
        }

        Self::from_requests(requests)
    }

    /// Build a manifest from already-constructed requests, validating them.
    pub fn from_requests(extensions: Vec<ExtensionRequest>) -> Result<Self, ManifestError> {
        let manifest = Self { extensions };
        manifest.validate()?;
        Ok(manifest)
    }

    /// Check the manifest: at least one extension, complete identifiers,
    /// non-blank pinned versions, unique identifiers and only known platform
    /// tags.
    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.extensions.is_empty() {
            return Err(ManifestError::Empty);
        }

        let mut seen = HashSet::new();
        for request in &self.extensions {
            if request.id.publisher().trim().is_empty() || request.id.name().trim().is_empty() {
                return Err(ManifestError::InvalidId {
                    id: request.id.to_string(),
                });
            }
            if matches!(&request.version, Some(v) if v.trim().is_empty()) {
                return Err(ManifestError::EmptyVersion {
                    id: request.id.to_string(),
                });
            }
            if !seen.insert(&request.id) {
                return Err(ManifestError::Duplicate {
                    id: request.id.to_string(),
                });
            }
            if let Some(platform) = request.platforms.iter().find(|p| !p.is_known()) {
                return Err(ManifestError::InvalidPlatform {
                    id: request.id.to_string(),
                    platform: platform.to_string(),
                });
            }
        }

        Ok(())
    }

    /// The requests, in manifest order.
    pub fn extensions(&self) -> &[ExtensionRequest] {
        &self.extensions
    }

    /// Consume the manifest, returning its requests.
    pub fn into_requests(self) -> Vec<ExtensionRequest> {
        self.extensions
    }

    /// Number of extensions listed.
    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    /// Always false for a validated manifest.
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

fn parse_section(
    index: usize,
    section: &str,
    props: &Properties,
) -> Result<ExtensionRequest, ManifestError> {
    let raw_id = section.trim();
    if raw_id.is_empty() {
        return Err(ManifestError::MissingId { index });
    }
    let id: ExtensionId = raw_id.parse()?;

    for (key, _) in props.iter() {
        if key != KEY_VERSION && key != KEY_PLATFORMS {
            tracing::warn!(extension = %id, key, "Ignoring unknown manifest key");
        }
    }

    let version = props
        .get(KEY_VERSION)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    let mut platforms = Vec::new();
    if let Some(raw) = props.get(KEY_PLATFORMS) {
        for tag in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let platform = Platform::known(tag).ok_or_else(|| ManifestError::InvalidPlatform {
                id: id.to_string(),
                platform: tag.to_string(),
            })?;
            platforms.push(platform);
        }
    }

    Ok(ExtensionRequest {
        id,
        version,
        platforms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest() {
        let manifest = Manifest::parse(
            "[ms-python.python]\n\
             version = 2024.2.0\n\
             platforms = linux-x64, darwin-arm64\n\
             \n\
             [esbenp.prettier-vscode]\n",
        )
        .unwrap();

        assert_eq!(manifest.len(), 2);
        let python = &manifest.extensions()[0];
        assert_eq!(python.id.to_string(), "ms-python.python");
        assert_eq!(python.version.as_deref(), Some("2024.2.0"));
        assert_eq!(
            python.platforms,
            vec![Platform::from("linux-x64"), Platform::from("darwin-arm64")]
        );

        let prettier = &manifest.extensions()[1];
        assert_eq!(prettier.id.to_string(), "esbenp.prettier-vscode");
        assert!(!prettier.is_pinned());
        assert!(!prettier.wants_platforms());
    }

    #[test]
    fn test_blank_version_means_latest() {
        let manifest = Manifest::parse("[a.b]\nversion =\nplatforms = ,\n").unwrap();
        let request = &manifest.extensions()[0];
        assert!(!request.is_pinned());
        assert!(!request.wants_platforms());
    }

    #[test]
    fn test_empty_manifest_rejected() {
        assert!(matches!(
            Manifest::parse("; nothing here\n"),
            Err(ManifestError::Empty)
        ));
    }

    #[test]
    fn test_invalid_identifier_rejected() {
        assert!(matches!(
            Manifest::parse("[prettier]\n"),
            Err(ManifestError::InvalidId { .. })
        ));
    }

    #[test]
    fn test_invalid_platform_rejected() {
        let err = Manifest::parse("[a.b]\nplatforms = linux-x64, plan9-x64\n").unwrap_err();
        match err {
            ManifestError::InvalidPlatform { id, platform } => {
                assert_eq!(id, "a.b");
                assert_eq!(platform, "plan9-x64");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_properties_outside_section_rejected() {
        assert!(matches!(
            Manifest::parse("version = 1.0.0\n[a.b]\n"),
            Err(ManifestError::Parse(_))
        ));
    }

    #[test]
    fn test_duplicate_requests_rejected() {
        let id = ExtensionId::new("a", "b");
        let err = Manifest::from_requests(vec![
            ExtensionRequest::latest(id.clone()),
            ExtensionRequest::pinned(id, "1.0.0"),
        ])
        .unwrap_err();
        assert!(matches!(err, ManifestError::Duplicate { id } if id == "a.b"));
    }

    #[test]
    fn test_from_requests_checks_platforms() {
        let request = ExtensionRequest::latest(ExtensionId::new("a", "b"))
            .with_platforms([Platform::new("beos-x86")]);
        assert!(matches!(
            Manifest::from_requests(vec![request]),
            Err(ManifestError::InvalidPlatform { .. })
        ));
    }

    #[test]
    fn test_from_requests_rejects_blank_pin() {
        let request = ExtensionRequest::pinned(ExtensionId::new("a", "b"), "");
        assert!(matches!(
            Manifest::from_requests(vec![request]),
            Err(ManifestError::EmptyVersion { ref id }) if id == "a.b"
        ));

        let request = ExtensionRequest::pinned(ExtensionId::new("a", "b"), "  ");
        assert!(matches!(
            Manifest::from_requests(vec![request]),
            Err(ManifestError::EmptyVersion { .. })
        ));
    }

    #[test]
    fn test_from_requests_rejects_incomplete_id() {
        for id in [ExtensionId::new("", "b"), ExtensionId::new("a", " ")] {
            assert!(matches!(
                Manifest::from_requests(vec![ExtensionRequest::latest(id)]),
                Err(ManifestError::InvalidId { .. })
            ));
        }
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Manifest::load(&dir.path().join("missing.ini")).unwrap_err();
        assert!(matches!(err, ManifestError::Read { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extensions.ini");
        std::fs::write(&path, "[rust-lang.rust-analyzer]\nplatforms = linux-x64\n").unwrap();

        let manifest = Manifest::load(&path).unwrap();
        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.into_requests()[0].platforms.len(), 1);
    }
}
