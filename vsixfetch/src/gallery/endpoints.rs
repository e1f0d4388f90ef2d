//! Gallery endpoint URLs.

use crate::manifest::{ExtensionId, Platform};

/// Marketplace extension query endpoint.
pub const DEFAULT_QUERY_URL: &str =
    "https://marketplace.visualstudio.com/_apis/public/gallery/extensionquery";

/// Marketplace gallery API root used to build package download URLs.
pub const DEFAULT_DOWNLOAD_BASE: &str = "https://marketplace.visualstudio.com/_apis/public/gallery";

/// Where to send queries and package downloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryEndpoints {
    /// Extension query endpoint (POST).
    pub query_url: String,
    /// Gallery API root for `publishers/.../vspackage` downloads (GET).
    pub download_base: String,
}

impl Default for GalleryEndpoints {
    fn default() -> Self {
        Self::new(DEFAULT_QUERY_URL, DEFAULT_DOWNLOAD_BASE)
    }
}

impl GalleryEndpoints {
    /// Create endpoints; a trailing slash on `download_base` is ignored.
    pub fn new(query_url: impl Into<String>, download_base: impl Into<String>) -> Self {
        let download_base: String = download_base.into();
        Self {
            query_url: query_url.into(),
            download_base: download_base.trim_end_matches('/').to_string(),
        }
    }

    /// Build the package download URL for one extension build.
    ///
    /// # Examples
    ///
    /// ```
    /// use vsixfetch::{ExtensionId, GalleryEndpoints, Platform};
    ///
    /// let endpoints = GalleryEndpoints::new("http://q", "http://g/");
    /// let id = ExtensionId::new("ms-python", "python");
    /// assert_eq!(
    ///     endpoints.package_url(&id, "1.0.0", Some(&Platform::from("linux-x64"))),
    ///     "http://g/publishers/ms-python/vsextensions/python/1.0.0/vspackage?targetPlatform=linux-x64"
    /// );
    /// ```
    pub fn package_url(
        &self,
        id: &ExtensionId,
        version: &str,
        platform: Option<&Platform>,
    ) -> String {
        let mut url = format!(
            "{}/publishers/{}/vsextensions/{}/{}/vspackage",
            self.download_base,
            id.publisher(),
            id.name(),
            version
        );
        if let Some(platform) = platform {
            url.push_str("?targetPlatform=");
            url.push_str(platform.as_str());
        }
        url
    }
}
