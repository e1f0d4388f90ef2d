//! Configuration file support.
//!
//! Settings live in an INI file, by default at
//! `~/.config/vsixfetch/config.ini`:
//!
//! ```ini
//! [gallery]
//! query_url = https://marketplace.visualstudio.com/_apis/public/gallery/extensionquery
//! download_base = https://marketplace.visualstudio.com/_apis/public/gallery
//! timeout = 30
//! max_attempts = 3
//! retry_base_delay_ms = 2000
//! retry_scope = all
//! version_order = server
//!
//! [download]
//! output_dir = ./vsix
//! concurrency = 4
//! ```
//!
//! Every key is optional. A missing file yields the defaults.

use std::fmt::Display;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ini::{Ini, Properties};
use thiserror::Error;

use crate::fetch::DEFAULT_CONCURRENCY;
use crate::gallery::{
    GalleryEndpoints, RetryPolicy, RetryScope, VersionOrder, DEFAULT_BASE_DELAY_MS,
    DEFAULT_DOWNLOAD_BASE, DEFAULT_MAX_ATTEMPTS, DEFAULT_QUERY_URL, DEFAULT_TIMEOUT_SECS,
};

/// Directory name under the platform config directory.
const CONFIG_DIR_NAME: &str = "vsixfetch";

/// Config file name.
const CONFIG_FILE_NAME: &str = "config.ini";

/// Default download directory.
pub const DEFAULT_OUTPUT_DIR: &str = "./vsix";

/// Errors from loading the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parsing config: {0}")]
    Parse(String),

    #[error("invalid value {value:?} for {section}.{key}: {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

/// `[gallery]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GallerySettings {
    pub query_url: String,
    pub download_base: String,
    /// Query request timeout in seconds.
    pub timeout: u64,
    pub max_attempts: u32,
    pub retry_base_delay_ms: u64,
    pub retry_scope: RetryScope,
    pub version_order: VersionOrder,
}

impl Default for GallerySettings {
    fn default() -> Self {
        Self {
            query_url: DEFAULT_QUERY_URL.to_string(),
            download_base: DEFAULT_DOWNLOAD_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT_SECS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_base_delay_ms: DEFAULT_BASE_DELAY_MS,
            retry_scope: RetryScope::default(),
            version_order: VersionOrder::default(),
        }
    }
}

/// `[download]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSettings {
    pub output_dir: PathBuf,
    pub concurrency: usize,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub gallery: GallerySettings,
    pub download: DownloadSettings,
}

/// Default config file location, if the platform has a config directory.
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

impl ConfigFile {
    /// Load from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        match config_file_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Self::parse(&content)
    }

    /// Parse config content.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let mut config = Self::default();

        if let Some(section) = ini.section(Some("gallery")) {
            let gallery = &mut config.gallery;
            if let Some(v) = non_empty(section, "query_url") {
                gallery.query_url = v.to_string();
            }
            if let Some(v) = non_empty(section, "download_base") {
                gallery.download_base = v.to_string();
            }
            parse_into(section, "gallery", "timeout", &mut gallery.timeout)?;
            parse_into(section, "gallery", "max_attempts", &mut gallery.max_attempts)?;
            parse_into(
                section,
                "gallery",
                "retry_base_delay_ms",
                &mut gallery.retry_base_delay_ms,
            )?;
            parse_into(section, "gallery", "retry_scope", &mut gallery.retry_scope)?;
            parse_into(section, "gallery", "version_order", &mut gallery.version_order)?;

            if gallery.timeout == 0 {
                return Err(invalid("gallery", "timeout", "0", "must be at least 1"));
            }
            if gallery.max_attempts == 0 {
                return Err(invalid("gallery", "max_attempts", "0", "must be at least 1"));
            }
        }

        if let Some(section) = ini.section(Some("download")) {
            if let Some(v) = non_empty(section, "output_dir") {
                config.download.output_dir = PathBuf::from(v);
            }
            parse_into(section, "download", "concurrency", &mut config.download.concurrency)?;
            if config.download.concurrency == 0 {
                return Err(invalid("download", "concurrency", "0", "must be at least 1"));
            }
        }

        Ok(config)
    }

    /// Gallery endpoints from the `[gallery]` section.
    pub fn endpoints(&self) -> GalleryEndpoints {
        GalleryEndpoints::new(&self.gallery.query_url, &self.gallery.download_base)
    }

    /// Query retry policy from the `[gallery]` section.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.gallery.max_attempts,
            Duration::from_millis(self.gallery.retry_base_delay_ms),
        )
        .with_scope(self.gallery.retry_scope)
    }

    /// Query request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.gallery.timeout)
    }

    /// All settings as `section.key = value` pairs, for display.
    pub fn entries(&self) -> Vec<(String, String)> {
        let scope = match self.gallery.retry_scope {
            RetryScope::AllFailures => "all",
            RetryScope::TransientOnly => "transient",
        };
        let order = match self.gallery.version_order {
            VersionOrder::Server => "server",
            VersionOrder::Semver => "semver",
        };

        [
            ("gallery.query_url", self.gallery.query_url.clone()),
            ("gallery.download_base", self.gallery.download_base.clone()),
            ("gallery.timeout", self.gallery.timeout.to_string()),
            ("gallery.max_attempts", self.gallery.max_attempts.to_string()),
            (
                "gallery.retry_base_delay_ms",
                self.gallery.retry_base_delay_ms.to_string(),
            ),
            ("gallery.retry_scope", scope.to_string()),
            ("gallery.version_order", order.to_string()),
            (
                "download.output_dir",
                self.download.output_dir.display().to_string(),
            ),
            ("download.concurrency", self.download.concurrency.to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }
}

fn non_empty<'a>(section: &'a Properties, key: &str) -> Option<&'a str> {
    section.get(key).map(str::trim).filter(|v| !v.is_empty())
}

fn parse_into<T>(
    section: &Properties,
    section_name: &str,
    key: &str,
    slot: &mut T,
) -> Result<(), ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    if let Some(raw) = non_empty(section, key) {
        *slot = raw
            .parse()
            .map_err(|e: T::Err| invalid(section_name, key, raw, e))?;
    }
    Ok(())
}

fn invalid(section: &str, key: &str, value: &str, reason: impl Display) -> ConfigError {
    ConfigError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
