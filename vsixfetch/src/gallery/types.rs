//! Wire types for the gallery `extensionquery` API.

use serde::{Deserialize, Serialize};

/// Query flags returning only the latest version per target platform.
pub const FLAGS_LATEST: u32 = 0x3D6; // 982

/// Query flags returning every published version, used to find a pinned one.
pub const FLAGS_ALL_VERSIONS: u32 = 0x1D6; // 470

/// Filter type matching an exact `publisher.name` identifier.
pub const FILTER_EXTENSION_NAME: u32 = 7;

/// Query request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryRequest {
    pub filters: Vec<QueryFilter>,
    pub flags: u32,
}

impl QueryRequest {
    /// Build a query for a single extension identifier.
    pub fn for_extension(id: &str, all_versions: bool) -> Self {
        Self {
            filters: vec![QueryFilter {
                criteria: vec![Criterion {
                    filter_type: FILTER_EXTENSION_NAME,
                    value: id.to_string(),
                }],
            }],
            flags: if all_versions {
                FLAGS_ALL_VERSIONS
            } else {
                FLAGS_LATEST
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryFilter {
    pub criteria: Vec<Criterion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Criterion {
    pub filter_type: u32,
    pub value: String,
}

/// Query response body. Missing arrays decode as empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub results: Vec<ResultSet>,
}

impl QueryResponse {
    /// The first extension of the first result set; the rest is ignored.
    pub fn into_first_extension(self) -> Option<ExtensionRecord> {
        self.results
            .into_iter()
            .next()
            .and_then(|set| set.extensions.into_iter().next())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultSet {
    #[serde(default)]
    pub extensions: Vec<ExtensionRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionRecord {
    #[serde(default)]
    pub publisher: PublisherRecord,
    #[serde(default)]
    pub extension_name: String,
    #[serde(default)]
    pub versions: Vec<VersionRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublisherRecord {
    #[serde(rename = "publisherName", alias = "name", default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRecord {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub target_platform: Option<String>,
    #[serde(default)]
    pub files: Vec<FileRecord>,
    #[serde(default)]
    pub properties: Vec<PropertyRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    #[serde(default)]
    pub asset_type: String,
    #[serde(default)]
    pub source: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropertyRecord {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
}
