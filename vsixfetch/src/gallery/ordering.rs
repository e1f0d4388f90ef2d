//! Ordering of version entries.
//!
//! The resolver treats the first entry of a [`QueryResult`](super::QueryResult)
//! as the newest build. By default that is the gallery's own ordering, which
//! is never checked locally; [`VersionOrder::Semver`] re-sorts entries by
//! semantic version instead.

use std::cmp::Ordering;
use std::str::FromStr;

use semver::Version;

use super::result::VersionEntry;

/// How entries are ordered before the resolver sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersionOrder {
    /// Keep the gallery's order.
    #[default]
    Server,
    /// Sort newest first by semantic version. The sort is stable; entries
    /// whose version does not parse keep their relative order after all
    /// parsable ones.
    Semver,
}

impl VersionOrder {
    /// Reorder `entries` in place.
    pub fn apply(&self, entries: &mut Vec<VersionEntry>) {
        if *self == Self::Server {
            return;
        }

        let mut keyed: Vec<(Option<Version>, VersionEntry)> = entries
            .drain(..)
            .map(|entry| (Version::parse(&entry.version).ok(), entry))
            .collect();

        keyed.sort_by(|(a, _), (b, _)| match (a, b) {
            (Some(a), Some(b)) => b.cmp(a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });

        entries.extend(keyed.into_iter().map(|(_, entry)| entry));
    }
}

impl FromStr for VersionOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "server" => Ok(Self::Server),
            "semver" => Ok(Self::Semver),
            other => Err(format!(
                "unknown version order {other:?} (expected server or semver)"
            )),
        }
    }
}
