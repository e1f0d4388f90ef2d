//! Target resolution.
//!
//! Turns each [`ExtensionRequest`] plus the gallery's [`QueryResult`] into
//! the concrete [`Target`]s to download.
//!
//! # Rules
//!
//! Pinned requests (`version` set):
//! - keep entries whose version matches exactly; universal ones when no
//!   platforms were requested, otherwise those for a requested platform
//! - platforms requested but none matched: the universal build of the pinned
//!   version (`universal_fallback`)
//! - still nothing: the pinned version's universal URL, unverified
//!   (`direct_pinned_attempt`); a missing package fails at download time
//!
//! Latest requests:
//! - no platforms: the newest entry, whatever its platform
//! - platforms: the newest entry for each requested platform, skipping
//!   platforms without a build
//! - platforms requested but none matched: the universal build of the newest
//!   version (`universal_fallback`)
//! - an empty version list resolves to nothing

mod policy;

pub use policy::FallbackPolicy;

use std::collections::HashSet;

use crate::gallery::{GalleryError, PackageQuery, QueryResult};
use crate::manifest::{ExtensionRequest, Platform};
use crate::target::Target;

/// Resolve one request against its query result. Pure; never fails.
pub fn resolve(
    request: &ExtensionRequest,
    result: &QueryResult,
    policy: &FallbackPolicy,
) -> Vec<Target> {
    let targets = match &request.version {
        Some(version) => resolve_pinned(request, version, result, policy),
        None => resolve_latest(request, result, policy),
    };
    dedupe(targets)
}

/// Query and resolve every request in order.
///
/// Queries run one at a time. The first failure aborts the whole run and no
/// partial list is returned.
pub async fn resolve_all(
    gallery: &dyn PackageQuery,
    requests: &[ExtensionRequest],
    policy: &FallbackPolicy,
) -> Result<Vec<Target>, GalleryError> {
    let mut targets = Vec::new();

    for request in requests {
        let result = gallery
            .query(&request.id, request.is_pinned())
            .await
            .map_err(|e| GalleryError::Resolve {
                id: request.id.to_string(),
                source: Box::new(e),
            })?;

        let resolved = resolve(request, &result, policy);
        tracing::debug!(
            extension = %request.id,
            versions = result.versions.len(),
            targets = resolved.len(),
            "Resolved extension"
        );
        targets.extend(resolved);
    }

    Ok(targets)
}

fn resolve_pinned(
    request: &ExtensionRequest,
    version: &str,
    result: &QueryResult,
    policy: &FallbackPolicy,
) -> Vec<Target> {
    let matches = result.versions.iter().filter(|e| e.version == version);

    let mut targets: Vec<Target> = if request.wants_platforms() {
        matches
            .filter_map(|entry| {
                request
                    .platforms
                    .iter()
                    .find(|p| entry.matches_platform(p))
                    .map(|p| Target::for_platform(request.id.clone(), version, p.clone()))
            })
            .collect()
    } else {
        matches
            .filter(|e| e.is_universal())
            .map(|_| Target::universal(request.id.clone(), version))
            .collect()
    };

    if targets.is_empty() && request.wants_platforms() && policy.universal_fallback {
        tracing::info!(
            extension = %request.id,
            version,
            "No platform-specific builds found, using universal build"
        );
        targets.push(Target::universal(request.id.clone(), version));
    }

    if targets.is_empty() && policy.direct_pinned_attempt {
        tracing::warn!(
            extension = %request.id,
            version,
            "Version not found in gallery response, attempting direct download"
        );
        targets.push(Target::universal(request.id.clone(), version));
    }

    targets
}

fn resolve_latest(
    request: &ExtensionRequest,
    result: &QueryResult,
    policy: &FallbackPolicy,
) -> Vec<Target> {
    let Some(newest) = result.newest() else {
        return Vec::new();
    };

    if !request.wants_platforms() {
        let platform = newest.target_platform.clone().map(Platform::new);
        return vec![Target::new(request.id.clone(), &newest.version, platform)];
    }

    let mut targets: Vec<Target> = request
        .platforms
        .iter()
        .filter_map(|platform| {
            result
                .versions
                .iter()
                .find(|e| e.matches_platform(platform))
                .map(|e| Target::for_platform(request.id.clone(), &e.version, platform.clone()))
        })
        .collect();

    if targets.is_empty() && policy.universal_fallback {
        tracing::info!(
            extension = %request.id,
            version = %newest.version,
            "No platform-specific builds found, using universal build"
        );
        targets.push(Target::universal(request.id.clone(), &newest.version));
    }

    targets
}

fn dedupe(targets: Vec<Target>) -> Vec<Target> {
    let mut seen = HashSet::with_capacity(targets.len());
    targets
        .into_iter()
        .filter(|t| seen.insert(t.clone()))
        .collect()
}
