//! Fallback rules applied when no exact build matches a request.

/// Which fallback rules the resolver may apply.
///
/// Both rules are enabled by default. [`FallbackPolicy::strict`] disables
/// them, so requests without an exact match resolve to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackPolicy {
    /// When platform builds were requested but none exist, download the
    /// universal build instead.
    pub universal_fallback: bool,
    /// When a pinned version is absent from the query result, still try its
    /// universal download URL.
    pub direct_pinned_attempt: bool,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self {
            universal_fallback: true,
            direct_pinned_attempt: true,
        }
    }
}

impl FallbackPolicy {
    /// A policy with every fallback disabled.
    pub fn strict() -> Self {
        Self {
            universal_fallback: false,
            direct_pinned_attempt: false,
        }
    }
}
