//! Retry policy for gallery queries.
//!
//! Queries are retried with exponential backoff: the delay starts at
//! `base_delay` and doubles after each failed attempt. Only the query step
//! retries; package downloads are attempted once.

use std::str::FromStr;
use std::time::Duration;

use super::error::TransportError;

/// Default number of attempts (including the first).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default delay before the first retry (2 seconds).
pub const DEFAULT_BASE_DELAY_MS: u64 = 2000;

/// Which failures are worth another attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryScope {
    /// Retry every failure, including definitive 4xx answers.
    #[default]
    AllFailures,
    /// Retry only failures [`TransportError::is_transient`] accepts.
    TransientOnly,
}

impl RetryScope {
    /// Whether `error` should be retried under this scope.
    pub fn should_retry(&self, error: &TransportError) -> bool {
        match self {
            Self::AllFailures => true,
            Self::TransientOnly => error.is_transient(),
        }
    }
}

impl FromStr for RetryScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Self::AllFailures),
            "transient" => Ok(Self::TransientOnly),
            other => Err(format!("unknown retry scope {other:?} (expected all or transient)")),
        }
    }
}

/// Bounded exponential backoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt).
    pub max_attempts: u32,
    /// Delay after the first failure; doubles after each further failure.
    pub base_delay: Duration,
    /// Which failures are retried.
    pub scope: RetryScope,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_ATTEMPTS,
            Duration::from_millis(DEFAULT_BASE_DELAY_MS),
        )
    }
}

impl RetryPolicy {
    /// Create a policy retrying every failure.
    ///
    /// `max_attempts` is clamped to at least 1.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            scope: RetryScope::AllFailures,
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Set which failures are retried.
    pub fn with_scope(mut self, scope: RetryScope) -> Self {
        self.scope = scope;
        self
    }

    /// Delay before the next attempt, given how many attempts have failed.
    ///
    /// `failed_attempts` is 1 after the first failure. Returns `None` once
    /// the attempt budget is spent.
    pub fn delay_for_attempt(&self, failed_attempts: u32) -> Option<Duration> {
        if failed_attempts == 0 || failed_attempts >= self.max_attempts {
            return None;
        }
        let factor = 1u32
            .checked_shl(failed_attempts - 1)
            .unwrap_or(u32::MAX);
        Some(self.base_delay.saturating_mul(factor))
    }

    /// Maximum number of attempts.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}
