//! Retry policies for network bring-up.
//!
//! The radio join is retried forever at a fixed interval by default; the policy is injected as
//! configuration so a build can bound it instead.

use core::num::NonZeroU32;

use embassy_time::Duration;

/// How often, and how many times, to retry a failing operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RetryPolicy {
    backoff: Duration,
    max_attempts: Option<NonZeroU32>,
}

impl RetryPolicy {
    /// Retry forever, waiting 200 ms between attempts.
    pub const NETWORK_JOIN: Self = Self::unbounded(Duration::from_millis(200));

    /// Retry forever with a fixed wait between attempts.
    #[must_use]
    pub const fn unbounded(backoff: Duration) -> Self {
        Self {
            backoff,
            max_attempts: None,
        }
    }

    /// Give up after `max_attempts` attempts in total, waiting `backoff` between them.
    #[must_use]
    pub const fn bounded(backoff: Duration, max_attempts: NonZeroU32) -> Self {
        Self {
            backoff,
            max_attempts: Some(max_attempts),
        }
    }

    /// The wait before the next attempt, given how many attempts have failed so far, or `None`
    /// once the policy gives up.
    #[must_use]
    pub fn delay_after(&self, failed_attempts: u32) -> Option<Duration> {
        match self.max_attempts {
            Some(max) if failed_attempts >= max.get() => None,
            _ => Some(self.backoff),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::NETWORK_JOIN
    }
}
