//! Retry policies attached to requests.

use std::time::Duration;

use crate::domain::{DeployError, RetryConfig};

/// Bounded exponential backoff for calls that race with staging.
///
/// Delay before retry `n` (1-based) is `min(initial * 2^(n-1), max_delay)`,
/// additionally clipped so the cumulative sleep never exceeds
/// `max_total_wait`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingBackoff {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub initial: Duration,
    pub max_delay: Duration,
    pub max_total_wait: Duration,
}

impl Default for StagingBackoff {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl StagingBackoff {
    #[must_use]
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.staging_max_attempts.max(1),
            initial: Duration::from_millis(config.staging_initial_delay_ms),
            max_delay: Duration::from_millis(config.staging_max_delay_ms),
            max_total_wait: Duration::from_millis(config.staging_max_total_wait_ms),
        }
    }

    /// Fast backoff for tests (1ms initial, 4ms max).
    #[must_use]
    pub fn fast(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
            max_total_wait: Duration::from_secs(5),
        }
    }

    /// Uncapped delay before the retry that follows attempt `attempt`.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.initial
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }

    /// Delay before the next attempt, or `None` once attempts or the total
    /// wait budget are exhausted.
    #[must_use]
    pub fn next_delay(&self, attempt: u32, waited: Duration) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }
        let remaining = self.max_total_wait.saturating_sub(waited);
        let delay = self.delay_for(attempt).min(remaining);
        (!delay.is_zero()).then_some(delay)
    }
}

/// How a request reacts to a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RetryPolicy {
    /// First error propagates.
    #[default]
    None,
    /// Staging-classified errors are retried with backoff.
    StagingAware(StagingBackoff),
    /// Like `StagingAware`, but an app-stopped error ends the request at once
    /// and surfaces `message` instead of the transport error.
    AppStoppedAware {
        backoff: StagingBackoff,
        message: String,
    },
}

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Retry(Duration),
    GiveUp,
}

impl RetryPolicy {
    #[must_use]
    pub fn retries_staging(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Decide whether attempt number `attempt` (1-based), which failed with
    /// `error` after `waited` cumulative backoff, is retried.
    #[must_use]
    pub fn decide(&self, error: &DeployError, attempt: u32, waited: Duration) -> Decision {
        let Some(cause) = error.controller_error() else {
            return Decision::GiveUp;
        };
        let backoff = match self {
            Self::None => return Decision::GiveUp,
            Self::StagingAware(backoff) => backoff,
            Self::AppStoppedAware { backoff, .. } => {
                if cause.is_app_stopped_state() {
                    return Decision::GiveUp;
                }
                backoff
            }
        };
        if !cause.is_staging_in_progress() {
            return Decision::GiveUp;
        }
        backoff
            .next_delay(attempt, waited)
            .map_or(Decision::GiveUp, Decision::Retry)
    }
}
