//! Domain types and validators for cfdeploy configuration.
//!
//! Pure functions only: no I/O.

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

pub const VALID_CONFIG_KEYS: &[&str] = &[
    "target.api",
    "target.org",
    "target.space",
    "retry.staging_max_attempts",
    "retry.staging_initial_delay_ms",
    "retry.staging_max_delay_ms",
    "retry.staging_max_total_wait_ms",
    "tracker.poll_interval_ms",
    "tracker.max_wait_secs",
    "tracker.steady_state_poll_ms",
];

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.cfdeploy/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct CfDeployConfig {
    pub target: TargetConfig,
    pub retry: RetryConfig,
    pub tracker: TrackerConfig,
}

/// Controller endpoint and the org/space operations run in.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct TargetConfig {
    /// Controller API base URL, e.g. `https://api.example.com`.
    pub api: Option<String>,
    pub org: Option<String>,
    pub space: Option<String>,
}

/// Bounds for retrying calls that race with staging.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, including the first one.
    pub staging_max_attempts: u32,
    pub staging_initial_delay_ms: u64,
    pub staging_max_delay_ms: u64,
    /// Cap on the cumulative time spent sleeping between attempts.
    pub staging_max_total_wait_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            staging_max_attempts: 10,
            staging_initial_delay_ms: 1_000,
            staging_max_delay_ms: 8_000,
            staging_max_total_wait_ms: 60_000,
        }
    }
}

/// Polling cadence for instance and steady-state tracking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TrackerConfig {
    pub poll_interval_ms: u64,
    pub max_wait_secs: u64,
    pub steady_state_poll_ms: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 200,
            max_wait_secs: 120,
            steady_state_poll_ms: 200,
        }
    }
}

impl TrackerConfig {
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub fn max_wait(&self) -> Duration {
        Duration::from_secs(self.max_wait_secs)
    }

    #[must_use]
    pub fn steady_state_poll(&self) -> Duration {
        Duration::from_millis(self.steady_state_poll_ms)
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<()> {
    if !VALID_CONFIG_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey {
            key: key.to_string(),
            valid: VALID_CONFIG_KEYS.join(", "),
        }
        .into());
    }
    Ok(())
}

fn invalid(key: &str, value: &str, expected: &str) -> anyhow::Error {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        expected: expected.to_string(),
    }
    .into()
}

fn parse_positive(key: &str, value: &str) -> Result<u64> {
    match value.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(invalid(key, value, "Expected a positive integer.")),
    }
}

/// Validates a configuration value for the given key.
///
/// # Errors
///
/// Returns an error if the value is not valid for the key.
pub fn validate_config_value(key: &str, value: &str) -> Result<()> {
    match key {
        "target.api" => {
            if !(value.starts_with("https://") || value.starts_with("http://")) {
                return Err(invalid(key, value, "Expected an http(s) URL."));
            }
            Ok(())
        }
        "target.org" | "target.space" => {
            cfdeploy_common::validate_app_name(value)
                .map_err(|e| invalid(key, value, &e.to_string()))
        }
        "retry.staging_max_attempts" => {
            let n = parse_positive(key, value)?;
            if n > 100 {
                return Err(invalid(key, value, "Expected at most 100 attempts."));
            }
            Ok(())
        }
        _ => parse_positive(key, value).map(|_| ()),
    }
}

/// Validate and apply `key = value` to `config`.
///
/// # Errors
///
/// Returns an error if the key is unknown or the value is invalid.
pub fn apply_config_value(config: &mut CfDeployConfig, key: &str, value: &str) -> Result<()> {
    validate_config_key(key)?;
    validate_config_value(key, value)?;
    match key {
        "target.api" => config.target.api = Some(value.trim_end_matches('/').to_string()),
        "target.org" => config.target.org = Some(value.to_string()),
        "target.space" => config.target.space = Some(value.to_string()),
        "retry.staging_max_attempts" => {
            config.retry.staging_max_attempts = u32::try_from(parse_positive(key, value)?)
                .map_err(|_| invalid(key, value, "Expected at most 100 attempts."))?;
        }
        "retry.staging_initial_delay_ms" => {
            config.retry.staging_initial_delay_ms = parse_positive(key, value)?;
        }
        "retry.staging_max_delay_ms" => {
            config.retry.staging_max_delay_ms = parse_positive(key, value)?;
        }
        "retry.staging_max_total_wait_ms" => {
            config.retry.staging_max_total_wait_ms = parse_positive(key, value)?;
        }
        "tracker.poll_interval_ms" => config.tracker.poll_interval_ms = parse_positive(key, value)?,
        "tracker.max_wait_secs" => config.tracker.max_wait_secs = parse_positive(key, value)?,
        "tracker.steady_state_poll_ms" => {
            config.tracker.steady_state_poll_ms = parse_positive(key, value)?;
        }
        other => {
            return Err(ConfigError::UnknownKey {
                key: other.to_string(),
                valid: VALID_CONFIG_KEYS.join(", "),
            }
            .into());
        }
    }
    Ok(())
}

// ── Unit tests ───────────────────────────────────────────────────────────────
