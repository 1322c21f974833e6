//! JSON output helpers.
//!
//! Every `--json` code path prints exactly one pretty-printed document on
//! stdout: the command's result, or an error object when the command fails.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::domain::DeployError;

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Print `value` as one pretty JSON document.
///
/// # Errors
///
/// Returns an error if `value` cannot be serialized.
pub fn print<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("JSON serialization failed")?;
    println!("{text}");
    Ok(())
}

/// Stable code for the JSON error object, derived from the failure's
/// classification.
#[must_use]
pub fn error_code(err: &anyhow::Error) -> &'static str {
    let Some(deploy) = err.downcast_ref::<DeployError>() else {
        return "ERROR";
    };
    match deploy {
        DeployError::Controller(_) | DeployError::RemoteCall { .. } => "REMOTE_CALL",
        DeployError::StagingInProgress { .. } => "STAGING_IN_PROGRESS",
        DeployError::AppStateConflict { .. } => "APP_STATE_CONFLICT",
        DeployError::Unavailable { .. } => "UNAVAILABLE",
        DeployError::NoMappedModule(_) => "NO_MAPPED_MODULE",
        DeployError::Canceled(_) => "CANCELED",
        DeployError::Timeout(_) => "TIMEOUT",
        DeployError::InvalidDeployment(_) => "INVALID_DEPLOYMENT",
        DeployError::Store(_) => "STORE",
    }
}
