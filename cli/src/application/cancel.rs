//! Cooperative cancellation checkpoints.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::domain::DeployError;

/// Fail with `Canceled` if `cancel` has fired.
///
/// # Errors
///
/// Returns [`DeployError::Canceled`] naming `label` once the token is canceled.
pub fn ensure_active(cancel: &CancellationToken, label: &str) -> Result<(), DeployError> {
    if cancel.is_cancelled() {
        return Err(DeployError::canceled(label));
    }
    Ok(())
}

/// Sleep for `duration` unless `cancel` fires first.
///
/// Returns `false` when the sleep was cut short by cancellation.
pub async fn sleep_or_cancel(cancel: &CancellationToken, duration: Duration) -> bool {
    tokio::select! {
        () = cancel.cancelled() => false,
        () = tokio::time::sleep(duration) => true,
    }
}
