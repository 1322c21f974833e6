//! Request engine.
//!
//! A [`Request`] is one labelled remote call plus the policy that decides how
//! it reacts to failure. Requests hold no state between runs: every call to
//! [`Request::run`] starts from attempt one.

pub mod batch;
pub mod policy;

use std::future::Future;
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::LocalBoxFuture;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::application::cancel::{ensure_active, sleep_or_cancel};
use crate::domain::DeployError;

pub use batch::{BatchOutcome, BatchRequest, ItemOutcome};
pub use policy::{Decision, RetryPolicy, StagingBackoff};

/// Future produced by a request's call closure.
pub type CallFuture<'a, T> = LocalBoxFuture<'a, Result<T, DeployError>>;

type Call<'a, T> = Box<dyn Fn() -> CallFuture<'a, T> + 'a>;

/// A single labelled remote call with a retry policy.
pub struct Request<'a, T> {
    label: String,
    policy: RetryPolicy,
    unavailable_hint: Option<String>,
    call: Call<'a, T>,
}

impl<'a, T> Request<'a, T> {
    /// Plain request running `call` once per [`run`](Self::run).
    pub fn new<F, Fut>(label: impl Into<String>, call: F) -> Self
    where
        F: Fn() -> Fut + 'a,
        Fut: Future<Output = Result<T, DeployError>> + 'a,
    {
        Self {
            label: label.into(),
            policy: RetryPolicy::None,
            unavailable_hint: None,
            call: Box::new(move || call().boxed_local()),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Message surfaced instead of the transport text when the controller
    /// answers 503 and the policy does not retry it.
    #[must_use]
    pub fn with_unavailable_hint(mut self, hint: impl Into<String>) -> Self {
        self.unavailable_hint = Some(hint.into());
        self
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Execute the call, retrying as the policy allows.
    ///
    /// Cancellation is checked before every attempt and again as soon as a
    /// response arrives; either check failing yields `Canceled`, even when the
    /// call itself succeeded.
    ///
    /// # Errors
    ///
    /// Returns `Canceled` on cancellation, otherwise the last failure
    /// relabelled by [`Request::classify`].
    pub async fn run(&self, cancel: &CancellationToken) -> Result<T, DeployError> {
        let mut attempt: u32 = 0;
        let mut waited = Duration::ZERO;
        loop {
            ensure_active(cancel, &self.label)?;
            attempt += 1;
            debug!(label = %self.label, attempt, "issuing request");
            let result = (self.call)().await;
            ensure_active(cancel, &self.label)?;

            let error = match result {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            match self.policy.decide(&error, attempt, waited) {
                Decision::Retry(delay) => {
                    debug!(
                        label = %self.label,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %error,
                        "application still staging, retrying"
                    );
                    if !sleep_or_cancel(cancel, delay).await {
                        return Err(DeployError::canceled(&self.label));
                    }
                    waited += delay;
                }
                Decision::GiveUp => return Err(self.classify(error, attempt)),
            }
        }
    }

    /// Attach this request's label (or configured message) to a raw
    /// controller failure. Already-classified errors pass through.
    fn classify(&self, error: DeployError, attempts: u32) -> DeployError {
        let DeployError::Controller(source) = error else {
            return error;
        };
        if let RetryPolicy::AppStoppedAware { message, .. } = &self.policy
            && source.is_app_stopped_state()
        {
            return DeployError::AppStateConflict {
                message: message.clone(),
                source,
            };
        }
        if self.policy.retries_staging() && source.is_staging_in_progress() {
            return DeployError::StagingInProgress {
                label: self.label.clone(),
                attempts,
                source,
            };
        }
        if let Some(hint) = &self.unavailable_hint
            && source.http_status() == Some(503)
        {
            return DeployError::Unavailable {
                message: hint.clone(),
                source,
            };
        }
        DeployError::RemoteCall {
            label: self.label.clone(),
            source,
        }
    }
}
