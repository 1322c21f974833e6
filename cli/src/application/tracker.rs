//! Instance-state tracker: polls instance info until the application runs,
//! fails, or the wait ends.

use std::time::Duration;

use cfdeploy_common::{InstanceState, InstancesInfo};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::application::cancel::sleep_or_cancel;
use crate::application::factory::RequestFactory;
use crate::application::ports::RemoteControlClient;
use crate::domain::{DeployError, TrackerConfig};

/// Aggregate state of all instances.
///
/// Any running instance makes the application running; otherwise the first
/// state present in starting, flapping, crashed, down order wins.
#[must_use]
pub fn aggregate(info: &InstancesInfo) -> InstanceState {
    const PRECEDENCE: [InstanceState; 5] = [
        InstanceState::Running,
        InstanceState::Starting,
        InstanceState::Flapping,
        InstanceState::Crashed,
        InstanceState::Down,
    ];
    PRECEDENCE
        .into_iter()
        .find(|s| info.instances.iter().any(|i| i.state == *s))
        .unwrap_or(InstanceState::Unknown)
}

/// True when every reporting instance has crashed or is flapping.
#[must_use]
pub fn all_failed(info: &InstancesInfo) -> bool {
    !info.instances.is_empty() && info.instances.iter().all(|i| i.state.is_terminal_failure())
}

/// Polls one application's instances.
pub struct InstanceStateTracker<'f, 'a, C> {
    requests: &'f RequestFactory<'a, C>,
    app_name: String,
    poll_interval: Duration,
    max_wait: Duration,
}

impl<'f, 'a, C: RemoteControlClient> InstanceStateTracker<'f, 'a, C> {
    pub fn new(requests: &'f RequestFactory<'a, C>, app_name: &str, config: &TrackerConfig) -> Self {
        Self {
            requests,
            app_name: app_name.to_string(),
            poll_interval: config.poll_interval(),
            max_wait: config.max_wait(),
        }
    }

    /// Poll until the aggregate is `Running`, all instances have failed,
    /// `max_wait` elapses, or `cancel` fires.
    ///
    /// Returns the last observed aggregate; cancellation is not an error here.
    ///
    /// # Errors
    ///
    /// Propagates non-cancellation failures of the instances request.
    pub async fn track(&self, cancel: &CancellationToken) -> Result<InstanceState, DeployError> {
        let request = self.requests.get_instances_info(&self.app_name);
        let deadline = Instant::now() + self.max_wait;
        let mut last = InstanceState::Unknown;
        loop {
            if cancel.is_cancelled() {
                debug!(app = %self.app_name, ?last, "tracking canceled");
                return Ok(last);
            }
            match request.run(cancel).await {
                Ok(Some(info)) => {
                    last = aggregate(&info);
                    debug!(app = %self.app_name, state = ?last, "instance state");
                    if last == InstanceState::Running || all_failed(&info) {
                        info!(app = %self.app_name, state = ?last, "instance tracking finished");
                        return Ok(last);
                    }
                }
                Ok(None) => {}
                Err(e) if e.is_canceled() => return Ok(last),
                Err(e) => return Err(e),
            }
            if Instant::now() >= deadline {
                info!(app = %self.app_name, state = ?last, "gave up waiting for instances");
                return Ok(last);
            }
            if !sleep_or_cancel(cancel, self.poll_interval).await {
                return Ok(last);
            }
        }
    }
}
