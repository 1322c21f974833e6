use tokio_util::sync::CancellationToken;

use super::ApplicationOperation;
use super::start::start_module;
use crate::application::ports::RemoteControlClient;
use crate::application::session::Session;
use crate::domain::{ApplicationAction, ApplicationModule, DeployError, DeploymentConfiguration};

/// Restart (or start) an already-deployed application.
pub struct RestartOperation {
    local_id: String,
    configuration: DeploymentConfiguration,
}

impl RestartOperation {
    #[must_use]
    pub fn new(local_id: impl Into<String>) -> Self {
        Self::with_configuration(local_id, DeploymentConfiguration::default())
    }

    /// Start without restarting semantics; used by `cfdeploy start`.
    #[must_use]
    pub fn start(local_id: impl Into<String>) -> Self {
        Self::with_configuration(
            local_id,
            DeploymentConfiguration::new(ApplicationAction::Start),
        )
    }

    #[must_use]
    pub fn with_configuration(
        local_id: impl Into<String>,
        configuration: DeploymentConfiguration,
    ) -> Self {
        Self {
            local_id: local_id.into(),
            configuration,
        }
    }
}

impl ApplicationOperation for RestartOperation {
    fn name(&self) -> &str {
        match self.configuration.start_mode {
            ApplicationAction::Start => "Starting application",
            _ => "Restarting application",
        }
    }

    fn local_id(&self) -> &str {
        &self.local_id
    }

    async fn execute<C: RemoteControlClient>(
        &self,
        session: &Session<'_, C>,
        module: &mut ApplicationModule,
        cancel: &CancellationToken,
    ) -> Result<(), DeployError> {
        start_module(session, module, self.configuration.start_mode, cancel).await
    }
}
