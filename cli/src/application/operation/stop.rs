use tokio_util::sync::CancellationToken;

use super::ApplicationOperation;
use crate::application::ports::RemoteControlClient;
use crate::application::session::Session;
use crate::domain::{ApplicationModule, DeployError, ModuleState};

/// Stop a deployed application.
pub struct StopApplicationOperation {
    local_id: String,
}

impl StopApplicationOperation {
    #[must_use]
    pub fn new(local_id: impl Into<String>) -> Self {
        Self {
            local_id: local_id.into(),
        }
    }
}

impl ApplicationOperation for StopApplicationOperation {
    fn name(&self) -> &str {
        "Stopping application"
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
        let name = module.deployed_name.clone();
        session.set_module_state(&self.local_id, ModuleState::Stopping);
        session
            .requests()
            .stop_application(&format!("Stopping application {name}"), &name)
            .run(cancel)
            .await?;
        session.set_module_state(&self.local_id, ModuleState::Stopped);
        module.clear_error();
        session.refresh_module(module, cancel).await?;
        session.print(&name, &format!("Application {name} stopped"));
        Ok(())
    }
}
