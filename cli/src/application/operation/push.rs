use tokio_util::sync::CancellationToken;
use tracing::info;

use super::ApplicationOperation;
use super::start::start_module;
use crate::application::ports::RemoteControlClient;
use crate::application::session::Session;
use crate::domain::{
    ApplicationModule, DeployError, DeploymentConfiguration, DeploymentInfo,
};

/// Deploy an application from its deployment info, creating the mapping and
/// the remote application when they do not exist yet.
pub struct PushApplicationOperation {
    local_id: String,
    info: DeploymentInfo,
    configuration: DeploymentConfiguration,
}

impl PushApplicationOperation {
    #[must_use]
    pub fn new(
        local_id: impl Into<String>,
        info: DeploymentInfo,
        configuration: DeploymentConfiguration,
    ) -> Self {
        Self {
            local_id: local_id.into(),
            info,
            configuration,
        }
    }

    /// Deployment info deployed under `name`.
    fn named_info(&self, name: &str) -> DeploymentInfo {
        let mut info = self.info.clone();
        info.deployment_name = Some(name.to_string());
        info
    }
}

impl ApplicationOperation for PushApplicationOperation {
    fn name(&self) -> &str {
        "Pushing application"
    }

    fn local_id(&self) -> &str {
        &self.local_id
    }

    /// The only resolution allowed to create a mapping.
    fn resolve<C: RemoteControlClient>(
        &self,
        session: &Session<'_, C>,
    ) -> Result<ApplicationModule, DeployError> {
        let existing = session
            .store
            .cloud_module(&self.local_id)
            .map_err(DeployError::Store)?;
        Ok(match existing {
            Some(mut module) => {
                // Without an explicit name a redeploy stays on the mapped application.
                if let Some(name) = &self.info.deployment_name {
                    module.deployed_name.clone_from(name);
                }
                module
            }
            None => {
                let name = self
                    .info
                    .deployment_name
                    .clone()
                    .unwrap_or_else(|| self.local_id.clone());
                ApplicationModule::new(self.local_id.clone(), self.named_info(&name))
            }
        })
    }

    async fn execute<C: RemoteControlClient>(
        &self,
        session: &Session<'_, C>,
        module: &mut ApplicationModule,
        cancel: &CancellationToken,
    ) -> Result<(), DeployError> {
        let name = module.deployed_name.clone();
        let info = self.named_info(&name);
        cfdeploy_common::validate_app_name(&name)
            .map_err(|e| DeployError::InvalidDeployment(e.to_string()))?;
        if info.instances == 0 {
            return Err(DeployError::InvalidDeployment(format!(
                "Instance count for {name} must be 1 or higher"
            )));
        }

        // Persist the mapping first so URL change events can attach to it.
        session.save(module)?;

        let requests = session.requests();
        let reporter = session.reporter;
        if session.fetch_application(&name, cancel).await?.is_none() {
            reporter.step(&format!("Creating application {name}"));
            requests
                .create_application(&name, info.clone())
                .run(cancel)
                .await?;
            info!(app = %name, "application created");
        } else {
            if info.memory > 0 {
                reporter.step(&format!("Updating memory of {name}"));
                requests
                    .update_application_memory(&name, info.memory)
                    .run(cancel)
                    .await?;
            }
            reporter.step(&format!("Updating instances of {name}"));
            requests
                .update_application_instances(&name, info.instances)?
                .run(cancel)
                .await?;
            reporter.step(&format!("Updating URLs of {name}"));
            requests
                .update_application_uris(&name, info.uris.clone())
                .run(cancel)
                .await?;
        }

        reporter.step(&format!("Updating environment of {name}"));
        requests
            .update_application_env(&name, &info.env)
            .run(cancel)
            .await?;
        reporter.step(&format!("Updating service bindings of {name}"));
        requests
            .update_application_services(&name, info.services.clone())
            .run(cancel)
            .await?;

        module.deployment_info = Some(info);
        session.save(module)?;

        start_module(session, module, self.configuration.start_mode, cancel).await
    }
}
