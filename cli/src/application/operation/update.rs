//! In-place updates of a deployed application: scaling and URL changes.

use tokio_util::sync::CancellationToken;

use super::ApplicationOperation;
use crate::application::ports::RemoteControlClient;
use crate::application::session::Session;
use crate::domain::{ApplicationModule, DeployError, DeploymentInfo};

fn deployment_info(module: &mut ApplicationModule) -> &mut DeploymentInfo {
    let name = module.deployed_name.clone();
    module
        .deployment_info
        .get_or_insert_with(|| DeploymentInfo::named(name))
}

/// Change instance count and/or memory without redeploying.
pub struct ScaleApplicationOperation {
    local_id: String,
    instances: Option<u32>,
    memory: Option<u32>,
}

impl ScaleApplicationOperation {
    #[must_use]
    pub fn new(local_id: impl Into<String>, instances: Option<u32>, memory: Option<u32>) -> Self {
        Self {
            local_id: local_id.into(),
            instances,
            memory,
        }
    }
}

impl ApplicationOperation for ScaleApplicationOperation {
    fn name(&self) -> &str {
        "Scaling application"
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
        if self.instances.is_none() && self.memory.is_none() {
            return Err(DeployError::InvalidDeployment(
                "Nothing to scale: pass an instance count or a memory limit".to_string(),
            ));
        }
        let name = module.deployed_name.clone();
        let requests = session.requests();
        if let Some(instances) = self.instances {
            requests
                .update_application_instances(&name, instances)?
                .run(cancel)
                .await?;
            deployment_info(module).instances = instances;
        }
        if let Some(memory) = self.memory {
            requests
                .update_application_memory(&name, memory)
                .run(cancel)
                .await?;
            deployment_info(module).memory = memory;
        }
        module.clear_error();
        session.refresh_module(module, cancel).await
    }
}

/// Replace the URIs an application is reachable under.
pub struct UpdateUrlsOperation {
    local_id: String,
    uris: Vec<String>,
}

impl UpdateUrlsOperation {
    #[must_use]
    pub fn new(local_id: impl Into<String>, uris: Vec<String>) -> Self {
        Self {
            local_id: local_id.into(),
            uris,
        }
    }
}

impl ApplicationOperation for UpdateUrlsOperation {
    fn name(&self) -> &str {
        "Updating application URLs"
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
        // The request reads the previous URIs from the stored record, so the
        // record is only updated after the write.
        session
            .requests()
            .update_application_uris(&name, self.uris.clone())
            .run(cancel)
            .await?;
        deployment_info(module).uris.clone_from(&self.uris);
        module.clear_error();
        session.save(module)
    }
}
