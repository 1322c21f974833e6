use tokio_util::sync::CancellationToken;
use tracing::info;

use super::ApplicationOperation;
use crate::application::ports::RemoteControlClient;
use crate::application::session::Session;
use crate::domain::{ApplicationModule, DeployError, ModuleState};

/// Delete the remote application and forget its local record.
///
/// Never creates a mapping. When no record exists the caller may name the
/// application directly.
pub struct DeleteApplicationOperation {
    local_id: String,
    app_name: Option<String>,
    delete_services: bool,
}

impl DeleteApplicationOperation {
    #[must_use]
    pub fn new(local_id: impl Into<String>) -> Self {
        Self {
            local_id: local_id.into(),
            app_name: None,
            delete_services: false,
        }
    }

    /// Application to delete when no local record exists.
    #[must_use]
    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    /// Also delete the services bound to the application.
    #[must_use]
    pub fn with_services(mut self, delete_services: bool) -> Self {
        self.delete_services = delete_services;
        self
    }
}

impl ApplicationOperation for DeleteApplicationOperation {
    fn name(&self) -> &str {
        "Deleting application"
    }

    fn local_id(&self) -> &str {
        &self.local_id
    }

    fn resolve<C: RemoteControlClient>(
        &self,
        session: &Session<'_, C>,
    ) -> Result<ApplicationModule, DeployError> {
        match session.mapped_module(&self.local_id) {
            Err(DeployError::NoMappedModule(_)) if self.app_name.is_some() => {
                Ok(ApplicationModule {
                    local_id: self.local_id.clone(),
                    deployed_name: self.app_name.clone().unwrap_or_default(),
                    ..ApplicationModule::default()
                })
            }
            other => other,
        }
    }

    async fn execute<C: RemoteControlClient>(
        &self,
        session: &Session<'_, C>,
        module: &mut ApplicationModule,
        cancel: &CancellationToken,
    ) -> Result<(), DeployError> {
        let name = module.deployed_name.clone();
        let requests = session.requests();
        session.set_module_state(&self.local_id, ModuleState::Stopping);

        let app = session.fetch_application(&name, cancel).await?;
        let services = match (&app, self.delete_services) {
            (_, false) => Vec::new(),
            (Some(app), true) => app.services.clone(),
            // App already gone: fall back to the services it was deployed with.
            (None, true) => module
                .deployment_info
                .as_ref()
                .map(|info| info.services.clone())
                .unwrap_or_default(),
        };

        if app.is_some() {
            requests.delete_application(&name).run(cancel).await?;
            info!(app = %name, "application deleted");
        } else {
            session.print(&name, &format!("Application {name} no longer exists"));
        }

        if !services.is_empty() {
            let outcome = requests
                .delete_services(services)
                .run(cancel, session.reporter)
                .await?;
            info!(
                app = %name,
                skipped = outcome.skipped.len(),
                remaining = outcome.value.len(),
                "bound services processed"
            );
        }

        session
            .store
            .remove_module(&self.local_id)
            .map_err(DeployError::Store)?;
        session.set_module_state(&self.local_id, ModuleState::Stopped);
        Ok(())
    }

    fn refresh_on_completion(&self) -> bool {
        false
    }
}
