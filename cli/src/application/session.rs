//! Session context shared by every operation.
//!
//! A `Session` bundles the controller client with the local ports an
//! operation mutates. Operations never reach for globals: everything they
//! touch is borrowed from here.

use std::cell::RefCell;
use std::collections::HashMap;

use cfdeploy_common::CloudApplication;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::application::factory::RequestFactory;
use crate::application::ports::{
    AppStateTracker, ConsoleSink, EventSink, LocalModuleStore, ProgressReporter,
    RefreshScheduler, RemoteControlClient, StateProjector,
};
use crate::application::request::StagingBackoff;
use crate::domain::{
    ApplicationModule, CfDeployConfig, DeployError, ModuleState, PublishState, ServerEvent,
};

/// Ports an operation runs against.
pub struct Session<'a, C> {
    pub client: &'a C,
    pub store: &'a dyn LocalModuleStore,
    pub projector: &'a dyn StateProjector,
    pub events: &'a dyn EventSink,
    pub console: &'a dyn ConsoleSink,
    pub refresh: &'a dyn RefreshScheduler,
    pub reporter: &'a dyn ProgressReporter,
    /// Optional readiness tracker consulted after instances report running.
    pub app_state: Option<&'a dyn AppStateTracker>,
    pub config: &'a CfDeployConfig,
    /// Controller name used in request labels.
    pub server: String,
    module_states: RefCell<HashMap<String, ModuleState>>,
}

/// Ports a [`Session`] is assembled from.
pub struct SessionPorts<'a> {
    pub store: &'a dyn LocalModuleStore,
    pub projector: &'a dyn StateProjector,
    pub events: &'a dyn EventSink,
    pub console: &'a dyn ConsoleSink,
    pub refresh: &'a dyn RefreshScheduler,
    pub reporter: &'a dyn ProgressReporter,
}

impl<'a, C: RemoteControlClient> Session<'a, C> {
    pub fn new(
        client: &'a C,
        ports: SessionPorts<'a>,
        config: &'a CfDeployConfig,
        server: impl Into<String>,
    ) -> Self {
        Self {
            client,
            store: ports.store,
            projector: ports.projector,
            events: ports.events,
            console: ports.console,
            refresh: ports.refresh,
            reporter: ports.reporter,
            app_state: None,
            config,
            server: server.into(),
            module_states: RefCell::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn with_app_state_tracker(mut self, tracker: &'a dyn AppStateTracker) -> Self {
        self.app_state = Some(tracker);
        self
    }

    /// Request factory bound to this session's client and ports.
    pub fn requests(&self) -> RequestFactory<'a, C> {
        RequestFactory::new(
            self.client,
            self.store,
            self.events,
            self.server.clone(),
            StagingBackoff::from_config(&self.config.retry),
        )
    }

    // ── Projection ───────────────────────────────────────────────────────────

    /// Project `state` for `local_id`, remembering it for this session.
    pub fn set_module_state(&self, local_id: &str, state: ModuleState) {
        debug!(local_id, ?state, "module state");
        self.module_states
            .borrow_mut()
            .insert(local_id.to_string(), state);
        self.projector.set_module_state(local_id, state);
    }

    /// Last module state projected for `local_id` through this session.
    #[must_use]
    pub fn module_state(&self, local_id: &str) -> Option<ModuleState> {
        self.module_states.borrow().get(local_id).copied()
    }

    pub fn set_module_publish_state(&self, local_id: &str, state: PublishState) {
        self.projector.set_module_publish_state(local_id, state);
    }

    pub fn set_server_publish_state(&self, state: PublishState) {
        self.projector.set_server_publish_state(state);
    }

    pub fn fire_event(&self, event: ServerEvent) {
        debug!(app = event.app_name(), "firing server event");
        self.events.fire_event(event);
    }

    pub fn print(&self, app_name: &str, text: &str) {
        self.console.print(app_name, text);
    }

    // ── Local records ────────────────────────────────────────────────────────

    /// Module mapped to `local_id`.
    ///
    /// # Errors
    ///
    /// `NoMappedModule` when no mapping exists, `Store` when the lookup fails.
    pub fn mapped_module(&self, local_id: &str) -> Result<ApplicationModule, DeployError> {
        self.store
            .cloud_module(local_id)
            .map_err(DeployError::Store)?
            .ok_or_else(|| DeployError::NoMappedModule(local_id.to_string()))
    }

    /// Persist `module`.
    ///
    /// # Errors
    ///
    /// Returns `Store` when the write fails.
    pub fn save(&self, module: &ApplicationModule) -> Result<(), DeployError> {
        self.store.save_module(module).map_err(DeployError::Store)
    }

    // ── Remote refresh ───────────────────────────────────────────────────────

    /// Fetch `name` from the controller; `None` when the application does not
    /// exist.
    ///
    /// # Errors
    ///
    /// Propagates any failure other than "not found".
    pub async fn fetch_application(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<CloudApplication>, DeployError> {
        match self.requests().get_application(name).run(cancel).await {
            Ok(app) => Ok(Some(app)),
            Err(e) if e.controller_error().is_some_and(|c| c.is_not_found()) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Replace the module's application snapshot with the controller's view.
    ///
    /// # Errors
    ///
    /// Propagates request and store failures.
    pub async fn refresh_module(
        &self,
        module: &mut ApplicationModule,
        cancel: &CancellationToken,
    ) -> Result<(), DeployError> {
        let app = self.fetch_application(&module.deployed_name, cancel).await?;
        module.set_application(app);
        self.save(module)
    }

    /// Refresh the application snapshot and, when the app exists, its
    /// instances.
    ///
    /// # Errors
    ///
    /// Propagates request and store failures.
    pub async fn refresh_module_with_instances(
        &self,
        module: &mut ApplicationModule,
        cancel: &CancellationToken,
    ) -> Result<(), DeployError> {
        let app = self.fetch_application(&module.deployed_name, cancel).await?;
        module.instances = match app {
            Some(_) => {
                self.requests()
                    .get_instances_info(&module.deployed_name)
                    .run(cancel)
                    .await?
            }
            None => None,
        };
        module.set_application(app);
        self.save(module)
    }
}
