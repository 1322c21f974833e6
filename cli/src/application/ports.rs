//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` and `cfdeploy_common`, never
//! from `crate::infra`, `crate::commands`, or `crate::output`.

use std::collections::BTreeMap;

use anyhow::Result;
use cfdeploy_common::{
    ApplicationLog, ApplicationStats, CloudApplication, CloudDomain, CloudRoute, CloudService,
    InstancesInfo, ServiceInstance, ServiceOffering, StartingInfo,
};

use crate::domain::{
    ApplicationModule, ControllerError, DeploymentInfo, ModuleState, PublishState, ServerEvent,
};

/// Result of a single controller call.
pub type ControllerResult<T> = std::result::Result<T, ControllerError>;

// ── Controller Port ───────────────────────────────────────────────────────────

/// Remote application control client.
///
/// Every call maps to exactly one controller round trip and reports failures
/// as a classified [`ControllerError`]. Implementations never retry.
#[allow(async_fn_in_trait)]
pub trait RemoteControlClient {
    /// Authenticate against the controller.
    async fn login(&self) -> ControllerResult<()>;
    /// List every application in the targeted space.
    async fn get_applications(&self) -> ControllerResult<Vec<CloudApplication>>;
    /// Fetch one application by name.
    async fn get_application(&self, name: &str) -> ControllerResult<CloudApplication>;
    /// Create an application from deployment parameters (no bits uploaded).
    async fn create_application(&self, name: &str, info: &DeploymentInfo) -> ControllerResult<()>;
    /// Request a start. `None` when the controller returns no staging info.
    async fn start_application(&self, name: &str) -> ControllerResult<Option<StartingInfo>>;
    async fn stop_application(&self, name: &str) -> ControllerResult<()>;
    async fn delete_application(&self, name: &str) -> ControllerResult<()>;
    async fn update_application_memory(&self, name: &str, memory: u32) -> ControllerResult<()>;
    async fn update_application_instances(&self, name: &str, instances: u32)
    -> ControllerResult<()>;
    async fn update_application_uris(&self, name: &str, uris: &[String]) -> ControllerResult<()>;
    async fn update_application_env(
        &self,
        name: &str,
        env: &BTreeMap<String, String>,
    ) -> ControllerResult<()>;
    async fn update_application_services(
        &self,
        name: &str,
        services: &[String],
    ) -> ControllerResult<()>;
    async fn get_application_stats(&self, name: &str) -> ControllerResult<ApplicationStats>;
    async fn get_application_instances(&self, name: &str) -> ControllerResult<InstancesInfo>;
    async fn get_recent_logs(&self, name: &str) -> ControllerResult<Vec<ApplicationLog>>;
    async fn get_services(&self) -> ControllerResult<Vec<CloudService>>;
    async fn create_service(&self, service: &CloudService) -> ControllerResult<()>;
    async fn delete_service(&self, name: &str) -> ControllerResult<()>;
    async fn get_service_instance(&self, name: &str) -> ControllerResult<Option<ServiceInstance>>;
    async fn get_routes(&self, domain: &str) -> ControllerResult<Vec<CloudRoute>>;
    async fn delete_route(&self, host: &str, domain: &str) -> ControllerResult<()>;
    /// Domains visible to the targeted space.
    async fn get_domains(&self) -> ControllerResult<Vec<CloudDomain>>;
    /// Domains owned by or shared with the organization `org`.
    async fn get_domains_for_org(&self, org: &str) -> ControllerResult<Vec<CloudDomain>>;
    /// Marketplace offerings services can be created from.
    async fn get_service_offerings(&self) -> ControllerResult<Vec<ServiceOffering>>;
    /// One-time code for authenticating an SSH session to an application.
    async fn get_ssh_code(&self) -> ControllerResult<String>;
}

// ── Local State Ports ─────────────────────────────────────────────────────────

/// Local records mapping deployable units to remote applications.
pub trait LocalModuleStore {
    /// Module mapped to the local unit `local_id`, if any.
    fn cloud_module(&self, local_id: &str) -> Result<Option<ApplicationModule>>;
    /// Module whose deployed application is named `app_name`, if any.
    fn existing_cloud_module(&self, app_name: &str) -> Result<Option<ApplicationModule>>;
    /// Insert or replace the module keyed by its `local_id`.
    fn save_module(&self, module: &ApplicationModule) -> Result<()>;
    /// Forget the module for `local_id`. Missing records are not an error.
    fn remove_module(&self, local_id: &str) -> Result<()>;
}

/// Coarse lifecycle projection consumed by whatever displays module state.
#[cfg_attr(test, mockall::automock)]
pub trait StateProjector {
    fn set_module_state(&self, local_id: &str, state: ModuleState);
    fn set_module_publish_state(&self, local_id: &str, state: PublishState);
    fn set_server_publish_state(&self, state: PublishState);
}

// ── Notification Ports ────────────────────────────────────────────────────────

/// Best-effort receiver of state-change notifications.
#[cfg_attr(test, mockall::automock)]
pub trait EventSink {
    fn fire_event(&self, event: ServerEvent);
}

/// Best-effort diagnostic output attached to an application.
#[cfg_attr(test, mockall::automock)]
pub trait ConsoleSink {
    fn print(&self, app_name: &str, text: &str);
}

/// Schedules a re-read of remote state after a deployment change.
#[cfg_attr(test, mockall::automock)]
pub trait RefreshScheduler {
    fn schedule_refresh(&self, local_id: &str);
}

/// Tracks whether a started application has left its "starting" projection,
/// e.g. by watching its log output for a readiness line.
#[cfg_attr(test, mockall::automock)]
pub trait AppStateTracker {
    fn start_tracking(&self, module: &ApplicationModule);
    fn application_state(&self, module: &ApplicationModule) -> ModuleState;
    fn stop_tracking(&self, module: &ApplicationModule);
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait, no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Abstracts configuration persistence.
pub trait ConfigStore {
    /// Load configuration, returning defaults when none exists.
    fn load(&self) -> Result<crate::domain::CfDeployConfig>;
    /// Persist configuration.
    fn save(&self, config: &crate::domain::CfDeployConfig) -> Result<()>;
    /// Location of the configuration file.
    fn path(&self) -> Result<std::path::PathBuf>;
}
