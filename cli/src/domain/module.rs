//! Application modules: the local record mapping a deployable unit to the
//! remote application that runs it.
//!
//! Pure data and validation only, no I/O.

use std::collections::BTreeMap;

use cfdeploy_common::{CloudApplication, EnvironmentVariable, InstancesInfo, StartingInfo};
use serde::{Deserialize, Serialize};

/// What an operation should do with the application once it is deployed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationAction {
    Start,
    Stop,
    #[default]
    Restart,
    UpdateRestart,
}

/// Per-operation deployment settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeploymentConfiguration {
    pub start_mode: ApplicationAction,
}

impl DeploymentConfiguration {
    #[must_use]
    pub fn new(start_mode: ApplicationAction) -> Self {
        Self { start_mode }
    }
}

/// Desired deployment parameters for one application.
///
/// Replaced wholesale on redeploy. Only the URIs are ever diffed against the
/// previous value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DeploymentInfo {
    /// Name of the application on the controller.
    pub deployment_name: Option<String>,
    #[serde(default)]
    pub uris: Vec<String>,
    /// Memory per instance, in MB.
    #[serde(default)]
    pub memory: u32,
    #[serde(default = "default_instances")]
    pub instances: u32,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub env: Vec<EnvironmentVariable>,
}

fn default_instances() -> u32 {
    1
}

impl DeploymentInfo {
    /// Deployment info for `name` with one instance and no other settings.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            deployment_name: Some(name.into()),
            instances: default_instances(),
            ..Self::default()
        }
    }

    /// Environment variables as the map the controller expects.
    ///
    /// Later assignments of the same variable win.
    #[must_use]
    pub fn env_map(&self) -> BTreeMap<String, String> {
        env_to_map(&self.env)
    }
}

/// Collapse a list of assignments into a map; later duplicates win.
#[must_use]
pub fn env_to_map(vars: &[EnvironmentVariable]) -> BTreeMap<String, String> {
    vars.iter()
        .map(|v| (v.variable.clone(), v.value.clone()))
        .collect()
}

/// Local record of a deployed application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ApplicationModule {
    /// Identity of the local deployable unit.
    pub local_id: String,
    /// Name of the application on the controller.
    pub deployed_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_info: Option<DeploymentInfo>,
    /// Last application snapshot fetched from the controller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<CloudApplication>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instances: Option<InstancesInfo>,
    /// Error message from the last failed operation, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starting_info: Option<StartingInfo>,
}

impl ApplicationModule {
    /// New mapping from `local_id` to the application named in `info`,
    /// falling back to `local_id` when the info carries no name.
    #[must_use]
    pub fn new(local_id: impl Into<String>, info: DeploymentInfo) -> Self {
        let local_id = local_id.into();
        let deployed_name = info
            .deployment_name
            .clone()
            .unwrap_or_else(|| local_id.clone());
        Self {
            local_id,
            deployed_name,
            deployment_info: Some(info),
            ..Self::default()
        }
    }

    /// Deployment name from the deployment info, if one is set.
    #[must_use]
    pub fn deployment_name(&self) -> Option<&str> {
        self.deployment_info
            .as_ref()
            .and_then(|i| i.deployment_name.as_deref())
    }

    /// Record the latest application snapshot from the controller.
    pub fn set_application(&mut self, application: Option<CloudApplication>) {
        self.application = application;
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.status = None;
    }
}
