use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of an application as reported by the controller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum AppState {
    Stopped,
    Starting,
    Started,
    Updating,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Lifecycle state of a single application instance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum InstanceState {
    Starting,
    Running,
    Crashed,
    Flapping,
    Down,
    #[default]
    #[serde(other)]
    Unknown,
}

impl InstanceState {
    /// `true` for states an instance does not leave without intervention.
    #[must_use]
    pub fn is_terminal_failure(self) -> bool {
        matches!(self, Self::Crashed | Self::Flapping)
    }
}

/// An application as the controller describes it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CloudApplication {
    pub name: String,
    #[serde(default)]
    pub uris: Vec<String>,
    /// Memory limit per instance, in MB.
    #[serde(default)]
    pub memory: u32,
    #[serde(default)]
    pub instances: u32,
    #[serde(default)]
    pub running_instances: u32,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    #[serde(default)]
    pub state: AppState,
}

/// One entry of the instances listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstanceInfo {
    pub index: u32,
    pub state: InstanceState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<DateTime<Utc>>,
}

/// Per-instance lifecycle information for one application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct InstancesInfo {
    #[serde(default)]
    pub instances: Vec<InstanceInfo>,
}

/// Resource usage of one running instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstanceStats {
    pub index: u32,
    pub state: InstanceState,
    #[serde(default)]
    pub cpu: f64,
    /// Resident memory in bytes.
    #[serde(default)]
    pub mem: u64,
    /// Uptime in seconds.
    #[serde(default)]
    pub uptime: u64,
}

/// Resource usage of every instance of an application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ApplicationStats {
    #[serde(default)]
    pub records: Vec<InstanceStats>,
}

/// Opaque token returned when an application start was accepted.
///
/// Carries the location of the staging log when the controller streams one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct StartingInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staging_file: Option<String>,
}

/// A provisioned service instance as listed in the space.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CloudService {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
}

/// A plan of a service offering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ServicePlan {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A kind of service the marketplace can provision, with its plans.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ServiceOffering {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub plans: Vec<ServicePlan>,
}

/// Binding between a service instance and an application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceBinding {
    pub app_name: String,
}

/// Detailed view of a service instance, including its bindings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceInstance {
    pub name: String,
    #[serde(default)]
    pub bindings: Vec<ServiceBinding>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CloudDomain {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CloudRoute {
    pub host: String,
    pub domain: CloudDomain,
    #[serde(default)]
    pub app_count: u32,
}

/// Which stream a log line was written to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogStream {
    Stdout,
    Stderr,
}

/// A single recent log line for an application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApplicationLog {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    /// Emitting component, e.g. `APP/0`, `STG`, `RTR`.
    #[serde(default)]
    pub source: String,
    pub stream: LogStream,
}

/// A single environment variable assignment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnvironmentVariable {
    pub variable: String,
    pub value: String,
}

impl EnvironmentVariable {
    #[must_use]
    pub fn new(variable: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            value: value.into(),
        }
    }
}
