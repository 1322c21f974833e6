//! Notifications emitted after a state change has taken effect remotely.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ServerEvent {
    /// The application's URIs were replaced.
    AppUrlChanged {
        local_id: String,
        app_name: String,
        old: Vec<String>,
        new: Vec<String>,
    },
    /// The controller accepted a start request.
    AppStarting { local_id: String, app_name: String },
    /// At least one instance reached `RUNNING`.
    AppStarted { local_id: String, app_name: String },
}

impl ServerEvent {
    #[must_use]
    pub fn app_name(&self) -> &str {
        match self {
            Self::AppUrlChanged { app_name, .. }
            | Self::AppStarting { app_name, .. }
            | Self::AppStarted { app_name, .. } => app_name,
        }
    }
}
