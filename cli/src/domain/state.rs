//! Coarse local lifecycle projection of deployed applications.

use serde::{Deserialize, Serialize};

/// Local lifecycle state shown for a module.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ModuleState {
    #[default]
    Unknown,
    Starting,
    Started,
    Stopping,
    Stopped,
}

/// Whether local content is believed to match what the controller runs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PublishState {
    /// In sync.
    #[default]
    None,
    /// Needs a re-evaluation pass.
    Incremental,
    /// Needs a full publish.
    Full,
    Unknown,
}

/// Phases of an operation run.
///
/// `Pending → ResolvingModule → Executing → {Completed | Canceled | Failed}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationPhase {
    Pending,
    ResolvingModule,
    Executing,
    Completed,
    Canceled,
    Failed,
}

impl OperationPhase {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Canceled | Self::Failed)
    }
}
