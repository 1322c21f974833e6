//! In-process `StateProjector`: remembers the latest projection per module
//! so commands can render it once an operation returns.

use std::cell::RefCell;
use std::collections::BTreeMap;

use tracing::debug;

use crate::application::ports::StateProjector;
use crate::domain::{ModuleState, PublishState};

/// One projection change, in the order it was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    Module(ModuleState),
    ModulePublish(PublishState),
    ServerPublish(PublishState),
}

/// Latest module and publish states, plus the full change history.
#[derive(Default)]
pub struct StateBoard {
    modules: RefCell<BTreeMap<String, ModuleState>>,
    publish: RefCell<BTreeMap<String, PublishState>>,
    server: RefCell<PublishState>,
    history: RefCell<Vec<(Option<String>, Projection)>>,
}

impl StateBoard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn module_state(&self, local_id: &str) -> ModuleState {
        self.modules
            .borrow()
            .get(local_id)
            .copied()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn module_publish_state(&self, local_id: &str) -> PublishState {
        self.publish
            .borrow()
            .get(local_id)
            .copied()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn server_publish_state(&self) -> PublishState {
        *self.server.borrow()
    }

    /// Module states applied to `local_id`, oldest first.
    #[must_use]
    pub fn module_history(&self, local_id: &str) -> Vec<ModuleState> {
        self.history
            .borrow()
            .iter()
            .filter_map(|(id, change)| match change {
                Projection::Module(state) if id.as_deref() == Some(local_id) => Some(*state),
                _ => None,
            })
            .collect()
    }

    fn record(&self, local_id: Option<&str>, change: Projection) {
        self.history
            .borrow_mut()
            .push((local_id.map(str::to_string), change));
    }
}

impl StateProjector for StateBoard {
    fn set_module_state(&self, local_id: &str, state: ModuleState) {
        self.modules
            .borrow_mut()
            .insert(local_id.to_string(), state);
        self.record(Some(local_id), Projection::Module(state));
    }

    fn set_module_publish_state(&self, local_id: &str, state: PublishState) {
        debug!(local_id, ?state, "module publish state");
        self.publish
            .borrow_mut()
            .insert(local_id.to_string(), state);
        self.record(Some(local_id), Projection::ModulePublish(state));
    }

    fn set_server_publish_state(&self, state: PublishState) {
        debug!(?state, "server publish state");
        *self.server.borrow_mut() = state;
        self.record(None, Projection::ServerPublish(state));
    }
}
