//! Event sink that turns server events into structured log records.

use std::cell::RefCell;

use tracing::info;

use crate::application::ports::EventSink;
use crate::domain::ServerEvent;

/// Logs every event and keeps it for the command to report.
#[derive(Default)]
pub struct TracingEventSink {
    fired: RefCell<Vec<ServerEvent>>,
}

impl TracingEventSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events fired so far, oldest first.
    #[must_use]
    pub fn fired(&self) -> Vec<ServerEvent> {
        self.fired.borrow().clone()
    }
}

impl EventSink for TracingEventSink {
    fn fire_event(&self, event: ServerEvent) {
        match &event {
            ServerEvent::AppUrlChanged {
                local_id,
                app_name,
                old,
                new,
            } => info!(local_id, app = app_name, ?old, ?new, "application URLs changed"),
            ServerEvent::AppStarting { local_id, app_name } => {
                info!(local_id, app = app_name, "application starting");
            }
            ServerEvent::AppStarted { local_id, app_name } => {
                info!(local_id, app = app_name, "application started");
            }
        }
        self.fired.borrow_mut().push(event);
    }
}
