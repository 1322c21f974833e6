//! `RefreshScheduler` backed by a de-duplicating queue.
//!
//! The CLI runs one operation per process, so scheduled refreshes are
//! drained by the command after the operation returns.

use std::cell::RefCell;

use tracing::debug;

use crate::application::ports::RefreshScheduler;

#[derive(Default)]
pub struct RefreshQueue {
    pending: RefCell<Vec<String>>,
}

impl RefreshQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every pending local id, in scheduling order.
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.pending.borrow_mut())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }
}

impl RefreshScheduler for RefreshQueue {
    fn schedule_refresh(&self, local_id: &str) {
        let mut pending = self.pending.borrow_mut();
        if pending.iter().any(|id| id == local_id) {
            return;
        }
        debug!(local_id, "refresh scheduled");
        pending.push(local_id.to_string());
    }
}
