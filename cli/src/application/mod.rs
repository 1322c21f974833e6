//! Application layer — port trait definitions and use-case orchestration.
//!
//! This module depends only on `crate::domain`, never on `crate::infra`,
//! `crate::commands`, or `crate::output`.

pub mod cancel;
pub mod factory;
pub mod operation;
pub mod ports;
pub mod request;
pub mod session;
pub mod tracker;

#[cfg(test)]
pub(crate) mod test_support;

pub use factory::RequestFactory;
pub use operation::{ApplicationOperation, OperationOutcome, run_operation};
pub use ports::{
    AppStateTracker, ConfigStore, ConsoleSink, ControllerResult, EventSink, LocalModuleStore,
    ProgressReporter, RefreshScheduler, RemoteControlClient, StateProjector,
};
pub use request::{BatchRequest, Request, RetryPolicy, StagingBackoff};
pub use session::{Session, SessionPorts};
pub use tracker::InstanceStateTracker;
