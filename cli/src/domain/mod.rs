//! Domain layer — pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod error;
pub mod event;
pub mod module;
pub mod state;

pub use config::{CfDeployConfig, RetryConfig, TrackerConfig};
pub use error::{ConfigError, ControllerError, DeployError};
pub use event::ServerEvent;
pub use module::{
    ApplicationAction, ApplicationModule, DeploymentConfiguration, DeploymentInfo,
};
pub use state::{ModuleState, OperationPhase, PublishState};
