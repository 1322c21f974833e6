//! `cfdeploy start|stop|restart` — drive a mapped application's lifecycle.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::operation::{RestartOperation, StopApplicationOperation};
use crate::commands::run_deploy;

/// Arguments shared by the lifecycle commands.
#[derive(Args)]
pub struct ModuleArgs {
    /// Local id of the deployed module
    pub local_id: String,
}

/// Run `cfdeploy start`.
///
/// # Errors
///
/// Returns an error if the module is not mapped or the start fails.
pub async fn start(app: &AppContext, args: &ModuleArgs) -> Result<ExitCode> {
    run_deploy(app, &RestartOperation::start(&args.local_id)).await
}

/// Run `cfdeploy restart`.
///
/// # Errors
///
/// Returns an error if the module is not mapped or the restart fails.
pub async fn restart(app: &AppContext, args: &ModuleArgs) -> Result<ExitCode> {
    run_deploy(app, &RestartOperation::new(&args.local_id)).await
}

/// Run `cfdeploy stop`.
///
/// # Errors
///
/// Returns an error if the module is not mapped or the stop fails.
pub async fn stop(app: &AppContext, args: &ModuleArgs) -> Result<ExitCode> {
    run_deploy(app, &StopApplicationOperation::new(&args.local_id)).await
}
