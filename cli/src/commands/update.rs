//! `cfdeploy scale` and `cfdeploy urls` — change a deployed application in
//! place.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::operation::{ScaleApplicationOperation, UpdateUrlsOperation};
use crate::commands::run_deploy;

/// Arguments for the scale command.
#[derive(Args)]
pub struct ScaleArgs {
    /// Local id of the deployed module
    pub local_id: String,

    /// New number of instances
    #[arg(long)]
    pub instances: Option<u32>,

    /// New memory per instance, in MB
    #[arg(long)]
    pub memory: Option<u32>,
}

/// Arguments for the urls command.
#[derive(Args)]
pub struct UrlsArgs {
    /// Local id of the deployed module
    pub local_id: String,

    /// Complete new set of routes; omit to unmap every route
    pub uris: Vec<String>,
}

/// Run `cfdeploy scale`.
///
/// # Errors
///
/// Returns an error if neither value is given or the update fails.
pub async fn scale(app: &AppContext, args: &ScaleArgs) -> Result<ExitCode> {
    let operation = ScaleApplicationOperation::new(&args.local_id, args.instances, args.memory);
    run_deploy(app, &operation).await
}

/// Run `cfdeploy urls`.
///
/// # Errors
///
/// Returns an error if the module is not mapped or the update fails.
pub async fn urls(app: &AppContext, args: &UrlsArgs) -> Result<ExitCode> {
    let operation = UpdateUrlsOperation::new(&args.local_id, args.uris.clone());
    run_deploy(app, &operation).await
}
