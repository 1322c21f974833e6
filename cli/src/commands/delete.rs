//! `cfdeploy delete` — delete an application and forget its local record.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::operation::DeleteApplicationOperation;
use crate::commands::run_deploy;

/// Arguments for the delete command.
#[derive(Args)]
pub struct DeleteArgs {
    /// Local id of the module
    pub local_id: String,

    /// Application to delete when the module has no local record
    #[arg(long)]
    pub name: Option<String>,

    /// Also delete services bound to the application
    #[arg(long)]
    pub delete_services: bool,
}

impl DeleteArgs {
    fn operation(&self) -> DeleteApplicationOperation {
        let operation =
            DeleteApplicationOperation::new(&self.local_id).with_services(self.delete_services);
        match &self.name {
            Some(name) => operation.with_app_name(name),
            None => operation,
        }
    }
}

/// Run `cfdeploy delete`.
///
/// # Errors
///
/// Returns an error if the prompt fails or the deletion fails.
pub async fn run(app: &AppContext, args: &DeleteArgs) -> Result<ExitCode> {
    let target = args.name.as_deref().unwrap_or(&args.local_id);
    let prompt = if args.delete_services {
        format!("Delete application {target} and its bound services?")
    } else {
        format!("Delete application {target}?")
    };
    if !app.assume_yes && !app.confirm(&prompt, false)? {
        app.output.info("Cancelled.");
        return Ok(ExitCode::SUCCESS);
    }
    run_deploy(app, &args.operation()).await
}
