//! `cfdeploy status` — show a module's application and instance state.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::LocalModuleStore;
use crate::commands::{LocalPorts, deploy_failure};
use crate::domain::DeployError;
use crate::output::progress;

/// Arguments for the status command.
#[derive(Args)]
pub struct StatusArgs {
    /// Local id of the module
    pub local_id: String,

    /// Show the stored record without contacting the controller
    #[arg(long)]
    pub offline: bool,

    /// Also show per-instance CPU, memory and uptime
    #[arg(long, conflicts_with = "offline")]
    pub stats: bool,
}

/// Run `cfdeploy status`.
///
/// # Errors
///
/// Returns an error if the module is not mapped or the refresh fails.
pub async fn run(app: &AppContext, args: &StatusArgs) -> Result<ExitCode> {
    let mut module = app
        .modules
        .cloud_module(&args.local_id)?
        .ok_or_else(|| deploy_failure(DeployError::NoMappedModule(args.local_id.clone())))?;

    let mut stats = None;
    if !args.offline {
        let config = app.config()?;
        let client = app.controller(&config)?;
        let ports = LocalPorts::default();
        let reporter = app.reporter();
        let session = ports.session(app, &client, &reporter, &config);

        let pb = progress::spinner_if(
            app.output.show_progress() && !app.is_json(),
            &format!("Fetching {}", module.deployed_name),
        );
        let mut refreshed = session
            .refresh_module_with_instances(&mut module, &app.cancel)
            .await;
        if refreshed.is_ok() && args.stats && module.application.is_some() {
            match session
                .requests()
                .get_application_stats(&module.deployed_name)
                .run(&app.cancel)
                .await
            {
                Ok(usage) => stats = usage,
                Err(e) => refreshed = Err(e),
            }
        }
        progress::finish(&pb);
        refreshed.map_err(deploy_failure)?;
    }

    if args.stats {
        app.renderer().render_module_stats(&module, stats.as_ref())?;
    } else {
        app.renderer().render_module(&module)?;
    }
    Ok(ExitCode::SUCCESS)
}
