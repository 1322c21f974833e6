//! `cfdeploy logs` — print an application's recent log lines.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::commands::{LocalPorts, deploy_failure};

/// Arguments for the logs command.
#[derive(Args)]
pub struct LogsArgs {
    /// Local id of the module
    pub local_id: String,

    /// Show only the last N lines
    #[arg(short = 'n', long)]
    pub tail: Option<usize>,
}

/// Run `cfdeploy logs`.
///
/// # Errors
///
/// Returns an error if the module is not mapped or the logs cannot be fetched.
pub async fn run(app: &AppContext, args: &LogsArgs) -> Result<ExitCode> {
    let config = app.config()?;
    let client = app.controller(&config)?;
    let ports = LocalPorts::default();
    let reporter = app.reporter();
    let session = ports.session(app, &client, &reporter, &config);

    let module = session.mapped_module(&args.local_id).map_err(deploy_failure)?;
    let mut logs = session
        .requests()
        .get_recent_logs(&module.deployed_name)
        .run(&app.cancel)
        .await
        .map_err(deploy_failure)?;
    logs.sort_by_key(|log| log.timestamp);
    if let Some(tail) = args.tail {
        let skip = logs.len().saturating_sub(tail);
        logs.drain(..skip);
    }

    app.renderer().render_logs(&module.deployed_name, &logs)?;
    Ok(ExitCode::SUCCESS)
}
