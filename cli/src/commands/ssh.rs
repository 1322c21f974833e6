//! `cfdeploy ssh-code` — print a one-time code for SSH access to applications.

use std::process::ExitCode;

use anyhow::Result;
use tracing::debug;

use crate::app::AppContext;
use crate::commands::{LocalPorts, deploy_failure};

/// Run `cfdeploy ssh-code`.
///
/// # Errors
///
/// Returns an error if login or the code exchange fails.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let config = app.config()?;
    let client = app.controller(&config)?;
    let ports = LocalPorts::default();
    let reporter = app.reporter();
    let session = ports.session(app, &client, &reporter, &config);
    let requests = session.requests();

    requests
        .connect()
        .run(&app.cancel)
        .await
        .map_err(deploy_failure)?;
    let code = requests
        .get_ssh_code()
        .run(&app.cancel)
        .await
        .map_err(deploy_failure)?;
    debug!("ssh code issued");

    app.renderer().render_ssh_code(&code)?;
    Ok(ExitCode::SUCCESS)
}
