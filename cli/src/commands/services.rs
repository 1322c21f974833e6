//! `cfdeploy services` — list, create and delete service instances, and
//! browse the offerings they are created from.

use std::process::ExitCode;

use anyhow::Result;
use cfdeploy_common::{CloudService, validate_service_name};
use clap::Subcommand;

use crate::app::AppContext;
use crate::commands::{LocalPorts, deploy_failure};

/// Services subcommands.
#[derive(Subcommand)]
pub enum ServicesCommand {
    /// List services in the targeted space
    List,
    /// List service offerings and their plans
    Offerings,
    /// Create a service instance
    Create {
        /// Service instance name
        name: String,
        /// Service offering label, e.g. `postgresql`
        #[arg(long)]
        label: Option<String>,
        /// Service plan
        #[arg(long)]
        plan: Option<String>,
    },
    /// Delete services no application is bound to
    Delete {
        /// Service instance names
        #[arg(required = true)]
        names: Vec<String>,
    },
}

/// Run the services command.
///
/// # Errors
///
/// Returns an error if a name is invalid or a controller call fails.
pub async fn run(app: &AppContext, cmd: ServicesCommand) -> Result<ExitCode> {
    let config = app.config()?;
    let client = app.controller(&config)?;
    let ports = LocalPorts::default();
    let reporter = app.reporter();
    let session = ports.session(app, &client, &reporter, &config);
    let requests = session.requests();

    let services = match cmd {
        ServicesCommand::Offerings => {
            let offerings = requests
                .get_service_offerings()
                .run(&app.cancel)
                .await
                .map_err(deploy_failure)?;
            app.renderer().render_offerings(&offerings)?;
            return Ok(ExitCode::SUCCESS);
        }
        ServicesCommand::List => requests
            .get_services()
            .run(&app.cancel)
            .await
            .map_err(deploy_failure)?,
        ServicesCommand::Create { name, label, plan } => {
            validate_service_name(&name)?;
            let service = CloudService { name, label, plan };
            requests
                .create_services(vec![service])
                .run(&app.cancel, &reporter)
                .await
                .map_err(deploy_failure)?
                .value
        }
        ServicesCommand::Delete { names } => {
            for name in &names {
                validate_service_name(name)?;
            }
            // Bound services are skipped with a warning, not an error.
            requests
                .delete_services(names)
                .run(&app.cancel, &reporter)
                .await
                .map_err(deploy_failure)?
                .value
        }
    };

    app.renderer().render_services(&services)?;
    Ok(ExitCode::SUCCESS)
}
