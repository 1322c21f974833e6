//! `cfdeploy routes` — list routes and domains, and clean up orphaned routes.

use std::process::ExitCode;

use anyhow::{Context, Result};
use cfdeploy_common::CloudRoute;
use clap::Subcommand;
use tracing::info;

use crate::app::AppContext;
use crate::application::{RemoteControlClient, RequestFactory};
use crate::commands::{LocalPorts, deploy_failure};

/// Routes subcommands.
#[derive(Subcommand)]
pub enum RoutesCommand {
    /// List routes across every domain of the space
    List,
    /// Delete routes no application is mapped to
    Prune,
    /// List domains of the targeted space
    Domains {
        /// List the domains of the targeted org instead
        #[arg(long)]
        org: bool,
    },
}

/// Run the routes command.
///
/// # Errors
///
/// Returns an error if a controller call or the prompt fails.
pub async fn run(app: &AppContext, cmd: RoutesCommand) -> Result<ExitCode> {
    let config = app.config()?;
    let client = app.controller(&config)?;
    let ports = LocalPorts::default();
    let reporter = app.reporter();
    let session = ports.session(app, &client, &reporter, &config);
    let requests = session.requests();

    match cmd {
        RoutesCommand::List => {
            let routes = all_routes(app, &requests).await?;
            app.renderer().render_routes(&routes)?;
        }
        RoutesCommand::Prune => {
            let orphaned = orphaned(all_routes(app, &requests).await?);
            if !orphaned.is_empty() {
                let prompt = format!("Delete {} orphaned route(s)?", orphaned.len());
                if !app.assume_yes && !app.confirm(&prompt, false)? {
                    app.output.info("Cancelled.");
                    return Ok(ExitCode::SUCCESS);
                }
            }
            if let Some(request) = requests.delete_routes(orphaned.clone()) {
                request.run(&app.cancel).await.map_err(deploy_failure)?;
                info!(count = orphaned.len(), "orphaned routes deleted");
            }
            app.renderer().render_pruned_routes(&orphaned)?;
        }
        RoutesCommand::Domains { org } => {
            let request = if org {
                let name = config.target.org.as_deref().context(
                    "No org configured. Set one with: cfdeploy config set target.org <name>",
                )?;
                requests.get_domains_for_org(name)
            } else {
                requests.get_domains()
            };
            let domains = request.run(&app.cancel).await.map_err(deploy_failure)?;
            app.renderer().render_domains(&domains)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn all_routes<C: RemoteControlClient>(
    app: &AppContext,
    requests: &RequestFactory<'_, C>,
) -> Result<Vec<CloudRoute>> {
    let domains = requests
        .get_domains()
        .run(&app.cancel)
        .await
        .map_err(deploy_failure)?;
    let mut routes = Vec::new();
    for domain in &domains {
        let found = requests
            .get_routes(&domain.name)
            .run(&app.cancel)
            .await
            .map_err(deploy_failure)?;
        routes.extend(found);
    }
    Ok(routes)
}

/// Routes with no application mapped to them.
fn orphaned(routes: Vec<CloudRoute>) -> Vec<CloudRoute> {
    routes.into_iter().filter(|r| r.app_count == 0).collect()
}
