//! `cfdeploy push` — create or update an application from deployment
//! parameters and start it.

use std::process::ExitCode;

use anyhow::Result;
use cfdeploy_common::{EnvironmentVariable, validate_app_name, validate_service_name};
use clap::Args;

use crate::app::AppContext;
use crate::application::operation::PushApplicationOperation;
use crate::commands::run_deploy;
use crate::domain::{ApplicationAction, DeploymentConfiguration, DeploymentInfo};

/// Arguments for the push command.
#[derive(Args)]
pub struct PushArgs {
    /// Local id of the module to deploy
    pub local_id: String,

    /// Application name on the controller (defaults to the mapped name, then the local id)
    #[arg(long)]
    pub name: Option<String>,

    /// Memory per instance, in MB
    #[arg(long, default_value_t = 0)]
    pub memory: u32,

    /// Number of instances
    #[arg(long, default_value_t = 1)]
    pub instances: u32,

    /// Route to map (repeatable)
    #[arg(long = "uri")]
    pub uris: Vec<String>,

    /// Environment variable as KEY=VALUE (repeatable)
    #[arg(long = "env", value_parser = parse_env)]
    pub env: Vec<EnvironmentVariable>,

    /// Service to bind (repeatable)
    #[arg(long = "service")]
    pub services: Vec<String>,

    /// Deploy without starting the application
    #[arg(long)]
    pub no_start: bool,
}

impl PushArgs {
    /// Deployment info described by these arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if the application or a service name is invalid.
    pub fn deployment_info(&self) -> Result<DeploymentInfo> {
        if let Some(name) = &self.name {
            validate_app_name(name)?;
        }
        for service in &self.services {
            validate_service_name(service)?;
        }
        Ok(DeploymentInfo {
            deployment_name: self.name.clone(),
            uris: self.uris.clone(),
            memory: self.memory,
            instances: self.instances,
            services: self.services.clone(),
            env: self.env.clone(),
        })
    }

    fn configuration(&self) -> DeploymentConfiguration {
        let mode = if self.no_start {
            ApplicationAction::Stop
        } else {
            ApplicationAction::Start
        };
        DeploymentConfiguration::new(mode)
    }
}

/// Parse `KEY=VALUE`; the value may itself contain `=`.
fn parse_env(raw: &str) -> std::result::Result<EnvironmentVariable, String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok(EnvironmentVariable::new(key, value)),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

/// Run `cfdeploy push`.
///
/// # Errors
///
/// Returns an error if the arguments are invalid or the deployment fails.
pub async fn run(app: &AppContext, args: &PushArgs) -> Result<ExitCode> {
    let operation =
        PushApplicationOperation::new(&args.local_id, args.deployment_info()?, args.configuration());
    run_deploy(app, &operation).await
}
