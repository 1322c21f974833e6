//! CLI argument parsing with clap derive

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use crate::app::{AppContext, AppFlags, BehaviourFlags, OutputFlags};
use crate::commands;

/// Deploy and manage applications on a cloud-foundry controller
#[derive(Parser)]
#[command(
    name = "cfdeploy",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Log engine activity (retries, phases) to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Skip confirmation prompts
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create or update an application and start it
    Push(commands::push::PushArgs),

    /// Start a deployed application
    Start(commands::lifecycle::ModuleArgs),

    /// Stop a deployed application
    Stop(commands::lifecycle::ModuleArgs),

    /// Stop and start a deployed application
    Restart(commands::lifecycle::ModuleArgs),

    /// Change instance count or memory
    Scale(commands::update::ScaleArgs),

    /// Replace the routes mapped to an application
    Urls(commands::update::UrlsArgs),

    /// Delete an application
    Delete(commands::delete::DeleteArgs),

    /// Show application and instance state
    Status(commands::status::StatusArgs),

    /// Show recent application logs
    Logs(commands::logs::LogsArgs),

    /// Manage service instances
    #[command(subcommand)]
    Services(commands::services::ServicesCommand),

    /// List routes or delete orphaned ones
    #[command(subcommand)]
    Routes(commands::routes::RoutesCommand),

    /// Print a one-time code for SSH access to applications
    SshCode,

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self, cancel: CancellationToken) -> Result<ExitCode> {
        let flags = AppFlags {
            output: OutputFlags {
                no_color: self.no_color,
                quiet: self.quiet,
                json: self.json,
            },
            behaviour: BehaviourFlags { yes: self.yes },
        };
        let app = AppContext::new(&flags, cancel)?;

        match self.command {
            Command::Push(args) => commands::push::run(&app, &args).await,
            Command::Start(args) => commands::lifecycle::start(&app, &args).await,
            Command::Stop(args) => commands::lifecycle::stop(&app, &args).await,
            Command::Restart(args) => commands::lifecycle::restart(&app, &args).await,
            Command::Scale(args) => commands::update::scale(&app, &args).await,
            Command::Urls(args) => commands::update::urls(&app, &args).await,
            Command::Delete(args) => commands::delete::run(&app, &args).await,
            Command::Status(args) => commands::status::run(&app, &args).await,
            Command::Logs(args) => commands::logs::run(&app, &args).await,
            Command::Services(cmd) => commands::services::run(&app, cmd).await,
            Command::Routes(cmd) => commands::routes::run(&app, cmd).await,
            Command::SshCode => commands::ssh::run(&app).await,
            Command::Config(cmd) => commands::config::run(&app, cmd),
        }
    }
}
