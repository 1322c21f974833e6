//! cfdeploy - deploy and manage applications on a cloud-foundry controller

#![cfg_attr(test, allow(clippy::expect_used))]

use std::process::ExitCode;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use cfdeploy_cli::cli::Cli;
use cfdeploy_cli::output::json;

const DEFAULT_FILTER: &str = "cfdeploy_cli=info,warn";
const VERBOSE_FILTER: &str = "cfdeploy_cli=debug,info";

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default = if cli.verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, canceling");
            on_interrupt.cancel();
        }
    });

    let json_mode = cli.json;
    match cli.run(cancel).await {
        Ok(code) => code,
        Err(e) => {
            if json_mode && let Ok(text) = json::format_error(&e.to_string(), json::error_code(&e)) {
                println!("{text}");
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::FAILURE
        }
    }
}
