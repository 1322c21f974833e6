//! Command implementations

pub mod config;
pub mod delete;
pub mod lifecycle;
pub mod logs;
pub mod push;
pub mod routes;
pub mod services;
pub mod ssh;
pub mod status;
pub mod update;

use std::process::ExitCode;

use anyhow::Result;
use tracing::warn;

use crate::app::AppContext;
use crate::application::ports::LocalModuleStore;
use crate::application::{ApplicationOperation, OperationOutcome, Session, SessionPorts, run_operation};
use crate::domain::{CfDeployConfig, DeployError};
use crate::infra::controller::HttpControllerClient;
use crate::infra::events::TracingEventSink;
use crate::infra::projection::StateBoard;
use crate::infra::refresh::RefreshQueue;
use crate::output::TerminalReporter;

/// Exit code for an operation interrupted with Ctrl-C.
const EXIT_CANCELED: u8 = 130;

/// In-process sinks a command's session projects into.
#[derive(Default)]
pub struct LocalPorts {
    pub board: StateBoard,
    pub events: TracingEventSink,
    pub refresh: RefreshQueue,
}

impl LocalPorts {
    /// Session over `client` writing to the app's module store and these sinks.
    pub fn session<'a>(
        &'a self,
        app: &'a AppContext,
        client: &'a HttpControllerClient,
        reporter: &'a TerminalReporter<'a>,
        config: &'a CfDeployConfig,
    ) -> Session<'a, HttpControllerClient> {
        let ports = SessionPorts {
            store: &app.modules,
            projector: &self.board,
            events: &self.events,
            console: reporter,
            refresh: &self.refresh,
            reporter,
        };
        Session::new(client, ports, config, server_label(config))
    }
}

/// Controller name shown in request labels.
fn server_label(config: &CfDeployConfig) -> String {
    let api = config.target.api.as_deref().unwrap_or("controller");
    api.trim_start_matches("https://")
        .trim_start_matches("http://")
        .to_string()
}

/// Attach the user-facing message to a deployment failure.
pub fn deploy_failure(err: DeployError) -> anyhow::Error {
    let message = err.user_message();
    anyhow::Error::new(err).context(message)
}

/// Log in, run `operation`, refresh what it scheduled and render the outcome.
///
/// # Errors
///
/// Returns the operation's failure with its user-facing message.
pub async fn run_deploy<O: ApplicationOperation>(
    app: &AppContext,
    operation: &O,
) -> Result<ExitCode> {
    let config = app.config()?;
    let client = app.controller(&config)?;
    let ports = LocalPorts::default();
    let reporter = app.reporter();
    let session = ports.session(app, &client, &reporter, &config);

    let outcome = match session.requests().connect().run(&app.cancel).await {
        Ok(()) => {
            let outcome = run_operation(operation, &session, &app.cancel)
                .await
                .map_err(deploy_failure)?;
            refresh_scheduled(app, &session, &ports.refresh).await;
            outcome
        }
        Err(e) => login_interrupted(e)?,
    };

    app.renderer()
        .render_outcome(operation.name(), operation.local_id(), &outcome)?;
    Ok(match outcome {
        OperationOutcome::Completed => ExitCode::SUCCESS,
        OperationOutcome::Canceled { .. } => ExitCode::from(EXIT_CANCELED),
    })
}

/// A Ctrl-C during login cancels the command like any other step; every
/// other login failure is returned.
fn login_interrupted(err: DeployError) -> Result<OperationOutcome> {
    if err.is_canceled() {
        let reason = err.to_string();
        warn!("{reason}");
        Ok(OperationOutcome::Canceled { reason })
    } else {
        Err(deploy_failure(err))
    }
}

/// Re-read every module the operation asked to refresh. Failures only warn:
/// the operation itself already succeeded.
async fn refresh_scheduled(
    app: &AppContext,
    session: &Session<'_, HttpControllerClient>,
    queue: &RefreshQueue,
) {
    for local_id in queue.drain() {
        if app.cancel.is_cancelled() {
            return;
        }
        let mut module = match app.modules.cloud_module(&local_id) {
            Ok(Some(module)) => module,
            Ok(None) => continue,
            Err(e) => {
                warn!(local_id, error = %e, "cannot read module for refresh");
                continue;
            }
        };
        if let Err(e) = session
            .refresh_module_with_instances(&mut module, &app.cancel)
            .await
        {
            warn!(local_id, error = %e, "refresh failed");
        }
    }
}
