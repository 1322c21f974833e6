//! Start sequence shared by restart, start and push.

use cfdeploy_common::{AppState, InstanceState};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::application::cancel::{ensure_active, sleep_or_cancel};
use crate::application::factory::RequestFactory;
use crate::application::ports::RemoteControlClient;
use crate::application::session::Session;
use crate::application::tracker::InstanceStateTracker;
use crate::domain::{ApplicationAction, ApplicationModule, DeployError, ModuleState, ServerEvent};

const MISSING_DEPLOYMENT_NAME: &str = "Unable to start application. Missing application deployment name in application deployment information.";

/// Bring `module` into the state `mode` asks for.
///
/// `Stop` only records the module as stopped. Every other mode stops the
/// application (best effort), starts it, and waits until an instance runs
/// and the readiness tracker, if any, no longer reports it as starting.
pub(super) async fn start_module<C: RemoteControlClient>(
    session: &Session<'_, C>,
    module: &mut ApplicationModule,
    mode: ApplicationAction,
    cancel: &CancellationToken,
) -> Result<(), DeployError> {
    module.clear_error();
    let local_id = module.local_id.clone();
    session.set_module_state(&local_id, ModuleState::Starting);

    let Some(name) = module.deployment_name().map(str::to_string) else {
        session.set_module_state(&local_id, ModuleState::Stopped);
        return Err(DeployError::InvalidDeployment(
            MISSING_DEPLOYMENT_NAME.to_string(),
        ));
    };

    session.refresh_module(module, cancel).await?;

    if mode == ApplicationAction::Stop {
        session.set_module_state(&local_id, ModuleState::Stopped);
        return Ok(());
    }

    let requests = session.requests();
    let start_label = format!("Starting application - {name}");
    session.print(&name, &start_label);
    info!(app = %name, ?mode, "starting application");

    let stop_label = format!("Stopping application {name}");
    match requests.stop_application(&stop_label, &name).run(cancel).await {
        Ok(()) => {}
        Err(e) if e.is_canceled() => return Err(e),
        Err(e) => warn!(app = %name, error = %e, "stop before start failed"),
    }

    if let Some(info) = requests.start_application(&name).run(cancel).await? {
        module.starting_info = Some(info);
        session.fire_event(ServerEvent::AppStarting {
            local_id: local_id.clone(),
            app_name: name.clone(),
        });
    }
    session.save(module)?;

    wait_until_started(session, &requests, module, &name, cancel).await
}

async fn wait_until_started<C: RemoteControlClient>(
    session: &Session<'_, C>,
    requests: &RequestFactory<'_, C>,
    module: &mut ApplicationModule,
    name: &str,
    cancel: &CancellationToken,
) -> Result<(), DeployError> {
    let label = format!("Waiting for application {name} to start");
    let local_id = module.local_id.clone();

    let state = InstanceStateTracker::new(requests, name, &session.config.tracker)
        .track(cancel)
        .await?;
    ensure_active(cancel, &label)?;

    if state != InstanceState::Running {
        session.set_module_state(&local_id, ModuleState::Stopped);
        session.refresh_module_with_instances(module, cancel).await?;
        let stopped = module
            .application
            .as_ref()
            .is_none_or(|app| app.state == AppState::Stopped);
        if stopped {
            return Err(DeployError::Canceled(format!(
                "{name} - application was stopped or does not exist. Terminating start operation."
            )));
        }
        return Err(DeployError::Timeout(module.deployed_name.clone()));
    }

    ensure_active(cancel, &label)?;
    if let Some(tracker) = session.app_state {
        tracker.start_tracking(module);
    }

    info!(app = %name, "application started");
    session.fire_event(ServerEvent::AppStarted {
        local_id: local_id.clone(),
        app_name: name.to_string(),
    });

    if let Some(tracker) = session.app_state {
        let poll = session.config.tracker.steady_state_poll();
        while tracker.application_state(module) == ModuleState::Starting {
            if !sleep_or_cancel(cancel, poll).await {
                debug!(app = %name, "readiness wait interrupted");
                break;
            }
        }
        tracker.stop_tracking(module);
    }

    session.set_module_state(&local_id, ModuleState::Started);
    Ok(())
}
