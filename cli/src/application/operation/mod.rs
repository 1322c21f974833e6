//! Application operations — multi-step workflows over requests.
//!
//! Every operation runs through [`run_operation`], which drives the
//! `Pending → ResolvingModule → Executing → {Completed | Canceled | Failed}`
//! state machine and applies the side effects of each outcome:
//!
//! - **Completed**: a refresh of the module is scheduled.
//! - **Canceled**: not an error. Module state becomes `Unknown` (or stays
//!   `Stopped` when the operation established that), server and module
//!   publish state become `Incremental`, and the reason is logged and echoed
//!   to the console.
//! - **Failed**: the error is stored on the module's status, module publish
//!   state becomes `Unknown`, and the error is returned.

mod delete;
mod push;
mod restart;
mod start;
mod stop;
mod update;

pub use delete::DeleteApplicationOperation;
pub use push::PushApplicationOperation;
pub use restart::RestartOperation;
pub use stop::StopApplicationOperation;
pub use update::{ScaleApplicationOperation, UpdateUrlsOperation};

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::application::ports::RemoteControlClient;
use crate::application::session::Session;
use crate::domain::{ApplicationModule, DeployError, ModuleState, OperationPhase, PublishState};

/// How an operation ended, when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutcome {
    Completed,
    Canceled { reason: String },
}

impl OperationOutcome {
    #[must_use]
    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled { .. })
    }
}

/// A workflow acting on one primary module.
#[allow(async_fn_in_trait)]
pub trait ApplicationOperation {
    /// Human-readable name, e.g. "Restarting application".
    fn name(&self) -> &str;

    /// Local id of the primary module.
    fn local_id(&self) -> &str;

    /// Resolve the primary module. Only push may create a mapping; the
    /// default refuses unmapped modules.
    ///
    /// # Errors
    ///
    /// `NoMappedModule` when no mapping exists.
    fn resolve<C: RemoteControlClient>(
        &self,
        session: &Session<'_, C>,
    ) -> Result<ApplicationModule, DeployError> {
        session.mapped_module(self.local_id())
    }

    /// Perform the operation's steps.
    async fn execute<C: RemoteControlClient>(
        &self,
        session: &Session<'_, C>,
        module: &mut ApplicationModule,
        cancel: &CancellationToken,
    ) -> Result<(), DeployError>;

    /// Whether a completed run schedules a refresh of the module.
    fn refresh_on_completion(&self) -> bool {
        true
    }
}

fn enter(operation: &impl ApplicationOperation, phase: OperationPhase) {
    debug!(
        operation = operation.name(),
        local_id = operation.local_id(),
        ?phase,
        "operation phase"
    );
}

/// Run `operation` against `session`.
///
/// # Errors
///
/// Returns the failure of any non-canceled step. Cancellation is reported as
/// [`OperationOutcome::Canceled`].
pub async fn run_operation<C, O>(
    operation: &O,
    session: &Session<'_, C>,
    cancel: &CancellationToken,
) -> Result<OperationOutcome, DeployError>
where
    C: RemoteControlClient,
    O: ApplicationOperation,
{
    let local_id = operation.local_id();
    enter(operation, OperationPhase::Pending);
    if cancel.is_cancelled() {
        let reason = DeployError::canceled(operation.name());
        return Ok(canceled(operation, session, local_id, &reason));
    }

    enter(operation, OperationPhase::ResolvingModule);
    let mut module = match operation.resolve(session) {
        Ok(module) => module,
        Err(e) => return Err(failed(operation, session, None, e)),
    };

    if cancel.is_cancelled() {
        let reason = DeployError::canceled(operation.name());
        return Ok(canceled(operation, session, &module.deployed_name, &reason));
    }

    enter(operation, OperationPhase::Executing);
    match operation.execute(session, &mut module, cancel).await {
        Ok(()) => {
            enter(operation, OperationPhase::Completed);
            info!(operation = operation.name(), app = %module.deployed_name, "operation completed");
            if operation.refresh_on_completion() {
                session.refresh.schedule_refresh(local_id);
            }
            Ok(OperationOutcome::Completed)
        }
        Err(e) if e.is_canceled() => Ok(canceled(operation, session, &module.deployed_name, &e)),
        Err(e) => Err(failed(operation, session, Some(&mut module), e)),
    }
}

fn canceled<C: RemoteControlClient>(
    operation: &impl ApplicationOperation,
    session: &Session<'_, C>,
    app_name: &str,
    reason: &DeployError,
) -> OperationOutcome {
    enter(operation, OperationPhase::Canceled);
    let local_id = operation.local_id();
    let state = match session.module_state(local_id) {
        Some(ModuleState::Stopped) => ModuleState::Stopped,
        _ => ModuleState::Unknown,
    };
    session.set_module_state(local_id, state);
    session.set_server_publish_state(PublishState::Incremental);
    session.set_module_publish_state(local_id, PublishState::Incremental);

    let reason = reason.to_string();
    warn!(local_id, "{reason}");
    session.print(app_name, &format!("Operation canceled: {reason}"));
    OperationOutcome::Canceled { reason }
}

fn failed<C: RemoteControlClient>(
    operation: &impl ApplicationOperation,
    session: &Session<'_, C>,
    module: Option<&mut ApplicationModule>,
    err: DeployError,
) -> DeployError {
    enter(operation, OperationPhase::Failed);
    let local_id = operation.local_id();
    error!(operation = operation.name(), local_id, error = %err, "operation failed");
    if let Some(module) = module {
        module.set_error(err.user_message());
        // Only annotate records that still exist; delete may have removed it.
        if matches!(session.store.cloud_module(local_id), Ok(Some(_)))
            && let Err(e) = session.save(module)
        {
            warn!(local_id, error = %e, "could not record operation error");
        }
    }
    session.set_module_publish_state(local_id, PublishState::Unknown);
    err
}
