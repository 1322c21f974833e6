//! Operation workflows against the recording controller.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::time::{Duration, Instant};

use cfdeploy_cli::application::operation::{
    DeleteApplicationOperation, PushApplicationOperation, RestartOperation,
    ScaleApplicationOperation, StopApplicationOperation, UpdateUrlsOperation,
};
use cfdeploy_cli::application::{InstanceStateTracker, OperationOutcome, run_operation};
use cfdeploy_cli::domain::{
    ApplicationAction, DeployError, DeploymentConfiguration, DeploymentInfo, ModuleState,
    PublishState, ServerEvent, TrackerConfig,
};
use cfdeploy_common::{AppState, InstanceState};
use tokio_util::sync::CancellationToken;

use crate::mocks::{FakeController, Harness, listing};

fn web_info() -> DeploymentInfo {
    DeploymentInfo {
        uris: vec!["web.apps.example.com".to_string()],
        memory: 512,
        ..DeploymentInfo::named("web-app")
    }
}

// ── restart / start ──────────────────────────────────────────────────────────

#[tokio::test]
async fn restart_stops_starts_and_reports_started() {
    let h = Harness::new(FakeController::new().with_app("web-app", AppState::Started)).map("web", "web-app");
    let session = h.session();

    let outcome = run_operation(&RestartOperation::new("web"), &session, &CancellationToken::new())
        .await
        .expect("restart");

    assert_eq!(outcome, OperationOutcome::Completed);
    assert_eq!(
        h.controller.mutations(),
        vec!["stop_application web-app", "start_application web-app"]
    );
    assert_eq!(h.board.module_state("web"), ModuleState::Started);
    assert_eq!(
        h.board.module_history("web"),
        vec![ModuleState::Starting, ModuleState::Started]
    );
    let events = h.events.fired();
    assert!(events.contains(&ServerEvent::AppStarting {
        local_id: "web".to_string(),
        app_name: "web-app".to_string(),
    }));
    assert!(events.contains(&ServerEvent::AppStarted {
        local_id: "web".to_string(),
        app_name: "web-app".to_string(),
    }));
    assert_eq!(h.refresh.drain(), vec!["web".to_string()]);
    assert!(h.module("web").expect("record").status.is_none());
}

#[tokio::test]
async fn start_waits_through_starting_instances() {
    let h = Harness::new(FakeController::new().with_app("web-app", AppState::Stopped)).map("web", "web-app");
    h.controller.script_instances(vec![
        listing(&[InstanceState::Starting]),
        listing(&[InstanceState::Starting]),
        listing(&[InstanceState::Running]),
    ]);
    let session = h.session();

    let outcome = run_operation(&RestartOperation::start("web"), &session, &CancellationToken::new())
        .await
        .expect("start");

    assert_eq!(outcome, OperationOutcome::Completed);
    assert_eq!(h.controller.count("get_application_instances"), 3);
    assert_eq!(h.board.module_state("web"), ModuleState::Started);
}

#[tokio::test]
async fn stop_failure_before_start_is_not_fatal() {
    let h = Harness::new(FakeController::new().with_app("web-app", AppState::Started)).map("web", "web-app");
    h.controller.fail(
        "stop_application",
        vec![cfdeploy_cli::domain::ControllerError::status(500)],
    );
    let session = h.session();

    let outcome = run_operation(&RestartOperation::new("web"), &session, &CancellationToken::new())
        .await
        .expect("restart despite failed stop");

    assert_eq!(outcome, OperationOutcome::Completed);
    assert_eq!(h.controller.count("start_application"), 1);
}

#[tokio::test(start_paused = true)]
async fn app_stopped_during_start_is_canceled_and_stays_stopped() {
    let controller = FakeController::new().with_app("web-app", AppState::Stopped);
    controller.stopped_externally.set(true);
    let h = Harness::new(controller).map("web", "web-app");
    let session = h.session();

    let outcome = run_operation(&RestartOperation::start("web"), &session, &CancellationToken::new())
        .await
        .expect("cancellation is not an error");

    let OperationOutcome::Canceled { reason } = outcome else {
        panic!("expected canceled outcome");
    };
    assert!(reason.contains("stopped or does not exist"), "got: {reason}");
    assert_eq!(h.board.module_state("web"), ModuleState::Stopped);
    assert_eq!(h.board.server_publish_state(), PublishState::Incremental);
    assert_eq!(h.board.module_publish_state("web"), PublishState::Incremental);
    assert!(h.refresh.is_empty());
    assert!(
        h.console
            .lines
            .borrow()
            .iter()
            .any(|l| l.contains("Operation canceled")),
    );
}

#[tokio::test(start_paused = true)]
async fn instances_never_running_times_out() {
    let h = Harness::new(FakeController::new().with_app("web-app", AppState::Started)).map("web", "web-app");
    h.controller
        .script_instances(vec![listing(&[InstanceState::Starting, InstanceState::Down])]);
    let session = h.session();

    let err = run_operation(&RestartOperation::new("web"), &session, &CancellationToken::new())
        .await
        .expect_err("times out");

    assert!(err.is_timeout(), "got: {err}");
    assert_eq!(h.board.module_state("web"), ModuleState::Stopped);
    assert_eq!(h.board.module_publish_state("web"), PublishState::Unknown);
    let stored = h.module("web").expect("record");
    assert_eq!(stored.status.as_deref(), Some("Starting of web-app timed out"));
}

#[tokio::test]
async fn crashed_instances_end_the_wait_early() {
    let h = Harness::new(FakeController::new().with_app("web-app", AppState::Started)).map("web", "web-app");
    h.controller
        .script_instances(vec![listing(&[InstanceState::Crashed, InstanceState::Flapping])]);
    let session = h.session();

    let err = run_operation(&RestartOperation::new("web"), &session, &CancellationToken::new())
        .await
        .expect_err("fails");

    assert!(err.is_timeout());
    // One poll decides; the refresh afterwards adds the second.
    assert_eq!(h.controller.count("get_application_instances"), 2);
}

#[tokio::test]
async fn cancel_before_execute_makes_no_remote_calls() {
    let h = Harness::new(FakeController::new().with_app("web-app", AppState::Started)).map("web", "web-app");
    let session = h.session();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = run_operation(&RestartOperation::new("web"), &session, &cancel)
        .await
        .expect("canceled");

    assert!(outcome.is_canceled());
    assert!(h.controller.calls().is_empty());
    assert_eq!(h.board.module_state("web"), ModuleState::Unknown);
}

#[tokio::test]
async fn unmapped_module_is_rejected() {
    let h = Harness::new(FakeController::new());
    let session = h.session();

    let err = run_operation(&RestartOperation::new("ghost"), &session, &CancellationToken::new())
        .await
        .expect_err("no mapping");

    assert!(matches!(err, DeployError::NoMappedModule(ref id) if id == "ghost"));
    assert!(h.controller.calls().is_empty());
}

#[tokio::test]
async fn tracker_notices_cancel_within_one_interval() {
    let h = Harness::new(FakeController::new().with_app("web-app", AppState::Started));
    h.controller
        .script_instances(vec![listing(&[InstanceState::Starting])]);
    let session = h.session();
    let requests = session.requests();
    let config = TrackerConfig {
        poll_interval_ms: 200,
        max_wait_secs: 30,
        steady_state_poll_ms: 200,
    };
    let tracker = InstanceStateTracker::new(&requests, "web-app", &config);
    let cancel = CancellationToken::new();

    let started = Instant::now();
    let (state, ()) = tokio::join!(tracker.track(&cancel), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
    });

    assert_eq!(state.expect("no error"), InstanceState::Starting);
    assert!(started.elapsed() < Duration::from_millis(250), "took {:?}", started.elapsed());
}

// ── stop ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn stop_projects_stopping_then_stopped() {
    let h = Harness::new(FakeController::new().with_app("web-app", AppState::Started)).map("web", "web-app");
    let session = h.session();

    run_operation(&StopApplicationOperation::new("web"), &session, &CancellationToken::new())
        .await
        .expect("stop");

    assert_eq!(
        h.board.module_history("web"),
        vec![ModuleState::Stopping, ModuleState::Stopped]
    );
    assert_eq!(h.controller.app("web-app").expect("app").state, AppState::Stopped);
    let stored = h.module("web").expect("record");
    assert_eq!(
        stored.application.map(|a| a.state),
        Some(AppState::Stopped)
    );
}

// ── push ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn push_creates_mapping_and_application() {
    let h = Harness::new(FakeController::new());
    let session = h.session();
    let op = PushApplicationOperation::new(
        "web",
        web_info(),
        DeploymentConfiguration::new(ApplicationAction::Start),
    );

    let outcome = run_operation(&op, &session, &CancellationToken::new())
        .await
        .expect("push");

    assert_eq!(outcome, OperationOutcome::Completed);
    let created = h.controller.app("web-app").expect("created");
    assert_eq!(created.memory, 512);
    assert_eq!(created.state, AppState::Started);
    let stored = h.module("web").expect("mapping created");
    assert_eq!(stored.deployed_name, "web-app");
    assert_eq!(stored.deployment_info, Some(web_info()));
    assert_eq!(h.board.module_state("web"), ModuleState::Started);
}

#[tokio::test]
async fn push_without_start_leaves_application_stopped() {
    let h = Harness::new(FakeController::new());
    let session = h.session();
    let op = PushApplicationOperation::new(
        "web",
        web_info(),
        DeploymentConfiguration::new(ApplicationAction::Stop),
    );

    run_operation(&op, &session, &CancellationToken::new())
        .await
        .expect("push");

    assert_eq!(h.controller.count("start_application"), 0);
    assert_eq!(h.controller.app("web-app").expect("created").state, AppState::Stopped);
    assert_eq!(h.board.module_state("web"), ModuleState::Stopped);
}

#[tokio::test]
async fn push_to_existing_application_updates_in_place() {
    let h = Harness::new(
        FakeController::new()
            .with_app("web-app", AppState::Started)
            .with_uris("web-app", &["old.apps.example.com"]),
    )
    .map_with(
        "web",
        DeploymentInfo {
            uris: vec!["old.apps.example.com".to_string()],
            ..DeploymentInfo::named("web-app")
        },
    );
    let session = h.session();
    let op = PushApplicationOperation::new("web", web_info(), DeploymentConfiguration::default());

    run_operation(&op, &session, &CancellationToken::new())
        .await
        .expect("push");

    assert_eq!(h.controller.count("create_application"), 0);
    assert_eq!(h.controller.count("update_application_memory"), 1);
    let app = h.controller.app("web-app").expect("app");
    assert_eq!(app.uris, vec!["web.apps.example.com".to_string()]);
    assert_eq!(
        h.events.fired().first(),
        Some(&ServerEvent::AppUrlChanged {
            local_id: "web".to_string(),
            app_name: "web-app".to_string(),
            old: vec!["old.apps.example.com".to_string()],
            new: vec!["web.apps.example.com".to_string()],
        })
    );
}

#[tokio::test]
async fn push_rejects_invalid_application_name() {
    let h = Harness::new(FakeController::new());
    let session = h.session();
    let op = PushApplicationOperation::new(
        "web",
        DeploymentInfo::named("bad name!"),
        DeploymentConfiguration::default(),
    );

    let err = run_operation(&op, &session, &CancellationToken::new())
        .await
        .expect_err("invalid");

    assert!(matches!(err, DeployError::InvalidDeployment(_)));
    assert!(h.controller.mutations().is_empty());
}

#[tokio::test]
async fn push_without_name_redeploys_the_mapped_application() {
    let h = Harness::new(FakeController::new().with_app("web-app", AppState::Stopped))
        .map("web", "web-app");
    let session = h.session();
    let op = PushApplicationOperation::new(
        "web",
        DeploymentInfo {
            deployment_name: None,
            ..web_info()
        },
        DeploymentConfiguration::new(ApplicationAction::Stop),
    );

    run_operation(&op, &session, &CancellationToken::new())
        .await
        .expect("push");

    assert_eq!(h.controller.count("create_application"), 0);
    assert!(h.controller.app("web").is_none());
    let stored = h.module("web").expect("record");
    assert_eq!(stored.deployed_name, "web-app");
    assert_eq!(
        stored.deployment_info.and_then(|i| i.deployment_name),
        Some("web-app".to_string())
    );
}

#[tokio::test]
async fn push_without_name_or_mapping_uses_the_local_id() {
    let h = Harness::new(FakeController::new());
    let session = h.session();
    let op = PushApplicationOperation::new(
        "web",
        DeploymentInfo {
            deployment_name: None,
            ..web_info()
        },
        DeploymentConfiguration::new(ApplicationAction::Stop),
    );

    run_operation(&op, &session, &CancellationToken::new())
        .await
        .expect("push");

    assert!(h.controller.app("web").is_some());
    assert_eq!(h.module("web").expect("record").deployed_name, "web");
}

// ── delete ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_skips_services_still_bound_elsewhere() {
    let h = Harness::new(
        FakeController::new()
            .with_app("web-app", AppState::Started)
            .with_app("api-app", AppState::Started)
            .with_service("shared-db", &["web-app", "api-app"]),
    )
    .map("web", "web-app");
    let session = h.session();
    let op = DeleteApplicationOperation::new("web").with_services(true);

    let outcome = run_operation(&op, &session, &CancellationToken::new())
        .await
        .expect("delete");

    assert_eq!(outcome, OperationOutcome::Completed);
    assert!(h.controller.app("web-app").is_none());
    assert_eq!(h.controller.count("delete_service"), 0);
    let warnings = h.console.warnings.borrow();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("shared-db"), "got: {}", warnings[0]);
    assert!(h.module("web").is_none());
    assert!(h.refresh.is_empty());
}

#[tokio::test]
async fn delete_of_missing_application_still_forgets_record() {
    let h = Harness::new(FakeController::new()).map("web", "web-app");
    let session = h.session();

    run_operation(
        &DeleteApplicationOperation::new("web"),
        &session,
        &CancellationToken::new(),
    )
    .await
    .expect("delete");

    assert_eq!(h.controller.count("delete_application"), 0);
    assert!(h.module("web").is_none());
    assert_eq!(h.board.module_state("web"), ModuleState::Stopped);
}

#[tokio::test]
async fn delete_of_missing_application_removes_recorded_services() {
    let h = Harness::new(FakeController::new().with_service("web-db", &[])).map_with(
        "web",
        DeploymentInfo {
            services: vec!["web-db".to_string()],
            ..DeploymentInfo::named("web-app")
        },
    );
    let session = h.session();
    let op = DeleteApplicationOperation::new("web").with_services(true);

    run_operation(&op, &session, &CancellationToken::new())
        .await
        .expect("delete");

    assert_eq!(h.controller.count("delete_application"), 0);
    assert_eq!(h.controller.count("delete_service"), 1);
    assert!(h.module("web").is_none());
}

#[tokio::test]
async fn delete_by_name_without_record() {
    let h = Harness::new(FakeController::new().with_app("legacy", AppState::Stopped));
    let session = h.session();
    let op = DeleteApplicationOperation::new("legacy").with_app_name("legacy");

    run_operation(&op, &session, &CancellationToken::new())
        .await
        .expect("delete");

    assert!(h.controller.app("legacy").is_none());
}

// ── scale / urls ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn scale_updates_remote_and_record() {
    let h = Harness::new(FakeController::new().with_app("web-app", AppState::Started)).map("web", "web-app");
    let session = h.session();

    run_operation(
        &ScaleApplicationOperation::new("web", Some(3), Some(1024)),
        &session,
        &CancellationToken::new(),
    )
    .await
    .expect("scale");

    let app = h.controller.app("web-app").expect("app");
    assert_eq!((app.instances, app.memory), (3, 1024));
    let info = h.module("web").and_then(|m| m.deployment_info).expect("info");
    assert_eq!((info.instances, info.memory), (3, 1024));
}

#[tokio::test]
async fn scale_to_zero_instances_is_rejected_before_any_write() {
    let h = Harness::new(FakeController::new().with_app("web-app", AppState::Started)).map("web", "web-app");
    let session = h.session();

    let err = run_operation(
        &ScaleApplicationOperation::new("web", Some(0), None),
        &session,
        &CancellationToken::new(),
    )
    .await
    .expect_err("invalid");

    assert!(matches!(err, DeployError::InvalidDeployment(_)));
    assert!(h.controller.mutations().is_empty());
}

#[tokio::test]
async fn url_update_fires_one_change_event() {
    let h = Harness::new(
        FakeController::new()
            .with_app("web-app", AppState::Started)
            .with_uris("web-app", &["a.example.com"]),
    )
    .map_with(
        "web",
        DeploymentInfo {
            uris: vec!["a.example.com".to_string()],
            ..DeploymentInfo::named("web-app")
        },
    );
    let session = h.session();
    let uris = vec!["b.example.com".to_string()];

    run_operation(
        &UpdateUrlsOperation::new("web", uris.clone()),
        &session,
        &CancellationToken::new(),
    )
    .await
    .expect("urls");

    assert_eq!(
        h.events.fired(),
        vec![ServerEvent::AppUrlChanged {
            local_id: "web".to_string(),
            app_name: "web-app".to_string(),
            old: vec!["a.example.com".to_string()],
            new: uris.clone(),
        }]
    );
    assert_eq!(h.controller.count("get_application "), 0);
    let info = h.module("web").and_then(|m| m.deployment_info).expect("info");
    assert_eq!(info.uris, uris);
}
