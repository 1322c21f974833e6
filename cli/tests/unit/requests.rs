//! Retry behaviour of configured requests against the recording controller.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use cfdeploy_cli::domain::{ControllerError, DeployError};
use cfdeploy_common::{AppState, CloudDomain, CloudRoute, CloudService};
use tokio_util::sync::CancellationToken;

use crate::mocks::{FakeController, Harness, app_stopped, staging};

#[tokio::test]
async fn staging_errors_are_retried_until_the_call_succeeds() {
    let h = Harness::new(FakeController::new().with_app("web-app", AppState::Started));
    h.controller
        .fail("update_application_services", vec![staging(), staging()]);
    let session = h.session();

    session
        .requests()
        .update_application_services("web-app", vec!["db".to_string()])
        .run(&CancellationToken::new())
        .await
        .expect("third attempt succeeds");

    assert_eq!(h.controller.count("update_application_services"), 3);
    assert_eq!(
        h.controller.app("web-app").expect("app").services,
        vec!["db".to_string()]
    );
}

#[tokio::test]
async fn staging_retries_stop_at_the_attempt_limit() {
    let h = Harness::new(FakeController::new().with_app("web-app", AppState::Started));
    h.controller.fail(
        "update_application_services",
        vec![staging(), staging(), staging(), staging()],
    );
    let session = h.session();

    let err = session
        .requests()
        .update_application_services("web-app", Vec::new())
        .run(&CancellationToken::new())
        .await
        .expect_err("gives up");

    assert!(
        matches!(err, DeployError::StagingInProgress { attempts: 3, .. }),
        "got: {err:?}"
    );
    assert_eq!(h.controller.count("update_application_services"), 3);
}

#[tokio::test]
async fn not_staged_code_counts_as_staging() {
    let h = Harness::new(FakeController::new().with_app("web-app", AppState::Started));
    h.controller.fail(
        "update_application_services",
        vec![ControllerError::coded(400, 170_002, "App has not finished staging")],
    );
    let session = h.session();

    session
        .requests()
        .update_application_services("web-app", Vec::new())
        .run(&CancellationToken::new())
        .await
        .expect("retried");

    assert_eq!(h.controller.count("update_application_services"), 2);
}

#[tokio::test]
async fn stopped_application_ends_memory_update_at_once() {
    let h = Harness::new(FakeController::new().with_app("web-app", AppState::Stopped));
    h.controller
        .fail("update_application_memory", vec![app_stopped(), app_stopped()]);
    let session = h.session();

    let err = session
        .requests()
        .update_application_memory("web-app", 1024)
        .run(&CancellationToken::new())
        .await
        .expect_err("conflict");

    let DeployError::AppStateConflict { message, .. } = &err else {
        panic!("expected conflict, got {err:?}");
    };
    assert!(message.contains("while the application is stopped"));
    assert_eq!(h.controller.count("update_application_memory"), 1);
}

#[tokio::test]
async fn instances_of_stopped_application_are_absent_not_an_error() {
    let h = Harness::new(FakeController::new().with_app("web-app", AppState::Stopped));
    let session = h.session();

    let info = session
        .requests()
        .get_instances_info("web-app")
        .run(&CancellationToken::new())
        .await
        .expect("no error");

    assert!(info.is_none());
}

#[tokio::test]
async fn plain_failures_carry_the_request_label() {
    let h = Harness::new(FakeController::new());
    h.controller
        .fail("get_recent_logs", vec![ControllerError::status(500)]);
    let session = h.session();

    let err = session
        .requests()
        .get_recent_logs("web-app")
        .run(&CancellationToken::new())
        .await
        .expect_err("fails");

    let DeployError::RemoteCall { label, .. } = &err else {
        panic!("expected remote call error, got {err:?}");
    };
    assert_eq!(label, "Getting existing application logs for: web-app");
    assert_eq!(h.controller.count("get_recent_logs"), 1);
}

#[tokio::test]
async fn cancel_stops_a_batch_before_the_next_item() {
    let h = Harness::new(FakeController::new());
    let session = h.session();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = session
        .requests()
        .create_services(vec![CloudService {
            name: "db".to_string(),
            ..CloudService::default()
        }])
        .run(&cancel, &h.console)
        .await
        .expect_err("canceled");

    assert!(err.is_canceled());
    assert!(h.controller.calls().is_empty());
}

#[tokio::test]
async fn create_services_returns_the_space_listing() {
    let h = Harness::new(FakeController::new().with_service("existing", &[]));
    let session = h.session();

    let outcome = session
        .requests()
        .create_services(vec![CloudService {
            name: "db".to_string(),
            label: Some("postgres".to_string()),
            plan: Some("small".to_string()),
        }])
        .run(&CancellationToken::new(), &h.console)
        .await
        .expect("created");

    let names: Vec<_> = outcome.value.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["db", "existing"]);
    assert!(outcome.skipped.is_empty());
    assert_eq!(h.console.steps.borrow().len(), 1);
}

#[tokio::test]
async fn deleting_no_routes_builds_no_request() {
    let h = Harness::new(FakeController::new());
    let session = h.session();

    assert!(session.requests().delete_routes(Vec::new()).is_none());
}

#[tokio::test]
async fn delete_routes_removes_each_route() {
    let h = Harness::new(FakeController::new());
    let session = h.session();
    let route = |host: &str| CloudRoute {
        host: host.to_string(),
        domain: CloudDomain {
            name: "apps.example.com".to_string(),
        },
        app_count: 0,
    };

    session
        .requests()
        .delete_routes(vec![route("old"), route("tmp")])
        .expect("request")
        .run(&CancellationToken::new())
        .await
        .expect("deleted");

    assert_eq!(
        h.controller.calls(),
        vec![
            "delete_route old.apps.example.com".to_string(),
            "delete_route tmp.apps.example.com".to_string(),
        ]
    );
}

#[tokio::test]
async fn stats_of_stopped_application_are_absent() {
    let h = Harness::new(FakeController::new().with_app("web-app", AppState::Stopped));
    h.controller
        .fail("get_application_stats", vec![app_stopped()]);
    let session = h.session();

    let stats = session
        .requests()
        .get_application_stats("web-app")
        .run(&CancellationToken::new())
        .await
        .expect("no error");

    assert!(stats.is_none());
}

#[tokio::test]
async fn org_domains_are_requested_for_the_named_org() {
    let h = Harness::new(FakeController::new());
    let session = h.session();

    let domains = session
        .requests()
        .get_domains_for_org("acme")
        .run(&CancellationToken::new())
        .await
        .expect("domains");

    let names: Vec<_> = domains.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["apps.example.com", "acme.example.com"]);
    assert_eq!(h.controller.calls(), vec!["get_domains_for_org acme".to_string()]);
}

#[tokio::test]
async fn service_offerings_list_plans() {
    let h = Harness::new(FakeController::new());
    let session = h.session();

    let offerings = session
        .requests()
        .get_service_offerings()
        .run(&CancellationToken::new())
        .await
        .expect("offerings");

    assert_eq!(offerings.len(), 1);
    assert_eq!(offerings[0].plans[0].name, "small");
}

#[tokio::test]
async fn failed_ssh_code_exchange_is_not_retried() {
    let h = Harness::new(FakeController::new());
    h.controller.fail("get_ssh_code", vec![staging(), staging()]);
    let session = h.session();

    let err = session
        .requests()
        .get_ssh_code()
        .run(&CancellationToken::new())
        .await
        .expect_err("fails");

    assert!(
        matches!(
            err,
            DeployError::RemoteCall { .. } | DeployError::Unavailable { .. }
        ),
        "got: {err:?}"
    );
    assert_eq!(h.controller.count("get_ssh_code"), 1);
}

#[tokio::test]
async fn canceled_login_reports_cancellation() {
    let h = Harness::new(FakeController::new());
    let session = h.session();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = session
        .requests()
        .connect()
        .run(&cancel)
        .await
        .expect_err("canceled");

    assert!(err.is_canceled());
}
