//! Request factory — one builder per controller action.
//!
//! Builders perform no I/O; they capture owned arguments and shared
//! references and return a [`Request`] (or [`BatchRequest`]) configured with
//! the retry policy and messages appropriate to the call.

use cfdeploy_common::{
    ApplicationLog, ApplicationStats, CloudApplication, CloudDomain, CloudRoute, CloudService,
    EnvironmentVariable, InstancesInfo, ServiceOffering, StartingInfo,
};
use tracing::debug;

use crate::application::ports::{EventSink, LocalModuleStore, RemoteControlClient};
use crate::application::request::{
    BatchRequest, ItemOutcome, Request, RetryPolicy, StagingBackoff,
};
use crate::domain::module::env_to_map;
use crate::domain::{DeployError, DeploymentInfo, ServerEvent};

/// Builds configured requests against one controller.
pub struct RequestFactory<'a, C> {
    client: &'a C,
    store: &'a dyn LocalModuleStore,
    events: &'a dyn EventSink,
    server: String,
    backoff: StagingBackoff,
}

impl<'a, C: RemoteControlClient> RequestFactory<'a, C> {
    /// `server` names the controller in labels and unavailable messages.
    pub fn new(
        client: &'a C,
        store: &'a dyn LocalModuleStore,
        events: &'a dyn EventSink,
        server: impl Into<String>,
        backoff: StagingBackoff,
    ) -> Self {
        Self {
            client,
            store,
            events,
            server: server.into(),
            backoff,
        }
    }

    fn staging_aware(&self) -> RetryPolicy {
        RetryPolicy::StagingAware(self.backoff.clone())
    }

    fn stopped_aware(&self, message: String) -> RetryPolicy {
        RetryPolicy::AppStoppedAware {
            backoff: self.backoff.clone(),
            message,
        }
    }

    // ── Session ──────────────────────────────────────────────────────────────

    pub fn connect(&self) -> Request<'a, ()> {
        let client = self.client;
        Request::new(format!("Login to {}", self.server), move || async move {
            Ok(client.login().await?)
        })
    }

    // ── Applications ─────────────────────────────────────────────────────────

    pub fn get_applications(&self) -> Request<'a, Vec<CloudApplication>> {
        let client = self.client;
        Request::new(
            format!("Getting all applications from {}", self.server),
            move || async move { Ok(client.get_applications().await?) },
        )
        .with_unavailable_hint(format!(
            "Unable to list applications: {} is temporarily unavailable. Try again shortly.",
            self.server
        ))
    }

    pub fn get_application(&self, name: &str) -> Request<'a, CloudApplication> {
        let client = self.client;
        let app = name.to_string();
        let hint = format!(
            "Unable to fetch application {app}: {} is temporarily unavailable. Try again shortly.",
            self.server
        );
        Request::new(format!("Getting application {app}"), move || {
            let app = app.clone();
            async move { Ok(client.get_application(&app).await?) }
        })
        .with_unavailable_hint(hint)
    }

    pub fn create_application(&self, name: &str, info: DeploymentInfo) -> Request<'a, ()> {
        let client = self.client;
        let app = name.to_string();
        Request::new(format!("Creating application {app}"), move || {
            let app = app.clone();
            let info = info.clone();
            async move { Ok(client.create_application(&app, &info).await?) }
        })
    }

    /// Start `name`, returning the staging info token when the controller
    /// provides one.
    pub fn start_application(&self, name: &str) -> Request<'a, Option<StartingInfo>> {
        let client = self.client;
        let app = name.to_string();
        Request::new(format!("Starting application {app}"), move || {
            let app = app.clone();
            async move { Ok(client.start_application(&app).await?) }
        })
    }

    pub fn stop_application(&self, label: &str, name: &str) -> Request<'a, ()> {
        let client = self.client;
        let app = name.to_string();
        Request::new(label, move || {
            let app = app.clone();
            async move { Ok(client.stop_application(&app).await?) }
        })
    }

    pub fn delete_application(&self, name: &str) -> Request<'a, ()> {
        let client = self.client;
        let app = name.to_string();
        Request::new(format!("Deleting {app}"), move || {
            let app = app.clone();
            async move { Ok(client.delete_application(&app).await?) }
        })
    }

    pub fn update_application_memory(&self, name: &str, memory: u32) -> Request<'a, ()> {
        let client = self.client;
        let app = name.to_string();
        let message = format!("Unable to update memory of {app} while the application is stopped");
        Request::new(format!("Updating memory of {app} to {memory}M"), move || {
            let app = app.clone();
            async move { Ok(client.update_application_memory(&app, memory).await?) }
        })
        .with_policy(self.stopped_aware(message))
    }

    /// Scale `name` to `instances`. The controller allows this while the
    /// application is running; the count must be at least one.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDeployment` for a zero instance count.
    pub fn update_application_instances(
        &self,
        name: &str,
        instances: u32,
    ) -> Result<Request<'a, ()>, DeployError> {
        if instances == 0 {
            return Err(DeployError::InvalidDeployment(format!(
                "Instance count for {name} must be 1 or higher"
            )));
        }
        let client = self.client;
        let app = name.to_string();
        let message =
            format!("Unable to update instances of {app} while the application is stopped");
        Ok(Request::new("Updating application instances", move || {
            let app = app.clone();
            async move { Ok(client.update_application_instances(&app, instances).await?) }
        })
        .with_policy(self.stopped_aware(message)))
    }

    /// Replace the URIs of `name`, firing `AppUrlChanged` once the controller
    /// accepted the write.
    ///
    /// Previous URIs come from the local record when one exists; the
    /// controller is only asked when there is no record to consult. The
    /// event is only fired when a local record exists.
    pub fn update_application_uris(&self, name: &str, uris: Vec<String>) -> Request<'a, ()> {
        let client = self.client;
        let store = self.store;
        let events = self.events;
        let app = name.to_string();
        let message = format!("Unable to update URLs of {app} while the application is stopped");
        Request::new(format!("Updating URLs of {app}"), move || {
            let app = app.clone();
            let uris = uris.clone();
            async move {
                let existing = store
                    .existing_cloud_module(&app)
                    .map_err(DeployError::Store)?;
                let recorded = existing
                    .as_ref()
                    .and_then(|m| m.deployment_info.as_ref())
                    .map(|info| info.uris.clone());
                let old = match recorded {
                    Some(old) => old,
                    None => client.get_application(&app).await?.uris,
                };

                client.update_application_uris(&app, &uris).await?;

                if let Some(module) = existing {
                    events.fire_event(ServerEvent::AppUrlChanged {
                        local_id: module.local_id,
                        app_name: app,
                        old,
                        new: uris,
                    });
                }
                Ok(())
            }
        })
        .with_policy(self.stopped_aware(message))
    }

    /// Replace the environment of `name`. Later assignments of the same
    /// variable win.
    pub fn update_application_env(
        &self,
        name: &str,
        vars: &[EnvironmentVariable],
    ) -> Request<'a, ()> {
        let client = self.client;
        let app = name.to_string();
        let env = env_to_map(vars);
        Request::new(
            format!("Updating environment variables of {app}"),
            move || {
                let app = app.clone();
                let env = env.clone();
                async move { Ok(client.update_application_env(&app, &env).await?) }
            },
        )
    }

    pub fn update_application_services(
        &self,
        name: &str,
        services: Vec<String>,
    ) -> Request<'a, ()> {
        let client = self.client;
        let app = name.to_string();
        Request::new(format!("Updating service bindings of {app}"), move || {
            let app = app.clone();
            let services = services.clone();
            async move { Ok(client.update_application_services(&app, &services).await?) }
        })
        .with_policy(self.staging_aware())
    }

    // ── Monitoring ───────────────────────────────────────────────────────────

    /// Stats for `name`; `None` while the app is stopped or not yet able to
    /// report.
    pub fn get_application_stats(&self, name: &str) -> Request<'a, Option<ApplicationStats>> {
        let client = self.client;
        let app = name.to_string();
        Request::new(format!("Getting application statistics for {app}"), move || {
            let app = app.clone();
            async move {
                match client.get_application_stats(&app).await {
                    Ok(stats) => Ok(Some(stats)),
                    Err(e) if e.is_app_stopped_state() || e.is_bad_request() => {
                        debug!(app = %app, error = %e, "stats not available");
                        Ok(None)
                    }
                    Err(e) => Err(e.into()),
                }
            }
        })
        .with_policy(self.staging_aware())
    }

    /// Instance info for `name`; `None` while the app is stopped or not yet
    /// able to report.
    pub fn get_instances_info(&self, name: &str) -> Request<'a, Option<InstancesInfo>> {
        let client = self.client;
        let app = name.to_string();
        Request::new(format!("Getting application instances for {app}"), move || {
            let app = app.clone();
            async move {
                match client.get_application_instances(&app).await {
                    Ok(info) => Ok(Some(info)),
                    Err(e) if e.is_app_stopped_state() || e.is_bad_request() => {
                        debug!(app = %app, error = %e, "instances not available");
                        Ok(None)
                    }
                    Err(e) => Err(e.into()),
                }
            }
        })
        .with_policy(self.staging_aware())
    }

    pub fn get_recent_logs(&self, name: &str) -> Request<'a, Vec<ApplicationLog>> {
        let client = self.client;
        let app = name.to_string();
        Request::new(
            format!("Getting existing application logs for: {app}"),
            move || {
                let app = app.clone();
                async move { Ok(client.get_recent_logs(&app).await?) }
            },
        )
    }

    // ── Services ─────────────────────────────────────────────────────────────

    pub fn get_services(&self) -> Request<'a, Vec<CloudService>> {
        let client = self.client;
        Request::new(
            format!("Getting all services from {}", self.server),
            move || async move { Ok(client.get_services().await?) },
        )
    }

    pub fn get_service_offerings(&self) -> Request<'a, Vec<ServiceOffering>> {
        let client = self.client;
        Request::new("Getting available service options", move || async move {
            Ok(client.get_service_offerings().await?)
        })
    }

    /// Create every service in order, then return the space's service list.
    pub fn create_services(
        &self,
        services: Vec<CloudService>,
    ) -> BatchRequest<'a, CloudService, Vec<CloudService>> {
        let client = self.client;
        BatchRequest::new(
            "Creating services",
            services,
            move |service: &CloudService| {
                let service = service.clone();
                Request::new(format!("Creating service {}", service.name), move || {
                    let service = service.clone();
                    async move {
                        client.create_service(&service).await?;
                        Ok(ItemOutcome::Done)
                    }
                })
            },
            self.get_services(),
        )
    }

    /// Delete every service that no application is bound to.
    ///
    /// Bound services are skipped and reported together in one warning. When
    /// the service instance cannot be inspected, bindings are inferred from
    /// the application list instead.
    pub fn delete_services(
        &self,
        services: Vec<String>,
    ) -> BatchRequest<'a, String, Vec<CloudService>> {
        let client = self.client;
        BatchRequest::new(
            "Deleting services",
            services,
            move |service: &String| {
                let service = service.clone();
                Request::new(format!("Deleting service {service}"), move || {
                    let service = service.clone();
                    async move {
                        if is_service_bound(client, &service).await? {
                            return Ok(ItemOutcome::Skipped(service));
                        }
                        client.delete_service(&service).await?;
                        Ok(ItemOutcome::Done)
                    }
                })
            },
            self.get_services(),
        )
        .with_skipped_warning(|names| {
            format!("Unable to delete services still bound to applications: {names}")
        })
    }

    // ── Routes & domains ─────────────────────────────────────────────────────

    pub fn get_routes(&self, domain: &str) -> Request<'a, Vec<CloudRoute>> {
        let client = self.client;
        let domain = domain.to_string();
        Request::new(format!("Getting routes for domain {domain}"), move || {
            let domain = domain.clone();
            async move { Ok(client.get_routes(&domain).await?) }
        })
    }

    /// Delete `routes`; `None` when there is nothing to delete.
    pub fn delete_routes(&self, routes: Vec<CloudRoute>) -> Option<Request<'a, ()>> {
        if routes.is_empty() {
            return None;
        }
        let client = self.client;
        Some(Request::new("Deleting routes", move || {
            let routes = routes.clone();
            async move {
                for route in &routes {
                    client.delete_route(&route.host, &route.domain.name).await?;
                }
                Ok(())
            }
        }))
    }

    pub fn get_domains(&self) -> Request<'a, Vec<CloudDomain>> {
        let client = self.client;
        Request::new("Getting domains for the current space", move || async move {
            Ok(client.get_domains().await?)
        })
    }

    pub fn get_domains_for_org(&self, org: &str) -> Request<'a, Vec<CloudDomain>> {
        let client = self.client;
        let org = org.to_string();
        Request::new(format!("Getting domains for org {org}"), move || {
            let org = org.clone();
            async move { Ok(client.get_domains_for_org(&org).await?) }
        })
    }

    // ── SSH ──────────────────────────────────────────────────────────────────

    /// One-time SSH code. Codes are single use and the request is not retried.
    pub fn get_ssh_code(&self) -> Request<'a, String> {
        let client = self.client;
        Request::new(
            format!("Getting SSH code from {}", self.server),
            move || async move { Ok(client.get_ssh_code().await?) },
        )
    }
}

/// Whether any application is bound to `service`.
async fn is_service_bound<C: RemoteControlClient>(
    client: &C,
    service: &str,
) -> Result<bool, DeployError> {
    match client.get_service_instance(service).await {
        Ok(instance) => Ok(instance.is_some_and(|i| !i.bindings.is_empty())),
        Err(e) => {
            debug!(service, error = %e, "service lookup failed, checking application bindings");
            let apps = client.get_applications().await?;
            Ok(apps
                .iter()
                .any(|app| app.services.iter().any(|s| s == service)))
        }
    }
}
