//! Infrastructure implementation of the `RemoteControlClient` port.
//!
//! `HttpControllerClient` talks JSON to a controller gateway that addresses
//! applications, services and routes by name under `<api>/v2/...`. Requests
//! carry the targeted org and space as `organization` / `space` query
//! parameters. Every method is a single round trip; failures are classified
//! into [`ControllerError`] and never retried here.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{Context, Result};
use cfdeploy_common::{
    ApplicationLog, ApplicationStats, CloudApplication, CloudDomain, CloudRoute, CloudService,
    InstancesInfo, ServiceInstance, ServiceOffering, StartingInfo,
};
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::trace;

use crate::application::ports::{ControllerResult, RemoteControlClient};
use crate::domain::{ControllerError, DeploymentInfo};

/// Environment variable holding the bearer token.
pub const TOKEN_ENV: &str = "CFDEPLOY_TOKEN";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Controller error body.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    code: Option<u32>,
    description: Option<String>,
    error_code: Option<String>,
}

/// Fields of `GET /v2/info` needed for the SSH code exchange.
#[derive(Debug, Deserialize)]
struct ControllerInfo {
    authorization_endpoint: Option<String>,
    app_ssh_oauth_client: Option<String>,
}

/// JSON/HTTP controller client.
pub struct HttpControllerClient {
    client: Client,
    /// Same settings as `client` but never follows redirects.
    no_redirect: Client,
    base: Url,
    token: Option<String>,
    org: Option<String>,
    space: Option<String>,
}

impl HttpControllerClient {
    /// Client for the controller at `api`.
    ///
    /// # Errors
    ///
    /// Returns an error if `api` is not a valid base URL or the HTTP client
    /// cannot be built.
    pub fn new(api: &str, token: Option<String>) -> Result<Self> {
        let base = Url::parse(api).with_context(|| format!("invalid controller URL: {api}"))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("invalid controller URL: {api}");
        }
        let builder = || {
            Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .user_agent(concat!("cfdeploy/", env!("CARGO_PKG_VERSION")))
        };
        let client = builder().build().context("cannot build HTTP client")?;
        let no_redirect = builder()
            .redirect(Policy::none())
            .build()
            .context("cannot build HTTP client")?;
        Ok(Self {
            client,
            no_redirect,
            base,
            token,
            org: None,
            space: None,
        })
    }

    /// Scope every request to `org` and `space`.
    #[must_use]
    pub fn with_target(mut self, org: Option<String>, space: Option<String>) -> Self {
        self.org = org;
        self.space = space;
        self
    }

    /// Client for `api`, authenticating with `CFDEPLOY_TOKEN` when set.
    ///
    /// # Errors
    ///
    /// See [`HttpControllerClient::new`].
    pub fn from_env(api: &str) -> Result<Self> {
        Self::new(api, std::env::var(TOKEN_ENV).ok())
    }

    /// `<api>/v2/<segments...>`, each segment percent-encoded, scoped to the
    /// targeted org and space.
    fn endpoint(&self, segments: &[&str]) -> ControllerResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ControllerError::Decode(format!("invalid base URL {}", self.base)))?
            .pop_if_empty()
            .push("v2")
            .extend(segments);
        if self.org.is_some() || self.space.is_some() {
            let mut query = url.query_pairs_mut();
            if let Some(org) = &self.org {
                query.append_pair("organization", org);
            }
            if let Some(space) = &self.space {
                query.append_pair("space", space);
            }
        }
        Ok(url)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn request(&self, method: Method, segments: &[&str]) -> ControllerResult<RequestBuilder> {
        let url = self.endpoint(segments)?;
        trace!(%method, %url, "controller request");
        Ok(self.authorized(self.client.request(method, url)))
    }

    async fn send(builder: RequestBuilder) -> ControllerResult<Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| ControllerError::Network(e.to_string()))?;
        if response.status().is_success() {
            return Ok(response);
        }
        Err(Self::classify(response).await)
    }

    async fn classify(response: Response) -> ControllerError {
        let status = response.status().as_u16();
        let body: ErrorBody = response.json().await.unwrap_or_default();
        ControllerError::Http {
            status,
            code: body.code,
            error_code: body.error_code,
            description: body.description,
        }
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> ControllerResult<T> {
        let response = Self::send(self.request(Method::GET, segments)?).await?;
        response
            .json()
            .await
            .map_err(|e| ControllerError::Decode(e.to_string()))
    }

    async fn execute(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<serde_json::Value>,
    ) -> ControllerResult<Response> {
        let mut builder = self.request(method, segments)?;
        if let Some(body) = body {
            builder = builder.json(&body);
        }
        Self::send(builder).await
    }

    /// `<authorization_endpoint>/oauth/authorize` asking for a code for the
    /// SSH client advertised by the controller.
    async fn ssh_authorize_url(&self) -> ControllerResult<Url> {
        let info: ControllerInfo = self.get(&["info"]).await?;
        let missing =
            |field: &str| ControllerError::Decode(format!("controller info has no {field}"));
        let endpoint = info
            .authorization_endpoint
            .ok_or_else(|| missing("authorization_endpoint"))?;
        let client_id = info
            .app_ssh_oauth_client
            .ok_or_else(|| missing("app_ssh_oauth_client"))?;
        let mut url = Url::parse(&format!("{}/oauth/authorize", endpoint.trim_end_matches('/')))
            .map_err(|e| ControllerError::Decode(format!("invalid authorization endpoint: {e}")))?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("grant_type", "authorization_code")
            .append_pair("client_id", &client_id);
        Ok(url)
    }

    async fn update_app(&self, name: &str, body: serde_json::Value) -> ControllerResult<()> {
        self.execute(Method::PUT, &["apps", name], Some(body))
            .await
            .map(|_| ())
    }
}

impl RemoteControlClient for HttpControllerClient {
    async fn login(&self) -> ControllerResult<()> {
        self.execute(Method::GET, &["info"], None).await.map(|_| ())
    }

    async fn get_applications(&self) -> ControllerResult<Vec<CloudApplication>> {
        self.get(&["apps"]).await
    }

    async fn get_application(&self, name: &str) -> ControllerResult<CloudApplication> {
        self.get(&["apps", name]).await
    }

    async fn create_application(&self, name: &str, info: &DeploymentInfo) -> ControllerResult<()> {
        let body = json!({
            "name": name,
            "memory": info.memory,
            "instances": info.instances,
            "uris": info.uris,
            "services": info.services,
            "env": info.env_map(),
        });
        self.execute(Method::POST, &["apps"], Some(body))
            .await
            .map(|_| ())
    }

    async fn start_application(&self, name: &str) -> ControllerResult<Option<StartingInfo>> {
        let response = self.execute(Method::PUT, &["apps", name, "start"], None).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ControllerError::Decode(e.to_string()))?;
        if bytes.is_empty() {
            return Ok(None);
        }
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| ControllerError::Decode(e.to_string()))
    }

    async fn stop_application(&self, name: &str) -> ControllerResult<()> {
        self.execute(Method::PUT, &["apps", name, "stop"], None)
            .await
            .map(|_| ())
    }

    async fn delete_application(&self, name: &str) -> ControllerResult<()> {
        self.execute(Method::DELETE, &["apps", name], None)
            .await
            .map(|_| ())
    }

    async fn update_application_memory(&self, name: &str, memory: u32) -> ControllerResult<()> {
        self.update_app(name, json!({ "memory": memory })).await
    }

    async fn update_application_instances(
        &self,
        name: &str,
        instances: u32,
    ) -> ControllerResult<()> {
        self.update_app(name, json!({ "instances": instances })).await
    }

    async fn update_application_uris(&self, name: &str, uris: &[String]) -> ControllerResult<()> {
        self.update_app(name, json!({ "uris": uris })).await
    }

    async fn update_application_env(
        &self,
        name: &str,
        env: &BTreeMap<String, String>,
    ) -> ControllerResult<()> {
        self.update_app(name, json!({ "env": env })).await
    }

    async fn update_application_services(
        &self,
        name: &str,
        services: &[String],
    ) -> ControllerResult<()> {
        self.update_app(name, json!({ "services": services })).await
    }

    async fn get_application_stats(&self, name: &str) -> ControllerResult<ApplicationStats> {
        self.get(&["apps", name, "stats"]).await
    }

    async fn get_application_instances(&self, name: &str) -> ControllerResult<InstancesInfo> {
        self.get(&["apps", name, "instances"]).await
    }

    async fn get_recent_logs(&self, name: &str) -> ControllerResult<Vec<ApplicationLog>> {
        self.get(&["apps", name, "recent_logs"]).await
    }

    async fn get_services(&self) -> ControllerResult<Vec<CloudService>> {
        self.get(&["services"]).await
    }

    async fn create_service(&self, service: &CloudService) -> ControllerResult<()> {
        let body =
            serde_json::to_value(service).map_err(|e| ControllerError::Decode(e.to_string()))?;
        self.execute(Method::POST, &["services"], Some(body))
            .await
            .map(|_| ())
    }

    async fn delete_service(&self, name: &str) -> ControllerResult<()> {
        self.execute(Method::DELETE, &["services", name], None)
            .await
            .map(|_| ())
    }

    async fn get_service_instance(&self, name: &str) -> ControllerResult<Option<ServiceInstance>> {
        match self.get(&["services", name]).await {
            Ok(instance) => Ok(Some(instance)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn get_routes(&self, domain: &str) -> ControllerResult<Vec<CloudRoute>> {
        self.get(&["domains", domain, "routes"]).await
    }

    async fn delete_route(&self, host: &str, domain: &str) -> ControllerResult<()> {
        self.execute(Method::DELETE, &["domains", domain, "routes", host], None)
            .await
            .map(|_| ())
    }

    async fn get_domains(&self) -> ControllerResult<Vec<CloudDomain>> {
        self.get(&["domains"]).await
    }

    async fn get_domains_for_org(&self, org: &str) -> ControllerResult<Vec<CloudDomain>> {
        self.get(&["organizations", org, "domains"]).await
    }

    async fn get_service_offerings(&self) -> ControllerResult<Vec<ServiceOffering>> {
        self.get(&["service_offerings"]).await
    }

    async fn get_ssh_code(&self) -> ControllerResult<String> {
        let url = self.ssh_authorize_url().await?;
        trace!(%url, "ssh code request");
        let response = self
            .authorized(self.no_redirect.get(url.clone()))
            .send()
            .await
            .map_err(|e| ControllerError::Network(e.to_string()))?;
        if response.status() != StatusCode::FOUND {
            return Err(Self::classify(response).await);
        }
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                ControllerError::Decode("no Location header in redirect response".to_string())
            })?;
        code_from_location(&url, location)
    }
}

/// The `code` query parameter of a redirect `location`, resolved against the
/// URL that was redirected.
fn code_from_location(request: &Url, location: &str) -> ControllerResult<String> {
    let target = request.join(location).map_err(|e| {
        ControllerError::Decode(format!("invalid redirect Location {location}: {e}"))
    })?;
    target
        .query_pairs()
        .find(|(name, _)| name == "code")
        .map(|(_, code)| code.into_owned())
        .ok_or_else(|| {
            ControllerError::Decode(format!("no 'code' param in redirect Location: {location}"))
        })
}
