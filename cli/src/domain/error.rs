//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! `DeployError` is what operations return; `ControllerError` is what the
//! controller client raises before a request has labelled it.

use thiserror::Error;

// ── Controller codes ─────────────────────────────────────────────────────────

/// Controller error code: the application has not finished staging.
pub const CODE_NOT_STAGED: u32 = 170_002;
/// Controller error code: stats requested for a stopped application.
pub const CODE_APP_STOPPED_STATS: u32 = 200_003;
/// Controller error code: instances requested for a stopped application.
pub const CODE_INSTANCES_ERROR: u32 = 220_001;

const STAGING_SIGNATURES: &[&str] = &[
    "not finished staging",
    "staging in progress",
    "still staging",
];
const STOPPED_SIGNATURES: &[&str] = &["stopped app", "app is stopped", "application is stopped"];

// ── Controller errors ────────────────────────────────────────────────────────

/// Classified failure raised by the remote control client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    #[error("HTTP {status}: {}", description.as_deref().unwrap_or("no description"))]
    Http {
        status: u16,
        code: Option<u32>,
        error_code: Option<String>,
        description: Option<String>,
    },

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected controller response: {0}")]
    Decode(String),
}

impl ControllerError {
    /// HTTP failure without a controller error body.
    #[must_use]
    pub fn status(status: u16) -> Self {
        Self::Http {
            status,
            code: None,
            error_code: None,
            description: None,
        }
    }

    /// HTTP failure with the controller's numeric code and description.
    #[must_use]
    pub fn coded(status: u16, code: u32, description: impl Into<String>) -> Self {
        Self::Http {
            status,
            code: Some(code),
            error_code: None,
            description: Some(description.into()),
        }
    }

    #[must_use]
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    fn code(&self) -> Option<u32> {
        match self {
            Self::Http { code, .. } => *code,
            _ => None,
        }
    }

    fn mentions(&self, needles: &[&str], symbolic: &[&str]) -> bool {
        let Self::Http {
            error_code,
            description,
            ..
        } = self
        else {
            return false;
        };
        if error_code
            .as_deref()
            .is_some_and(|c| symbolic.contains(&c))
        {
            return true;
        }
        description.as_deref().is_some_and(|d| {
            let d = d.to_ascii_lowercase();
            needles.iter().any(|n| d.contains(n))
        })
    }

    /// The application is still being staged; the same call may succeed later.
    #[must_use]
    pub fn is_staging_in_progress(&self) -> bool {
        self.http_status() == Some(503)
            || self.code() == Some(CODE_NOT_STAGED)
            || self.mentions(STAGING_SIGNATURES, &["CF-NotStaged"])
    }

    /// The call is not valid because the application is stopped.
    #[must_use]
    pub fn is_app_stopped_state(&self) -> bool {
        matches!(
            self.code(),
            Some(CODE_APP_STOPPED_STATS | CODE_INSTANCES_ERROR)
        ) || self.mentions(
            STOPPED_SIGNATURES,
            &["CF-AppStoppedStatsError", "CF-InstancesError"],
        )
    }

    #[must_use]
    pub fn is_bad_request(&self) -> bool {
        self.http_status() == Some(400)
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.http_status() == Some(404)
    }
}

// ── Deployment errors ────────────────────────────────────────────────────────

/// Errors returned by requests and operations.
#[derive(Debug, Error)]
pub enum DeployError {
    /// A client failure that has not yet been attributed to a request.
    /// `Request::run` never lets this variant escape.
    #[error(transparent)]
    Controller(#[from] ControllerError),

    #[error("{label} failed: {source}")]
    RemoteCall {
        label: String,
        #[source]
        source: ControllerError,
    },

    #[error("{label}: application still staging after {attempts} attempt(s): {source}")]
    StagingInProgress {
        label: String,
        attempts: u32,
        #[source]
        source: ControllerError,
    },

    #[error("{message}")]
    AppStateConflict {
        message: String,
        #[source]
        source: ControllerError,
    },

    #[error("{message}")]
    Unavailable {
        message: String,
        #[source]
        source: ControllerError,
    },

    #[error(
        "Internal Error: No cloud application module found for: {0} - Unable to deploy or start application"
    )]
    NoMappedModule(String),

    #[error("{0}")]
    Canceled(String),

    #[error("Starting of {0} timed out")]
    Timeout(String),

    #[error("{0}")]
    InvalidDeployment(String),

    #[error("local module store failed: {0:#}")]
    Store(anyhow::Error),
}

impl DeployError {
    /// Cancellation raised while running `label`.
    #[must_use]
    pub fn canceled(label: &str) -> Self {
        Self::Canceled(format!("{label} - operation canceled"))
    }

    #[must_use]
    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled(_))
    }

    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// The classified remote error behind this failure, if any.
    #[must_use]
    pub fn controller_error(&self) -> Option<&ControllerError> {
        match self {
            Self::Controller(source)
            | Self::RemoteCall { source, .. }
            | Self::StagingInProgress { source, .. }
            | Self::AppStateConflict { source, .. }
            | Self::Unavailable { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Message shown to the user, derived from the error's classification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::RemoteCall {
                label,
                source: ControllerError::Network(msg),
            } => format!("{label}: cannot reach the controller ({msg})"),
            Self::RemoteCall { label, source } if matches!(source.http_status(), Some(401 | 403)) => {
                format!("{label}: not authorized. Check the configured access token.")
            }
            Self::RemoteCall { label, source } if source.is_not_found() => {
                format!("{label}: the controller does not know this resource")
            }
            Self::StagingInProgress { label, attempts, .. } => format!(
                "{label}: the application is still staging ({attempts} attempt(s)). Try again shortly."
            ),
            other => other.to_string(),
        }
    }
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\n{expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: String,
    },
}
