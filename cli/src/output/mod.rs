//! Output formatting module

pub mod human;
pub mod json;
pub mod progress;
pub mod reporter;
pub mod styles;

use anyhow::{Context, Result};
use cfdeploy_common::{
    ApplicationLog, ApplicationStats, CloudDomain, CloudRoute, CloudService, ServiceOffering,
};
use console::Term;
use owo_colors::OwoColorize as _;
use serde_json::json;

pub use human::HumanRenderer;
pub use reporter::TerminalReporter;
pub use styles::Styles;

use crate::application::OperationOutcome;
use crate::domain::{ApplicationModule, CfDeployConfig};

/// Output context carrying styling and terminal state.
pub struct OutputContext {
    /// Stylesheet for colored output.
    pub styles: Styles,
    /// Whether stdout is a TTY.
    pub is_tty: bool,
    /// Whether to suppress non-error output.
    pub quiet: bool,
}

impl OutputContext {
    /// Create output context based on CLI flags and environment.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let is_tty = Term::stdout().is_term();
        let use_colors = !no_color && is_tty && std::env::var("NO_COLOR").is_err();

        let mut styles = Styles::default();
        if use_colors {
            styles.colorize();
        }

        Self {
            styles,
            is_tty,
            quiet,
        }
    }

    /// Check if progress indicators should be shown.
    #[must_use]
    pub fn show_progress(&self) -> bool {
        self.is_tty && !self.quiet
    }

    /// Print a success message prefixed with `✓`. Suppressed when `quiet`.
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "✓".style(self.styles.success));
        }
    }

    /// Print a warning message prefixed with `⚠`. Suppressed when `quiet`.
    pub fn warn(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "⚠".style(self.styles.warning));
        }
    }

    /// Print an error message prefixed with `✗` to stderr. Never suppressed.
    pub fn error(&self, msg: &str) {
        eprintln!("  {} {msg}", "✗".style(self.styles.error));
    }

    /// Print an info message prefixed with `ℹ`. Suppressed when `quiet`.
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "ℹ".style(self.styles.info));
        }
    }

    /// Print a section header. Suppressed when `quiet`.
    pub fn header(&self, msg: &str) {
        if !self.quiet {
            println!("  {}", msg.style(self.styles.header));
        }
    }

    /// Print a key-value pair with the key dimmed. Suppressed when `quiet`.
    pub fn kv(&self, key: &str, value: &str) {
        if !self.quiet {
            println!("  {:<14}{value}", key.style(self.styles.dim));
        }
    }
}

/// Output renderer for the active mode.
pub enum Renderer<'a> {
    Human(HumanRenderer<'a>),
    Json,
}

impl Renderer<'_> {
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_outcome(
        &self,
        operation: &str,
        app_name: &str,
        outcome: &OperationOutcome,
    ) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_outcome(operation, app_name, outcome);
                Ok(())
            }
            Self::Json => {
                let (status, reason) = match outcome {
                    OperationOutcome::Completed => ("completed", None),
                    OperationOutcome::Canceled { reason } => ("canceled", Some(reason)),
                };
                json::print(&json!({
                    "operation": operation,
                    "application": app_name,
                    "outcome": status,
                    "reason": reason,
                }))
            }
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_module(&self, module: &ApplicationModule) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_module(module);
                Ok(())
            }
            Self::Json => json::print(module),
        }
    }

    /// Module plus per-instance usage. JSON output is the module object with
    /// an added `stats` field.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_module_stats(
        &self,
        module: &ApplicationModule,
        stats: Option<&ApplicationStats>,
    ) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_module(module);
                if let Some(stats) = stats {
                    r.render_stats(stats);
                }
                Ok(())
            }
            Self::Json => {
                let mut value = serde_json::to_value(module).context("JSON serialization failed")?;
                if let Some(object) = value.as_object_mut() {
                    object.insert(
                        "stats".to_string(),
                        serde_json::to_value(stats).context("JSON serialization failed")?,
                    );
                }
                json::print(&value)
            }
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_routes(&self, routes: &[CloudRoute]) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_routes(routes);
                Ok(())
            }
            Self::Json => json::print(routes),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_pruned_routes(&self, deleted: &[CloudRoute]) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_pruned_routes(deleted);
                Ok(())
            }
            Self::Json => json::print(&json!({ "deleted": deleted })),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_logs(&self, app_name: &str, logs: &[ApplicationLog]) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_logs(app_name, logs);
                Ok(())
            }
            Self::Json => json::print(logs),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_services(&self, services: &[CloudService]) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_services(services);
                Ok(())
            }
            Self::Json => json::print(services),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_offerings(&self, offerings: &[ServiceOffering]) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_offerings(offerings);
                Ok(())
            }
            Self::Json => json::print(offerings),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_domains(&self, domains: &[CloudDomain]) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_domains(domains);
                Ok(())
            }
            Self::Json => json::print(domains),
        }
    }

    /// Print the code alone on stdout so it can be piped into an SSH client.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_ssh_code(&self, code: &str) -> Result<()> {
        match self {
            Self::Human(_) => {
                println!("{code}");
                Ok(())
            }
            Self::Json => json::print(&json!({ "code": code })),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_config(&self, config: &CfDeployConfig, path: &std::path::Path) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_config(config, path);
                Ok(())
            }
            Self::Json => json::print(&json!({
                "path": path,
                "config": config,
            })),
        }
    }
}
