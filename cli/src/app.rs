//! Application context — unified state passed to every command handler.
//!
//! `AppContext` is constructed once in `Cli::run()` and owns the output
//! context, configuration, local module store and the cancellation token
//! that Ctrl-C trips. Adding a new cross-cutting concern requires only one
//! field change here; zero command signatures change.

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use crate::application::ports::ConfigStore;
use crate::domain::CfDeployConfig;
use crate::infra::config::YamlConfigStore;
use crate::infra::controller::HttpControllerClient;
use crate::infra::store::JsonModuleStore;
use crate::output::{HumanRenderer, OutputContext, Renderer, TerminalReporter};

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Behaviour flags.
pub struct BehaviourFlags {
    /// Skip interactive prompts (also set by `CI` / `CFDEPLOY_YES` env vars).
    pub yes: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Output rendering options.
    pub output: OutputFlags,
    /// Behaviour options.
    pub behaviour: BehaviourFlags,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// Configuration file access.
    pub config_store: YamlConfigStore,
    /// Local application modules.
    pub modules: JsonModuleStore,
    /// Tripped on Ctrl-C; every running operation observes it.
    pub cancel: CancellationToken,
    /// When `true`, skip interactive prompts and use defaults.
    ///
    /// Set when `--yes` / `-y` is passed, or when the `CI` or `CFDEPLOY_YES`
    /// environment variables are present.
    pub non_interactive: bool,
    /// `--yes` / `-y` was passed: destructive commands skip their prompt.
    pub assume_yes: bool,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the module store location cannot be determined.
    pub fn new(flags: &AppFlags, cancel: CancellationToken) -> Result<Self> {
        let ci_env = std::env::var("CI").is_ok() || std::env::var("CFDEPLOY_YES").is_ok();
        let non_interactive = flags.behaviour.yes || ci_env;

        let mode = if flags.output.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };

        Ok(Self {
            output: OutputContext::new(flags.output.no_color, flags.output.quiet),
            mode,
            config_store: YamlConfigStore,
            modules: JsonModuleStore::new()?,
            cancel,
            non_interactive,
            assume_yes: flags.behaviour.yes,
        })
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Returns the appropriate `Renderer` variant for the current output mode.
    #[must_use]
    pub fn renderer(&self) -> Renderer<'_> {
        match self.mode {
            OutputMode::Human => Renderer::Human(HumanRenderer::new(&self.output)),
            OutputMode::Json => Renderer::Json,
        }
    }

    /// Progress reporter for operations; stays off stdout in JSON mode.
    #[must_use]
    pub fn reporter(&self) -> TerminalReporter<'_> {
        if self.is_json() {
            TerminalReporter::silent(&self.output)
        } else {
            TerminalReporter::new(&self.output)
        }
    }

    /// Load the configuration file, or defaults when none exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn config(&self) -> Result<CfDeployConfig> {
        self.config_store.load()
    }

    /// Controller client for the configured target, scoped to its org and
    /// space.
    ///
    /// # Errors
    ///
    /// Returns an error when no target API is configured or the client
    /// cannot be built.
    pub fn controller(&self, config: &CfDeployConfig) -> Result<HttpControllerClient> {
        let api = config.target.api.as_deref().context(
            "No controller configured. Set one with: cfdeploy config set target.api <url>",
        )?;
        Ok(HttpControllerClient::from_env(api)?
            .with_target(config.target.org.clone(), config.target.space.clone()))
    }

    /// Ask the user for confirmation.
    ///
    /// When `non_interactive` is `true` (CI, `--yes` flag, or `CFDEPLOY_YES`
    /// env), returns `default` immediately without prompting.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt fails (e.g. no TTY available).
    pub fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if self.non_interactive {
            return Ok(default);
        }
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?;
        Ok(confirmed)
    }
}
