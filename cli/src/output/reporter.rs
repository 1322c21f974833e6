//! Terminal implementations of the application's output ports.
//!
//! `TerminalReporter` implements `ProgressReporter` and `ConsoleSink` over
//! `&OutputContext`, so operations can emit progress and application console
//! lines without depending on any presentation type directly.

use owo_colors::OwoColorize as _;

use crate::application::ports::{ConsoleSink, ProgressReporter};
use crate::output::OutputContext;

/// Terminal progress reporter that wraps an `OutputContext`.
///
/// - `step()` prints `"  → {message}"` (suppressed when `ctx.quiet`)
/// - `success()` prints `"  ✓ {message}"` (suppressed when `ctx.quiet`)
/// - `warn()` prints `"  ! {message}"` to stderr (never suppressed)
/// - `print()` prints `"  [{app}] {text}"` (suppressed when `ctx.quiet`)
///
/// In JSON mode all output except warnings is suppressed so stdout carries
/// only the JSON document.
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
    silent: bool,
}

impl<'a> TerminalReporter<'a> {
    /// Create a new `TerminalReporter` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self {
            ctx,
            silent: ctx.quiet,
        }
    }

    /// Reporter that never writes to stdout.
    #[must_use]
    pub fn silent(ctx: &'a OutputContext) -> Self {
        Self { ctx, silent: true }
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        if !self.silent {
            println!("  {} {message}", "→".style(self.ctx.styles.header));
        }
    }

    fn success(&self, message: &str) {
        if !self.silent {
            println!("  {} {message}", "✓".style(self.ctx.styles.success));
        }
    }

    fn warn(&self, message: &str) {
        eprintln!("  {} {message}", "!".style(self.ctx.styles.warning));
    }
}

impl ConsoleSink for TerminalReporter<'_> {
    fn print(&self, app_name: &str, text: &str) {
        if !self.silent {
            println!(
                "  {} {text}",
                format!("[{app_name}]").style(self.ctx.styles.dim)
            );
        }
    }
}
