//! Human-readable terminal renderer.

use cfdeploy_common::{
    ApplicationLog, ApplicationStats, CloudDomain, CloudRoute, CloudService, InstanceState,
    LogStream, ServiceOffering,
};
use owo_colors::OwoColorize as _;

use crate::application::OperationOutcome;
use crate::domain::{ApplicationModule, CfDeployConfig};
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the end of an operation run.
    pub fn render_outcome(&self, operation: &str, app_name: &str, outcome: &OperationOutcome) {
        match outcome {
            OperationOutcome::Completed => {
                self.ctx.success(&format!("{operation} - {app_name}: done"));
            }
            OperationOutcome::Canceled { reason } => {
                self.ctx.warn(&format!("{operation} - {app_name}: canceled ({reason})"));
            }
        }
    }

    /// Render the stored and last-fetched view of one module.
    pub fn render_module(&self, module: &ApplicationModule) {
        if self.ctx.quiet {
            return;
        }
        self.ctx.kv("Module:", &module.local_id);
        self.ctx.kv("Application:", &module.deployed_name);

        match &module.application {
            Some(app) => {
                self.ctx.kv("State:", &format!("{:?}", app.state).to_lowercase());
                self.ctx.kv(
                    "Instances:",
                    &format!("{}/{}", app.running_instances, app.instances),
                );
                self.ctx.kv("Memory:", &format!("{} MB", app.memory));
                self.ctx.kv("URLs:", &join_or_none(&app.uris));
                self.ctx.kv("Services:", &join_or_none(&app.services));
            }
            None => self.ctx.kv("State:", "not deployed"),
        }

        if let Some(info) = &module.instances
            && !info.instances.is_empty()
        {
            println!();
            self.ctx.header("Instances:");
            for instance in &info.instances {
                let state = format!("{:?}", instance.state).to_lowercase();
                let styled = match instance.state {
                    InstanceState::Running => state.style(self.ctx.styles.running).to_string(),
                    s if s.is_terminal_failure() => {
                        state.style(self.ctx.styles.failing).to_string()
                    }
                    _ => state,
                };
                println!("    #{:<3} {styled}", instance.index);
            }
        }

        if let Some(status) = &module.status {
            println!();
            self.ctx.warn(&format!("Last operation failed: {status}"));
        }
    }

    /// Render per-instance resource usage below a module.
    pub fn render_stats(&self, stats: &ApplicationStats) {
        if self.ctx.quiet {
            return;
        }
        println!();
        self.ctx.header("Usage:");
        if stats.records.is_empty() {
            println!("    no instance is reporting");
            return;
        }
        for record in &stats.records {
            let state = format!("{:?}", record.state).to_lowercase();
            println!(
                "    #{:<3} {:<9} cpu {:>5.1}%  mem {:>6} MB  up {}",
                record.index,
                state,
                record.cpu,
                record.mem / (1024 * 1024),
                format_uptime(record.uptime)
            );
        }
    }

    /// Render recent log lines, oldest first.
    pub fn render_logs(&self, app_name: &str, logs: &[ApplicationLog]) {
        if logs.is_empty() {
            self.ctx.info(&format!("No recent logs for {app_name}"));
            return;
        }
        for log in logs {
            let time = log.timestamp.format("%Y-%m-%dT%H:%M:%S");
            let source = format!("[{}]", log.source);
            match log.stream {
                LogStream::Stdout => {
                    println!("{} {} {}", time.style(self.ctx.styles.dim), source, log.message);
                }
                LogStream::Stderr => println!(
                    "{} {} {}",
                    time.style(self.ctx.styles.dim),
                    source,
                    log.message.style(self.ctx.styles.error)
                ),
            }
        }
    }

    /// Render the space's service list.
    pub fn render_services(&self, services: &[CloudService]) {
        if services.is_empty() {
            self.ctx.info("No services in this space.");
            return;
        }
        println!(
            "  {:<24} {:<16} {}",
            "NAME".style(self.ctx.styles.bold),
            "LABEL".style(self.ctx.styles.bold),
            "PLAN".style(self.ctx.styles.bold)
        );
        for service in services {
            println!(
                "  {:<24} {:<16} {}",
                service.name,
                service.label.as_deref().unwrap_or("-"),
                service.plan.as_deref().unwrap_or("-")
            );
        }
    }

    /// Render marketplace offerings, one line per plan.
    pub fn render_offerings(&self, offerings: &[ServiceOffering]) {
        if offerings.is_empty() {
            self.ctx.info("No service offerings available.");
            return;
        }
        println!(
            "  {:<24} {:<16} {}",
            "LABEL".style(self.ctx.styles.bold),
            "PLAN".style(self.ctx.styles.bold),
            "DESCRIPTION".style(self.ctx.styles.bold)
        );
        for offering in offerings {
            let description = offering.description.as_deref().unwrap_or("");
            if offering.plans.is_empty() {
                println!("  {:<24} {:<16} {description}", offering.label, "-");
            }
            for plan in &offering.plans {
                println!(
                    "  {:<24} {:<16} {}",
                    offering.label,
                    plan.name,
                    plan.description.as_deref().unwrap_or(description)
                );
            }
        }
    }

    pub fn render_domains(&self, domains: &[CloudDomain]) {
        if domains.is_empty() {
            self.ctx.info("No domains found.");
            return;
        }
        for domain in domains {
            println!("  {}", domain.name);
        }
    }

    /// Render routes across the space's domains.
    pub fn render_routes(&self, routes: &[CloudRoute]) {
        if routes.is_empty() {
            self.ctx.info("No routes in this space.");
            return;
        }
        println!(
            "  {:<40} {}",
            "ROUTE".style(self.ctx.styles.bold),
            "APPS".style(self.ctx.styles.bold)
        );
        for route in routes {
            let apps = if route.app_count == 0 {
                "0 (orphaned)".style(self.ctx.styles.dim).to_string()
            } else {
                route.app_count.to_string()
            };
            println!("  {:<40} {apps}", route_url(route));
        }
    }

    /// Render the result of an orphaned-route cleanup.
    pub fn render_pruned_routes(&self, deleted: &[CloudRoute]) {
        if deleted.is_empty() {
            self.ctx.info("No orphaned routes.");
            return;
        }
        for route in deleted {
            self.ctx.kv("Deleted:", &route_url(route));
        }
        self.ctx
            .success(&format!("Deleted {} orphaned route(s)", deleted.len()));
    }

    /// Render the current cfdeploy configuration.
    pub fn render_config(&self, config: &CfDeployConfig, path: &std::path::Path) {
        println!();
        println!(
            "  {}",
            format!("Configuration ({})", path.display()).style(self.ctx.styles.header)
        );
        println!();
        let unset = "(not set)";
        println!("  {:<34} {}", "target.api:", config.target.api.as_deref().unwrap_or(unset));
        println!("  {:<34} {}", "target.org:", config.target.org.as_deref().unwrap_or(unset));
        println!(
            "  {:<34} {}",
            "target.space:",
            config.target.space.as_deref().unwrap_or(unset)
        );
        let retry = &config.retry;
        println!("  {:<34} {}", "retry.staging_max_attempts:", retry.staging_max_attempts);
        println!(
            "  {:<34} {}",
            "retry.staging_initial_delay_ms:", retry.staging_initial_delay_ms
        );
        println!("  {:<34} {}", "retry.staging_max_delay_ms:", retry.staging_max_delay_ms);
        println!(
            "  {:<34} {}",
            "retry.staging_max_total_wait_ms:", retry.staging_max_total_wait_ms
        );
        let tracker = &config.tracker;
        println!("  {:<34} {}", "tracker.poll_interval_ms:", tracker.poll_interval_ms);
        println!("  {:<34} {}", "tracker.max_wait_secs:", tracker.max_wait_secs);
        println!("  {:<34} {}", "tracker.steady_state_poll_ms:", tracker.steady_state_poll_ms);
        println!();
        println!("  {}", "Environment:".style(self.ctx.styles.bold));
        for var in ["CFDEPLOY_CONFIG", "CFDEPLOY_MODULES", "CFDEPLOY_TOKEN", "NO_COLOR"] {
            let value = match std::env::var(var) {
                Ok(_) if var == "CFDEPLOY_TOKEN" => "(set)".to_string(),
                Ok(v) => v,
                Err(_) => unset.to_string(),
            };
            println!("    {:<18} {value}", format!("{var}:"));
        }
        println!();
    }
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

/// `host.domain`, or just the domain for a route without a host.
fn route_url(route: &CloudRoute) -> String {
    if route.host.is_empty() {
        route.domain.name.clone()
    } else {
        format!("{}.{}", route.host, route.domain.name)
    }
}

fn format_uptime(secs: u64) -> String {
    let (days, rem) = (secs / 86_400, secs % 86_400);
    let (hours, rem) = (rem / 3_600, rem % 3_600);
    let minutes = rem / 60;
    if days > 0 {
        format!("{days}d {hours}h")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m {}s", rem % 60)
    }
}
