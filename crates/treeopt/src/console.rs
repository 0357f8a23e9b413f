//! Colorful console output for optimizer runs.
//!
//! Provides a `tracing` layer that renders the structured events of the
//! optimizer and the branch-and-bound backend.
//!
//! ## Log Levels
//!
//! - **INFO**: Lifecycle events (solve start/end, search start/end)
//! - **DEBUG**: Improving incumbents and backend summaries
//! - **TRACE**: Individual nodes (not rendered)
//!
//! The default filter is `treeopt=info,treeopt_solver=info`; `RUST_LOG`
//! replaces it.

use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();
static EPOCH: OnceLock<Instant> = OnceLock::new();
static SOLVE_START_NANOS: AtomicU64 = AtomicU64::new(0);

const DEFAULT_FILTER: &str = "treeopt=info,treeopt_solver=info";

/// Installs the console layer as the global subscriber.
///
/// Only the first call has effect. If another global subscriber is already
/// installed, it is left in place.
pub fn init() {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(ConsoleLayer)
            .try_init();
    });
}

fn mark_solve_start() {
    let epoch = EPOCH.get_or_init(Instant::now);
    SOLVE_START_NANOS.store(epoch.elapsed().as_nanos() as u64, Ordering::Relaxed);
}

fn elapsed_secs() -> f64 {
    let Some(epoch) = EPOCH.get() else {
        return 0.0;
    };
    let start = SOLVE_START_NANOS.load(Ordering::Relaxed);
    let now = epoch.elapsed().as_nanos() as u64;
    now.saturating_sub(start) as f64 / 1_000_000_000.0
}

/// A tracing layer that formats optimizer events with colors.
pub struct ConsoleLayer;

impl<S: Subscriber> Layer<S> for ConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        // treeopt, treeopt_solver, treeopt_ensemble
        if !event.metadata().target().starts_with("treeopt") {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(&visitor);
        if !output.is_empty() {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }
}

#[derive(Debug, Default)]
struct EventVisitor {
    event: Option<String>,
    solver: Option<String>,
    status: Option<String>,
    variables: Option<u64>,
    integer_variables: Option<u64>,
    constraints: Option<u64>,
    objectives: Option<u64>,
    objective: Option<f64>,
    best_bound: Option<f64>,
    nodes: Option<u64>,
    active_leaves: Option<u64>,
    duration_ms: Option<u64>,
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value);
        let s = s.trim_matches('"').to_string();
        match field.name() {
            "event" => self.event = Some(s),
            "solver" => self.solver = Some(s),
            "status" => self.status = Some(s),
            _ => {}
        }
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        match field.name() {
            "objective" => self.objective = Some(value),
            "best_bound" => self.best_bound = Some(value),
            _ => {}
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "variables" => self.variables = Some(value),
            "integer_variables" => self.integer_variables = Some(value),
            "constraints" => self.constraints = Some(value),
            "objectives" => self.objectives = Some(value),
            "nodes" => self.nodes = Some(value),
            "active_leaves" => self.active_leaves = Some(value),
            "duration_ms" | "elapsed_ms" => self.duration_ms = Some(value),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_u64(field, value.max(0) as u64);
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "event" => self.event = Some(value.to_string()),
            "solver" => self.solver = Some(value.to_string()),
            "status" => self.status = Some(value.to_string()),
            _ => {}
        }
    }
}

fn format_event(v: &EventVisitor) -> String {
    match v.event.as_deref().unwrap_or("") {
        "solve_start" => format_solve_start(v),
        "solve_end" => format_solve_end(v),
        "bnb_start" => format_bnb_start(v),
        "incumbent" => format_incumbent(v),
        "bnb_end" => format_bnb_end(v),
        _ => String::new(),
    }
}

fn format_elapsed() -> String {
    format!("{:>7.3}s", elapsed_secs())
        .bright_black()
        .to_string()
}

fn format_solve_start(v: &EventVisitor) -> String {
    mark_solve_start();
    format!(
        "{} {} Solving with {} │ {} variables │ {} constraints │ {} objectives",
        format_elapsed(),
        "▶".bright_green().bold(),
        v.solver.as_deref().unwrap_or("?").white().bold(),
        v.variables.unwrap_or(0).bright_yellow(),
        v.constraints.unwrap_or(0).bright_yellow(),
        v.objectives.unwrap_or(0).bright_yellow(),
    )
}

fn format_bnb_start(v: &EventVisitor) -> String {
    format!(
        "{} {} Branch and bound │ {} integer variables",
        format_elapsed(),
        "▶".bright_blue(),
        v.integer_variables.unwrap_or(0).bright_yellow(),
    )
}

fn format_incumbent(v: &EventVisitor) -> String {
    format!(
        "    {} node {:>7} │ {}",
        "->".bright_blue(),
        v.nodes.unwrap_or(0).white(),
        format_objective(v.objective),
    )
}

fn format_bnb_end(v: &EventVisitor) -> String {
    let mut output = format!(
        "{} {} Branch and bound ended │ {} │ {} nodes │ {}",
        format_elapsed(),
        "◀".bright_blue(),
        format_status(v.status.as_deref()),
        v.nodes.unwrap_or(0).white(),
        format_duration_ms(v.duration_ms.unwrap_or(0)).yellow(),
    );
    if let Some(bound) = v.best_bound {
        output.push_str(&format!(" │ bound {}", format!("{bound:.6}").white()));
    }
    output
}

fn format_solve_end(v: &EventVisitor) -> String {
    format!(
        "{} {} Solving complete │ {} │ {} │ {} active leaves │ {}",
        format_elapsed(),
        "■".bright_cyan().bold(),
        format_status(v.status.as_deref()),
        format_objective(v.objective),
        v.active_leaves.unwrap_or(0).white(),
        format_duration_ms(v.duration_ms.unwrap_or(0)).yellow(),
    )
}

fn format_status(status: Option<&str>) -> String {
    match status {
        Some(s) if s.eq_ignore_ascii_case("optimal") => s.bright_green().bold().to_string(),
        Some(s) => s.bright_yellow().bold().to_string(),
        None => "N/A".white().to_string(),
    }
}

fn format_objective(objective: Option<f64>) -> String {
    match objective {
        Some(value) => format!("objective {value:.6}").bright_magenta().to_string(),
        None => "objective N/A".white().to_string(),
    }
}

fn format_duration_ms(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.2}s", ms as f64 / 1000.0)
    } else {
        let mins = ms / 60_000;
        let secs = (ms % 60_000) / 1000;
        format!("{}m {}s", mins, secs)
    }
}
