//! Per-command execution reports.

use std::time::{Duration, Instant};

use lintwright_core::{Diagnostic, DiagnosticFormatter, WarningSink};
use parking_lot::Mutex;
use tracing::{info, warn};

const MAX_COMMAND_LENGTH: usize = 150;

#[derive(Debug, Default)]
struct ReporterState {
    commands: Vec<String>,
    diagnostics: Vec<Diagnostic>,
    result: Option<(bool, i32)>,
    elapsed: Option<Duration>,
}

/// Collects what one command did: executed processes, diagnostics and result.
#[derive(Debug)]
pub struct Reporter {
    name: String,
    started: Instant,
    state: Mutex<ReporterState>,
}

impl Reporter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            started: Instant::now(),
            state: Mutex::new(ReporterState::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Records an executed command line.
    pub fn record_command(&self, argv: &[String]) {
        let command = argv.join(" ");
        info!("[{}] Running: {}", self.name, truncate(&command));
        self.state.lock().commands.push(command);
    }

    pub fn report_diagnostics(&self, diagnostics: Vec<Diagnostic>) {
        self.state.lock().diagnostics.extend(diagnostics);
    }

    /// Marks the command as finished.
    pub fn set_result(&self, success: bool, exit_code: i32) {
        let mut state = self.state.lock();
        state.result = Some((success, exit_code));
        state.elapsed = Some(self.started.elapsed());
    }

    pub fn commands(&self) -> Vec<String> {
        self.state.lock().commands.clone()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.state.lock().diagnostics.clone()
    }

    /// False until a successful result is set.
    pub fn success(&self) -> bool {
        self.state.lock().result.is_some_and(|(success, _)| success)
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.state.lock().result.map(|(_, code)| code)
    }

    pub fn elapsed(&self) -> Duration {
        self.state
            .lock()
            .elapsed
            .unwrap_or_else(|| self.started.elapsed())
    }
}

impl WarningSink for Reporter {
    fn warn(&self, message: &str) {
        warn!("[{}] {}", self.name, message);
    }
}

fn truncate(command: &str) -> String {
    if command.chars().count() <= MAX_COMMAND_LENGTH {
        return command.to_string();
    }
    let head: String = command.chars().take(MAX_COMMAND_LENGTH - 3).collect();
    format!("{}...", head)
}

/// Creates reporters and keeps the finished ones.
#[derive(Debug, Default)]
pub struct ReporterFactory {
    reporters: Mutex<Vec<Reporter>>,
}

impl ReporterFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, name: impl Into<String>) -> Reporter {
        Reporter::new(name)
    }

    /// Stores a finished reporter.
    pub fn finish(&self, reporter: Reporter) {
        self.reporters.lock().push(reporter);
    }

    pub fn len(&self) -> usize {
        self.reporters.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reporters.lock().is_empty()
    }

    pub fn has_error(&self) -> bool {
        self.reporters.lock().iter().any(|r| !r.success())
    }

    /// Names of the commands that failed, in completion order.
    pub fn failed(&self) -> Vec<String> {
        self.reporters
            .lock()
            .iter()
            .filter(|r| !r.success())
            .map(|r| r.name().to_string())
            .collect()
    }

    pub fn format_summary(&self) -> String {
        let mut lines = vec![" ** execution summary **".to_string()];
        for reporter in self.reporters.lock().iter() {
            let status = if reporter.success() { "OK" } else { "Failed" };
            lines.push(format!(
                "{} .......... {} ({:.2} sec)",
                reporter.name(),
                status,
                reporter.elapsed().as_secs_f64()
            ));
        }
        lines.join("\n")
    }

    /// Empty when every command succeeded.
    pub fn format_error_summary(&self) -> String {
        let failed = self.failed();
        if failed.is_empty() {
            return String::new();
        }
        let mut lines = vec![" ** error summary **".to_string(), "Errored:".to_string()];
        lines.extend(failed.iter().map(|name| format!(" - {}", name)));
        lines.join("\n")
    }

    /// Formats every diagnostic of every reporter.
    pub fn format_diagnostic_summary(&self, formatter: &dyn DiagnosticFormatter) -> String {
        let reporters = self.reporters.lock();
        let lines: Vec<String> = reporters
            .iter()
            .flat_map(|r| {
                r.diagnostics()
                    .into_iter()
                    .map(|d| formatter.format(&d, r.name()))
                    .collect::<Vec<_>>()
            })
            .collect();
        lines.join("\n")
    }

    /// `(command name, diagnostic)` pairs of every reporter.
    pub fn diagnostics(&self) -> Vec<(String, Diagnostic)> {
        self.reporters
            .lock()
            .iter()
            .flat_map(|r| {
                r.diagnostics()
                    .into_iter()
                    .map(|d| (r.name().to_string(), d))
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}
