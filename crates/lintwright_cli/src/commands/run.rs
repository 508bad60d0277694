//! Run and run-files command implementation

use std::path::PathBuf;

use lintwright_core::path::resolve_path;
use lintwright_tools::{ReporterFactory, RunOptions};
use miette::{IntoDiagnostic, Result};

use crate::cli::{Cli, ErrorFormat};
use crate::output::output_report;

/// Runs `targets`, or a single target on `files`. Returns true if any command failed.
pub fn run_targets(
    cli: &Cli,
    targets: &[String],
    error_format: Option<ErrorFormat>,
    no_parallel: bool,
    files: Option<&[PathBuf]>,
) -> Result<bool> {
    let context = super::load(cli)?;
    let options = RunOptions {
        require_diagnostics: error_format.is_some(),
        no_parallel,
    };
    let files: Option<Vec<PathBuf>> =
        files.map(|files| files.iter().map(|f| resolve_path(&context.cwd, f)).collect());

    let reporters = ReporterFactory::new();
    context
        .runner
        .run(
            targets,
            &reporters,
            options,
            context.settings_dir.as_deref(),
            files.as_deref(),
        )
        .into_diagnostic()?;

    output_report(&reporters, error_format)?;
    Ok(reporters.has_error())
}
