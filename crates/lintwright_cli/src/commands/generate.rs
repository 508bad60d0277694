//! Generate command implementation

use std::path::Path;

use lintwright_core::path::resolve_path;
use miette::{IntoDiagnostic, Result, miette};
use tracing::info;

use crate::cli::Cli;

pub fn run_generate(cli: &Cli, export_dir: &Path) -> Result<()> {
    let context = super::load(cli)?;
    let export_dir = resolve_path(&context.cwd, export_dir);
    if export_dir.exists() && !export_dir.is_dir() {
        return Err(miette!("{} is not a directory", export_dir.display()));
    }

    let written = context
        .runner
        .export_settings(&export_dir)
        .into_diagnostic()?;
    for path in &written {
        info!("Generated {}", path.display());
    }
    Ok(())
}
