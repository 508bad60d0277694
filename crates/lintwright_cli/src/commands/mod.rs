//! Subcommand implementations

mod generate;
mod list;
mod run;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use lintwright_core::{GitIndex, GitSettings};
use lintwright_tools::{ManifestOptions, Runner, config};
use miette::{IntoDiagnostic, Result, miette};
use tracing::{debug, info};

use crate::cli::Cli;

pub use generate::run_generate;
pub use list::run_list;
pub use run::run_targets;

/// A runner for the discovered config plus CLI-level settings.
pub(crate) struct Context {
    pub runner: Runner,
    pub settings_dir: Option<PathBuf>,
    pub cwd: PathBuf,
}

pub(crate) fn load(cli: &Cli) -> Result<Context> {
    let cwd = std::env::current_dir().into_diagnostic()?;
    let path = config::find_config(cli.config.as_deref(), &cwd).into_diagnostic()?;
    info!("Using config: {}", path.display());

    let base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| miette!("Config path has no parent directory: {}", path.display()))?;
    let manifest = config::load_manifest(&path).into_diagnostic()?;
    let settings_dir = config::parse_cli_config(&path)
        .into_diagnostic()?
        .and_then(|c| c.settings_dir);
    if let Some(dir) = &settings_dir {
        debug!("Settings directory: {}", dir.display());
    }

    let git = Arc::new(GitIndex::new(GitSettings::from_env()));
    let runner = Runner::new(manifest, base_dir, git).with_filters(ManifestOptions {
        enable: cli.enable.clone(),
        disable: cli.disable.clone(),
    });
    Ok(Context {
        runner,
        settings_dir,
        cwd,
    })
}
