//! Commands created by components for a run target.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lintwright_core::path::resolve_path;
use lintwright_core::{FilePredicate, GitIndex, Source};
use tracing::info;

use crate::error::ToolError;
use crate::reporter::Reporter;

/// Directories a run works with.
#[derive(Debug, Clone)]
pub struct PathContext {
    /// Directory of the config file; tools run from here.
    pub base_dir: PathBuf,
    /// Directory holding generated settings files.
    pub settings_dir: PathBuf,
    /// Shared git index used for source resolution.
    pub git: Arc<GitIndex>,
}

impl PathContext {
    pub fn new(base_dir: impl Into<PathBuf>, settings_dir: impl Into<PathBuf>, git: Arc<GitIndex>) -> Self {
        Self {
            base_dir: base_dir.into(),
            settings_dir: settings_dir.into(),
            git,
        }
    }

    /// Path of a generated settings file.
    pub fn setting_path(&self, file_name: &str) -> PathBuf {
        resolve_path(&self.settings_dir, Path::new(file_name))
    }
}

/// Options shared by every command of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Ask tools for machine-readable output and parse it into diagnostics.
    pub require_diagnostics: bool,
    /// Never run commands concurrently.
    pub no_parallel: bool,
}

/// A runnable unit of a target.
pub trait Command: Send + Sync {
    fn name(&self) -> &str;

    /// True if the command modifies files.
    fn has_side_effects(&self) -> bool;

    /// Runs the command on its configured sources and returns the exit code.
    fn run(&self, reporter: &Reporter) -> Result<i32, ToolError>;

    /// Runs the command on an explicit list of files.
    fn run_files(&self, reporter: &Reporter, files: &[PathBuf]) -> Result<i32, ToolError> {
        let _ = (reporter, files);
        Err(ToolError::RunFilesNotSupported(self.name().to_string()))
    }
}

/// Source handling shared by commands that work on a file selection.
#[derive(Debug, Clone)]
pub(crate) struct SourceSelection {
    pub base_dir: PathBuf,
    pub source: Source,
    pub git: Arc<GitIndex>,
}

impl SourceSelection {
    pub fn new(paths: &PathContext, source: &Source) -> Self {
        Self {
            base_dir: paths.base_dir.clone(),
            source: source.clone(),
            git: Arc::clone(&paths.git),
        }
    }

    /// Resolves the sources, using git when the base directory is in a repository.
    pub fn resolve(
        &self,
        reporter: &Reporter,
        predicate: &FilePredicate,
    ) -> Result<BTreeSet<PathBuf>, ToolError> {
        let git = self
            .git
            .is_available(&self.base_dir)
            .then_some(self.git.as_ref());
        Ok(self
            .source
            .resolve_files(&self.base_dir, Some(predicate), git, Some(reporter))?)
    }

    /// Keeps the files of `files` that belong to the resolved sources.
    pub fn covered_files(
        &self,
        reporter: &Reporter,
        files: &[PathBuf],
        predicate: &FilePredicate,
    ) -> Result<Vec<PathBuf>, ToolError> {
        let sources = self.resolve(reporter, predicate)?;
        let mut covered = Vec::new();
        for file in files {
            let resolved = resolve_path(&self.base_dir, file);
            if sources.contains(&resolved) {
                covered.push(resolved);
            } else {
                info!("Skipping {} for {}", file.display(), reporter.name());
            }
        }
        Ok(covered)
    }
}
