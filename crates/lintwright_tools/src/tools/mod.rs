//! Wrapped tools: settings, exports and commands.

pub mod black;
pub mod flake8;
pub mod isort;
pub mod mypy;
pub mod ruff;

use std::path::{Path, PathBuf};

use toml::{Table, Value};

use crate::command::{Command, PathContext, SourceSelection};
use crate::error::ToolError;
use crate::reporter::Reporter;

pub use black::{Black, BlackSetting};
pub use flake8::{Flake8, Flake8Setting};
pub use isort::{Isort, IsortSectionName, IsortSetting};
pub use mypy::{Mypy, MypyFollowImports, MypyPlugin, MypyPreset, MypySetting, MypyTarget};
pub use ruff::{Ruff, RuffSetting};

/// Builds a TOML array of strings.
pub(crate) fn string_array<I, S>(items: I) -> Value
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Value::Array(items.into_iter().map(|s| Value::String(s.into())).collect())
}

/// Inserts `value` under `key` when present.
pub(crate) fn insert_some(table: &mut Table, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        table.insert(key.to_string(), value);
    }
}

pub(crate) fn path_strings(paths: &[PathBuf]) -> Vec<String> {
    paths.iter().map(|p| p.display().to_string()).collect()
}

/// Runs a tool over files selected from its source.
///
/// `invoke` runs the tool on the selected files from the base directory.
pub(crate) struct SourceCommand<F>
where
    F: Fn(&Reporter, &Path, &[PathBuf]) -> Result<i32, ToolError> + Send + Sync,
{
    name: String,
    selection: SourceSelection,
    side_effects: bool,
    invoke: F,
}

impl<F> SourceCommand<F>
where
    F: Fn(&Reporter, &Path, &[PathBuf]) -> Result<i32, ToolError> + Send + Sync,
{
    pub fn new(
        name: &str,
        paths: &PathContext,
        source: &lintwright_core::Source,
        side_effects: bool,
        invoke: F,
    ) -> Self {
        Self {
            name: name.to_string(),
            selection: SourceSelection::new(paths, source),
            side_effects,
            invoke,
        }
    }
}

impl<F> Command for SourceCommand<F>
where
    F: Fn(&Reporter, &Path, &[PathBuf]) -> Result<i32, ToolError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn has_side_effects(&self) -> bool {
        self.side_effects
    }

    fn run(&self, reporter: &Reporter) -> Result<i32, ToolError> {
        let filter = lintwright_core::python_file_filter();
        let sources: Vec<PathBuf> = self
            .selection
            .resolve(reporter, filter.as_ref())?
            .into_iter()
            .collect();
        tracing::info!("[{}] Checking {} files", self.name, sources.len());
        if sources.is_empty() {
            return Ok(0);
        }
        (self.invoke)(reporter, &self.selection.base_dir, &sources)
    }

    fn run_files(&self, reporter: &Reporter, files: &[PathBuf]) -> Result<i32, ToolError> {
        let filter = lintwright_core::python_file_filter();
        let covered = self
            .selection
            .covered_files(reporter, files, filter.as_ref())?;
        if covered.is_empty() {
            return Ok(0);
        }
        (self.invoke)(reporter, &self.selection.base_dir, &covered)
    }
}

/// First whitespace-separated token of a diff header.
pub(crate) fn header_path(header: &str) -> &str {
    header.split(' ').next().unwrap_or(header)
}
