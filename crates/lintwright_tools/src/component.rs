//! Components: configured tools that export settings and create commands.

use std::collections::BTreeMap;

use lintwright_core::{SettingError, SettingFile};

use crate::command::{Command, PathContext, RunOptions};
use crate::tools::{Black, Flake8, Isort, Mypy, Ruff};

#[derive(Debug, Clone)]
pub enum Component {
    Black(Black),
    Isort(Isort),
    Flake8(Flake8),
    Mypy(Mypy),
    Ruff(Ruff),
}

impl Component {
    pub fn name(&self) -> &str {
        match self {
            Self::Black(c) => c.name.as_str(),
            Self::Isort(c) => c.name.as_str(),
            Self::Flake8(c) => c.name.as_str(),
            Self::Mypy(c) => c.name.as_str(),
            Self::Ruff(c) => c.name.as_str(),
        }
    }

    /// Target names this component takes part in.
    pub fn targets(&self) -> &'static [&'static str] {
        match self {
            Self::Black(c) => c.targets(),
            Self::Isort(c) => c.targets(),
            Self::Flake8(c) => c.targets(),
            Self::Mypy(c) => c.targets(),
            Self::Ruff(c) => c.targets(),
        }
    }

    /// Adds this component's sections to the settings files, keyed by file name.
    pub fn export_settings(
        &self,
        paths: &PathContext,
        files: &mut BTreeMap<String, SettingFile>,
    ) -> Result<(), SettingError> {
        match self {
            Self::Black(c) => c.export_settings(files),
            Self::Isort(c) => c.export_settings(files),
            Self::Flake8(c) => c.export_settings(files),
            Self::Mypy(c) => c.export_settings(paths, files),
            Self::Ruff(c) => c.export_settings(files),
        }
    }

    /// Creates the command for `target`, or `None` if the component lacks it.
    pub fn create_command(
        &self,
        target: &str,
        paths: &PathContext,
        options: &RunOptions,
    ) -> Option<Box<dyn Command>> {
        match self {
            Self::Black(c) => c.create_command(target, paths),
            Self::Isort(c) => c.create_command(target, paths),
            Self::Flake8(c) => c.create_command(target, paths),
            Self::Mypy(c) => c.create_command(target, paths, options),
            Self::Ruff(c) => c.create_command(target, paths),
        }
    }
}

impl From<Black> for Component {
    fn from(value: Black) -> Self {
        Self::Black(value)
    }
}

impl From<Isort> for Component {
    fn from(value: Isort) -> Self {
        Self::Isort(value)
    }
}

impl From<Flake8> for Component {
    fn from(value: Flake8) -> Self {
        Self::Flake8(value)
    }
}

impl From<Mypy> for Component {
    fn from(value: Mypy) -> Self {
        Self::Mypy(value)
    }
}

impl From<Ruff> for Component {
    fn from(value: Ruff) -> Self {
        Self::Ruff(value)
    }
}
