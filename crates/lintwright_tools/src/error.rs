//! Error types for configuration loading, tool execution and runs.

use std::path::PathBuf;

use lintwright_core::{InheritanceError, SettingError, SourceError};
use thiserror::Error;

/// Errors raised while locating or parsing configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No config file was found.
    #[error("{0}")]
    NotFound(String),

    /// Reading a config file failed.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or does not match the expected model.
    #[error("invalid configuration in {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The file has no `[tool.lintwright]` table.
    #[error("{} doesn't have [tool.lintwright] section.", .0.display())]
    SectionNotFound(PathBuf),

    /// A base config has no `[tool.lintwright.lint]` table.
    #[error("detected {} doesn't have [tool.lintwright.lint] section.", .0.display())]
    LintSectionNotFound(PathBuf),

    /// A value is syntactically valid but semantically wrong.
    #[error("Configuration error: {0}")]
    Invalid(String),

    #[error(transparent)]
    Inheritance(#[from] InheritanceError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Manifest(#[from] RunnerError),
}

impl ConfigError {
    /// Creates an invalid configuration error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}

/// Errors raised while running a tool command.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The tool executable could not be started.
    #[error("command not found: {0}")]
    CommandNotFound(String),

    /// The command cannot run on an explicit file list.
    #[error("{0} does not support target file execution")]
    RunFilesNotSupported(String),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while writing generated settings files.
#[derive(Debug, Error)]
pub enum DumpError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse existing {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize {}: {source}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: toml::ser::Error,
    },

    #[error("unsupported settings file: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error(transparent)]
    Setting(#[from] SettingError),
}

/// Errors raised by the manifest and the runner.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("invalid component name: {0}")]
    InvalidComponentName(String),

    #[error("duplicated component name: {0}")]
    DuplicatedComponentName(String),

    #[error("--enable and --disable cannot be used together")]
    ConflictingFilters,

    #[error("target: {0} not found")]
    TargetNotFound(String),

    #[error("invalid command name: {0}")]
    InvalidCommandName(String),

    #[error(transparent)]
    Setting(#[from] SettingError),

    #[error(transparent)]
    Dump(#[from] DumpError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
