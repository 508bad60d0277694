//! # lintwright_tools
//!
//! Tool components and the runner for lintwright.
//!
//! This crate provides:
//! - Settings, exports and commands for black, isort, flake8, mypy and ruff
//! - Loading of `[tool.lintwright]` configuration with `base` inheritance
//! - A manifest of components with `--enable`/`--disable` filtering
//! - A runner that writes settings files and executes targets
//!
//! ## Example
//!
//! ```rust,ignore
//! use lintwright_tools::{ReporterFactory, RunOptions, Runner, config};
//!
//! let path = config::find_config(None, &cwd)?;
//! let manifest = config::load_manifest(&path)?;
//! let runner = Runner::new(manifest, path.parent().unwrap(), git);
//! let reporters = ReporterFactory::new();
//! runner.run(&["lint".to_string()], &reporters, RunOptions::default(), None, None)?;
//! ```

pub mod command;
pub mod component;
pub mod config;
pub mod dumper;
mod error;
pub mod factory;
pub mod manifest;
pub mod process;
pub mod py_version;
pub mod reporter;
pub mod runner;
pub mod tools;

pub use command::{Command, PathContext, RunOptions};
pub use component::Component;
pub use config::{CliConfig, Config, LintConfig};
pub use error::{ConfigError, DumpError, RunnerError, ToolError};
pub use factory::{MypyModuleOption, configure_lint};
pub use manifest::{Manifest, ManifestOptions};
pub use py_version::PythonVersion;
pub use reporter::{Reporter, ReporterFactory};
pub use runner::{Runner, run_commands};
