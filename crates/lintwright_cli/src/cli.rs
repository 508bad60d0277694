//! CLI argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// lintwright - One configuration for black, isort, flake8, mypy and ruff
#[derive(Parser)]
#[command(name = "lintwright")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub loglevel: LogLevel,

    /// Show or hide the output of wrapped tools
    #[arg(long, global = true, value_enum, default_value_t = ProcessOutputMode::Auto)]
    pub process_output: ProcessOutputMode,

    /// Always show the output of wrapped tools (same as --process-output show)
    #[arg(short = 's', global = true)]
    pub show_process_output: bool,

    /// Only use the given components (comma separated)
    #[arg(long, global = true, value_delimiter = ',')]
    pub enable: Option<Vec<String>>,

    /// Do not use the given components (comma separated)
    #[arg(long, global = true, value_delimiter = ',')]
    pub disable: Option<Vec<String>>,
}

impl Cli {
    /// Error format of the selected command, if any.
    pub fn error_format(&self) -> Option<ErrorFormat> {
        match &self.command {
            Commands::Run { error_format, .. } | Commands::RunFiles { error_format, .. } => {
                *error_format
            }
            Commands::Generate { .. } | Commands::List => None,
        }
    }

    /// Whether wrapped tool output should reach the log.
    pub fn shows_process_output(&self) -> bool {
        if self.show_process_output {
            return true;
        }
        match self.process_output {
            ProcessOutputMode::Show => true,
            ProcessOutputMode::Hide => false,
            ProcessOutputMode::Auto => self.error_format().is_none(),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run targets (e.g. lint, format)
    Run {
        /// Targets to run
        #[arg(required = true)]
        targets: Vec<String>,

        /// Print diagnostics in the given format
        #[arg(long, value_enum)]
        error_format: Option<ErrorFormat>,

        /// Run commands one at a time
        #[arg(long)]
        no_parallel: bool,
    },

    /// Run a target on the given files only
    RunFiles {
        /// Target to run
        target: String,

        /// Files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Print diagnostics in the given format
        #[arg(long, value_enum)]
        error_format: Option<ErrorFormat>,

        /// Run commands one at a time
        #[arg(long)]
        no_parallel: bool,
    },

    /// Write the generated tool settings into a directory
    Generate {
        /// Output directory
        export_dir: PathBuf,
    },

    /// List available targets
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProcessOutputMode {
    Auto,
    Show,
    Hide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ErrorFormat {
    /// file:line:col:command: message
    Gnu,
    /// [command] file:line:col:message
    Pretty,
    /// JSON array of diagnostics
    Json,
}
