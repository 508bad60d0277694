//! lintwright CLI
//!
//! Generates settings for Python code quality tools from one config and runs them.

mod cli;
mod commands;
mod output;

use std::process::ExitCode;

use clap::Parser;
use miette::Result;
use tracing::error;
use tracing_subscriber::EnvFilter;

use lintwright_tools::process::PROCESS_TARGET;

use crate::cli::{Cli, Commands};
use crate::commands::{run_generate, run_list, run_targets};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over --loglevel
    let mut filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.loglevel.directive()));
    let process_level = if cli.shows_process_output() {
        "info"
    } else {
        "off"
    };
    if let Ok(directive) = format!("{}={}", PROCESS_TARGET, process_level).parse() {
        filter = filter.add_directive(directive);
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(has_errors) => {
            if has_errors {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!("{:?}", e);
            ExitCode::from(1)
        }
    }
}

fn run(cli: &Cli) -> Result<bool> {
    let error_format = cli.error_format();
    match &cli.command {
        Commands::Run {
            targets,
            no_parallel,
            ..
        } => run_targets(cli, targets, error_format, *no_parallel, None),
        Commands::RunFiles {
            target,
            files,
            no_parallel,
            ..
        } => run_targets(
            cli,
            std::slice::from_ref(target),
            error_format,
            *no_parallel,
            Some(files.as_slice()),
        ),
        Commands::Generate { export_dir } => run_generate(cli, export_dir).map(|_| false),
        Commands::List => run_list(cli).map(|_| false),
    }
}
