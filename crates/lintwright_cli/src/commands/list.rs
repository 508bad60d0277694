//! List command implementation

use miette::{IntoDiagnostic, Result};

use crate::cli::Cli;

pub fn run_list(cli: &Cli) -> Result<()> {
    let context = super::load(cli)?;
    let targets = context.runner.targets().into_diagnostic()?;

    println!("Available targets:");
    for (target, components) in &targets {
        println!(" * {}", target);
        for component in components {
            println!("   - {}", component);
        }
    }
    Ok(())
}
