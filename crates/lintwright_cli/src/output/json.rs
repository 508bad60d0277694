//! JSON output formatter

use lintwright_tools::ReporterFactory;
use miette::{IntoDiagnostic, Result};

pub fn output_json(reporters: &ReporterFactory) -> Result<()> {
    let output: Vec<_> = reporters
        .diagnostics()
        .into_iter()
        .map(|(command, diagnostic)| {
            serde_json::json!({
                "command": command,
                "diagnostic": diagnostic,
            })
        })
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&output).into_diagnostic()?
    );
    Ok(())
}
