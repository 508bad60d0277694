//! Output formatting module

mod json;
mod text;

use lintwright_core::{GnuFormatter, PrettyFormatter};
use lintwright_tools::ReporterFactory;
use miette::Result;

use crate::cli::ErrorFormat;

/// Prints the results of a run: summaries without a format, diagnostics with one.
pub fn output_report(reporters: &ReporterFactory, format: Option<ErrorFormat>) -> Result<()> {
    match format {
        None => text::output_summary(reporters),
        Some(ErrorFormat::Gnu) => text::output_diagnostics(reporters, &GnuFormatter),
        Some(ErrorFormat::Pretty) => text::output_diagnostics(reporters, &PrettyFormatter),
        Some(ErrorFormat::Json) => json::output_json(reporters)?,
    }
    Ok(())
}
