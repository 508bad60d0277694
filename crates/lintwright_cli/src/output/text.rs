//! Text output formatter

use lintwright_core::DiagnosticFormatter;
use lintwright_tools::ReporterFactory;

pub fn output_summary(reporters: &ReporterFactory) {
    println!();
    println!("{}", reporters.format_summary());

    let errors = reporters.format_error_summary();
    if !errors.is_empty() {
        println!();
        println!("{}", errors);
    }
}

pub fn output_diagnostics(reporters: &ReporterFactory, formatter: &dyn DiagnosticFormatter) {
    let diagnostics = reporters.format_diagnostic_summary(formatter);
    if diagnostics.is_empty() {
        println!("No errors found");
    } else {
        println!("{}", diagnostics);
    }

    // Failures without diagnostics are otherwise silent.
    let errors = reporters.format_error_summary();
    if !errors.is_empty() {
        eprintln!("{}", errors);
    }
}
