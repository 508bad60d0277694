//! Parsers turning tool output into [`Diagnostic`]s.
//!
//! Two shapes of output are understood: `file:line[:column]: message`
//! lines (flake8, mypy) and unified diffs (black, isort, ruff).

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::diagnostic::Diagnostic;
use crate::unidiff::{self, Hunk, PatchedFile};
use crate::warning::{WarningSink, emit};

static ERROR_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<file_path>.*?):(?P<line>0|[1-9]\d*)(:(?P<column>0|[1-9]\d*))?: (?P<message>.*)$",
    )
    .expect("valid regex")
});

/// Raised by a file path extractor that does not recognize a diff header.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unexpected error format: {0}")]
pub struct UnexpectedErrorFormat(pub String);

fn warn_parse_error(errors: &str, warnings: Option<&dyn WarningSink>) {
    emit(
        warnings,
        &format!(
            "The following error(s) could not be parsed, so lintwright won't format it (them).\n\
             {}\n\
             If you think this is a bug please report it to the maintainers.",
            errors
        ),
    );
}

/// Parses `file:line[:column]: message` lines.
///
/// Relative file paths are resolved against `base_dir`. Lines that do not
/// match are reported once, together, through `warnings`.
pub fn parse_error_lines(
    text: &str,
    base_dir: &Path,
    warnings: Option<&dyn WarningSink>,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut invalid_lines = Vec::new();

    for raw in text.lines() {
        match parse_error_line(raw, base_dir) {
            Some(diagnostic) => diagnostics.push(diagnostic),
            None => invalid_lines.push(raw),
        }
    }

    if !invalid_lines.is_empty() {
        warn_parse_error(&invalid_lines.join("\n"), warnings);
    }
    diagnostics
}

fn parse_error_line(raw: &str, base_dir: &Path) -> Option<Diagnostic> {
    let caps = ERROR_LINE.captures(raw)?;
    let line: u32 = caps["line"].parse().ok()?;
    let column = match caps.name("column") {
        Some(m) => Some(m.as_str().parse::<u32>().ok()?),
        None => None,
    };
    let message = caps["message"].trim_start_matches(' ').trim_end_matches('\n');
    let file_path = base_dir.join(&caps["file_path"]);

    Diagnostic::message(file_path, message)
        .ok()
        .map(|d| d.with_lines(line, line).with_start_column(column))
}

/// Parses a unified diff into one diagnostic per hunk.
///
/// `extractor` maps the text of a `---` header to the file path. A diff
/// that cannot be parsed at all is reported once and yields nothing. A
/// patch whose header the extractor rejects is reported and skipped.
pub fn parse_error_diffs<F>(
    text: &str,
    extractor: F,
    warnings: Option<&dyn WarningSink>,
) -> Vec<Diagnostic>
where
    F: Fn(&str) -> Result<PathBuf, UnexpectedErrorFormat>,
{
    let patches = match unidiff::parse(text) {
        Ok(patches) => patches,
        Err(e) => {
            debug!("Failed to parse diff: {}", e);
            warn_parse_error(text, warnings);
            return Vec::new();
        }
    };

    let mut diagnostics = Vec::new();
    for patch in &patches {
        let file_path = match extractor(&patch.source_file) {
            Ok(path) if path.is_absolute() => path,
            Ok(_) | Err(_) => {
                warn_parse_error(&patch.to_string(), warnings);
                continue;
            }
        };
        diagnostics.extend(
            patch
                .hunks
                .iter()
                .filter_map(|hunk| hunk_diagnostic(patch, hunk, &file_path)),
        );
    }
    diagnostics
}

fn hunk_diagnostic(patch: &PatchedFile, hunk: &Hunk, file_path: &Path) -> Option<Diagnostic> {
    let source_changes: Vec<u32> = hunk
        .source_lines()
        .filter(|l| !l.is_context())
        .filter_map(|l| l.source_line_no)
        .collect();

    let (start_line, end_line) = match (source_changes.first(), source_changes.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => {
            let target_changes: Vec<u32> = hunk
                .target_lines()
                .filter(|l| !l.is_context())
                .filter_map(|l| l.target_line_no)
                .collect();
            match (target_changes.first(), target_changes.last()) {
                (Some(first), Some(last)) => (*first, *last),
                _ => {
                    debug!("Hunk without changes in {}", patch.source_file);
                    return None;
                }
            }
        }
    };

    let diff: String = hunk
        .lines
        .iter()
        .filter(|line| {
            !line.is_context()
                || line
                    .source_line_no
                    .is_some_and(|no| (start_line..=end_line).contains(&no))
        })
        .map(|line| line.to_string())
        .collect();

    Diagnostic::diff(file_path, diff)
        .ok()
        .map(|d| d.with_lines(start_line, end_line).with_start_column(Some(1)))
}
