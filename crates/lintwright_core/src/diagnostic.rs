//! Uniform diagnostic record produced by every tool wrapper.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::DiagnosticError;

/// Payload of a diagnostic: a textual message or a diff fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticBody {
    Message(String),
    Diff(String),
}

impl DiagnosticBody {
    pub fn text(&self) -> &str {
        match self {
            DiagnosticBody::Message(text) | DiagnosticBody::Diff(text) => text,
        }
    }
}

/// A single finding reported by a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    file_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_column: Option<u32>,
    #[serde(flatten)]
    body: DiagnosticBody,
}

impl Diagnostic {
    /// Creates a diagnostic with the given body. `file_path` must be absolute.
    pub fn new(file_path: impl Into<PathBuf>, body: DiagnosticBody) -> Result<Self, DiagnosticError> {
        let file_path = file_path.into();
        if !file_path.is_absolute() {
            return Err(DiagnosticError::RelativePath(file_path));
        }
        Ok(Self {
            file_path,
            start_line: None,
            end_line: None,
            start_column: None,
            body,
        })
    }

    pub fn message(file_path: impl Into<PathBuf>, message: impl Into<String>) -> Result<Self, DiagnosticError> {
        Self::new(file_path, DiagnosticBody::Message(message.into()))
    }

    pub fn diff(file_path: impl Into<PathBuf>, diff: impl Into<String>) -> Result<Self, DiagnosticError> {
        Self::new(file_path, DiagnosticBody::Diff(diff.into()))
    }

    /// Creates a diagnostic from optional parts; exactly one of `message`
    /// and `diff` must be present.
    pub fn from_parts(
        file_path: impl Into<PathBuf>,
        message: Option<String>,
        diff: Option<String>,
    ) -> Result<Self, DiagnosticError> {
        let body = match (message, diff) {
            (Some(message), None) => DiagnosticBody::Message(message),
            (None, Some(diff)) => DiagnosticBody::Diff(diff),
            (None, None) => return Err(DiagnosticError::MissingBody),
            (Some(_), Some(_)) => return Err(DiagnosticError::AmbiguousBody),
        };
        Self::new(file_path, body)
    }

    pub fn with_lines(mut self, start_line: u32, end_line: u32) -> Self {
        self.start_line = Some(start_line);
        self.end_line = Some(end_line);
        self
    }

    pub fn with_start_column(mut self, start_column: Option<u32>) -> Self {
        self.start_column = start_column;
        self
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn start_line(&self) -> Option<u32> {
        self.start_line
    }

    pub fn end_line(&self) -> Option<u32> {
        self.end_line
    }

    pub fn start_column(&self) -> Option<u32> {
        self.start_column
    }

    pub fn body(&self) -> &DiagnosticBody {
        &self.body
    }

    pub fn message_text(&self) -> Option<&str> {
        match &self.body {
            DiagnosticBody::Message(text) => Some(text),
            DiagnosticBody::Diff(_) => None,
        }
    }

    pub fn diff_text(&self) -> Option<&str> {
        match &self.body {
            DiagnosticBody::Diff(text) => Some(text),
            DiagnosticBody::Message(_) => None,
        }
    }

    fn position(&self) -> String {
        format!(
            "{}:{}:{}",
            self.file_path.display(),
            self.start_line.unwrap_or(1),
            self.start_column.unwrap_or(1)
        )
    }
}

/// Renders a diagnostic for a given command.
pub trait DiagnosticFormatter: Send + Sync {
    fn format(&self, diagnostic: &Diagnostic, command_name: &str) -> String;
}

/// `file:line:column:command: message` on one line.
///
/// See <https://www.gnu.org/prep/standards/html_node/Errors.html>.
#[derive(Debug, Default, Clone, Copy)]
pub struct GnuFormatter;

impl DiagnosticFormatter for GnuFormatter {
    fn format(&self, diagnostic: &Diagnostic, command_name: &str) -> String {
        format!(
            "{}:{}: {}",
            diagnostic.position(),
            command_name,
            diagnostic.body.text().replace('\n', "\\n")
        )
    }
}

/// Human oriented output; diffs start on their own line.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrettyFormatter;

impl DiagnosticFormatter for PrettyFormatter {
    fn format(&self, diagnostic: &Diagnostic, command_name: &str) -> String {
        let text = match &diagnostic.body {
            DiagnosticBody::Message(message) => message.clone(),
            DiagnosticBody::Diff(diff) => format!("\n{}", diff),
        };
        format!("[{}] {}:{}", command_name, diagnostic.position(), text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_requires_absolute_path() {
        assert_eq!(
            Diagnostic::message("relative.py", "msg"),
            Err(DiagnosticError::RelativePath(PathBuf::from("relative.py")))
        );
    }

    #[test]
    fn test_from_parts_requires_exactly_one_body() {
        assert_eq!(
            Diagnostic::from_parts("/a.py", None, None),
            Err(DiagnosticError::MissingBody)
        );
        assert_eq!(
            Diagnostic::from_parts("/a.py", Some("m".into()), Some("d".into())),
            Err(DiagnosticError::AmbiguousBody)
        );
        let diag = Diagnostic::from_parts("/a.py", None, Some("-x\n".into())).unwrap();
        assert_eq!(diag.diff_text(), Some("-x\n"));
        assert_eq!(diag.message_text(), None);
    }

    #[test]
    fn test_gnu_formatter() {
        let diag = Diagnostic::message("/a/b.py", "line one\nline two")
            .unwrap()
            .with_lines(3, 3)
            .with_start_column(Some(7));
        assert_eq!(
            GnuFormatter.format(&diag, "flake8"),
            "/a/b.py:3:7:flake8: line one\\nline two"
        );

        let diff = Diagnostic::diff("/a/b.py", "-a\n+b\n").unwrap();
        assert_eq!(
            GnuFormatter.format(&diff, "black"),
            "/a/b.py:1:1:black: -a\\n+b\\n"
        );
    }

    #[test]
    fn test_pretty_formatter() {
        let diag = Diagnostic::message("/a/b.py", "boom")
            .unwrap()
            .with_lines(2, 2);
        assert_eq!(PrettyFormatter.format(&diag, "mypy"), "[mypy] /a/b.py:2:1:boom");

        let diff = Diagnostic::diff("/a/b.py", "-a\n")
            .unwrap()
            .with_lines(5, 6)
            .with_start_column(Some(1));
        assert_eq!(
            PrettyFormatter.format(&diff, "isort"),
            "[isort] /a/b.py:5:1:\n-a\n"
        );
    }
}
