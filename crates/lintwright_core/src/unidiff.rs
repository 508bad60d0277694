//! Minimal unified diff parser.
//!
//! Produces a `PatchedFile -> Hunk -> Line` hierarchy from the output of
//! formatters running in check mode. Only the parts needed to locate
//! changes are kept: file headers, hunk ranges and body lines.

use std::fmt;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::DiffParseError;

static SOURCE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^--- ([^\t\n]+)(?:\t([^\n]+))?").expect("valid regex"));
static TARGET_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+\+\+ ([^\t\n]+)(?:\t([^\n]+))?").expect("valid regex"));
static HUNK_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@[ ]?(.*)").expect("valid regex")
});

/// Kind of a hunk body line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Context,
    Added,
    Removed,
    /// `\ No newline at end of file`
    NoNewline,
    /// Blank line trailing a complete hunk.
    Empty,
}

impl LineKind {
    fn prefix(self) -> &'static str {
        match self {
            LineKind::Context => " ",
            LineKind::Added => "+",
            LineKind::Removed => "-",
            LineKind::NoNewline => "\\",
            LineKind::Empty => "",
        }
    }
}

/// One body line of a hunk; `value` keeps its line terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub kind: LineKind,
    pub value: String,
    pub source_line_no: Option<u32>,
    pub target_line_no: Option<u32>,
}

impl Line {
    pub fn is_context(&self) -> bool {
        self.kind == LineKind::Context
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub source_start: u32,
    pub source_length: u32,
    pub target_start: u32,
    pub target_length: u32,
    pub section_header: String,
    pub lines: Vec<Line>,
}

impl Hunk {
    /// Lines present in the original file (context and removed).
    pub fn source_lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter().filter(|l| l.source_line_no.is_some())
    }

    /// Lines present in the new file (context and added).
    pub fn target_lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter().filter(|l| l.target_line_no.is_some())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchedFile {
    /// Source header text after `--- `, without a tab separated timestamp.
    pub source_file: String,
    pub target_file: String,
    pub hunks: Vec<Hunk>,
}

impl fmt::Display for PatchedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- {}", self.source_file)?;
        writeln!(f, "+++ {}", self.target_file)?;
        for hunk in &self.hunks {
            write!(
                f,
                "@@ -{},{} +{},{} @@",
                hunk.source_start, hunk.source_length, hunk.target_start, hunk.target_length
            )?;
            if !hunk.section_header.is_empty() {
                write!(f, " {}", hunk.section_header)?;
            }
            writeln!(f)?;
            for line in &hunk.lines {
                write!(f, "{}", line)?;
            }
        }
        Ok(())
    }
}

/// Parses a unified diff stream.
///
/// Text outside file headers and hunks is ignored.
pub fn parse(text: &str) -> Result<Vec<PatchedFile>, DiffParseError> {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    let mut files: Vec<PatchedFile> = Vec::new();
    let mut pending_source: Option<String> = None;
    let mut file_open = false;
    let mut index = 0;

    while index < lines.len() {
        let line = lines[index];
        let line_no = index + 1;
        index += 1;

        if let Some(caps) = SOURCE_HEADER.captures(line) {
            pending_source = Some(caps[1].to_string());
            file_open = false;
            continue;
        }

        if let Some(caps) = TARGET_HEADER.captures(line) {
            let Some(source_file) = pending_source.take() else {
                return Err(DiffParseError::UnexpectedTargetHeader {
                    line: line_no,
                    text: line.trim_end().to_string(),
                });
            };
            files.push(PatchedFile {
                source_file,
                target_file: caps[1].to_string(),
                hunks: Vec::new(),
            });
            file_open = true;
            continue;
        }

        if let Some(caps) = HUNK_HEADER.captures(line) {
            let file = match files.last_mut() {
                Some(file) if file_open => file,
                _ => {
                    return Err(DiffParseError::UnexpectedHunk {
                        line: line_no,
                        text: line.trim_end().to_string(),
                    });
                }
            };
            let (hunk, consumed) = parse_hunk(&caps, &lines[index..], index)?;
            index += consumed;
            file.hunks.push(hunk);
            continue;
        }

        if file_open && let Some(hunk) = files.last_mut().and_then(|f| f.hunks.last_mut()) {
            if line.starts_with('\\') {
                hunk.lines.push(trailing_line(LineKind::NoNewline, &line[1..]));
                continue;
            }
            if line == "\n" || line == "\r\n" {
                hunk.lines.push(trailing_line(LineKind::Empty, line));
                continue;
            }
        }

        file_open = false;
    }

    Ok(files)
}

fn trailing_line(kind: LineKind, value: &str) -> Line {
    Line {
        kind,
        value: value.to_string(),
        source_line_no: None,
        target_line_no: None,
    }
}

fn header_number(
    caps: &Captures<'_>,
    group: usize,
    default: u32,
    line: usize,
) -> Result<u32, DiffParseError> {
    match caps.get(group) {
        Some(m) => m
            .as_str()
            .parse()
            .map_err(|_| DiffParseError::InvalidHunkHeader {
                line,
                text: caps[0].trim_end().to_string(),
            }),
        None => Ok(default),
    }
}

fn advance(no: &mut u32, line: usize) -> Result<u32, DiffParseError> {
    let current = *no;
    *no = current
        .checked_add(1)
        .ok_or(DiffParseError::LineNumberOverflow { line })?;
    Ok(current)
}

/// Parses the body of a hunk; returns the hunk and the number of lines consumed.
///
/// `offset` is the line number of the hunk header.
fn parse_hunk(
    header: &Captures<'_>,
    body: &[&str],
    offset: usize,
) -> Result<(Hunk, usize), DiffParseError> {
    let source_start = header_number(header, 1, 0, offset)?;
    let source_length = header_number(header, 2, 1, offset)?;
    let target_start = header_number(header, 3, 0, offset)?;
    let target_length = header_number(header, 4, 1, offset)?;

    let mut hunk = Hunk {
        source_start,
        source_length,
        target_start,
        target_length,
        section_header: header
            .get(5)
            .map(|m| m.as_str().trim_end().to_string())
            .unwrap_or_default(),
        lines: Vec::new(),
    };

    let overflow = DiffParseError::LineNumberOverflow { line: offset };
    let source_end = source_start
        .checked_add(source_length)
        .ok_or_else(|| overflow.clone())?;
    let target_end = target_start.checked_add(target_length).ok_or(overflow)?;
    let mut source_no = source_start;
    let mut target_no = target_start;
    let mut consumed = 0;

    for raw in body {
        if source_no == source_end && target_no == target_end {
            break;
        }
        consumed += 1;
        let line_no = offset + consumed;

        let (kind, value) = if *raw == "\n" || *raw == "\r\n" {
            (LineKind::Context, *raw)
        } else {
            match raw.chars().next() {
                Some(' ') => (LineKind::Context, &raw[1..]),
                Some('+') => (LineKind::Added, &raw[1..]),
                Some('-') => (LineKind::Removed, &raw[1..]),
                Some('\\') => (LineKind::NoNewline, &raw[1..]),
                _ => {
                    return Err(DiffParseError::ExpectedHunkLine {
                        line: line_no,
                        text: raw.trim_end().to_string(),
                    });
                }
            }
        };

        let (source_line_no, target_line_no) = match kind {
            LineKind::Context => (
                Some(advance(&mut source_no, line_no)?),
                Some(advance(&mut target_no, line_no)?),
            ),
            LineKind::Added => (None, Some(advance(&mut target_no, line_no)?)),
            LineKind::Removed => (Some(advance(&mut source_no, line_no)?), None),
            LineKind::NoNewline | LineKind::Empty => (None, None),
        };

        if source_no > source_end || target_no > target_end {
            return Err(DiffParseError::HunkTooLong { line: line_no });
        }

        hunk.lines.push(Line {
            kind,
            value: value.to_string(),
            source_line_no,
            target_line_no,
        });
    }

    if source_no < source_end || target_no < target_end {
        return Err(DiffParseError::HunkTooShort);
    }

    Ok((hunk, consumed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SIMPLE: &str = "--- a.py\t2020-01-01\n+++ a.py\t2020-01-02\n@@ -1,3 +1,3 @@ def f():\n a\n-b\n+c\n d\n";

    #[test]
    fn test_parse_simple_patch() {
        let files = parse(SIMPLE).unwrap();
        assert_eq!(files.len(), 1);
        let file = &files[0];
        assert_eq!(file.source_file, "a.py");
        assert_eq!(file.target_file, "a.py");
        assert_eq!(file.hunks.len(), 1);

        let hunk = &file.hunks[0];
        assert_eq!(hunk.section_header, "def f():");
        let kinds: Vec<_> = hunk.lines.iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![
                LineKind::Context,
                LineKind::Removed,
                LineKind::Added,
                LineKind::Context
            ]
        );
        assert_eq!(hunk.lines[1].source_line_no, Some(2));
        assert_eq!(hunk.lines[2].target_line_no, Some(2));
        assert_eq!(hunk.lines[3].source_line_no, Some(3));
        assert_eq!(hunk.lines[1].to_string(), "-b\n");
    }

    #[test]
    fn test_header_without_lengths_defaults_to_one() {
        let files = parse("--- a\n+++ b\n@@ -3 +3 @@\n-x\n+y\n").unwrap();
        let hunk = &files[0].hunks[0];
        assert_eq!((hunk.source_length, hunk.target_length), (1, 1));
    }

    #[test]
    fn test_blank_line_inside_hunk_is_context() {
        let files = parse("--- a\n+++ a\n@@ -1,2 +1,2 @@\n\n-x\n+y\n").unwrap();
        let first = &files[0].hunks[0].lines[0];
        assert_eq!(first.kind, LineKind::Context);
        assert_eq!(first.to_string(), " \n");
    }

    #[test]
    fn test_blank_line_after_hunk_is_empty_line() {
        let files = parse("--- a\n+++ a\n@@ -1 +1 @@\n-x\n+y\n\n").unwrap();
        let lines = &files[0].hunks[0].lines;
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2].kind, LineKind::Empty);
        assert!(!lines[2].is_context());
        assert_eq!(lines[2].to_string(), "\n");
    }

    #[test]
    fn test_no_newline_marker() {
        let files = parse("--- a\n+++ a\n@@ -1 +1 @@\n-x\n+y\n\\ No newline at end of file\n").unwrap();
        let lines = &files[0].hunks[0].lines;
        assert_eq!(lines[2].kind, LineKind::NoNewline);
    }

    #[test]
    fn test_multiple_files_and_noise() {
        let text = "would reformat a.py\n--- a\n+++ a\n@@ -1 +1 @@\n-x\n+y\nsome text\n--- b\n+++ b\n@@ -1 +1 @@\n-p\n+q\n";
        let files = parse(text).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[1].source_file, "b");
    }

    #[test]
    fn test_hunk_without_file_header() {
        let err = parse("---/tmp/tmp.py\n+++/tmp/tmp.py\n@@ -1,7 +1,8 @@\ninvalid\n").unwrap_err();
        assert!(matches!(err, DiffParseError::UnexpectedHunk { line: 3, .. }));
    }

    #[test]
    fn test_target_without_source() {
        let err = parse("+++ a\n").unwrap_err();
        assert!(matches!(err, DiffParseError::UnexpectedTargetHeader { line: 1, .. }));
    }

    #[test]
    fn test_invalid_body_line() {
        let err = parse("--- a\n+++ a\n@@ -1,2 +1,2 @@\n a\ninvalid\n").unwrap_err();
        assert!(matches!(err, DiffParseError::ExpectedHunkLine { line: 5, .. }));
    }

    #[test]
    fn test_hunk_too_short() {
        let err = parse("--- a\n+++ a\n@@ -1,3 +1,3 @@\n a\n").unwrap_err();
        assert_eq!(err, DiffParseError::HunkTooShort);
    }

    #[test]
    fn test_hunk_too_long() {
        let err = parse("--- a\n+++ a\n@@ -1,2 +1,1 @@\n a\n a\n").unwrap_err();
        assert!(matches!(err, DiffParseError::HunkTooLong { line: 5 }));
    }

    #[test]
    fn test_hunk_range_overflow() {
        let err = parse("--- /a.py\n+++ /a.py\n@@ -4294967295,1 +1,1 @@\n x\n").unwrap_err();
        assert_eq!(err, DiffParseError::LineNumberOverflow { line: 3 });

        let err = parse("--- a\n+++ a\n@@ -1 +4294967294,2 @@\n+x\n").unwrap_err();
        assert_eq!(err, DiffParseError::LineNumberOverflow { line: 3 });
    }

    #[test]
    fn test_header_number_out_of_range() {
        let err = parse("--- a\n+++ a\n@@ -99999999999 +1 @@\n-x\n+y\n").unwrap_err();
        assert!(matches!(err, DiffParseError::InvalidHunkHeader { line: 3, .. }));
    }

    #[test]
    fn test_hunk_ending_at_max_line() {
        let files = parse("--- a\n+++ a\n@@ -4294967294 +4294967294 @@\n-x\n+y\n").unwrap();
        let lines = &files[0].hunks[0].lines;
        assert_eq!(lines[0].source_line_no, Some(4294967294));
        assert_eq!(lines[1].target_line_no, Some(4294967294));
    }

    #[test]
    fn test_display_round_trip() {
        let files = parse(SIMPLE).unwrap();
        assert_eq!(
            files[0].to_string(),
            "--- a.py\n+++ a.py\n@@ -1,3 +1,3 @@ def f():\n a\n-b\n+c\n d\n"
        );
    }
}
