//! flake8: style checker.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use lintwright_core::{SettingError, SettingFile, Source, parse_error_lines};
use toml::{Table, Value};

use super::{SourceCommand, insert_some, path_strings, string_array};
use crate::command::{Command, PathContext};
use crate::error::ToolError;
use crate::process;
use crate::reporter::Reporter;

const SETTING_FILE_NAME: &str = "setup.cfg";

/// True if `item` is listed in `codes`, either exactly or through its category letter.
fn contains_code(codes: &[String], item: &str) -> bool {
    let Some(category) = item.chars().next().map(|c| c.to_ascii_uppercase()) else {
        return false;
    };
    codes.iter().any(|code| {
        if code.chars().count() == 1 {
            code.to_ascii_uppercase().starts_with(category)
        } else {
            code == item
        }
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flake8Setting {
    pub max_line_length: u32,
    pub select: Option<Vec<String>>,
    pub ignore: Option<Vec<String>>,
    pub enable_extensions: Option<Vec<String>>,
    pub max_complexity: Option<u32>,
    /// Comment lines written into the section. Each starts with `#`.
    pub comments: Vec<String>,
}

impl Default for Flake8Setting {
    fn default() -> Self {
        Self {
            max_line_length: 88,
            select: Some(
                ["B", "C", "E", "F", "W", "B950"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
            ),
            ignore: None,
            enable_extensions: None,
            max_complexity: None,
            comments: Vec::new(),
        }
        .to_black_compatible()
    }
}

impl Flake8Setting {
    /// Ignores the codes black conflicts with, documenting each one.
    pub fn to_black_compatible(&self) -> Self {
        let mut new = self.clone();
        let ignore = new.ignore.get_or_insert_with(Vec::new);

        let rules = [
            ("E203", "# E203: black treats : as a binary operator"),
            ("E231", "# E231: black doesn't put a space after ,"),
            (
                "E501",
                "# E501: black may exceed the line-length to follow other style rules",
            ),
        ];
        for (code, comment) in rules {
            if !contains_code(ignore, code) {
                ignore.push(code.to_string());
                new.comments.push(comment.to_string());
            }
        }

        if !contains_code(ignore, "W503") && !contains_code(ignore, "W504") {
            ignore.push("W503".to_string());
            new.comments.push(
                "# W503 or W504: either one needs to be disabled to select W error codes"
                    .to_string(),
            );
        }
        new
    }

    pub fn export(&self) -> (Vec<String>, Table) {
        let mut entries = Table::new();
        entries.insert(
            "max-line-length".to_string(),
            Value::Integer(i64::from(self.max_line_length)),
        );
        insert_some(&mut entries, "select", self.select.clone().map(string_array));
        insert_some(&mut entries, "ignore", self.ignore.clone().map(string_array));
        insert_some(
            &mut entries,
            "enable-extensions",
            self.enable_extensions.clone().map(string_array),
        );
        insert_some(
            &mut entries,
            "max-complexity",
            self.max_complexity.map(|c| Value::Integer(i64::from(c))),
        );
        for comment in &self.comments {
            entries.insert(comment.clone(), Value::String(String::new()));
        }
        (vec!["flake8".to_string()], entries)
    }
}

#[derive(Debug, Clone)]
pub struct Flake8 {
    pub name: String,
    pub setting: Flake8Setting,
    pub source: Source,
}

impl Flake8 {
    pub fn new(setting: Flake8Setting, source: Source) -> Self {
        Self {
            name: "flake8".to_string(),
            setting,
            source,
        }
    }

    pub fn targets(&self) -> &'static [&'static str] {
        &["lint"]
    }

    pub fn export_settings(
        &self,
        files: &mut BTreeMap<String, SettingFile>,
    ) -> Result<(), SettingError> {
        let (section, entries) = self.setting.export();
        files
            .entry(SETTING_FILE_NAME.to_string())
            .or_default()
            .set_section(section, entries)
    }

    pub fn create_command(&self, target: &str, paths: &PathContext) -> Option<Box<dyn Command>> {
        if target != "lint" {
            return None;
        }
        let setting_path = paths.setting_path(SETTING_FILE_NAME);
        Some(Box::new(SourceCommand::new(
            &self.name,
            paths,
            &self.source,
            false,
            move |reporter: &Reporter, base_dir: &Path, files: &[PathBuf]| {
                run(reporter, base_dir, &setting_path, files)
            },
        )))
    }
}

/// Runs flake8 on `files` and reports its output lines as diagnostics.
pub fn run(
    reporter: &Reporter,
    base_dir: &Path,
    setting_path: &Path,
    files: &[PathBuf],
) -> Result<i32, ToolError> {
    process::check_command_installed("flake8", &["--version"])?;

    let mut argv = vec![
        "flake8".to_string(),
        "--config".to_string(),
        setting_path.display().to_string(),
    ];
    argv.extend(path_strings(files));

    let output = process::run(&argv, base_dir, reporter)?;
    let diagnostics = parse_error_lines(&output.stdout, base_dir, Some(reporter));
    reporter.report_diagnostics(diagnostics);
    Ok(output.exit_code)
}
