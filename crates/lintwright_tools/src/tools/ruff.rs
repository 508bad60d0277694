//! ruff: linter and formatter.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use lintwright_core::{
    SettingError, SettingFile, Source, UnexpectedErrorFormat, parse_error_diffs, parse_error_lines,
};
use toml::{Table, Value};

use super::{SourceCommand, header_path, path_strings, string_array};
use crate::command::{Command, PathContext};
use crate::error::ToolError;
use crate::process;
use crate::py_version::PythonVersion;
use crate::reporter::Reporter;

const SETTING_FILE_NAME: &str = "pyproject.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuffSetting {
    pub line_length: u32,
    pub target_version: PythonVersion,
    pub select: Option<Vec<String>>,
    pub ignore: Option<Vec<String>>,
    pub known_first_party: Option<BTreeSet<String>>,
    pub known_third_party: Option<BTreeSet<String>>,
}

impl Default for RuffSetting {
    fn default() -> Self {
        Self {
            line_length: 88,
            target_version: PythonVersion::default(),
            select: None,
            ignore: None,
            known_first_party: None,
            known_third_party: None,
        }
    }
}

impl RuffSetting {
    /// Exports `[tool.ruff]`; lint options live in nested tables of the same section.
    pub fn export(&self) -> (Vec<String>, Table) {
        let mut isort = Table::new();
        if let Some(known) = &self.known_first_party {
            isort.insert("known-first-party".to_string(), string_array(known.iter().cloned()));
        }
        if let Some(known) = &self.known_third_party {
            isort.insert("known-third-party".to_string(), string_array(known.iter().cloned()));
        }

        let mut lint = Table::new();
        if let Some(select) = &self.select {
            lint.insert("select".to_string(), string_array(select.iter().cloned()));
        }
        if let Some(ignore) = &self.ignore {
            lint.insert("ignore".to_string(), string_array(ignore.iter().cloned()));
        }
        if !isort.is_empty() {
            lint.insert("isort".to_string(), Value::Table(isort));
        }

        let mut entries = Table::new();
        entries.insert(
            "line-length".to_string(),
            Value::Integer(i64::from(self.line_length)),
        );
        entries.insert(
            "target-version".to_string(),
            Value::String(self.target_version.short_representation()),
        );
        if !lint.is_empty() {
            entries.insert("lint".to_string(), Value::Table(lint));
        }
        (vec!["tool".to_string(), "ruff".to_string()], entries)
    }
}

#[derive(Debug, Clone)]
pub struct Ruff {
    pub name: String,
    pub setting: RuffSetting,
    pub source: Source,
}

impl Ruff {
    pub fn new(setting: RuffSetting, source: Source) -> Self {
        Self {
            name: "ruff".to_string(),
            setting,
            source,
        }
    }

    pub fn targets(&self) -> &'static [&'static str] {
        &["lint", "format"]
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
        let inplace_edit = match target {
            "lint" => false,
            "format" => true,
            _ => return None,
        };
        let setting_path = paths.setting_path(SETTING_FILE_NAME);
        Some(Box::new(SourceCommand::new(
            &self.name,
            paths,
            &self.source,
            inplace_edit,
            move |reporter: &Reporter, base_dir: &Path, files: &[PathBuf]| {
                run(reporter, base_dir, &setting_path, files, inplace_edit)
            },
        )))
    }
}

fn build_argvs(setting_path: &Path, files: &[PathBuf], inplace_edit: bool) -> [Vec<String>; 2] {
    let config = setting_path.display().to_string();
    let mut check: Vec<String> = vec!["ruff".into(), "check".into(), "--config".into(), config.clone()];
    let mut format: Vec<String> = vec!["ruff".into(), "format".into(), "--config".into(), config];
    if inplace_edit {
        check.push("--fix".into());
    } else {
        check.extend(["--no-fix".into(), "--output-format".into(), "concise".into()]);
        format.push("--diff".into());
    }
    check.extend(path_strings(files));
    format.extend(path_strings(files));
    [check, format]
}

/// Runs `ruff check` then `ruff format` and returns the larger exit code.
pub fn run(
    reporter: &Reporter,
    base_dir: &Path,
    setting_path: &Path,
    files: &[PathBuf],
    inplace_edit: bool,
) -> Result<i32, ToolError> {
    process::check_command_installed("ruff", &["--version"])?;

    let [check, format] = build_argvs(setting_path, files, inplace_edit);
    let check_output = process::run(&check, base_dir, reporter)?;
    let format_output = process::run(&format, base_dir, reporter)?;

    if !inplace_edit {
        let mut diagnostics = parse_error_lines(&check_output.stdout, base_dir, Some(reporter));
        diagnostics.extend(parse_error_diffs(
            &format_output.stdout,
            |header| -> Result<PathBuf, UnexpectedErrorFormat> {
                Ok(base_dir.join(header_path(header)))
            },
            Some(reporter),
        ));
        reporter.report_diagnostics(diagnostics);
    }
    Ok(check_output.exit_code.max(format_output.exit_code))
}
