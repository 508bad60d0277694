//! black: code formatter.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use lintwright_core::{SettingError, SettingFile, Source, UnexpectedErrorFormat, parse_error_diffs};
use toml::{Table, Value};

use super::{SourceCommand, header_path, path_strings, string_array};
use crate::command::{Command, PathContext};
use crate::error::ToolError;
use crate::process;
use crate::py_version::PythonVersion;
use crate::reporter::Reporter;

const SETTING_FILE_NAME: &str = "pyproject.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlackSetting {
    pub line_length: u32,
    pub target_version: Vec<PythonVersion>,
}

impl Default for BlackSetting {
    fn default() -> Self {
        Self::for_version(PythonVersion::default())
    }
}

impl BlackSetting {
    pub fn for_version(py_version: PythonVersion) -> Self {
        Self {
            line_length: 88,
            target_version: vec![py_version],
        }
    }

    pub fn export(&self) -> (Vec<String>, Table) {
        let mut entries = Table::new();
        entries.insert(
            "line-length".to_string(),
            Value::Integer(i64::from(self.line_length)),
        );
        entries.insert(
            "target-version".to_string(),
            string_array(self.target_version.iter().map(PythonVersion::short_representation)),
        );
        (vec!["tool".to_string(), "black".to_string()], entries)
    }
}

#[derive(Debug, Clone)]
pub struct Black {
    pub name: String,
    pub setting: BlackSetting,
    pub source: Source,
}

impl Black {
    pub fn new(setting: BlackSetting, source: Source) -> Self {
        Self {
            name: "black".to_string(),
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

fn parse_file_path(base_dir: &Path, header: &str) -> Result<PathBuf, UnexpectedErrorFormat> {
    Ok(base_dir.join(header_path(header)))
}

/// Runs black on `files` and reports its diff as diagnostics.
pub fn run(
    reporter: &Reporter,
    base_dir: &Path,
    setting_path: &Path,
    files: &[PathBuf],
    inplace_edit: bool,
) -> Result<i32, ToolError> {
    process::check_command_installed("black", &["--version"])?;

    let mut argv = vec![
        "black".to_string(),
        "--config".to_string(),
        setting_path.display().to_string(),
    ];
    if !inplace_edit {
        argv.extend(["--diff".to_string(), "--check".to_string()]);
    }
    argv.extend(path_strings(files));

    let output = process::run(&argv, base_dir, reporter)?;
    let diagnostics = parse_error_diffs(
        &output.stdout,
        |header| parse_file_path(base_dir, header),
        Some(reporter),
    );
    reporter.report_diagnostics(diagnostics);
    Ok(output.exit_code)
}
