//! isort: import sorter.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use lintwright_core::{SettingError, SettingFile, Source, UnexpectedErrorFormat, parse_error_diffs};
use toml::{Table, Value};

use super::{SourceCommand, header_path, insert_some, path_strings, string_array};
use crate::command::{Command, PathContext};
use crate::error::{ConfigError, ToolError};
use crate::process;
use crate::reporter::Reporter;

const SETTING_FILE_NAME: &str = "pyproject.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IsortSectionName {
    Future,
    Stdlib,
    ThirdParty,
    FirstParty,
    LocalFolder,
}

impl IsortSectionName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Future => "FUTURE",
            Self::Stdlib => "STDLIB",
            Self::ThirdParty => "THIRDPARTY",
            Self::FirstParty => "FIRSTPARTY",
            Self::LocalFolder => "LOCALFOLDER",
        }
    }
}

impl fmt::Display for IsortSectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IsortSectionName {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "FUTURE" => Ok(Self::Future),
            "STDLIB" => Ok(Self::Stdlib),
            "THIRDPARTY" => Ok(Self::ThirdParty),
            "FIRSTPARTY" => Ok(Self::FirstParty),
            "LOCALFOLDER" => Ok(Self::LocalFolder),
            _ => Err(ConfigError::invalid(format!(
                "invalid default_section value: {}",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsortSetting {
    pub force_grid_wrap: u32,
    pub force_single_line: bool,
    pub include_trailing_comma: bool,
    pub known_first_party: Option<BTreeSet<String>>,
    pub known_third_party: Option<BTreeSet<String>>,
    pub line_length: u32,
    pub multi_line_output: u32,
    pub default_section: Option<IsortSectionName>,
    pub sections: Option<Vec<IsortSectionName>>,
    pub use_parentheses: bool,
    pub ensure_newline_before_comments: Option<bool>,
}

impl Default for IsortSetting {
    fn default() -> Self {
        Self {
            force_grid_wrap: 0,
            force_single_line: false,
            include_trailing_comma: true,
            known_first_party: None,
            known_third_party: None,
            line_length: 88,
            multi_line_output: 3,
            default_section: None,
            sections: None,
            use_parentheses: true,
            ensure_newline_before_comments: None,
        }
    }
}

impl IsortSetting {
    /// Adjusts wrapping so that isort and black agree on import layout.
    pub fn to_black_compatible(&self) -> Self {
        Self {
            multi_line_output: 3,
            include_trailing_comma: true,
            force_grid_wrap: 0,
            use_parentheses: true,
            ensure_newline_before_comments: Some(true),
            ..self.clone()
        }
    }

    pub fn export(&self) -> (Vec<String>, Table) {
        let mut entries = Table::new();
        entries.insert(
            "force_grid_wrap".to_string(),
            Value::Integer(i64::from(self.force_grid_wrap)),
        );
        entries.insert(
            "force_single_line".to_string(),
            Value::Boolean(self.force_single_line),
        );
        entries.insert(
            "include_trailing_comma".to_string(),
            Value::Boolean(self.include_trailing_comma),
        );
        insert_some(
            &mut entries,
            "known_first_party",
            self.known_first_party.as_ref().map(|s| string_array(s.iter().cloned())),
        );
        insert_some(
            &mut entries,
            "known_third_party",
            self.known_third_party.as_ref().map(|s| string_array(s.iter().cloned())),
        );
        entries.insert(
            "line_length".to_string(),
            Value::Integer(i64::from(self.line_length)),
        );
        entries.insert(
            "multi_line_output".to_string(),
            Value::Integer(i64::from(self.multi_line_output)),
        );
        insert_some(
            &mut entries,
            "default_section",
            self.default_section.map(|s| Value::String(s.to_string())),
        );
        insert_some(
            &mut entries,
            "sections",
            self.sections
                .as_ref()
                .map(|s| string_array(s.iter().map(IsortSectionName::to_string))),
        );
        entries.insert(
            "use_parentheses".to_string(),
            Value::Boolean(self.use_parentheses),
        );
        insert_some(
            &mut entries,
            "ensure_newline_before_comments",
            self.ensure_newline_before_comments.map(Value::Boolean),
        );
        (vec!["tool".to_string(), "isort".to_string()], entries)
    }
}

#[derive(Debug, Clone)]
pub struct Isort {
    pub name: String,
    pub setting: IsortSetting,
    pub source: Source,
}

impl Isort {
    pub fn new(setting: IsortSetting, source: Source) -> Self {
        Self {
            name: "isort".to_string(),
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

/// Strips the `:before`/`:after` suffix isort appends to diff headers.
fn parse_file_path(header: &str) -> Result<PathBuf, UnexpectedErrorFormat> {
    let path = header_path(header);
    path.strip_suffix(":before")
        .or_else(|| path.strip_suffix(":after"))
        .map(PathBuf::from)
        .ok_or_else(|| UnexpectedErrorFormat(header.to_string()))
}

/// Runs isort on `files` and reports its diff as diagnostics.
pub fn run(
    reporter: &Reporter,
    base_dir: &Path,
    setting_path: &Path,
    files: &[PathBuf],
    inplace_edit: bool,
) -> Result<i32, ToolError> {
    process::check_command_installed("isort", &["--version"])?;

    let mut argv = vec![
        "isort".to_string(),
        "--settings-path".to_string(),
        setting_path.display().to_string(),
    ];
    if !inplace_edit {
        argv.extend(["--diff".to_string(), "--check-only".to_string()]);
    }
    argv.extend(path_strings(files));

    let output = process::run(&argv, base_dir, reporter)?;
    let diagnostics = parse_error_diffs(&output.stdout, parse_file_path, Some(reporter));
    reporter.report_diagnostics(diagnostics);
    Ok(output.exit_code)
}
