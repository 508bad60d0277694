//! mypy: static type checker.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use lintwright_core::path::{is_covered, relative_path, resolve_path};
use lintwright_core::{SettingError, SettingFile, parse_error_lines};
use toml::{Table, Value};
use tracing::{error, info};

use super::{path_strings, string_array};
use crate::command::{Command, PathContext, RunOptions};
use crate::error::{ConfigError, ToolError};
use crate::process;
use crate::py_version::PythonVersion;
use crate::reporter::Reporter;

const SETTING_FILE_NAME: &str = "setup.cfg";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MypyFollowImports {
    Normal,
    Silent,
    Skip,
    Error,
}

impl MypyFollowImports {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Silent => "silent",
            Self::Skip => "skip",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for MypyFollowImports {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MypyFollowImports {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "silent" => Ok(Self::Silent),
            "skip" => Ok(Self::Skip),
            "error" => Ok(Self::Error),
            _ => Err(ConfigError::invalid(format!(
                "invalid follow_imports value: {}",
                s
            ))),
        }
    }
}

/// Strictness presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MypyPreset {
    VeryStrict,
    Strict,
    Entry,
}

impl MypyPreset {
    pub fn setting(&self) -> MypySetting {
        match self {
            Self::VeryStrict => MypySetting::very_strict(),
            Self::Strict => MypySetting::strict(),
            Self::Entry => MypySetting::entry(),
        }
    }
}

impl FromStr for MypyPreset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "very_strict" => Ok(Self::VeryStrict),
            "strict" => Ok(Self::Strict),
            "entry" => Ok(Self::Entry),
            _ => Err(ConfigError::invalid(format!("invalid mypy_preset value: {}", s))),
        }
    }
}

/// A mypy plugin given either as a script path or as an importable name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MypyPlugin {
    Script(PathBuf),
    Function(String),
}

impl MypyPlugin {
    fn as_config(&self, base_dir: &Path) -> String {
        match self {
            Self::Function(function) => function.clone(),
            Self::Script(script) => relative_path(script, base_dir).display().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MypySetting {
    pub python_version: Option<PythonVersion>,

    pub check_untyped_defs: Option<bool>,
    pub disallow_any_decorated: Option<bool>,
    pub disallow_any_generics: Option<bool>,
    pub disallow_any_unimported: Option<bool>,
    pub disallow_incomplete_defs: Option<bool>,
    pub disallow_subclassing_any: Option<bool>,
    pub disallow_untyped_calls: Option<bool>,
    pub disallow_untyped_decorators: Option<bool>,
    pub disallow_untyped_defs: Option<bool>,
    pub follow_imports: Option<MypyFollowImports>,
    pub ignore_errors: Option<bool>,
    pub ignore_missing_imports: Option<bool>,
    pub mypy_path: Option<Vec<PathBuf>>,
    pub no_implicit_optional: Option<bool>,
    pub pretty: Option<bool>,
    pub show_error_codes: Option<bool>,
    pub strict_equality: Option<bool>,
    pub strict_optional: Option<bool>,
    pub warn_redundant_casts: Option<bool>,
    pub warn_return_any: Option<bool>,
    pub warn_unreachable: Option<bool>,
    pub warn_unused_configs: Option<bool>,
    pub warn_unused_ignores: Option<bool>,
    pub plugins: Option<Vec<MypyPlugin>>,
}

impl MypySetting {
    pub fn very_strict() -> Self {
        Self {
            check_untyped_defs: Some(true),
            disallow_any_decorated: Some(true),
            disallow_any_generics: Some(true),
            disallow_any_unimported: Some(true),
            disallow_incomplete_defs: Some(true),
            disallow_subclassing_any: Some(true),
            disallow_untyped_calls: Some(true),
            disallow_untyped_decorators: Some(true),
            disallow_untyped_defs: Some(true),
            ignore_errors: Some(false),
            ignore_missing_imports: Some(false),
            no_implicit_optional: Some(true),
            show_error_codes: Some(true),
            strict_equality: Some(true),
            strict_optional: Some(true),
            warn_redundant_casts: Some(true),
            warn_return_any: Some(true),
            warn_unreachable: Some(true),
            warn_unused_configs: Some(true),
            warn_unused_ignores: Some(true),
            ..Self::default()
        }
    }

    pub fn strict() -> Self {
        Self {
            disallow_any_decorated: Some(false),
            disallow_any_unimported: Some(false),
            disallow_untyped_decorators: Some(false),
            ignore_missing_imports: Some(true),
            ..Self::very_strict()
        }
    }

    pub fn entry() -> Self {
        Self {
            disallow_untyped_calls: Some(false),
            disallow_untyped_defs: Some(false),
            warn_return_any: Some(false),
            ..Self::strict()
        }
    }

    fn flags(&self) -> [(&'static str, Option<bool>); 21] {
        [
            ("check_untyped_defs", self.check_untyped_defs),
            ("disallow_any_decorated", self.disallow_any_decorated),
            ("disallow_any_generics", self.disallow_any_generics),
            ("disallow_any_unimported", self.disallow_any_unimported),
            ("disallow_incomplete_defs", self.disallow_incomplete_defs),
            ("disallow_subclassing_any", self.disallow_subclassing_any),
            ("disallow_untyped_calls", self.disallow_untyped_calls),
            ("disallow_untyped_decorators", self.disallow_untyped_decorators),
            ("disallow_untyped_defs", self.disallow_untyped_defs),
            ("ignore_errors", self.ignore_errors),
            ("ignore_missing_imports", self.ignore_missing_imports),
            ("no_implicit_optional", self.no_implicit_optional),
            ("pretty", self.pretty),
            ("show_error_codes", self.show_error_codes),
            ("strict_equality", self.strict_equality),
            ("strict_optional", self.strict_optional),
            ("warn_redundant_casts", self.warn_redundant_casts),
            ("warn_return_any", self.warn_return_any),
            ("warn_unreachable", self.warn_unreachable),
            ("warn_unused_configs", self.warn_unused_configs),
            ("warn_unused_ignores", self.warn_unused_ignores),
        ]
    }

    /// Exports the `[mypy]` section, or `[mypy-<module>]` for a module.
    ///
    /// Paths are written relative to `base_dir`.
    pub fn export(&self, base_dir: &Path, target_module: Option<&str>) -> (Vec<String>, Table) {
        let section = match target_module {
            Some(module) => format!("mypy-{}", module),
            None => "mypy".to_string(),
        };

        let mut entries = Table::new();
        for (key, value) in self.flags() {
            if let Some(value) = value {
                entries.insert(key.to_string(), Value::Boolean(value));
            }
        }
        if let Some(version) = &self.python_version {
            entries.insert("python_version".to_string(), Value::String(version.version()));
        }
        if let Some(mypy_path) = &self.mypy_path {
            entries.insert(
                "mypy_path".to_string(),
                string_array(
                    mypy_path
                        .iter()
                        .map(|p| relative_path(p, base_dir).display().to_string()),
                ),
            );
        }
        if let Some(plugins) = &self.plugins {
            entries.insert(
                "plugins".to_string(),
                string_array(plugins.iter().map(|p| p.as_config(base_dir))),
            );
        }
        if let Some(follow_imports) = self.follow_imports {
            entries.insert(
                "follow_imports".to_string(),
                Value::String(follow_imports.to_string()),
            );
        }
        (vec![section], entries)
    }
}

/// Keeps the entries that are new or differ from `base`.
fn differences_from_base(entries: Table, base: &Table) -> Table {
    entries
        .into_iter()
        .filter(|(key, value)| base.get(key) != Some(value))
        .collect()
}

/// One mypy invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MypyTarget {
    pub paths: Vec<PathBuf>,
    pub namespace_packages: bool,
}

impl MypyTarget {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            namespace_packages: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Mypy {
    pub name: String,
    pub setting: MypySetting,
    pub module_settings: BTreeMap<String, MypySetting>,
    pub mypy_targets: Vec<MypyTarget>,
}

impl Mypy {
    pub fn new(
        setting: MypySetting,
        module_settings: BTreeMap<String, MypySetting>,
        mypy_targets: Vec<MypyTarget>,
    ) -> Self {
        Self {
            name: "mypy".to_string(),
            setting,
            module_settings,
            mypy_targets,
        }
    }

    pub fn targets(&self) -> &'static [&'static str] {
        &["lint"]
    }

    pub fn export_settings(
        &self,
        paths: &PathContext,
        files: &mut BTreeMap<String, SettingFile>,
    ) -> Result<(), SettingError> {
        let file = files.entry(SETTING_FILE_NAME.to_string()).or_default();
        let (section, global) = self.setting.export(&paths.base_dir, None);
        file.set_section(section, global.clone())?;

        for (module, setting) in &self.module_settings {
            let (section, entries) = setting.export(&paths.base_dir, Some(module));
            file.set_section(section, differences_from_base(entries, &global))?;
        }
        Ok(())
    }

    pub fn create_command(
        &self,
        target: &str,
        paths: &PathContext,
        options: &RunOptions,
    ) -> Option<Box<dyn Command>> {
        if target != "lint" {
            return None;
        }
        Some(Box::new(MypyCommand {
            name: self.name.clone(),
            base_dir: paths.base_dir.clone(),
            setting_path: paths.setting_path(SETTING_FILE_NAME),
            targets: self.mypy_targets.clone(),
            require_diagnostics: options.require_diagnostics,
        }))
    }
}

pub struct MypyCommand {
    name: String,
    base_dir: PathBuf,
    setting_path: PathBuf,
    targets: Vec<MypyTarget>,
    require_diagnostics: bool,
}

impl Command for MypyCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn has_side_effects(&self) -> bool {
        false
    }

    fn run(&self, reporter: &Reporter) -> Result<i32, ToolError> {
        if self.targets.is_empty() {
            error!(
                "[{}] No mypy targets specified. You must specify at least one entry in `tool.lintwright.lint.mypy_targets`.",
                self.name
            );
            return Ok(2);
        }

        let total = self.targets.len();
        let mut exit_code = 0;
        for (index, target) in self.targets.iter().enumerate() {
            info!(
                "[{}] [{}/{}] Checking {} entries",
                self.name,
                index + 1,
                total,
                target.paths.len()
            );
            let code = run(
                reporter,
                &self.base_dir,
                &self.setting_path,
                target,
                self.require_diagnostics,
            )?;
            if code != 0 {
                exit_code = code;
            }
        }
        Ok(exit_code)
    }

    fn run_files(&self, reporter: &Reporter, files: &[PathBuf]) -> Result<i32, ToolError> {
        let sources: BTreeSet<PathBuf> = self
            .targets
            .iter()
            .flat_map(|t| t.paths.iter().map(|p| resolve_path(&self.base_dir, p)))
            .collect();

        let mut covered = Vec::new();
        for file in files {
            let resolved = resolve_path(&self.base_dir, file);
            if is_covered(&resolved, &sources) {
                covered.push(resolved);
            } else {
                info!("Skipping {} for {}", file.display(), self.name);
            }
        }
        if covered.is_empty() {
            return Ok(0);
        }

        let target = MypyTarget {
            paths: covered,
            namespace_packages: self.targets.iter().any(|t| t.namespace_packages),
        };
        run(
            reporter,
            &self.base_dir,
            &self.setting_path,
            &target,
            self.require_diagnostics,
        )
    }
}

fn build_argv(
    base_dir: &Path,
    setting_path: &Path,
    target: &MypyTarget,
    require_diagnostics: bool,
) -> Vec<String> {
    let mut argv: Vec<String> = vec!["mypy".into(), "--show-absolute-path".into()];
    if require_diagnostics {
        argv.extend([
            "--no-color-output".into(),
            "--show-column-numbers".into(),
            "--no-error-summary".into(),
        ]);
    } else {
        argv.push("--pretty".into());
    }
    if target.namespace_packages {
        argv.push("--namespace-packages".into());
    }
    argv.extend(["--config-file".into(), setting_path.display().to_string()]);
    let paths: Vec<PathBuf> = target
        .paths
        .iter()
        .map(|p| resolve_path(base_dir, p))
        .collect();
    argv.extend(path_strings(&paths));
    argv
}

/// Runs mypy for one target.
pub fn run(
    reporter: &Reporter,
    base_dir: &Path,
    setting_path: &Path,
    target: &MypyTarget,
    require_diagnostics: bool,
) -> Result<i32, ToolError> {
    process::check_command_installed("mypy", &["--version"])?;
    if target.paths.is_empty() {
        return Ok(0);
    }

    let argv = build_argv(base_dir, setting_path, target, require_diagnostics);
    let output = process::run(&argv, base_dir, reporter)?;
    if require_diagnostics {
        let diagnostics = parse_error_lines(&output.stdout, base_dir, Some(reporter));
        reporter.report_diagnostics(diagnostics);
    }
    Ok(output.exit_code)
}
