//! Loading of `[tool.lintwright]` configuration.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use lintwright_core::path::{expand_user, resolve_path};
use lintwright_core::{Source, SourceEntrySetting, resolve_inheritance};
use serde::Deserialize;
use toml::{Table, Value};
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::factory::{MypyModuleOption, configure_lint};
use crate::manifest::Manifest;
use crate::py_version::PythonVersion;
use crate::tools::{IsortSectionName, MypyFollowImports, MypyPlugin, MypyPreset, MypyTarget};

/// File names searched for, in order, in every directory.
pub const CONFIG_FILE_NAMES: &[&str] = &["lintwright.toml", "pyproject.toml"];

const TOOL_SECTION: &str = "lintwright";
const CLI_SECTION: &str = "lintwright-cli";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    version: Option<String>,
    lint: Option<RawLintConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawLintConfig {
    base: Option<String>,
    enable_black: Option<bool>,
    enable_flake8: Option<bool>,
    enable_isort: Option<bool>,
    enable_mypy: Option<bool>,
    enable_ruff: Option<bool>,
    mypy_preset: Option<String>,
    mypy_modules: Option<BTreeMap<String, RawMypyModule>>,
    source: Option<RawSource>,
    line_length: Option<u32>,
    py_version: Option<String>,
    isort_known_third_party: Option<Vec<String>>,
    isort_known_first_party: Option<Vec<String>>,
    isort_default_section: Option<String>,
    mypy_path: Option<Vec<String>>,
    mypy_plugins: Option<Vec<RawMypyPlugin>>,
    mypy_targets: Option<Vec<RawMypyTarget>>,
    mypy_ignore_packages: Option<Vec<String>>,
    mypy_target_dirs: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMypyModule {
    preset: Option<String>,
    #[serde(default)]
    ignore_errors: bool,
    follow_imports: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMypyPlugin {
    script: Option<String>,
    function: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMypyTarget {
    paths: Vec<String>,
    #[serde(default)]
    namespace_packages: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawSource {
    List(Vec<String>),
    Table(RawSourceTable),
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSourceTable {
    includes: Option<Vec<String>>,
    include_globs: Option<Vec<String>>,
    excludes: Option<Vec<String>>,
    exclude_globs: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCliConfig {
    settings_dir: Option<String>,
}

/// Lint options of one config file. `None` means unset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LintConfig {
    pub base: Option<PathBuf>,
    pub enable_black: Option<bool>,
    pub enable_flake8: Option<bool>,
    pub enable_isort: Option<bool>,
    pub enable_mypy: Option<bool>,
    pub enable_ruff: Option<bool>,
    pub mypy_preset: Option<MypyPreset>,
    pub mypy_modules: Option<BTreeMap<String, MypyModuleOption>>,
    pub source: Option<Source>,
    pub line_length: Option<u32>,
    pub py_version: Option<PythonVersion>,
    pub isort_known_third_party: Option<Vec<String>>,
    pub isort_known_first_party: Option<Vec<String>>,
    pub isort_default_section: Option<IsortSectionName>,
    pub mypy_path: Option<Vec<PathBuf>>,
    pub mypy_plugins: Option<Vec<MypyPlugin>>,
    pub mypy_targets: Option<Vec<MypyTarget>>,
}

impl LintConfig {
    /// Overwrites every field set in `rhs`, except `base`.
    pub fn update(&mut self, rhs: LintConfig) {
        fn set<T>(dst: &mut Option<T>, src: Option<T>) {
            if src.is_some() {
                *dst = src;
            }
        }

        set(&mut self.enable_black, rhs.enable_black);
        set(&mut self.enable_flake8, rhs.enable_flake8);
        set(&mut self.enable_isort, rhs.enable_isort);
        set(&mut self.enable_mypy, rhs.enable_mypy);
        set(&mut self.enable_ruff, rhs.enable_ruff);
        set(&mut self.mypy_preset, rhs.mypy_preset);
        set(&mut self.mypy_modules, rhs.mypy_modules);
        set(&mut self.source, rhs.source);
        set(&mut self.line_length, rhs.line_length);
        set(&mut self.py_version, rhs.py_version);
        set(&mut self.isort_known_third_party, rhs.isort_known_third_party);
        set(&mut self.isort_known_first_party, rhs.isort_known_first_party);
        set(&mut self.isort_default_section, rhs.isort_default_section);
        set(&mut self.mypy_path, rhs.mypy_path);
        set(&mut self.mypy_plugins, rhs.mypy_plugins);
        set(&mut self.mypy_targets, rhs.mypy_targets);
    }
}

/// A parsed `[tool.lintwright]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Absolute path of the file the section was read from.
    pub path: PathBuf,
    pub version: Option<semver::Version>,
    pub lint: Option<LintConfig>,
}

/// Options read from `[tool.lintwright-cli]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    pub settings_dir: Option<PathBuf>,
}

fn read_table(path: &Path) -> Result<Table, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

fn tool_section(document: &Table, name: &str) -> Option<Table> {
    match document.get("tool")?.get(name)? {
        Value::Table(table) => Some(table.clone()),
        _ => None,
    }
}

fn deserialize<T: for<'de> Deserialize<'de>>(path: &Path, table: Table) -> Result<T, ConfigError> {
    Value::Table(table)
        .try_into()
        .map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
}

fn expand_path(base_dir: &Path, path: &str) -> PathBuf {
    base_dir.join(expand_user(Path::new(path)))
}

fn expand_paths(base_dir: &Path, paths: &[String]) -> Vec<PathBuf> {
    paths.iter().map(|p| expand_path(base_dir, p)).collect()
}

/// Parses `1.2` or `1.2.3` style versions.
fn parse_version(value: &str) -> Result<semver::Version, ConfigError> {
    let padded = match value.split('.').count() {
        2 => format!("{}.0", value),
        _ => value.to_string(),
    };
    semver::Version::parse(&padded)
        .map_err(|e| ConfigError::invalid(format!("invalid version: {} ({})", value, e)))
}

fn check_version(path: &Path, version: Option<&semver::Version>) {
    let current = match semver::Version::parse(env!("CARGO_PKG_VERSION")) {
        Ok(current) => current,
        Err(_) => return,
    };
    match version {
        None => warn!(
            "Consider specifying 'version' under [tool.lintwright] section in your config \
             to check compliance against the version of the installed lintwright. (File: {})",
            path.display()
        ),
        Some(version) if version.major != current.major || version.minor != current.minor => {
            warn!(
                "{} specifies version {}, but the lintwright you are using is version {}, \
                 which might not be compatible.",
                path.display(),
                version,
                current
            )
        }
        Some(_) => {}
    }
}

fn parse_source(base_dir: &Path, raw: RawSource) -> Result<Source, ConfigError> {
    match raw {
        RawSource::List(includes) => Ok(Source::from_includes(expand_paths(base_dir, &includes))),
        RawSource::Table(table) => {
            let mut source = Source::from_includes(expand_paths(
                base_dir,
                table.includes.as_deref().unwrap_or_default(),
            ));
            for exclude in expand_paths(base_dir, table.excludes.as_deref().unwrap_or_default()) {
                source.add_exclude(exclude, SourceEntrySetting::literal())?;
            }
            for pattern in table.include_globs.unwrap_or_default() {
                source.add_include(pattern, SourceEntrySetting::glob().base_dir(base_dir))?;
            }
            for pattern in table.exclude_globs.unwrap_or_default() {
                source.add_exclude(pattern, SourceEntrySetting::glob().base_dir(base_dir))?;
            }
            if source.includes().is_empty() {
                source.add_include(base_dir, SourceEntrySetting::literal())?;
            }
            Ok(source)
        }
    }
}

fn parse_mypy_modules(
    raw: BTreeMap<String, RawMypyModule>,
) -> Result<BTreeMap<String, MypyModuleOption>, ConfigError> {
    raw.into_iter()
        .map(|(module, option)| -> Result<_, ConfigError> {
            let preset = option
                .preset
                .as_deref()
                .map(str::parse::<MypyPreset>)
                .transpose()?;
            let follow_imports = option
                .follow_imports
                .as_deref()
                .map(str::parse::<MypyFollowImports>)
                .transpose()?;
            let option = MypyModuleOption::new(preset, option.ignore_errors, follow_imports)?;
            Ok((module, option))
        })
        .collect()
}

fn parse_mypy_plugin(base_dir: &Path, raw: RawMypyPlugin) -> Result<MypyPlugin, ConfigError> {
    match (raw.script, raw.function) {
        (Some(script), None) => Ok(MypyPlugin::Script(expand_path(base_dir, &script))),
        (None, Some(function)) => Ok(MypyPlugin::Function(function)),
        (None, None) => Err(ConfigError::invalid(
            "must specify either function or script for mypy plugin",
        )),
        (Some(_), Some(_)) => Err(ConfigError::invalid(
            "only one of function or script must be specified for mypy plugin",
        )),
    }
}

fn parse_mypy_target(base_dir: &Path, raw: RawMypyTarget) -> Result<MypyTarget, ConfigError> {
    if raw.paths.is_empty() {
        return Err(ConfigError::invalid(
            "invalid mypy_target: each target must have one or more paths",
        ));
    }
    Ok(MypyTarget {
        paths: expand_paths(base_dir, &raw.paths),
        namespace_packages: raw.namespace_packages,
    })
}

fn parse_lint(path: &Path, base_dir: &Path, raw: RawLintConfig) -> Result<LintConfig, ConfigError> {
    let mut mypy_modules = raw.mypy_modules.map(parse_mypy_modules).transpose()?;

    if let Some(packages) = raw.mypy_ignore_packages {
        let modules = mypy_modules.get_or_insert_with(BTreeMap::new);
        for package in packages {
            if modules.contains_key(&package) {
                return Err(ConfigError::invalid(format!(
                    "{} is configured in both mypy_ignore_packages and mypy_modules",
                    package
                )));
            }
            modules.insert(package, MypyModuleOption::ignored());
        }
    }

    let mut mypy_targets = raw
        .mypy_targets
        .map(|targets| {
            targets
                .into_iter()
                .map(|t| parse_mypy_target(base_dir, t))
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?;

    if let Some(dirs) = raw.mypy_target_dirs {
        warn!(
            "tool.lintwright.lint.mypy_target_dirs is deprecated. Use tool.lintwright.lint.mypy_targets instead (File: {})",
            path.display()
        );
        mypy_targets = Some(vec![MypyTarget::new(expand_paths(base_dir, &dirs))]);
    }

    Ok(LintConfig {
        base: raw.base.map(|b| expand_path(base_dir, &b)),
        enable_black: raw.enable_black,
        enable_flake8: raw.enable_flake8,
        enable_isort: raw.enable_isort,
        enable_mypy: raw.enable_mypy,
        enable_ruff: raw.enable_ruff,
        mypy_preset: raw.mypy_preset.as_deref().map(str::parse).transpose()?,
        mypy_modules,
        source: raw.source.map(|s| parse_source(base_dir, s)).transpose()?,
        line_length: raw.line_length,
        py_version: raw.py_version.as_deref().map(str::parse).transpose()?,
        isort_known_third_party: raw.isort_known_third_party,
        isort_known_first_party: raw.isort_known_first_party,
        isort_default_section: raw
            .isort_default_section
            .as_deref()
            .map(str::parse)
            .transpose()?,
        mypy_path: raw.mypy_path.map(|paths| expand_paths(base_dir, &paths)),
        mypy_plugins: raw
            .mypy_plugins
            .map(|plugins| {
                plugins
                    .into_iter()
                    .map(|p| parse_mypy_plugin(base_dir, p))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?,
        mypy_targets,
    })
}

/// Parses the `[tool.lintwright]` section of `path`.
///
/// Relative paths inside the section are taken from the file's directory.
pub fn parse(path: &Path) -> Result<Config, ConfigError> {
    let path = path
        .canonicalize()
        .map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let base_dir = path.parent().unwrap_or(Path::new("/")).to_path_buf();

    let document = read_table(&path)?;
    let section = tool_section(&document, TOOL_SECTION)
        .ok_or_else(|| ConfigError::SectionNotFound(path.clone()))?;
    let raw: RawConfig = deserialize(&path, section)?;

    let version = raw.version.as_deref().map(parse_version).transpose()?;
    check_version(&path, version.as_ref());

    let lint = raw
        .lint
        .map(|lint| parse_lint(&path, &base_dir, lint))
        .transpose()?;
    Ok(Config {
        path,
        version,
        lint,
    })
}

/// Reads `[tool.lintwright-cli]` from `path`, if present.
pub fn parse_cli_config(path: &Path) -> Result<Option<CliConfig>, ConfigError> {
    let document = read_table(path)?;
    let Some(section) = tool_section(&document, CLI_SECTION) else {
        return Ok(None);
    };
    let raw: RawCliConfig = deserialize(path, section)?;
    let base_dir = resolve_path(path.parent().unwrap_or(Path::new(".")), Path::new(""));
    Ok(Some(CliConfig {
        settings_dir: raw.settings_dir.map(|dir| expand_path(&base_dir, &dir)),
    }))
}

fn has_tool_section(path: &Path) -> bool {
    match read_table(path) {
        Ok(document) => tool_section(&document, TOOL_SECTION).is_some(),
        Err(e) => {
            debug!("Skipping {}: {}", path.display(), e);
            false
        }
    }
}

/// Searches `start` and its ancestors for a file with a `[tool.lintwright]` section.
pub fn find_config_recursive(start: &Path) -> Option<PathBuf> {
    let start = resolve_path(start, Path::new(""));
    for dir in start.ancestors() {
        for name in CONFIG_FILE_NAMES {
            let path = dir.join(name);
            if !path.is_file() {
                continue;
            }
            if has_tool_section(&path) {
                debug!("Found config file: {}", path.display());
                return Some(path);
            }
            debug!("Found a file, but [tool.lintwright] doesn't exist: {}", path.display());
        }
    }
    None
}

/// Returns `explicit` when given, otherwise searches from `start`.
pub fn find_config(explicit: Option<&Path>, start: &Path) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        let path = resolve_path(start, path);
        if !path.exists() {
            return Err(ConfigError::NotFound(format!(
                "File not found: {}",
                path.display()
            )));
        }
        if !path.is_file() {
            return Err(ConfigError::NotFound(format!(
                "{} is not a file",
                path.display()
            )));
        }
        return Ok(path);
    }

    find_config_recursive(start).ok_or_else(|| {
        ConfigError::NotFound(
            "Could not find a lintwright.toml or pyproject.toml file containing a \
             [tool.lintwright] section in this or any of its parent directories.\n\
             The `--loglevel debug` option may help."
                .to_string(),
        )
    })
}

/// Merges `config` over the chain of configs named by `base`.
pub fn resolve_lint_config_inheritance(config: LintConfig) -> Result<LintConfig, ConfigError> {
    let Some(base_path) = config.base.clone() else {
        return Ok(config);
    };

    let mut base = resolve_inheritance(
        &base_path,
        parse,
        |path: &Path, root: Config| {
            root.lint
                .ok_or_else(|| ConfigError::LintSectionNotFound(path.to_path_buf()))
        },
        |lint: &LintConfig| lint.base.clone(),
        |mut lhs: LintConfig, rhs: LintConfig| {
            lhs.update(rhs);
            lhs
        },
    )?;
    base.update(config);
    Ok(base)
}

/// Loads the manifest described by the config file at `path`.
pub fn load_manifest(path: &Path) -> Result<Manifest, ConfigError> {
    let config = parse(path)?;
    let components = match config.lint {
        Some(lint) => configure_lint(&resolve_lint_config_inheritance(lint)?),
        None => Vec::new(),
    };
    Ok(Manifest::new(components)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lintwright_core::{InheritanceError, SourceKey};
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    fn root(temp: &TempDir) -> PathBuf {
        temp.path().canonicalize().unwrap()
    }

    #[test]
    fn test_parse_full_lint_section() {
        let temp = TempDir::new().unwrap();
        let dir = root(&temp);
        let path = write(
            &dir,
            "pyproject.toml",
            r#"
[tool.black]
line-length = 1

[tool.lintwright]
version = "0.1"

[tool.lintwright.lint]
enable_black = true
enable_mypy = true
mypy_preset = "entry"
line_length = 100
py_version = "py39"
isort_default_section = "firstparty"
mypy_path = ["stubs"]
mypy_plugins = [{ function = "pydantic.mypy" }, { script = "tools/plugin.py" }]
mypy_targets = [{ paths = ["src"], namespace_packages = true }]
mypy_ignore_packages = ["vendor.*"]

[tool.lintwright.lint.mypy_modules."tests.*"]
preset = "very_strict"
follow_imports = "silent"
"#,
        );

        let config = parse(&path).unwrap();
        assert_eq!(config.path, path);
        assert_eq!(config.version, Some(semver::Version::new(0, 1, 0)));

        let lint = config.lint.unwrap();
        assert_eq!(lint.enable_black, Some(true));
        assert_eq!(lint.enable_flake8, None);
        assert_eq!(lint.mypy_preset, Some(MypyPreset::Entry));
        assert_eq!(lint.line_length, Some(100));
        assert_eq!(lint.py_version, Some(PythonVersion::new(3, 9)));
        assert_eq!(lint.isort_default_section, Some(IsortSectionName::FirstParty));
        assert_eq!(lint.mypy_path, Some(vec![dir.join("stubs")]));
        assert_eq!(
            lint.mypy_plugins,
            Some(vec![
                MypyPlugin::Function("pydantic.mypy".to_string()),
                MypyPlugin::Script(dir.join("tools/plugin.py")),
            ])
        );
        assert_eq!(
            lint.mypy_targets,
            Some(vec![MypyTarget {
                paths: vec![dir.join("src")],
                namespace_packages: true,
            }])
        );

        let modules = lint.mypy_modules.unwrap();
        assert_eq!(modules["vendor.*"], MypyModuleOption::ignored());
        assert_eq!(modules["tests.*"].preset, Some(MypyPreset::VeryStrict));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = write(
            temp.path(),
            "pyproject.toml",
            "[tool.lintwright.lint]\nenable_blak = true\n",
        );
        assert!(matches!(parse(&path), Err(ConfigError::Toml { .. })));
    }

    #[test]
    fn test_missing_section() {
        let temp = TempDir::new().unwrap();
        let path = write(temp.path(), "pyproject.toml", "[tool.black]\n");
        assert!(matches!(parse(&path), Err(ConfigError::SectionNotFound(_))));
    }

    #[test]
    fn test_ignore_packages_conflict() {
        let temp = TempDir::new().unwrap();
        let path = write(
            temp.path(),
            "pyproject.toml",
            r#"
[tool.lintwright.lint]
mypy_ignore_packages = ["a"]

[tool.lintwright.lint.mypy_modules.a]
ignore_errors = true
"#,
        );
        assert!(matches!(parse(&path), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_module_preset_and_ignore_errors_conflict() {
        let temp = TempDir::new().unwrap();
        let path = write(
            temp.path(),
            "pyproject.toml",
            r#"
[tool.lintwright.lint.mypy_modules.a]
preset = "strict"
ignore_errors = true
"#,
        );
        assert!(matches!(parse(&path), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_deprecated_target_dirs() {
        let temp = TempDir::new().unwrap();
        let dir = root(&temp);
        let path = write(
            &dir,
            "pyproject.toml",
            "[tool.lintwright.lint]\nmypy_target_dirs = [\"src\", \"tests\"]\n",
        );
        let lint = parse(&path).unwrap().lint.unwrap();
        assert_eq!(
            lint.mypy_targets,
            Some(vec![MypyTarget::new(vec![dir.join("src"), dir.join("tests")])])
        );
    }

    #[test]
    fn test_source_forms() {
        let temp = TempDir::new().unwrap();
        let dir = root(&temp);

        let list = write(
            &dir,
            "a/pyproject.toml",
            "[tool.lintwright.lint]\nsource = [\"src\"]\n",
        );
        let source = parse(&list).unwrap().lint.unwrap().source.unwrap();
        assert_eq!(
            source.includes(),
            &[(
                SourceKey::Path(dir.join("a/src")),
                SourceEntrySetting::literal()
            )]
        );

        let table = write(
            &dir,
            "b/pyproject.toml",
            r#"
[tool.lintwright.lint.source]
exclude_globs = ["**/gen_*.py"]
"#,
        );
        let source = parse(&table).unwrap().lint.unwrap().source.unwrap();
        assert_eq!(
            source.includes(),
            &[(SourceKey::Path(dir.join("b")), SourceEntrySetting::literal())]
        );
        assert_eq!(
            source.excludes(),
            &[(
                SourceKey::Pattern("**/gen_*.py".to_string()),
                SourceEntrySetting::glob().base_dir(dir.join("b"))
            )]
        );
    }

    #[test]
    fn test_find_config_prefers_lintwright_toml_and_walks_up() {
        let temp = TempDir::new().unwrap();
        let dir = root(&temp);
        write(&dir, "pyproject.toml", "[tool.lintwright]\n");
        let nested = dir.join("pkg/sub");
        fs::create_dir_all(&nested).unwrap();
        write(&dir, "pkg/pyproject.toml", "[tool.black]\n");

        assert_eq!(find_config(None, &nested).unwrap(), dir.join("pyproject.toml"));

        write(&dir, "lintwright.toml", "[tool.lintwright]\n");
        assert_eq!(find_config_recursive(&nested), Some(dir.join("lintwright.toml")));
    }

    #[test]
    fn test_find_config_explicit() {
        let temp = TempDir::new().unwrap();
        let dir = root(&temp);
        assert!(matches!(
            find_config(Some(Path::new("missing.toml")), &dir),
            Err(ConfigError::NotFound(_))
        ));
        assert!(matches!(
            find_config(Some(Path::new(".")), &dir),
            Err(ConfigError::NotFound(_))
        ));
        let path = write(&dir, "custom.toml", "");
        assert_eq!(find_config(Some(Path::new("custom.toml")), &dir).unwrap(), path);
    }

    #[test]
    fn test_inheritance_chain() {
        let temp = TempDir::new().unwrap();
        let dir = root(&temp);
        write(
            &dir,
            "base/pyproject.toml",
            "[tool.lintwright.lint]\nenable_black = true\nline_length = 80\npy_version = \"py37\"\n",
        );
        write(
            &dir,
            "mid/pyproject.toml",
            "[tool.lintwright.lint]\nbase = \"../base/pyproject.toml\"\nline_length = 90\n",
        );
        let leaf = write(
            &dir,
            "pyproject.toml",
            "[tool.lintwright.lint]\nbase = \"mid/pyproject.toml\"\nenable_flake8 = true\n",
        );

        let lint = parse(&leaf).unwrap().lint.unwrap();
        let resolved = resolve_lint_config_inheritance(lint).unwrap();
        assert_eq!(resolved.enable_black, Some(true));
        assert_eq!(resolved.enable_flake8, Some(true));
        assert_eq!(resolved.line_length, Some(90));
        assert_eq!(resolved.py_version, Some(PythonVersion::new(3, 7)));
    }

    #[test]
    fn test_inheritance_cycle() {
        let temp = TempDir::new().unwrap();
        let dir = root(&temp);
        write(&dir, "a.toml", "[tool.lintwright.lint]\nbase = \"b.toml\"\n");
        write(&dir, "b.toml", "[tool.lintwright.lint]\nbase = \"a.toml\"\n");

        let lint = parse(&dir.join("a.toml")).unwrap().lint.unwrap();
        assert!(matches!(
            resolve_lint_config_inheritance(lint),
            Err(ConfigError::Inheritance(InheritanceError::Circular(_)))
        ));
    }

    #[test]
    fn test_base_without_lint_section() {
        let temp = TempDir::new().unwrap();
        let dir = root(&temp);
        write(&dir, "base.toml", "[tool.lintwright]\n");
        let leaf = write(&dir, "leaf.toml", "[tool.lintwright.lint]\nbase = \"base.toml\"\n");

        let lint = parse(&leaf).unwrap().lint.unwrap();
        assert!(matches!(
            resolve_lint_config_inheritance(lint),
            Err(ConfigError::Inheritance(InheritanceError::Load { .. }))
        ));
    }

    #[test]
    fn test_cli_config() {
        let temp = TempDir::new().unwrap();
        let dir = root(&temp);
        let path = write(
            &dir,
            "pyproject.toml",
            "[tool.lintwright-cli]\nsettings_dir = \".lintwright\"\n",
        );
        assert_eq!(
            parse_cli_config(&path).unwrap(),
            Some(CliConfig {
                settings_dir: Some(dir.join(".lintwright")),
            })
        );

        let other = write(&dir, "other.toml", "[tool.lintwright]\n");
        assert_eq!(parse_cli_config(&other).unwrap(), None);
    }

    #[test]
    fn test_load_manifest() {
        let temp = TempDir::new().unwrap();
        let path = write(
            temp.path(),
            "pyproject.toml",
            "[tool.lintwright.lint]\nenable_black = true\nenable_isort = true\n",
        );
        let manifest = load_manifest(&path).unwrap();
        let names: Vec<&str> = manifest.components().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["isort", "black"]);
    }
}
