//! Builds components from a lint configuration.

use std::collections::BTreeMap;

use lintwright_core::Source;

use crate::component::Component;
use crate::config::LintConfig;
use crate::error::ConfigError;
use crate::py_version::PythonVersion;
use crate::tools::{
    Black, BlackSetting, Flake8, Flake8Setting, Isort, IsortSectionName, IsortSetting, Mypy,
    MypyFollowImports, MypyPreset, MypySetting, Ruff, RuffSetting,
};

const DEFAULT_LINE_LENGTH: u32 = 88;

/// Per-module mypy overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MypyModuleOption {
    pub preset: Option<MypyPreset>,
    pub ignore_errors: bool,
    pub follow_imports: Option<MypyFollowImports>,
}

impl MypyModuleOption {
    pub fn new(
        preset: Option<MypyPreset>,
        ignore_errors: bool,
        follow_imports: Option<MypyFollowImports>,
    ) -> Result<Self, ConfigError> {
        if preset.is_some() && ignore_errors {
            return Err(ConfigError::invalid(
                "cannot specify both preset and ignore_errors",
            ));
        }
        Ok(Self {
            preset,
            ignore_errors,
            follow_imports,
        })
    }

    /// Option used for packages listed in `mypy_ignore_packages`.
    pub fn ignored() -> Self {
        Self {
            preset: None,
            ignore_errors: true,
            follow_imports: Some(MypyFollowImports::Skip),
        }
    }

    pub fn setting(&self) -> MypySetting {
        if self.ignore_errors {
            return MypySetting {
                ignore_errors: Some(true),
                follow_imports: self.follow_imports,
                ..MypySetting::default()
            };
        }
        MypySetting {
            follow_imports: self.follow_imports,
            ..self.preset.unwrap_or(MypyPreset::Strict).setting()
        }
    }
}

/// Creates the enabled components in run order: isort, black, flake8, mypy, ruff.
pub fn configure_lint(config: &LintConfig) -> Vec<Component> {
    let mut components = Vec::new();

    let py_version = config.py_version.unwrap_or_default();
    let line_length = config.line_length.unwrap_or(DEFAULT_LINE_LENGTH);
    let enable_black = config.enable_black.unwrap_or(false);
    let source = config
        .source
        .clone()
        .unwrap_or_else(|| Source::from_includes(["."]));

    if config.enable_isort.unwrap_or(false) {
        let mut setting = IsortSetting {
            line_length,
            default_section: Some(
                config
                    .isort_default_section
                    .unwrap_or(IsortSectionName::ThirdParty),
            ),
            known_third_party: config
                .isort_known_third_party
                .as_ref()
                .map(|names| names.iter().cloned().collect()),
            known_first_party: config
                .isort_known_first_party
                .as_ref()
                .map(|names| names.iter().cloned().collect()),
            ..IsortSetting::default()
        };
        if enable_black {
            setting = setting.to_black_compatible();
        }
        components.push(Isort::new(setting, source.clone()).into());
    }

    if enable_black {
        let setting = BlackSetting {
            line_length,
            ..BlackSetting::for_version(py_version)
        };
        components.push(Black::new(setting, source.clone()).into());
    }

    if config.enable_flake8.unwrap_or(false) {
        let mut setting = Flake8Setting {
            max_line_length: line_length,
            ..Flake8Setting::default()
        };
        if enable_black {
            setting = setting.to_black_compatible();
        }
        components.push(Flake8::new(setting, source.clone()).into());
    }

    if config.enable_mypy.unwrap_or(false) {
        let mut setting = config.mypy_preset.unwrap_or(MypyPreset::Strict).setting();
        setting.python_version = Some(py_version);
        setting.mypy_path = config.mypy_path.clone();
        setting.plugins = config.mypy_plugins.clone();

        let module_settings: BTreeMap<String, MypySetting> = config
            .mypy_modules
            .iter()
            .flatten()
            .map(|(module, option)| (module.clone(), option.setting()))
            .collect();

        components.push(
            Mypy::new(
                setting,
                module_settings,
                config.mypy_targets.clone().unwrap_or_default(),
            )
            .into(),
        );
    }

    if config.enable_ruff.unwrap_or(false) {
        let setting = RuffSetting {
            line_length,
            target_version: py_version,
            known_first_party: config
                .isort_known_first_party
                .as_ref()
                .map(|names| names.iter().cloned().collect()),
            known_third_party: config
                .isort_known_third_party
                .as_ref()
                .map(|names| names.iter().cloned().collect()),
            ..RuffSetting::default()
        };
        components.push(Ruff::new(setting, source).into());
    }

    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::MypyTarget;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn names(components: &[Component]) -> Vec<&str> {
        components.iter().map(Component::name).collect()
    }

    #[test]
    fn test_nothing_enabled() {
        assert!(configure_lint(&LintConfig::default()).is_empty());
    }

    #[test]
    fn test_order_and_black_compatibility() {
        let config = LintConfig {
            enable_black: Some(true),
            enable_flake8: Some(true),
            enable_isort: Some(true),
            enable_mypy: Some(true),
            enable_ruff: Some(true),
            line_length: Some(100),
            py_version: Some(PythonVersion::new(3, 10)),
            isort_known_first_party: Some(vec!["app".into()]),
            mypy_targets: Some(vec![MypyTarget::new(vec![PathBuf::from("/p/src")])]),
            ..LintConfig::default()
        };
        let components = configure_lint(&config);
        assert_eq!(names(&components), vec!["isort", "black", "flake8", "mypy", "ruff"]);

        let Component::Isort(isort) = &components[0] else {
            panic!("expected isort");
        };
        assert_eq!(isort.setting.line_length, 100);
        assert_eq!(isort.setting.ensure_newline_before_comments, Some(true));
        assert_eq!(isort.setting.default_section, Some(IsortSectionName::ThirdParty));

        let Component::Black(black) = &components[1] else {
            panic!("expected black");
        };
        assert_eq!(black.setting.target_version, vec![PythonVersion::new(3, 10)]);

        let Component::Mypy(mypy) = &components[3] else {
            panic!("expected mypy");
        };
        assert_eq!(mypy.setting.python_version, Some(PythonVersion::new(3, 10)));
        assert_eq!(mypy.mypy_targets.len(), 1);

        let Component::Ruff(ruff) = &components[4] else {
            panic!("expected ruff");
        };
        assert_eq!(ruff.setting.line_length, 100);
        assert!(ruff.setting.known_first_party.is_some());
    }

    #[test]
    fn test_defaults() {
        let config = LintConfig {
            enable_black: Some(true),
            enable_mypy: Some(true),
            ..LintConfig::default()
        };
        let components = configure_lint(&config);
        let Component::Black(black) = &components[0] else {
            panic!("expected black");
        };
        assert_eq!(black.setting.line_length, 88);
        assert_eq!(black.setting.target_version, vec![PythonVersion::new(3, 8)]);

        let Component::Mypy(mypy) = &components[1] else {
            panic!("expected mypy");
        };
        assert_eq!(mypy.setting.ignore_missing_imports, Some(true));
    }

    #[test]
    fn test_module_options() {
        assert!(MypyModuleOption::new(Some(MypyPreset::Entry), true, None).is_err());

        let ignored = MypyModuleOption::ignored().setting();
        assert_eq!(ignored.ignore_errors, Some(true));
        assert_eq!(ignored.follow_imports, Some(MypyFollowImports::Skip));
        assert_eq!(ignored.disallow_untyped_defs, None);

        let entry = MypyModuleOption::new(Some(MypyPreset::Entry), false, None)
            .unwrap()
            .setting();
        assert_eq!(entry, MypySetting::entry());
    }
}
