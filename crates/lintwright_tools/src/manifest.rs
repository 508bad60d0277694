//! The set of components loaded from a config file.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use lintwright_core::SettingFile;
use tracing::info;

use crate::command::{Command, PathContext, RunOptions};
use crate::component::Component;
use crate::dumper;
use crate::error::RunnerError;

/// `--enable` / `--disable` component filters. At most one may be set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestOptions {
    pub enable: Option<Vec<String>>,
    pub disable: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct Manifest {
    components: Vec<Component>,
}

impl Manifest {
    pub fn new(components: Vec<Component>) -> Result<Self, RunnerError> {
        let mut seen = BTreeSet::new();
        for component in &components {
            if !seen.insert(component.name()) {
                return Err(RunnerError::DuplicatedComponentName(
                    component.name().to_string(),
                ));
            }
        }
        Ok(Self { components })
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name() == name)
    }

    fn verify_names(&self, names: &[String], option: &str) -> Result<(), RunnerError> {
        let known: BTreeSet<&str> = self.components.iter().map(Component::name).collect();
        let unknown: BTreeSet<&str> = names
            .iter()
            .map(String::as_str)
            .filter(|name| !known.contains(name))
            .collect();
        if unknown.is_empty() {
            return Ok(());
        }
        Err(RunnerError::InvalidComponentName(format!(
            "The following component(s) in option {} were not found: {}",
            option,
            unknown.into_iter().collect::<Vec<_>>().join(",")
        )))
    }

    fn filter_components(&self, options: &ManifestOptions) -> Result<Vec<&Component>, RunnerError> {
        match (&options.enable, &options.disable) {
            (Some(_), Some(_)) => Err(RunnerError::ConflictingFilters),
            (Some(enable), None) => {
                self.verify_names(enable, "--enable")?;
                Ok(self
                    .components
                    .iter()
                    .filter(|c| enable.iter().any(|name| name == c.name()))
                    .collect())
            }
            (None, Some(disable)) => {
                self.verify_names(disable, "--disable")?;
                Ok(self
                    .components
                    .iter()
                    .filter(|c| !disable.iter().any(|name| name == c.name()))
                    .collect())
            }
            (None, None) => Ok(self.components.iter().collect()),
        }
    }

    /// Target names mapped to the names of the components taking part.
    pub fn targets(
        &self,
        options: &ManifestOptions,
    ) -> Result<BTreeMap<String, Vec<String>>, RunnerError> {
        let mut targets: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for component in self.filter_components(options)? {
            for target in component.targets() {
                targets
                    .entry(target.to_string())
                    .or_default()
                    .push(component.name().to_string());
            }
        }
        Ok(targets)
    }

    /// Commands of the filtered components for `target`, in component order.
    pub fn target(
        &self,
        target: &str,
        paths: &PathContext,
        options: &RunOptions,
        manifest_options: &ManifestOptions,
    ) -> Result<Vec<Box<dyn Command>>, RunnerError> {
        Ok(self
            .filter_components(manifest_options)?
            .into_iter()
            .filter_map(|c| c.create_command(target, paths, options))
            .collect())
    }

    /// Writes the settings of every component into `paths.settings_dir`.
    ///
    /// Filters are ignored so that a partial export never drops sections
    /// from shared files.
    pub fn export_settings(&self, paths: &PathContext) -> Result<Vec<PathBuf>, RunnerError> {
        let mut files: BTreeMap<String, SettingFile> = BTreeMap::new();
        for component in &self.components {
            component.export_settings(paths, &mut files)?;
        }

        let mut written = Vec::new();
        for (file_name, setting) in &files {
            let path = dumper::dump(&paths.settings_dir, file_name, setting)?;
            info!("Exported {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{Black, BlackSetting, Flake8, Flake8Setting, Mypy, MypySetting};
    use lintwright_core::{GitIndex, GitSettings, Source};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn manifest() -> Manifest {
        let source = Source::from_includes(["."]);
        Manifest::new(vec![
            Black::new(BlackSetting::default(), source.clone()).into(),
            Flake8::new(Flake8Setting::default(), source).into(),
            Mypy::new(MypySetting::strict(), BTreeMap::new(), Vec::new()).into(),
        ])
        .unwrap()
    }

    fn paths(settings_dir: &std::path::Path) -> PathContext {
        PathContext::new(
            "/project",
            settings_dir,
            Arc::new(GitIndex::new(GitSettings::disabled())),
        )
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_duplicated_names() {
        let black = Black::new(BlackSetting::default(), Source::new());
        assert!(matches!(
            Manifest::new(vec![black.clone().into(), black.into()]),
            Err(RunnerError::DuplicatedComponentName(name)) if name == "black"
        ));
    }

    #[test]
    fn test_targets() {
        let targets = manifest().targets(&ManifestOptions::default()).unwrap();
        assert_eq!(targets["lint"], strings(&["black", "flake8", "mypy"]));
        assert_eq!(targets["format"], strings(&["black"]));
    }

    #[test]
    fn test_filters() {
        let manifest = manifest();
        let enable = ManifestOptions {
            enable: Some(strings(&["mypy"])),
            disable: None,
        };
        assert_eq!(manifest.targets(&enable).unwrap()["lint"], strings(&["mypy"]));

        let disable = ManifestOptions {
            enable: None,
            disable: Some(strings(&["black"])),
        };
        let targets = manifest.targets(&disable).unwrap();
        assert_eq!(targets["lint"], strings(&["flake8", "mypy"]));
        assert!(!targets.contains_key("format"));

        let unknown = ManifestOptions {
            enable: Some(strings(&["pylint", "black"])),
            disable: None,
        };
        assert!(matches!(
            manifest.targets(&unknown),
            Err(RunnerError::InvalidComponentName(message)) if message.ends_with("pylint")
        ));

        let both = ManifestOptions {
            enable: Some(strings(&["black"])),
            disable: Some(strings(&["mypy"])),
        };
        assert!(matches!(manifest.targets(&both), Err(RunnerError::ConflictingFilters)));
    }

    #[test]
    fn test_target_commands() {
        let temp = TempDir::new().unwrap();
        let commands = manifest()
            .target(
                "lint",
                &paths(temp.path()),
                &RunOptions::default(),
                &ManifestOptions::default(),
            )
            .unwrap();
        let names: Vec<&str> = commands.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["black", "flake8", "mypy"]);
    }

    #[test]
    fn test_export_settings() {
        let temp = TempDir::new().unwrap();
        let written = manifest().export_settings(&paths(temp.path())).unwrap();
        assert_eq!(
            written,
            vec![temp.path().join("pyproject.toml"), temp.path().join("setup.cfg")]
        );
        let cfg = std::fs::read_to_string(temp.path().join("setup.cfg")).unwrap();
        assert!(cfg.contains("[flake8]\n"));
        assert!(cfg.contains("[mypy]\n"));
        assert!(manifest().component("mypy").is_some());
    }
}
