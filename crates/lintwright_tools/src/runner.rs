//! Runs targets: exports settings, builds commands and executes them.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lintwright_core::GitIndex;
use rayon::prelude::*;
use tempfile::TempDir;
use tracing::{debug, error, info};

use crate::command::{Command, PathContext, RunOptions};
use crate::error::{RunnerError, ToolError};
use crate::manifest::{Manifest, ManifestOptions};
use crate::reporter::ReporterFactory;

const EXIT_COMMAND_NOT_FOUND: i32 = 127;
const EXIT_UNEXPECTED: i32 = -1;

/// Runs `commands`, reporting each one to `factory`.
///
/// Commands run in parallel unless one of them modifies files or
/// `options.no_parallel` is set. With `files`, each command runs on the
/// given files only.
pub fn run_commands(
    commands: &[Box<dyn Command>],
    factory: &ReporterFactory,
    options: &RunOptions,
    files: Option<&[PathBuf]>,
) -> Result<(), RunnerError> {
    if let Some(command) = commands.iter().find(|c| c.name().contains(':')) {
        return Err(RunnerError::InvalidCommandName(command.name().to_string()));
    }

    let execute = |command: &Box<dyn Command>| {
        let reporter = factory.create(command.name());
        let result = match files {
            Some(files) => command.run_files(&reporter, files),
            None => command.run(&reporter),
        };
        let exit_code = match result {
            Ok(code) => code,
            Err(ToolError::CommandNotFound(program)) => {
                error!("[{}] Command not found: {}", command.name(), program);
                EXIT_COMMAND_NOT_FOUND
            }
            Err(ToolError::RunFilesNotSupported(name)) => {
                info!("{} does not support run-files. Skipping.", name);
                0
            }
            Err(e) => {
                error!("[{}] {}", command.name(), e);
                EXIT_UNEXPECTED
            }
        };
        reporter.set_result(exit_code == 0, exit_code);
        factory.finish(reporter);
    };

    let parallel = !options.no_parallel && !commands.iter().any(|c| c.has_side_effects());
    if parallel {
        debug!("Running {} commands in parallel", commands.len());
        commands.par_iter().for_each(execute);
    } else {
        commands.iter().for_each(execute);
    }
    Ok(())
}

/// Runs targets of a manifest from a base directory.
#[derive(Debug)]
pub struct Runner {
    manifest: Manifest,
    base_dir: PathBuf,
    git: Arc<GitIndex>,
    filters: ManifestOptions,
}

impl Runner {
    pub fn new(manifest: Manifest, base_dir: impl Into<PathBuf>, git: Arc<GitIndex>) -> Self {
        Self {
            manifest,
            base_dir: base_dir.into(),
            git,
            filters: ManifestOptions::default(),
        }
    }

    /// Restricts the components that take part in runs.
    pub fn with_filters(mut self, filters: ManifestOptions) -> Self {
        self.filters = filters;
        self
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Targets available with the current filters.
    pub fn targets(&self) -> Result<BTreeMap<String, Vec<String>>, RunnerError> {
        self.manifest.targets(&self.filters)
    }

    fn paths(&self, settings_dir: &Path) -> PathContext {
        PathContext::new(&self.base_dir, settings_dir, Arc::clone(&self.git))
    }

    /// Writes every generated settings file into `export_dir`.
    pub fn export_settings(&self, export_dir: &Path) -> Result<Vec<PathBuf>, RunnerError> {
        fs::create_dir_all(export_dir)?;
        self.manifest.export_settings(&self.paths(export_dir))
    }

    /// Runs `targets` in order.
    ///
    /// Settings are written to `settings_dir`, or to a temporary directory
    /// removed after the run.
    pub fn run(
        &self,
        targets: &[String],
        factory: &ReporterFactory,
        options: RunOptions,
        settings_dir: Option<&Path>,
        files: Option<&[PathBuf]>,
    ) -> Result<(), RunnerError> {
        let available = self.targets()?;
        if let Some(missing) = targets.iter().find(|t| !available.contains_key(t.as_str())) {
            return Err(RunnerError::TargetNotFound(missing.clone()));
        }

        let temp_dir;
        let settings_dir = match settings_dir {
            Some(dir) => dir.to_path_buf(),
            None => {
                temp_dir = TempDir::new()?;
                temp_dir.path().to_path_buf()
            }
        };
        self.export_settings(&settings_dir)?;

        let paths = self.paths(&settings_dir);
        for target in targets {
            let commands = self
                .manifest
                .target(target, &paths, &options, &self.filters)?;
            info!("Running target {} ({} commands)", target, commands.len());
            run_commands(&commands, factory, &options, files)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::Reporter;
    use crate::tools::{Black, BlackSetting, Flake8, Flake8Setting};
    use lintwright_core::{GitSettings, Source};
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    struct Fake {
        name: &'static str,
        side_effects: bool,
        result: fn() -> Result<i32, ToolError>,
        seen_files: Mutex<Option<Vec<PathBuf>>>,
    }

    impl Fake {
        fn boxed(name: &'static str, result: fn() -> Result<i32, ToolError>) -> Box<dyn Command> {
            Box::new(Self {
                name,
                side_effects: false,
                result,
                seen_files: Mutex::new(None),
            })
        }
    }

    impl Command for Fake {
        fn name(&self) -> &str {
            self.name
        }

        fn has_side_effects(&self) -> bool {
            self.side_effects
        }

        fn run(&self, _reporter: &Reporter) -> Result<i32, ToolError> {
            (self.result)()
        }

        fn run_files(&self, _reporter: &Reporter, files: &[PathBuf]) -> Result<i32, ToolError> {
            *self.seen_files.lock() = Some(files.to_vec());
            (self.result)()
        }
    }

    #[test]
    fn test_exit_code_mapping() {
        let commands = vec![
            Fake::boxed("ok", || Ok(0)),
            Fake::boxed("lint", || Ok(1)),
            Fake::boxed("missing", || Err(ToolError::CommandNotFound("x".into()))),
            Fake::boxed("broken", || Err(ToolError::Io(std::io::Error::other("boom")))),
        ];
        let factory = ReporterFactory::new();
        run_commands(&commands, &factory, &RunOptions::default(), None).unwrap();

        assert_eq!(factory.len(), 4);
        let mut failed = factory.failed();
        failed.sort();
        assert_eq!(failed, vec!["broken", "lint", "missing"]);
    }

    #[test]
    fn test_run_files_not_supported_is_skipped() {
        let commands = vec![Fake::boxed("mypy", || {
            Err(ToolError::RunFilesNotSupported("mypy".into()))
        })];
        let factory = ReporterFactory::new();
        run_commands(
            &commands,
            &factory,
            &RunOptions::default(),
            Some(&[PathBuf::from("a.py")][..]),
        )
        .unwrap();
        assert!(!factory.has_error());
    }

    #[test]
    fn test_run_files_receives_files() {
        let fake = Arc::new(Fake {
            name: "flake8",
            side_effects: false,
            result: || Ok(0),
            seen_files: Mutex::new(None),
        });
        let commands: Vec<Box<dyn Command>> = vec![Box::new(Shared(Arc::clone(&fake)))];
        let files = vec![PathBuf::from("a.py"), PathBuf::from("b.py")];
        run_commands(
            &commands,
            &ReporterFactory::new(),
            &RunOptions::default(),
            Some(files.as_slice()),
        )
        .unwrap();
        assert_eq!(fake.seen_files.lock().clone(), Some(files));
    }

    #[test]
    fn test_invalid_command_name() {
        let commands = vec![Fake::boxed("bad:name", || Ok(0))];
        let factory = ReporterFactory::new();
        assert!(matches!(
            run_commands(&commands, &factory, &RunOptions::default(), None),
            Err(RunnerError::InvalidCommandName(name)) if name == "bad:name"
        ));
        assert!(factory.is_empty());
    }

    #[test]
    fn test_sequential_when_side_effects() {
        let commands: Vec<Box<dyn Command>> = vec![
            Box::new(Fake {
                name: "format",
                side_effects: true,
                result: || Ok(0),
                seen_files: Mutex::new(None),
            }),
            Fake::boxed("check", || Ok(0)),
        ];
        let factory = ReporterFactory::new();
        run_commands(&commands, &factory, &RunOptions::default(), None).unwrap();
        let summary = factory.format_summary();
        let names: Vec<&str> = summary
            .lines()
            .skip(1)
            .filter_map(|line| line.split(' ').next())
            .collect();
        assert_eq!(names, vec!["format", "check"]);
    }

    struct Shared(Arc<Fake>);

    impl Command for Shared {
        fn name(&self) -> &str {
            self.0.name()
        }

        fn has_side_effects(&self) -> bool {
            self.0.has_side_effects()
        }

        fn run(&self, reporter: &Reporter) -> Result<i32, ToolError> {
            self.0.run(reporter)
        }

        fn run_files(&self, reporter: &Reporter, files: &[PathBuf]) -> Result<i32, ToolError> {
            self.0.run_files(reporter, files)
        }
    }

    fn runner(base_dir: &Path) -> Runner {
        let source = Source::from_includes(["."]);
        let manifest = Manifest::new(vec![
            Black::new(BlackSetting::default(), source.clone()).into(),
            Flake8::new(Flake8Setting::default(), source).into(),
        ])
        .unwrap();
        Runner::new(
            manifest,
            base_dir,
            Arc::new(GitIndex::new(GitSettings::disabled())),
        )
    }

    #[test]
    fn test_run_without_python_files() {
        let base = TempDir::new().unwrap();
        let settings = TempDir::new().unwrap();
        let factory = ReporterFactory::new();
        runner(base.path())
            .run(
                &["lint".to_string()],
                &factory,
                RunOptions::default(),
                Some(settings.path()),
                None,
            )
            .unwrap();

        assert_eq!(factory.len(), 2);
        assert!(!factory.has_error());
        assert!(settings.path().join("pyproject.toml").exists());
        assert!(settings.path().join("setup.cfg").exists());
    }

    #[test]
    fn test_unknown_target() {
        let base = TempDir::new().unwrap();
        let factory = ReporterFactory::new();
        let result = runner(base.path()).run(
            &["lint".to_string(), "typecheck".to_string()],
            &factory,
            RunOptions::default(),
            None,
            None,
        );
        assert!(matches!(result, Err(RunnerError::TargetNotFound(t)) if t == "typecheck"));
        assert!(factory.is_empty());
    }

    #[test]
    fn test_filtered_target_disappears() {
        let base = TempDir::new().unwrap();
        let factory = ReporterFactory::new();
        let filtered = runner(base.path()).with_filters(ManifestOptions {
            enable: None,
            disable: Some(vec!["black".to_string()]),
        });
        let result = filtered.run(
            &["format".to_string()],
            &factory,
            RunOptions::default(),
            None,
            None,
        );
        assert!(matches!(result, Err(RunnerError::TargetNotFound(_))));
    }
}
