//! Include/exclude file selection.
//!
//! A [`Source`] holds two ordered sets of entries. Each entry is either a
//! literal path or a glob pattern resolved against a base directory.
//! [`Source::resolve_files`] expands the includes, drops everything under
//! an exclude root and optionally restricts directories to files tracked
//! by git.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use globset::GlobBuilder;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{GitError, SourceError};
use crate::git::GitIndex;
use crate::path::{is_contained, resolve_path};
use crate::warning::{WarningSink, emit};

/// Predicate applied to files discovered inside directories.
pub type FilePredicate = dyn Fn(&Path) -> bool + Send + Sync;

/// Key of a source entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceKey {
    /// A literal path. Never treated as a glob.
    Path(PathBuf),
    /// A string, literal or glob depending on the entry setting.
    Pattern(String),
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKey::Path(path) => write!(f, "{}", path.display()),
            SourceKey::Pattern(pattern) => f.write_str(pattern),
        }
    }
}

impl From<PathBuf> for SourceKey {
    fn from(path: PathBuf) -> Self {
        SourceKey::Path(path)
    }
}

impl From<&Path> for SourceKey {
    fn from(path: &Path) -> Self {
        SourceKey::Path(path.to_path_buf())
    }
}

impl From<String> for SourceKey {
    fn from(pattern: String) -> Self {
        SourceKey::Pattern(pattern)
    }
}

impl From<&str> for SourceKey {
    fn from(pattern: &str) -> Self {
        SourceKey::Pattern(pattern.to_string())
    }
}

/// How a source entry is resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceEntrySetting {
    /// Expand the key as a glob pattern.
    pub glob: bool,
    /// Directory the entry is resolved against instead of the caller's base.
    pub base_dir: Option<PathBuf>,
}

impl SourceEntrySetting {
    pub fn literal() -> Self {
        Self::default()
    }

    pub fn glob() -> Self {
        Self {
            glob: true,
            base_dir: None,
        }
    }

    pub fn base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }
}

type Entries = Vec<(SourceKey, SourceEntrySetting)>;

/// Ordered include and exclude entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Source {
    includes: Entries,
    excludes: Entries,
}

impl Source {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source with literal includes.
    pub fn from_includes<I, K>(includes: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<SourceKey>,
    {
        let mut source = Self::new();
        for key in includes {
            upsert(&mut source.includes, key.into(), SourceEntrySetting::literal());
        }
        source
    }

    pub fn includes(&self) -> &[(SourceKey, SourceEntrySetting)] {
        &self.includes
    }

    pub fn excludes(&self) -> &[(SourceKey, SourceEntrySetting)] {
        &self.excludes
    }

    pub fn add_include(
        &mut self,
        key: impl Into<SourceKey>,
        setting: SourceEntrySetting,
    ) -> Result<(), SourceError> {
        let key = validate(key.into(), &setting)?;
        upsert(&mut self.includes, key, setting);
        Ok(())
    }

    pub fn add_exclude(
        &mut self,
        key: impl Into<SourceKey>,
        setting: SourceEntrySetting,
    ) -> Result<(), SourceError> {
        let key = validate(key.into(), &setting)?;
        upsert(&mut self.excludes, key, setting);
        Ok(())
    }

    pub fn remove_include(&mut self, key: &SourceKey) -> Result<(), SourceError> {
        remove(&mut self.includes, key)
    }

    pub fn remove_exclude(&mut self, key: &SourceKey) -> Result<(), SourceError> {
        remove(&mut self.excludes, key)
    }

    /// Resolves the entries into a sorted set of absolute file paths.
    ///
    /// Passing a `git` index restricts directory includes to tracked files
    /// and drops untracked explicit files.
    pub fn resolve_files(
        &self,
        base_dir: &Path,
        predicate: Option<&FilePredicate>,
        git: Option<&GitIndex>,
        warnings: Option<&dyn WarningSink>,
    ) -> Result<BTreeSet<PathBuf>, SourceError> {
        if !base_dir.is_absolute() {
            return Err(SourceError::RelativeBaseDir(base_dir.to_path_buf()));
        }
        let git = git.filter(|index| index.settings().enabled);
        let accepts = |path: &Path| predicate.is_none_or(|p| p(path));

        let mut included = BTreeSet::new();
        for (key, setting) in &self.includes {
            for path in resolve_entry(key, setting, base_dir, warnings) {
                if path.is_file() {
                    include_file(&path, git, warnings, &mut included)?;
                } else if path.is_dir() {
                    include_dir(&path, git, &accepts, warnings, &mut included)?;
                }
            }
        }

        let mut exclude_roots = Vec::new();
        for (key, setting) in &self.excludes {
            exclude_roots.extend(resolve_entry(key, setting, base_dir, warnings));
        }

        let mut files = BTreeSet::new();
        for file in included {
            let mut excluded = false;
            for root in &exclude_roots {
                if is_contained(root, &file)? {
                    excluded = true;
                    break;
                }
            }
            if !excluded {
                files.insert(file);
            }
        }

        debug!("Resolved {} files under {}", files.len(), base_dir.display());
        Ok(files)
    }
}

fn validate(key: SourceKey, setting: &SourceEntrySetting) -> Result<SourceKey, SourceError> {
    match key {
        SourceKey::Path(path) if setting.glob => Err(SourceError::GlobPathKey(path)),
        key => Ok(key),
    }
}

fn upsert(entries: &mut Entries, key: SourceKey, setting: SourceEntrySetting) {
    match entries.iter_mut().find(|(existing, _)| *existing == key) {
        Some((_, existing)) => *existing = setting,
        None => entries.push((key, setting)),
    }
}

fn remove(entries: &mut Entries, key: &SourceKey) -> Result<(), SourceError> {
    let position = entries
        .iter()
        .position(|(existing, _)| existing == key)
        .ok_or_else(|| SourceError::EntryNotFound(key.to_string()))?;
    entries.remove(position);
    Ok(())
}

fn include_file(
    path: &Path,
    git: Option<&GitIndex>,
    warnings: Option<&dyn WarningSink>,
    included: &mut BTreeSet<PathBuf>,
) -> Result<(), SourceError> {
    let Some(git) = git else {
        included.insert(path.to_path_buf());
        return Ok(());
    };

    match git.is_tracked(path) {
        Ok(true) => {
            included.insert(path.to_path_buf());
        }
        Ok(false) => debug!("Skipping untracked file {}", path.display()),
        Err(GitError::RepositoryNotFound(_)) => {
            emit(
                warnings,
                &format!("{} is outside repository. ignored.", path.display()),
            );
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn include_dir(
    dir: &Path,
    git: Option<&GitIndex>,
    accepts: &dyn Fn(&Path) -> bool,
    warnings: Option<&dyn WarningSink>,
    included: &mut BTreeSet<PathBuf>,
) -> Result<(), SourceError> {
    let Some(git) = git else {
        included.extend(
            WalkDir::new(dir)
                .into_iter()
                .filter_map(|e| e.ok())
                .map(|e| e.into_path())
                .filter(|p| p.is_file() && accepts(p)),
        );
        return Ok(());
    };

    match git.list_tracked_files(dir) {
        Ok(files) => included.extend(files.into_iter().filter(|p| accepts(p))),
        Err(GitError::RepositoryNotFound(_)) => emit(
            warnings,
            &format!("{} is outside repository. ignored.", dir.display()),
        ),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn resolve_entry(
    key: &SourceKey,
    setting: &SourceEntrySetting,
    base_dir: &Path,
    warnings: Option<&dyn WarningSink>,
) -> Vec<PathBuf> {
    let base = match &setting.base_dir {
        Some(dir) => resolve_path(base_dir, dir),
        None => base_dir.to_path_buf(),
    };

    match key {
        SourceKey::Path(path) => vec![resolve_path(&base, path)],
        SourceKey::Pattern(pattern) if !setting.glob => {
            vec![resolve_path(&base, Path::new(pattern))]
        }
        SourceKey::Pattern(pattern) => expand_glob(&base, pattern, warnings),
    }
}

fn expand_glob(base: &Path, pattern: &str, warnings: Option<&dyn WarningSink>) -> Vec<PathBuf> {
    let base = resolve_path(base, Path::new(""));
    let pattern = pattern.trim_start_matches("./").trim_end_matches('/');
    if pattern.is_empty() || pattern == "." {
        return vec![base];
    }

    let matcher = match GlobBuilder::new(pattern).literal_separator(true).build() {
        Ok(glob) => glob.compile_matcher(),
        Err(e) => {
            emit(warnings, &format!("Invalid glob pattern '{}': {}", pattern, e));
            return Vec::new();
        }
    };

    let mut walker = WalkDir::new(&base).min_depth(1).sort_by_file_name();
    if !pattern.contains("**") {
        walker = walker.max_depth(pattern.split('/').filter(|s| !s.is_empty()).count());
    }

    walker
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| {
            entry
                .path()
                .strip_prefix(&base)
                .is_ok_and(|relative| matcher.is_match(relative))
        })
        .map(|entry| entry.into_path())
        .collect()
}

/// Accepts files whose extension is one of `extensions` (without the dot).
pub fn extension_filter(extensions: &[&str]) -> Box<FilePredicate> {
    let extensions: Vec<String> = extensions.iter().map(|e| e.to_string()).collect();
    Box::new(move |path: &Path| {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.iter().any(|e| e == ext))
    })
}

/// Accepts `.py` and `.pyi` files.
pub fn python_file_filter() -> Box<FilePredicate> {
    extension_filter(&["py", "pyi"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::GitSettings;
    use crate::git::tests::create_repo;
    use crate::warning::WarningBuffer;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn create_tree(files: &[&str]) -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        for name in files {
            let path = temp.path().join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, "").unwrap();
        }
        let root = temp.path().canonicalize().unwrap();
        (temp, root)
    }

    #[test]
    fn test_include_dir_with_exclude() {
        let (_temp, root) = create_tree(&["src/a.py", "src/generated/b.py", "src/c.txt"]);
        let mut source = Source::from_includes(["src/"]);
        source
            .add_exclude("src/generated/", SourceEntrySetting::literal())
            .unwrap();

        let filter = python_file_filter();
        let files = source
            .resolve_files(&root, Some(filter.as_ref()), None, None)
            .unwrap();
        assert_eq!(files, BTreeSet::from([root.join("src/a.py")]));
    }

    #[test]
    fn test_explicit_file_bypasses_predicate() {
        let (_temp, root) = create_tree(&["src/a.py", "src/c.txt"]);
        let source = Source::from_includes(["src", "src/c.txt"]);

        let filter = python_file_filter();
        let files = source
            .resolve_files(&root, Some(filter.as_ref()), None, None)
            .unwrap();
        assert_eq!(
            files,
            BTreeSet::from([root.join("src/a.py"), root.join("src/c.txt")])
        );
    }

    #[test]
    fn test_missing_paths_are_skipped() {
        let (_temp, root) = create_tree(&["a.py"]);
        let mut source = Source::from_includes(["a.py", "missing.py", "missing_dir"]);
        source
            .add_exclude("also_missing", SourceEntrySetting::literal())
            .unwrap();

        let files = source.resolve_files(&root, None, None, None).unwrap();
        assert_eq!(files, BTreeSet::from([root.join("a.py")]));
    }

    #[test]
    fn test_glob_include() {
        let (_temp, root) = create_tree(&["a.py", "pkg/b.py", "pkg/c.txt", "pkg/sub/d.py"]);
        let mut source = Source::new();
        source
            .add_include("pkg/*.py", SourceEntrySetting::glob())
            .unwrap();

        let files = source.resolve_files(&root, None, None, None).unwrap();
        assert_eq!(files, BTreeSet::from([root.join("pkg/b.py")]));

        let mut source = Source::new();
        source
            .add_include("**/*.py", SourceEntrySetting::glob())
            .unwrap();
        let files = source.resolve_files(&root, None, None, None).unwrap();
        assert_eq!(
            files,
            BTreeSet::from([
                root.join("a.py"),
                root.join("pkg/b.py"),
                root.join("pkg/sub/d.py"),
            ])
        );
    }

    #[test]
    fn test_glob_dot_resolves_to_base() {
        let (_temp, root) = create_tree(&["a.py", "pkg/b.py"]);
        let mut source = Source::new();
        source.add_include(".", SourceEntrySetting::glob()).unwrap();
        source
            .add_exclude("pkg/*", SourceEntrySetting::glob())
            .unwrap();

        let files = source.resolve_files(&root, None, None, None).unwrap();
        assert_eq!(files, BTreeSet::from([root.join("a.py")]));
    }

    #[test]
    fn test_glob_with_base_dir_override() {
        let (_temp, root) = create_tree(&["other/x.py", "y.py"]);
        let mut source = Source::new();
        source
            .add_include("*.py", SourceEntrySetting::glob().base_dir(root.join("other")))
            .unwrap();

        let files = source.resolve_files(&root, None, None, None).unwrap();
        assert_eq!(files, BTreeSet::from([root.join("other/x.py")]));
    }

    #[test]
    fn test_invalid_glob_warns_and_yields_nothing() {
        let (_temp, root) = create_tree(&["a.py"]);
        let mut source = Source::new();
        source.add_include("[", SourceEntrySetting::glob()).unwrap();

        let warnings = WarningBuffer::new();
        let files = source
            .resolve_files(&root, None, None, Some(&warnings))
            .unwrap();
        assert!(files.is_empty());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_path_key_with_glob_is_rejected() {
        let mut source = Source::new();
        let result = source.add_include(PathBuf::from("src"), SourceEntrySetting::glob());
        assert!(matches!(result, Err(SourceError::GlobPathKey(_))));
        assert!(source.includes().is_empty());
    }

    #[test]
    fn test_relative_base_dir_is_rejected() {
        let source = Source::from_includes(["src"]);
        let result = source.resolve_files(Path::new("relative"), None, None, None);
        assert!(matches!(result, Err(SourceError::RelativeBaseDir(_))));
    }

    #[test]
    fn test_add_and_remove_entries() {
        let mut source = Source::from_includes(["a", "b"]);
        source
            .add_include("a", SourceEntrySetting::glob())
            .unwrap();
        assert_eq!(source.includes().len(), 2);
        assert_eq!(source.includes()[0].1, SourceEntrySetting::glob());

        source.remove_include(&SourceKey::from("a")).unwrap();
        assert_eq!(source.includes().len(), 1);
        assert!(matches!(
            source.remove_include(&SourceKey::from("a")),
            Err(SourceError::EntryNotFound(_))
        ));
        assert!(matches!(
            source.remove_exclude(&SourceKey::from("b")),
            Err(SourceError::EntryNotFound(_))
        ));
    }

    #[test]
    fn test_git_filters_untracked_files() {
        let temp = create_repo(&["src/a.py", "tracked.py"], &["src/b.py", "untracked.py"]);
        let root = temp.path().canonicalize().unwrap();
        let git = GitIndex::new(GitSettings::default());
        let source = Source::from_includes(["src", "tracked.py", "untracked.py"]);
        let filter = python_file_filter();

        let with_git = source
            .resolve_files(&root, Some(filter.as_ref()), Some(&git), None)
            .unwrap();
        assert_eq!(
            with_git,
            BTreeSet::from([root.join("src/a.py"), root.join("tracked.py")])
        );

        let without_git = source
            .resolve_files(&root, Some(filter.as_ref()), None, None)
            .unwrap();
        assert!(without_git.is_superset(&with_git));
        assert!(without_git.contains(&root.join("src/b.py")));
    }

    #[test]
    fn test_disabled_git_index_behaves_like_no_git() {
        let temp = create_repo(&["a.py"], &["b.py"]);
        let root = temp.path().canonicalize().unwrap();
        let git = GitIndex::new(GitSettings::disabled());
        let source = Source::from_includes(["."]);

        let files = source.resolve_files(&root, None, Some(&git), None).unwrap();
        assert!(files.contains(&root.join("b.py")));
    }

    #[test]
    fn test_explicit_file_outside_repository_is_dropped() {
        let (temp, root) = create_tree(&["a.py"]);
        if git2::Repository::discover(temp.path()).is_ok() {
            return;
        }
        let git = GitIndex::new(GitSettings::default());
        let warnings = WarningBuffer::new();
        let filter = python_file_filter();

        let files = Source::from_includes(["a.py"])
            .resolve_files(&root, Some(filter.as_ref()), Some(&git), Some(&warnings))
            .unwrap();
        assert!(files.is_empty());
        assert_eq!(warnings.len(), 1);
        assert!(warnings.messages()[0].contains("outside repository"));
    }

    #[test]
    fn test_dir_outside_repository_is_dropped() {
        let (temp, root) = create_tree(&["pkg/a.py", "pkg/b.py"]);
        if git2::Repository::discover(temp.path()).is_ok() {
            return;
        }
        let git = GitIndex::new(GitSettings::default());
        let warnings = WarningBuffer::new();

        let files = Source::from_includes(["pkg"])
            .resolve_files(&root, None, Some(&git), Some(&warnings))
            .unwrap();
        assert!(files.is_empty());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_extension_filter() {
        let filter = extension_filter(&["py", "pyi"]);
        assert!(filter(Path::new("/a/b.py")));
        assert!(filter(Path::new("/a/b.pyi")));
        assert!(!filter(Path::new("/a/b.pyc")));
        assert!(!filter(Path::new("/a/py")));
    }
}
