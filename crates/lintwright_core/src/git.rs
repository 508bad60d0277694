//! Read-only access to the git index.
//!
//! `GitIndex` answers two questions: which files under a directory are
//! tracked, and whether a single file is tracked. Directory listings are
//! cached for a short window because every command of a run asks for the
//! same directories.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use git2::{Delta, ErrorCode, Repository};
use parking_lot::Mutex;
use tracing::debug;

use crate::error::GitError;
use crate::path::normalize;

/// Environment variable that disables git integration unless set to `"0"`.
pub const IGNORE_GIT_ENV: &str = "LINTWRIGHT_IGNORE_GIT";

const MAX_CACHED_DIRS: usize = 8;

/// Immutable settings for a [`GitIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GitSettings {
    /// When false every query answers "nothing tracked".
    pub enabled: bool,
    /// How long a directory listing stays cached.
    pub cache_ttl: Duration,
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            cache_ttl: Duration::from_secs(10),
        }
    }
}

impl GitSettings {
    /// Reads the toggle from [`IGNORE_GIT_ENV`].
    pub fn from_env() -> Self {
        let enabled = match std::env::var(IGNORE_GIT_ENV) {
            Ok(value) => value == "0",
            Err(_) => true,
        };
        Self {
            enabled,
            ..Self::default()
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }
}

#[derive(Debug)]
struct CachedListing {
    created: Instant,
    files: BTreeSet<PathBuf>,
}

/// Thread-safe view of the git index.
///
/// Every public call holds the internal lock for its whole duration.
#[derive(Debug)]
pub struct GitIndex {
    settings: GitSettings,
    cache: Mutex<HashMap<PathBuf, CachedListing>>,
}

impl GitIndex {
    pub fn new(settings: GitSettings) -> Self {
        Self {
            settings,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn settings(&self) -> GitSettings {
        self.settings
    }

    /// Returns true if git is enabled and `path` lies inside a work tree.
    pub fn is_available(&self, path: &Path) -> bool {
        let _guard = self.cache.lock();
        self.settings.enabled && open_repository(path).is_ok()
    }

    /// Drops every cached directory listing.
    pub fn invalidate(&self) {
        self.cache.lock().clear();
    }

    /// Lists tracked files under `dir`, minus files deleted from the work tree.
    pub fn list_tracked_files(&self, dir: &Path) -> Result<BTreeSet<PathBuf>, GitError> {
        let mut cache = self.cache.lock();
        if !self.settings.enabled {
            return Ok(BTreeSet::new());
        }

        let target = canonical(dir);
        if let Some(cached) = cache.get(&target)
            && cached.created.elapsed() < self.settings.cache_ttl
        {
            return Ok(cached.files.clone());
        }

        let files = list_indexed_files(&target)?;
        debug!(
            "Listed {} tracked files under {}",
            files.len(),
            target.display()
        );

        if cache.len() >= MAX_CACHED_DIRS && !cache.contains_key(&target) {
            let oldest = cache
                .iter()
                .min_by_key(|(_, listing)| listing.created)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                cache.remove(&oldest);
            }
        }
        cache.insert(
            target,
            CachedListing {
                created: Instant::now(),
                files: files.clone(),
            },
        );

        Ok(files)
    }

    /// Returns true if `path` has an entry in the index.
    pub fn is_tracked(&self, path: &Path) -> Result<bool, GitError> {
        let _guard = self.cache.lock();
        if !self.settings.enabled {
            return Ok(false);
        }

        let target = canonical(path);
        let start = if target.is_dir() {
            target.as_path()
        } else {
            target.parent().unwrap_or(target.as_path())
        };
        let repo = open_repository(start)?;
        let workdir = workdir(&repo, start)?;

        let Ok(relative) = target.strip_prefix(&workdir) else {
            return Ok(false);
        };
        let index = repo.index()?;
        Ok(index.get_path(relative, 0).is_some())
    }
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| normalize(path))
}

fn open_repository(path: &Path) -> Result<Repository, GitError> {
    match Repository::discover(path) {
        Ok(repo) => Ok(repo),
        Err(e) if e.code() == ErrorCode::NotFound => {
            Err(GitError::RepositoryNotFound(path.to_path_buf()))
        }
        Err(e) => Err(GitError::Git(e)),
    }
}

fn workdir(repo: &Repository, path: &Path) -> Result<PathBuf, GitError> {
    match repo.workdir() {
        Some(dir) => Ok(canonical(dir)),
        None => Err(GitError::RepositoryNotFound(path.to_path_buf())),
    }
}

fn list_indexed_files(target: &Path) -> Result<BTreeSet<PathBuf>, GitError> {
    let repo = open_repository(target)?;
    let workdir = workdir(&repo, target)?;
    let index = repo.index()?;

    let mut files: BTreeSet<PathBuf> = index
        .iter()
        .map(|entry| workdir.join(String::from_utf8_lossy(&entry.path).as_ref()))
        .filter(|path| path.starts_with(target))
        .collect();

    let diff = repo.diff_index_to_workdir(Some(&index), None)?;
    for delta in diff.deltas() {
        if delta.status() != Delta::Deleted {
            continue;
        }
        if let Some(deleted) = delta.old_file().path() {
            files.remove(&workdir.join(deleted));
        }
    }

    Ok(files)
}
