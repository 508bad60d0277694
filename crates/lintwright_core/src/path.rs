//! Path helpers shared by source selection and the tool wrappers.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use crate::error::PathError;

/// Expands a leading `~` to the user's home directory.
pub fn expand_user(path: &Path) -> PathBuf {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => match dirs::home_dir() {
            Some(home) => home.join(components.as_path()),
            None => path.to_path_buf(),
        },
        _ => path.to_path_buf(),
    }
}

/// Removes `.` and `..` components without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Resolves `path` against `base_dir`.
///
/// The result is canonical when the path exists and lexically normalized
/// otherwise, so missing paths still produce a stable absolute value.
pub fn resolve_path(base_dir: &Path, path: &Path) -> PathBuf {
    let joined = base_dir.join(expand_user(path));
    joined
        .canonicalize()
        .unwrap_or_else(|_| normalize(&joined))
}

/// Returns `path` relative to `base_dir` when `path` is absolute.
pub fn relative_path(path: &Path, base_dir: &Path) -> PathBuf {
    if !path.is_absolute() {
        return path.to_path_buf();
    }

    let path = normalize(path);
    let base = normalize(base_dir);
    let mut path_iter = path.components().peekable();
    let mut base_iter = base.components().peekable();

    while let (Some(a), Some(b)) = (path_iter.peek(), base_iter.peek()) {
        if a != b {
            break;
        }
        path_iter.next();
        base_iter.next();
    }

    let mut out = PathBuf::new();
    for _ in base_iter {
        out.push("..");
    }
    for component in path_iter {
        out.push(component);
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Returns true if `path` or one of its ancestors is in `sources`.
pub fn is_covered(path: &Path, sources: &BTreeSet<PathBuf>) -> bool {
    let resolved = path
        .canonicalize()
        .unwrap_or_else(|_| normalize(path));
    resolved.ancestors().any(|p| sources.contains(p))
}

/// String-prefix containment of `target` under `base`.
///
/// Both paths must be absolute.
pub fn is_contained(base: &Path, target: &Path) -> Result<bool, PathError> {
    if !base.is_absolute() || !target.is_absolute() {
        return Err(PathError::NotAbsolute {
            base: base.to_path_buf(),
            target: target.to_path_buf(),
        });
    }

    Ok(target
        .to_string_lossy()
        .starts_with(base.to_string_lossy().as_ref()))
}
