//! Resolution of `base` chains between configuration files.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{BoxError, InheritanceError};
use crate::path::resolve_path;

/// Resolves the config at `path` together with its chain of bases.
///
/// `load` reads a file, `select` extracts the interesting section,
/// `base_of` returns the section's base file (relative paths are taken
/// from the directory of the file that names them) and `update` merges a
/// more specific section over its resolved base.
pub fn resolve_inheritance<C, T, L, S, B, U, LE, SE>(
    path: &Path,
    load: L,
    select: S,
    base_of: B,
    update: U,
) -> Result<T, InheritanceError>
where
    L: Fn(&Path) -> Result<C, LE>,
    S: Fn(&Path, C) -> Result<T, SE>,
    B: Fn(&T) -> Option<PathBuf>,
    U: Fn(T, T) -> T,
    LE: Into<BoxError>,
    SE: Into<BoxError>,
{
    let mut visited = HashSet::new();
    resolve(path, &load, &select, &base_of, &update, &mut visited)
}

fn resolve<C, T, L, S, B, U, LE, SE>(
    path: &Path,
    load: &L,
    select: &S,
    base_of: &B,
    update: &U,
    visited: &mut HashSet<PathBuf>,
) -> Result<T, InheritanceError>
where
    L: Fn(&Path) -> Result<C, LE>,
    S: Fn(&Path, C) -> Result<T, SE>,
    B: Fn(&T) -> Option<PathBuf>,
    U: Fn(T, T) -> T,
    LE: Into<BoxError>,
    SE: Into<BoxError>,
{
    let key = resolve_path(&std::env::current_dir().unwrap_or_default(), path);
    if !visited.insert(key.clone()) {
        return Err(InheritanceError::Circular(key));
    }

    let document = load(path).map_err(|e| InheritanceError::load(path, e))?;
    let section = select(path, document).map_err(|e| InheritanceError::load(path, e))?;

    let Some(base) = base_of(&section) else {
        return Ok(section);
    };
    let base_dir = key.parent().unwrap_or(Path::new("/"));
    let base_path = resolve_path(base_dir, &base);
    debug!(
        "Resolving base {} of {}",
        base_path.display(),
        key.display()
    );

    let base_section = resolve(&base_path, load, select, base_of, update, visited)?;
    Ok(update(base_section, section))
}
