//! Error types for source selection, diagnostics and settings.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while comparing or resolving paths.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// Both paths must be absolute for a containment test.
    #[error("paths must be absolute: {base} and {target}")]
    NotAbsolute { base: PathBuf, target: PathBuf },
}

/// Errors raised by the git index.
#[derive(Debug, Error)]
pub enum GitError {
    /// No repository was found walking up from the given path.
    #[error("no git repository found for {0}")]
    RepositoryNotFound(PathBuf),

    /// Underlying libgit2 failure.
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by [`crate::Source`].
#[derive(Debug, Error)]
pub enum SourceError {
    /// A literal path key cannot carry the glob flag.
    #[error("path key {0} cannot be used as a glob pattern")]
    GlobPathKey(PathBuf),

    /// The entry to remove does not exist.
    #[error("source entry not found: {0}")]
    EntryNotFound(String),

    /// The base directory handed to `resolve_files` must be absolute.
    #[error("base directory must be absolute: {0}")]
    RelativeBaseDir(PathBuf),

    /// Path comparison failed.
    #[error(transparent)]
    Path(#[from] PathError),

    /// Git failure other than a missing repository.
    #[error(transparent)]
    Git(#[from] GitError),
}

/// Errors raised while building a [`crate::Diagnostic`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiagnosticError {
    /// File paths are always absolute.
    #[error("diagnostic file path must be absolute: {0}")]
    RelativePath(PathBuf),

    /// Neither a message nor a diff was given.
    #[error("diagnostic requires either a message or a diff")]
    MissingBody,

    /// Both a message and a diff were given.
    #[error("diagnostic cannot carry both a message and a diff")]
    AmbiguousBody,
}

/// Errors raised while parsing a unified diff.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DiffParseError {
    #[error("unexpected hunk found at line {line}: {text}")]
    UnexpectedHunk { line: usize, text: String },

    #[error("unexpected target file header at line {line}: {text}")]
    UnexpectedTargetHeader { line: usize, text: String },

    #[error("hunk diff line expected at line {line}: {text}")]
    ExpectedHunkLine { line: usize, text: String },

    #[error("hunk is longer than expected at line {line}")]
    HunkTooLong { line: usize },

    #[error("hunk is shorter than expected")]
    HunkTooShort,

    #[error("invalid hunk header at line {line}: {text}")]
    InvalidHunkHeader { line: usize, text: String },

    #[error("line number out of range at line {line}")]
    LineNumberOverflow { line: usize },
}

/// Errors raised by [`crate::SettingFile`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingError {
    #[error("section path must not be empty")]
    EmptyPath,

    #[error("section: {0} not found")]
    SectionNotFound(String),

    #[error("subpath: {0} already exists")]
    SubpathExists(String),

    #[error("section: {0} already exists")]
    SectionExists(String),

    #[error("invalid section: {0} is not a table")]
    InvalidSection(String),
}

impl SettingError {
    pub(crate) fn join(path: &[String]) -> String {
        path.join(".")
    }
}

/// Boxed error returned by inheritance callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while resolving a config inheritance chain.
#[derive(Debug, Error)]
pub enum InheritanceError {
    /// The `base` chain loops back to a file already visited.
    #[error("Circular dependency detected. {} was visited more than once.", .0.display())]
    Circular(PathBuf),

    /// Loading or selecting a config failed.
    #[error("failed to load {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: BoxError,
    },
}

impl InheritanceError {
    /// Creates a load error for the given file.
    pub fn load(path: impl Into<PathBuf>, source: impl Into<BoxError>) -> Self {
        Self::Load {
            path: path.into(),
            source: source.into(),
        }
    }
}
