//! # lintwright_core
//!
//! Core building blocks for lintwright.
//!
//! This crate provides:
//! - Source selection over include/exclude entries with optional git filtering
//! - A uniform `Diagnostic` model and parsers for line-based and diff output
//! - Ordered settings documents that merge into nested TOML tables
//! - Generic resolution of `base` inheritance chains between config files
//!
//! ## Example
//!
//! ```rust,ignore
//! use lintwright_core::{GitIndex, GitSettings, Source, python_file_filter};
//!
//! let source = Source::from_includes(["src"]);
//! let git = GitIndex::new(GitSettings::from_env());
//! let files = source.resolve_files(&base_dir, Some(&python_file_filter()), Some(&git), None)?;
//! ```

pub mod diagnostic;
mod error;
pub mod error_lines;
pub mod git;
pub mod inheritance;
pub mod path;
pub mod setting;
pub mod source;
pub mod unidiff;
pub mod warning;

pub use diagnostic::{Diagnostic, DiagnosticBody, DiagnosticFormatter, GnuFormatter, PrettyFormatter};
pub use error::{
    BoxError, DiagnosticError, DiffParseError, GitError, InheritanceError, PathError,
    SettingError, SourceError,
};
pub use error_lines::{UnexpectedErrorFormat, parse_error_diffs, parse_error_lines};
pub use git::{GitIndex, GitSettings};
pub use inheritance::resolve_inheritance;
pub use setting::{SectionPath, SettingFile};
pub use source::{
    FilePredicate, Source, SourceEntrySetting, SourceKey, extension_filter, python_file_filter,
};
pub use warning::{TracingSink, WarningBuffer, WarningSink};
