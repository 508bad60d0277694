//! Ordered settings documents.
//!
//! A [`SettingFile`] collects `(section path, section data)` entries for a
//! single output file and folds them into one nested TOML table. Keys are
//! written in sorted order so that generated files are deterministic.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use toml::{Table, Value};

use crate::error::SettingError;

/// Path of a section inside a settings document, e.g. `["tool", "black"]`.
pub type SectionPath = Vec<String>;

/// Entries of one generated settings file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingFile {
    entries: Vec<(SectionPath, Table)>,
    structure: BTreeSet<SectionPath>,
}

impl SettingFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[(SectionPath, Table)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registers a section.
    ///
    /// Registered paths never overlap: a path cannot be registered twice,
    /// be nested under another section or contain another section.
    pub fn set_section<I, S>(&mut self, path: I, data: Table) -> Result<(), SettingError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let path: SectionPath = path.into_iter().map(Into::into).collect();
        if path.is_empty() {
            return Err(SettingError::EmptyPath);
        }
        if self.structure.contains(&path) {
            return Err(SettingError::SectionExists(SettingError::join(&path)));
        }
        for depth in 1..path.len() {
            let prefix = &path[..depth];
            if self.structure.contains(prefix) {
                return Err(SettingError::SubpathExists(SettingError::join(prefix)));
            }
        }
        if self
            .structure
            .iter()
            .any(|existing| existing.len() > path.len() && existing.starts_with(&path))
        {
            return Err(SettingError::SubpathExists(SettingError::join(&path)));
        }

        self.structure.insert(path.clone());
        self.entries.push((path, data));
        Ok(())
    }

    /// Returns the data registered at exactly `path`.
    ///
    /// Falls back to `default` when given, errors otherwise.
    pub fn get_section(&self, path: &[&str], default: Option<Table>) -> Result<Table, SettingError> {
        let found = self.entries.iter().find(|(entry_path, _)| {
            entry_path.len() == path.len() && entry_path.iter().zip(path).all(|(a, b)| a == b)
        });
        match (found, default) {
            (Some((_, data)), _) => Ok(data.clone()),
            (None, Some(default)) => Ok(default),
            (None, None) => Err(SettingError::SectionNotFound(path.join("."))),
        }
    }

    /// Folds every entry into one nested table.
    pub fn as_table(&self) -> Result<Table, SettingError> {
        let mut table = Table::new();
        for (path, data) in &self.entries {
            Self::update_by_entry(&mut table, path, data, true)?;
        }
        Ok(table)
    }

    /// Writes `data` at `path` inside `dst`.
    ///
    /// Missing intermediate tables are created. With `replace` the section
    /// is cleared first, otherwise keys are merged into it. Keys are
    /// inserted in sorted order and values are sorted recursively.
    pub fn update_by_entry(
        dst: &mut Table,
        path: &[String],
        data: &Table,
        replace: bool,
    ) -> Result<(), SettingError> {
        let Some((last, parents)) = path.split_last() else {
            return Err(SettingError::EmptyPath);
        };

        let mut node = dst;
        for (depth, key) in parents.iter().enumerate() {
            let entry = node
                .entry(key.clone())
                .or_insert(Value::Table(Table::new()));
            node = match entry {
                Value::Table(table) => table,
                _ => {
                    return Err(SettingError::InvalidSection(SettingError::join(
                        &path[..=depth],
                    )));
                }
            };
        }

        if replace || !node.contains_key(last.as_str()) {
            node.insert(last.clone(), Value::Table(Table::new()));
        }
        let Some(Value::Table(section)) = node.get_mut(last.as_str()) else {
            return Err(SettingError::InvalidSection(SettingError::join(path)));
        };

        let mut items: Vec<(&String, &Value)> = data.iter().collect();
        items.sort_by(|a, b| a.0.cmp(b.0));
        for (key, value) in items {
            section.insert(key.clone(), sort_value(value));
        }
        Ok(())
    }
}

/// Converts `snake_case` keys to `dash-case`.
pub fn to_dash_case(key: &str) -> String {
    key.replace('_', "-")
}

/// Returns a copy of `value` with tables key-sorted and arrays sorted.
pub fn sort_value(value: &Value) -> Value {
    match value {
        Value::Table(table) => Value::Table(sort_table(table)),
        Value::Array(items) => {
            let mut items: Vec<Value> = items.iter().map(sort_value).collect();
            items.sort_by(compare_values);
            Value::Array(items)
        }
        other => other.clone(),
    }
}

fn sort_table(table: &Table) -> Table {
    let mut items: Vec<(&String, &Value)> = table.iter().collect();
    items.sort_by(|a, b| a.0.cmp(b.0));
    items
        .into_iter()
        .map(|(key, value)| (key.clone(), sort_value(value)))
        .collect()
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Boolean(_) => 0,
        Value::Integer(_) => 1,
        Value::Float(_) => 2,
        Value::String(_) => 3,
        Value::Datetime(_) => 4,
        Value::Array(_) => 5,
        Value::Table(_) => 6,
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Boolean(x), Value::Boolean(y)) => x.cmp(y),
        (Value::Integer(x), Value::Integer(y)) => x.cmp(y),
        (Value::Float(x), Value::Float(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Datetime(x), Value::Datetime(y)) => x.to_string().cmp(&y.to_string()),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}
