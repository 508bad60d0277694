//! Writes generated settings files.
//!
//! `.toml` files are merged into the existing document. `.cfg` files are
//! INI documents whose exported sections replace existing ones; other
//! sections are kept as they are.

use std::fs;
use std::path::{Path, PathBuf};

use lintwright_core::SettingFile;
use toml::{Table, Value};
use tracing::debug;

use crate::error::DumpError;

/// Writes `setting` to `dir/file_name`, merging with an existing file.
pub fn dump(dir: &Path, file_name: &str, setting: &SettingFile) -> Result<PathBuf, DumpError> {
    let path = dir.join(file_name);
    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => dump_toml(&path, setting)?,
        Some("cfg") | Some("ini") => dump_cfg(&path, setting)?,
        _ => return Err(DumpError::UnsupportedFormat(path)),
    }
    debug!("Wrote {}", path.display());
    Ok(path)
}

fn read_existing(path: &Path) -> Result<Option<String>, DumpError> {
    if !path.exists() {
        return Ok(None);
    }
    fs::read_to_string(path)
        .map(Some)
        .map_err(|source| DumpError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn write(path: &Path, content: &str) -> Result<(), DumpError> {
    fs::write(path, content).map_err(|source| DumpError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn dump_toml(path: &Path, setting: &SettingFile) -> Result<(), DumpError> {
    let mut document: Table = match read_existing(path)? {
        Some(text) => toml::from_str(&text).map_err(|source| DumpError::Parse {
            path: path.to_path_buf(),
            source,
        })?,
        None => Table::new(),
    };

    for (section, data) in setting.entries() {
        SettingFile::update_by_entry(&mut document, section, data, true)?;
    }

    let content = toml::to_string(&document).map_err(|source| DumpError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    write(path, &content)
}

/// One `[section]` of an INI document with its raw lines.
#[derive(Debug, Clone, PartialEq, Eq)]
struct IniSection {
    name: Option<String>,
    lines: Vec<String>,
}

fn parse_ini(text: &str) -> Vec<IniSection> {
    let mut sections = vec![IniSection {
        name: None,
        lines: Vec::new(),
    }];
    for line in text.lines() {
        let trimmed = line.trim();
        if let Some(name) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            sections.push(IniSection {
                name: Some(name.trim().to_string()),
                lines: Vec::new(),
            });
            continue;
        }
        if let Some(current) = sections.last_mut() {
            current.lines.push(line.to_string());
        }
    }
    sections
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Boolean(true) => "True".to_string(),
        Value::Boolean(false) => "False".to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(render_value).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

fn render_section(data: &Table) -> Vec<String> {
    let mut keys: Vec<&String> = data.keys().collect();
    keys.sort();
    keys.into_iter()
        .map(|key| {
            if key.starts_with('#') {
                key.clone()
            } else {
                format!("{} = {}", key, render_value(&data[key.as_str()]))
            }
        })
        .collect()
}

fn render_ini(sections: &[IniSection]) -> String {
    let mut out = String::new();
    for section in sections {
        let mut lines: Vec<&str> = section.lines.iter().map(String::as_str).collect();
        while lines.last().is_some_and(|l| l.trim().is_empty()) {
            lines.pop();
        }
        if section.name.is_none() && lines.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        if let Some(name) = &section.name {
            out.push_str(&format!("[{}]\n", name));
        }
        for line in lines {
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

fn dump_cfg(path: &Path, setting: &SettingFile) -> Result<(), DumpError> {
    let mut sections = match read_existing(path)? {
        Some(text) => parse_ini(&text),
        None => Vec::new(),
    };

    for (section_path, data) in setting.entries() {
        let name = section_path.join(".");
        let lines = render_section(data);
        match sections
            .iter_mut()
            .find(|s| s.name.as_deref() == Some(name.as_str()))
        {
            Some(existing) => existing.lines = lines,
            None => sections.push(IniSection {
                name: Some(name),
                lines,
            }),
        }
    }

    write(path, &render_ini(&sections))
}
