//! Persistence layer for settings: a plain key=value env file.
//!
//! The file is human-editable. Blank lines and `#` comments are kept intact
//! when a key is updated or removed; only the affected line changes.

use crate::Result;
use std::fs;
use std::path::Path;

/// Read all key=value pairs from the env file.
///
/// A missing file is not an error and yields an empty list. Lines that are
/// blank, comments, or have no `=` are skipped. Surrounding single or double
/// quotes on the value are stripped.
pub fn read(path: &Path) -> Result<Vec<(String, String)>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let contents = fs::read_to_string(path)?;
    let mut pairs = Vec::new();

    for line in contents.lines() {
        if let Some((key, value)) = parse_line(line) {
            pairs.push((key.to_string(), value.to_string()));
        }
    }

    Ok(pairs)
}

/// Set `name` to `value`, rewriting the line in place if the key already
/// exists and appending otherwise. Creates the file if it does not exist.
pub fn set_key(path: &Path, name: &str, value: &str) -> Result<()> {
    let contents = if path.exists() {
        fs::read_to_string(path)?
    } else {
        String::new()
    };

    let mut lines: Vec<String> = contents.lines().map(str::to_string).collect();
    let mut replaced = false;

    for line in &mut lines {
        if parse_line(line).is_some_and(|(key, _)| key == name) {
            *line = format!("{}={}", name, value);
            replaced = true;
            break;
        }
    }

    if !replaced {
        lines.push(format!("{}={}", name, value));
    }

    write_lines(path, &lines)
}

/// Remove `name` from the env file. A missing file or absent key is a no-op.
pub fn unset_key(path: &Path, name: &str) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }

    let contents = fs::read_to_string(path)?;
    let lines: Vec<String> = contents
        .lines()
        .filter(|line| !parse_line(line).is_some_and(|(key, _)| key == name))
        .map(str::to_string)
        .collect();

    write_lines(path, &lines)
}

fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
    let mut contents = lines.join("\n");
    if !contents.is_empty() {
        contents.push('\n');
    }
    fs::write(path, contents)?;
    Ok(())
}

fn parse_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }

    let value = value.trim();
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(value);

    Some((key, value))
}
