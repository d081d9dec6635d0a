use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{Map, Value};

/// Line cap applied to every `raw_excerpt`.
pub const DEFAULT_EXCERPT_LINES: usize = 40;

/// Final line of a truncated excerpt.
pub const TRUNCATION_MARKER: &str = "…";

/// Read a manifest, replacing invalid UTF-8 instead of failing.
pub fn read_manifest(path: &Path) -> Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Keep at most `max_lines` lines: content over the cap is cut to
/// `max_lines - 1` lines followed by [`TRUNCATION_MARKER`].
pub fn trim_excerpt(content: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    if lines.len() <= max_lines {
        return content.to_string();
    }
    let mut snippet = lines[..max_lines.saturating_sub(1)].join("\n");
    snippet.push('\n');
    snippet.push_str(TRUNCATION_MARKER);
    snippet
}

/// [`trim_excerpt`] with the default cap.
pub fn excerpt(content: &str) -> String {
    trim_excerpt(content, DEFAULT_EXCERPT_LINES)
}

/// `None` for null and for empty objects, arrays and strings.
pub fn non_empty(value: Value) -> Option<Value> {
    match &value {
        Value::Null => None,
        Value::Object(map) if map.is_empty() => None,
        Value::Array(items) if items.is_empty() => None,
        Value::String(s) if s.is_empty() => None,
        _ => Some(value),
    }
}

/// Wrap collected sections, or `None` when nothing was collected.
pub fn sections_or_none(sections: Map<String, Value>) -> Option<Value> {
    non_empty(Value::Object(sections))
}

/// `{"dependencies": [...]}` when `entries` is non-empty.
pub fn dependency_list(entries: Vec<Value>) -> Option<Value> {
    if entries.is_empty() {
        return None;
    }
    let mut sections = Map::new();
    sections.insert("dependencies".to_string(), Value::Array(entries));
    Some(Value::Object(sections))
}

/// Copy the named keys of a JSON document that hold non-empty objects.
pub fn object_sections(document: &Value, keys: &[&str]) -> Map<String, Value> {
    let mut sections = Map::new();
    for key in keys {
        if let Some(section) = document.get(*key).and_then(|v| v.as_object()) {
            if !section.is_empty() {
                sections.insert(key.to_string(), Value::Object(section.clone()));
            }
        }
    }
    sections
}

pub fn parse_toml(content: &str) -> Result<toml::Table> {
    Ok(content.parse::<toml::Table>()?)
}

/// Convert a TOML value to JSON. Datetimes become their TOML string form.
pub fn toml_to_json(value: &toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s.clone()),
        toml::Value::Integer(i) => Value::from(*i),
        toml::Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => table_to_json(table),
    }
}

pub fn table_to_json(table: &toml::Table) -> Value {
    Value::Object(
        table
            .iter()
            .map(|(k, v)| (k.clone(), toml_to_json(v)))
            .collect(),
    )
}

/// Remove one pair of matching surrounding quotes.
pub fn unquote(text: &str) -> &str {
    let text = text.trim();
    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return &text[1..text.len() - 1];
        }
    }
    text
}

/// `{name, version?}` entry used by the heuristic parsers.
pub fn name_version(name: &str, version: Option<&str>) -> Value {
    let mut entry = Map::new();
    entry.insert("name".to_string(), Value::String(name.to_string()));
    if let Some(version) = version.filter(|v| !v.is_empty()) {
        entry.insert("version".to_string(), Value::String(version.to_string()));
    }
    Value::Object(entry)
}
