use std::path::Path;

use anyhow::Result;
use serde_json::{Map, Value};

use super::helpers::{excerpt, read_manifest, sections_or_none};
use crate::models::ParsedManifest;
use crate::registry::{ManifestParserRegistry, ParserRegistration};

pub fn register(registry: &mut ManifestParserRegistry) {
    registry.register(
        ParserRegistration::new(parse_go_mod)
            .names(&["go.mod"])
            .priority(80),
    );
}

/// Parse `go.mod`: `module`, `go` and `require` directives (block and single-line).
pub fn parse_go_mod(path: &Path) -> Result<ParsedManifest> {
    let content = read_manifest(path)?;

    let mut module_name: Option<&str> = None;
    let mut go_version: Option<&str> = None;
    let mut deps = Vec::new();
    let mut in_require_block = false;

    for raw in content.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        if let Some(rest) = line.strip_prefix("module ") {
            module_name = Some(rest.trim());
            continue;
        }
        if let Some(rest) = line.strip_prefix("go ") {
            go_version = Some(rest.trim());
            continue;
        }
        if line == "require (" || line == "require(" {
            in_require_block = true;
            continue;
        }
        if in_require_block && line == ")" {
            in_require_block = false;
            continue;
        }
        if in_require_block {
            if let Some(entry) = require_entry(line) {
                deps.push(entry);
            }
            continue;
        }
        if let Some(rest) = line.strip_prefix("require ") {
            if let Some(entry) = require_entry(rest) {
                deps.push(entry);
            }
        }
    }

    let mut data = Map::new();
    if let Some(module_name) = module_name {
        data.insert("module".to_string(), Value::String(module_name.to_string()));
    }
    if let Some(go_version) = go_version {
        data.insert("go".to_string(), Value::String(go_version.to_string()));
    }
    if !deps.is_empty() {
        data.insert("dependencies".to_string(), Value::Array(deps));
    }

    Ok(ParsedManifest::new(
        "go_mod",
        Some("go"),
        sections_or_none(data),
        excerpt(&content),
    ))
}

/// `path version [// indirect]` → `{module, version, indirect?}`.
fn require_entry(line: &str) -> Option<Value> {
    let (line, comment) = match line.split_once("//") {
        Some((line, comment)) => (line, Some(comment.trim())),
        None => (line, None),
    };
    let mut parts = line.split_whitespace();
    let module = parts.next()?;
    let version = parts.next()?;

    let mut entry = Map::new();
    entry.insert("module".to_string(), Value::String(module.to_string()));
    entry.insert("version".to_string(), Value::String(version.to_string()));
    if comment == Some("indirect") {
        entry.insert("indirect".to_string(), Value::Bool(true));
    }
    Some(Value::Object(entry))
}
