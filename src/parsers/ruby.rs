use std::path::Path;

use anyhow::Result;
use regex::Regex;
use serde_json::Value;

use super::helpers::{dependency_list, excerpt, name_version, read_manifest};
use crate::models::ParsedManifest;
use crate::registry::{ManifestParserRegistry, ParserRegistration};

pub fn register(registry: &mut ManifestParserRegistry) {
    registry.register(
        ParserRegistration::new(parse_gemfile)
            .names(&["Gemfile"])
            .priority(70),
    );
    registry.register(
        ParserRegistration::new(parse_gemspec)
            .patterns(&["*.gemspec"])
            .priority(70),
    );
}

/// Parse `Gemfile`: `gem "name"[, "requirement"]` lines.
pub fn parse_gemfile(path: &Path) -> Result<ParsedManifest> {
    let content = read_manifest(path)?;
    let re = Regex::new(r#"^\s*gem\s+['"]([^'"]+)['"](?:\s*,\s*['"]([^'"]+)['"])?"#)?;

    let deps: Vec<Value> = content
        .lines()
        .filter_map(|line| re.captures(line))
        .map(|caps| name_version(&caps[1], caps.get(2).map(|m| m.as_str())))
        .collect();

    Ok(ParsedManifest::new(
        "Gemfile",
        Some("bundler"),
        dependency_list(deps),
        excerpt(&content),
    ))
}

/// Parse `*.gemspec`: `add_dependency`, `add_runtime_dependency` and
/// `add_development_dependency` calls, with or without parentheses.
pub fn parse_gemspec(path: &Path) -> Result<ParsedManifest> {
    let content = read_manifest(path)?;
    let re = Regex::new(
        r#"add_(runtime_|development_)?dependency\s*\(?\s*['"]([^'"]+)['"](?:\s*,\s*['"]([^'"]+)['"])?"#,
    )?;

    let mut deps = Vec::new();
    for line in content.lines() {
        let Some(caps) = re.captures(line) else {
            continue;
        };
        let mut entry = name_version(&caps[2], caps.get(3).map(|m| m.as_str()));
        if caps.get(1).map(|m| m.as_str()) == Some("development_") {
            if let Value::Object(fields) = &mut entry {
                fields.insert("development".to_string(), Value::Bool(true));
            }
        }
        deps.push(entry);
    }

    Ok(ParsedManifest::new(
        "gemspec",
        Some("bundler"),
        dependency_list(deps),
        excerpt(&content),
    ))
}
