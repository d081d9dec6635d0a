use std::path::Path;

use anyhow::Result;
use regex::Regex;
use serde_json::Value;

use super::helpers::{dependency_list, excerpt, name_version, read_manifest};
use crate::models::ParsedManifest;
use crate::registry::{ManifestParserRegistry, ParserRegistration};

pub fn register(registry: &mut ManifestParserRegistry) {
    registry.register(
        ParserRegistration::new(parse_deps_edn)
            .names(&["deps.edn"])
            .priority(60),
    );
    registry.register(
        ParserRegistration::new(parse_project_clj)
            .names(&["project.clj"])
            .priority(60),
    );
}

/// Parse `deps.edn`: `group/artifact {:mvn/version "v"}` coordinates.
pub fn parse_deps_edn(path: &Path) -> Result<ParsedManifest> {
    let content = read_manifest(path)?;
    let re = Regex::new(r#"([A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+)\s+\{\s*:mvn/version\s+"([^"]+)""#)?;

    Ok(ParsedManifest::new(
        "deps_edn",
        Some("clojure"),
        dependency_list(coordinates(&re, &content)),
        excerpt(&content),
    ))
}

/// Parse Leiningen `project.clj`: `[group/artifact "v"]` vectors.
pub fn parse_project_clj(path: &Path) -> Result<ParsedManifest> {
    let content = read_manifest(path)?;
    let re = Regex::new(r#"\[([\w.-]+/[\w.-]+)\s+"([^"]+)""#)?;

    Ok(ParsedManifest::new(
        "project_clj",
        Some("leiningen"),
        dependency_list(coordinates(&re, &content)),
        excerpt(&content),
    ))
}

fn coordinates(re: &Regex, content: &str) -> Vec<Value> {
    re.captures_iter(content)
        .map(|caps| name_version(&caps[1], Some(&caps[2])))
        .collect()
}
