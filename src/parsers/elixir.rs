use std::path::Path;

use anyhow::Result;
use regex::Regex;
use serde_json::Value;

use super::helpers::{dependency_list, excerpt, name_version, read_manifest};
use crate::models::ParsedManifest;
use crate::registry::{ManifestParserRegistry, ParserRegistration};

pub fn register(registry: &mut ManifestParserRegistry) {
    registry.register(
        ParserRegistration::new(parse_mix_exs)
            .names(&["mix.exs"])
            .priority(60),
    );
}

/// Parse `mix.exs`: `{:name, "requirement"}` tuples anywhere in the file.
pub fn parse_mix_exs(path: &Path) -> Result<ParsedManifest> {
    let content = read_manifest(path)?;
    let re = Regex::new(r#"\{\s*:([^,\s]+)\s*,\s*"([^"]+)""#)?;

    let deps: Vec<Value> = re
        .captures_iter(&content)
        .map(|caps| name_version(&caps[1], Some(&caps[2])))
        .collect();

    Ok(ParsedManifest::new(
        "mix_exs",
        Some("mix"),
        dependency_list(deps),
        excerpt(&content),
    ))
}
