use std::path::Path;

use anyhow::Result;
use serde_json::Value;

use super::helpers::{excerpt, object_sections, read_manifest, sections_or_none};
use crate::models::ParsedManifest;
use crate::registry::{ManifestParserRegistry, ParserRegistration};

pub fn register(registry: &mut ManifestParserRegistry) {
    registry.register(
        ParserRegistration::new(parse_composer_json)
            .names(&["composer.json"])
            .priority(90),
    );
}

/// Parse `composer.json`: `require` and `require-dev`.
pub fn parse_composer_json(path: &Path) -> Result<ParsedManifest> {
    let content = read_manifest(path)?;
    let json: Value = serde_json::from_str(&content)?;

    Ok(ParsedManifest::new(
        "composer_json",
        Some("composer"),
        sections_or_none(object_sections(&json, &["require", "require-dev"])),
        excerpt(&content),
    ))
}
