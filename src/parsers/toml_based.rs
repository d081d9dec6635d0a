use std::path::Path;

use anyhow::Result;
use serde_json::{Map, Value};

use super::helpers::{
    excerpt, non_empty, parse_toml, read_manifest, sections_or_none, table_to_json,
};
use crate::models::ParsedManifest;
use crate::registry::{ManifestParserRegistry, ParserRegistration};

const CARGO_SECTIONS: &[&str] = &[
    "dependencies",
    "dev-dependencies",
    "build-dependencies",
    "target",
];

pub fn register(registry: &mut ManifestParserRegistry) {
    registry.register(
        ParserRegistration::new(parse_cargo_toml)
            .names(&["Cargo.toml"])
            .priority(80),
    );
    registry.register(
        ParserRegistration::new(parse_project_toml)
            .names(&["Project.toml"])
            .priority(70),
    );
    registry.register(
        ParserRegistration::new(parse_generic_toml)
            .suffixes(&[".toml"])
            .priority(10),
    );
}

/// Copy the named non-empty tables of a TOML document.
fn table_sections(document: &toml::Table, keys: &[&str]) -> Map<String, Value> {
    let mut sections = Map::new();
    for key in keys {
        if let Some(table) = document.get(*key).and_then(|v| v.as_table()) {
            if !table.is_empty() {
                sections.insert(key.to_string(), table_to_json(table));
            }
        }
    }
    sections
}

/// Parse `Cargo.toml`: dependency tables, `target` and `workspace.dependencies`.
pub fn parse_cargo_toml(path: &Path) -> Result<ParsedManifest> {
    let content = read_manifest(path)?;
    let document = parse_toml(&content)?;

    let mut data = table_sections(&document, CARGO_SECTIONS);
    if let Some(workspace) = document.get("workspace").and_then(|v| v.as_table()) {
        let workspace_deps = table_sections(workspace, &["dependencies"]);
        if let Some(deps) = workspace_deps.get("dependencies") {
            data.insert("workspace_dependencies".to_string(), deps.clone());
        }
    }

    Ok(ParsedManifest::new(
        "Cargo.toml",
        Some("cargo"),
        sections_or_none(data),
        excerpt(&content),
    ))
}

/// Parse Julia `Project.toml`.
pub fn parse_project_toml(path: &Path) -> Result<ParsedManifest> {
    let content = read_manifest(path)?;
    let document = parse_toml(&content)?;

    let mut data = Map::new();
    if let Some(project) = document.get("project").and_then(|v| v.as_table()) {
        data.insert("project".to_string(), table_to_json(project));
    }
    data.extend(table_sections(&document, &["deps", "compat"]));

    Ok(ParsedManifest::new(
        "Project.toml",
        Some("julia"),
        sections_or_none(data),
        excerpt(&content),
    ))
}

/// Catch-all for other TOML files: the whole document is kept.
pub fn parse_generic_toml(path: &Path) -> Result<ParsedManifest> {
    let content = read_manifest(path)?;
    let document = parse_toml(&content)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(ParsedManifest::new(
        file_name,
        None,
        non_empty(table_to_json(&document)),
        excerpt(&content),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_cargo_toml() {
        let content = r#"[package]
name = "demo"
version = "0.1.0"

[dependencies]
serde = { version = "1", features = ["derive"] }
anyhow = "1"

[dev-dependencies]
tempfile = "3"

[build-dependencies]

[target.'cfg(windows)'.dependencies]
winapi = "0.3"

[workspace.dependencies]
tokio = "1"
"#;
        let mut f = NamedTempFile::new().unwrap();
        write!(f, "{}", content).unwrap();
        let parsed = parse_cargo_toml(f.path()).unwrap();
        assert_eq!(parsed.manifest_type, "Cargo.toml");
        assert_eq!(parsed.manager.as_deref(), Some("cargo"));

        let data = parsed.data.unwrap();
        assert_eq!(data["dependencies"]["anyhow"], "1");
        assert_eq!(data["dependencies"]["serde"]["features"], json!(["derive"]));
        assert_eq!(data["dev-dependencies"]["tempfile"], "3");
        assert!(data.get("build-dependencies").is_none());
        assert_eq!(data["target"]["cfg(windows)"]["dependencies"]["winapi"], "0.3");
        assert_eq!(data["workspace_dependencies"]["tokio"], "1");
    }

    #[test]
    fn test_cargo_toml_without_dependencies() {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, "[package]\nname = \"bare\"\n").unwrap();
        assert!(parse_cargo_toml(f.path()).unwrap().data.is_none());
    }

    #[test]
    fn test_malformed_cargo_toml_is_an_error() {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, "[dependencies\nserde = \n").unwrap();
        assert!(parse_cargo_toml(f.path()).is_err());
    }

    #[test]
    fn test_parse_julia_project_toml() {
        let content = r#"name = "Example"
uuid = "7876af07-990d-54b4-ab0e-23690620f79a"

[deps]
JSON = "682c06a0-de6a-54ab-a142-c8b1cf79cde6"

[compat]
JSON = "0.21"
julia = "1.6"
"#;
        let mut f = NamedTempFile::new().unwrap();
        write!(f, "{}", content).unwrap();
        let parsed = parse_project_toml(f.path()).unwrap();
        assert_eq!(parsed.manager.as_deref(), Some("julia"));
        let data = parsed.data.unwrap();
        assert!(data.get("project").is_none());
        assert_eq!(data["deps"]["JSON"], "682c06a0-de6a-54ab-a142-c8b1cf79cde6");
        assert_eq!(data["compat"]["julia"], "1.6");
    }

    #[test]
    fn test_parse_generic_toml_keeps_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rust-toolchain.toml");
        std::fs::write(&path, "[toolchain]\nchannel = \"stable\"\n").unwrap();

        let parsed = parse_generic_toml(&path).unwrap();
        assert_eq!(parsed.manifest_type, "rust-toolchain.toml");
        assert!(parsed.manager.is_none());
        assert_eq!(parsed.data.unwrap(), json!({"toolchain": {"channel": "stable"}}));
    }
}
