use std::path::Path;

use anyhow::Result;
use serde_json::Value;

use super::helpers::{excerpt, object_sections, read_manifest, sections_or_none};
use crate::models::ParsedManifest;
use crate::registry::{ManifestParserRegistry, ParserRegistration};

const SECTIONS: &[&str] = &[
    "dependencies",
    "devDependencies",
    "peerDependencies",
    "optionalDependencies",
];

pub fn register(registry: &mut ManifestParserRegistry) {
    registry.register(
        ParserRegistration::new(parse_package_json)
            .names(&["package.json"])
            .priority(100),
    );
}

/// Parse `package.json`: dependency sections are kept verbatim under their keys.
pub fn parse_package_json(path: &Path) -> Result<ParsedManifest> {
    let content = read_manifest(path)?;
    let json: Value = serde_json::from_str(&content)?;

    Ok(ParsedManifest::new(
        "package_json",
        Some("npm"),
        sections_or_none(object_sections(&json, SECTIONS)),
        excerpt(&content),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_package_json() {
        let json = r#"{
  "name": "my-app",
  "dependencies": {"react": "^18.2.0"},
  "devDependencies": {"typescript": "5.4.0"},
  "peerDependencies": {}
}"#;
        let mut f = NamedTempFile::new().unwrap();
        write!(f, "{}", json).unwrap();
        let parsed = parse_package_json(f.path()).unwrap();
        assert_eq!(parsed.manifest_type, "package_json");
        assert_eq!(parsed.manager.as_deref(), Some("npm"));

        let data = parsed.data.unwrap();
        assert_eq!(data["dependencies"]["react"], "^18.2.0");
        assert_eq!(data["devDependencies"]["typescript"], "5.4.0");
        // Empty sections are dropped
        assert!(data.get("peerDependencies").is_none());
    }

    #[test]
    fn test_package_json_without_dependencies() {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, r#"{{"name": "bare", "version": "1.0.0"}}"#).unwrap();
        let parsed = parse_package_json(f.path()).unwrap();
        assert!(parsed.data.is_none());
        assert!(parsed.raw_excerpt.unwrap().contains("bare"));
    }

    #[test]
    fn test_malformed_package_json_is_an_error() {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, "{{ not json").unwrap();
        assert!(parse_package_json(f.path()).is_err());
    }
}
