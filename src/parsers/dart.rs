use std::path::Path;

use anyhow::Result;
use serde_json::{Map, Value};

use super::helpers::{excerpt, read_manifest, sections_or_none, unquote};
use crate::models::ParsedManifest;
use crate::registry::{ManifestParserRegistry, ParserRegistration};

const SECTIONS: &[&str] = &["dependencies", "dev_dependencies"];

pub fn register(registry: &mut ManifestParserRegistry) {
    registry.register(
        ParserRegistration::new(parse_pubspec_yaml)
            .names(&["pubspec.yaml"])
            .priority(60),
    );
}

/// Parse `pubspec.yaml` dependency blocks without a YAML parser.
///
/// Direct children of `dependencies:` / `dev_dependencies:` map a package to
/// its version text. A package declared with a nested block
/// (`flutter:\n  sdk: flutter`) maps to an object of the nested `key: value`
/// lines. Any other top-level key ends the block.
pub fn parse_pubspec_yaml(path: &Path) -> Result<ParsedManifest> {
    let content = read_manifest(path)?;

    let mut data = Map::new();
    let mut section: Option<&str> = None;
    let mut child_indent: Option<usize> = None;
    let mut last_package: Option<String> = None;

    for raw in content.lines() {
        let line = raw.trim_end();
        let stripped = line.trim_start();
        if stripped.is_empty() || stripped.starts_with('#') {
            continue;
        }
        let indent = line.len() - stripped.len();

        if indent == 0 {
            let key = stripped.split(':').next().unwrap_or_default().trim();
            section = SECTIONS.iter().copied().find(|s| *s == key);
            child_indent = None;
            last_package = None;
            if let Some(name) = section {
                data.entry(name.to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
            }
            continue;
        }

        let Some(name) = section else {
            continue;
        };
        let Some((key, value)) = stripped.split_once(':') else {
            continue;
        };
        let key = unquote(key).to_string();
        let value = unquote(value).to_string();
        let Some(Value::Object(packages)) = data.get_mut(name) else {
            continue;
        };

        let direct = *child_indent.get_or_insert(indent);
        if indent <= direct {
            let entry = if value.is_empty() {
                Value::Null
            } else {
                Value::String(value)
            };
            packages.insert(key.clone(), entry);
            last_package = Some(key);
        } else if let Some(package) = last_package.as_ref() {
            if let Some(slot) = packages.get_mut(package) {
                if !slot.is_object() {
                    *slot = Value::Object(Map::new());
                }
                if let Value::Object(nested) = slot {
                    nested.insert(key, Value::String(value));
                }
            }
        }
    }

    let data: Map<String, Value> = data
        .into_iter()
        .filter(|(_, packages)| packages.as_object().is_some_and(|m| !m.is_empty()))
        .collect();

    Ok(ParsedManifest::new(
        "pubspec_yaml",
        Some("dart"),
        sections_or_none(data),
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
    fn test_parse_pubspec_yaml() {
        let content = r#"name: app
version: 1.0.0

dependencies:
  flutter:
    sdk: flutter
  http: ^1.1.0
  # pinned for the web build
  intl: "0.18.1"

dev_dependencies:
  flutter_test:
    sdk: flutter
  lints: ^3.0.0

flutter:
  uses-material-design: true
"#;
        let mut f = NamedTempFile::new().unwrap();
        write!(f, "{}", content).unwrap();
        let parsed = parse_pubspec_yaml(f.path()).unwrap();
        assert_eq!(parsed.manifest_type, "pubspec_yaml");
        assert_eq!(parsed.manager.as_deref(), Some("dart"));
        assert_eq!(
            parsed.data.unwrap(),
            json!({
                "dependencies": {
                    "flutter": {"sdk": "flutter"},
                    "http": "^1.1.0",
                    "intl": "0.18.1"
                },
                "dev_dependencies": {
                    "flutter_test": {"sdk": "flutter"},
                    "lints": "^3.0.0"
                }
            })
        );
    }

    #[test]
    fn test_empty_sections_are_dropped() {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, "name: app\ndependencies:\nenvironment:\n  sdk: '>=3.0.0 <4.0.0'\n").unwrap();
        let parsed = parse_pubspec_yaml(f.path()).unwrap();
        assert!(parsed.data.is_none());
    }
}
