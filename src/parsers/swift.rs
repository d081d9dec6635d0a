use std::path::Path;

use anyhow::Result;
use regex::Regex;
use serde_json::{Map, Value};

use super::helpers::{dependency_list, excerpt, read_manifest};
use crate::models::ParsedManifest;
use crate::registry::{ManifestParserRegistry, ParserRegistration};

pub fn register(registry: &mut ManifestParserRegistry) {
    registry.register(
        ParserRegistration::new(parse_package_swift)
            .names(&["Package.swift"])
            .priority(60),
    );
}

/// Parse `Package.swift` `.package(...)` declarations that pin `from:` or `exact:`.
///
/// A declaration may span lines. `name:` entries keep the declared name;
/// `url:` entries are named after the last URL segment and keep the URL.
pub fn parse_package_swift(path: &Path) -> Result<ParsedManifest> {
    let content = read_manifest(path)?;
    let re = Regex::new(r#"\.package\s*\(\s*(name|url):\s*"([^"]+)"[^)]*?(?:from|exact):\s*"([^"]+)""#)?;

    let mut deps = Vec::new();
    for caps in re.captures_iter(&content) {
        let mut entry = Map::new();
        if &caps[1] == "url" {
            let url = &caps[2];
            entry.insert("name".to_string(), Value::String(package_name_from_url(url)));
            entry.insert("url".to_string(), Value::String(url.to_string()));
        } else {
            entry.insert("name".to_string(), Value::String(caps[2].to_string()));
        }
        entry.insert("version".to_string(), Value::String(caps[3].to_string()));
        deps.push(Value::Object(entry));
    }

    Ok(ParsedManifest::new(
        "Package.swift",
        Some("swiftpm"),
        dependency_list(deps),
        excerpt(&content),
    ))
}

fn package_name_from_url(url: &str) -> String {
    let last = url.trim_end_matches('/').rsplit('/').next().unwrap_or(url);
    last.strip_suffix(".git").unwrap_or(last).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_package_swift() {
        let content = r#"// swift-tools-version:5.9
import PackageDescription

let package = Package(
    name: "App",
    dependencies: [
        .package(name: "Alamofire",
                 url: "https://github.com/Alamofire/Alamofire.git",
                 from: "5.8.0"),
        .package(url: "https://github.com/apple/swift-nio.git", exact: "2.62.0"),
        .package(path: "../Local"),
    ]
)
"#;
        let mut f = NamedTempFile::new().unwrap();
        write!(f, "{}", content).unwrap();
        let parsed = parse_package_swift(f.path()).unwrap();
        assert_eq!(parsed.manifest_type, "Package.swift");
        assert_eq!(parsed.manager.as_deref(), Some("swiftpm"));
        assert_eq!(
            parsed.data.unwrap(),
            json!({"dependencies": [
                {"name": "Alamofire", "version": "5.8.0"},
                {
                    "name": "swift-nio",
                    "url": "https://github.com/apple/swift-nio.git",
                    "version": "2.62.0"
                }
            ]})
        );
    }

    #[test]
    fn test_package_name_from_url() {
        assert_eq!(package_name_from_url("https://github.com/a/b.git"), "b");
        assert_eq!(package_name_from_url("https://github.com/a/b/"), "b");
    }
}
