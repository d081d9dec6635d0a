use std::path::Path;

use anyhow::{anyhow, bail, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use serde_json::{Map, Value};

use super::helpers::{dependency_list, excerpt, read_manifest};
use crate::models::ParsedManifest;
use crate::registry::{ManifestParserRegistry, ParserRegistration};

/// Gradle configurations whose string notation is extracted.
const GRADLE_CONFIGURATIONS: &str =
    "api|implementation|compileOnly|runtimeOnly|testImplementation|testCompileOnly";

pub fn register(registry: &mut ManifestParserRegistry) {
    registry.register(
        ParserRegistration::new(parse_pom_xml)
            .names(&["pom.xml"])
            .priority(80),
    );
    registry.register(
        ParserRegistration::new(parse_gradle)
            .names(&["build.gradle", "build.gradle.kts"])
            .priority(80),
    );
}

/// Parse `pom.xml` using quick-xml event API.
///
/// Every `<dependency>` element is collected, including those under
/// `<dependencyManagement>` and plugins. Only direct children of the element
/// are read, so `<exclusions>` do not overwrite coordinates.
pub fn parse_pom_xml(path: &Path) -> Result<ParsedManifest> {
    let content = read_manifest(path)?;
    let mut reader = Reader::from_str(&content);
    reader.config_mut().trim_text(true);

    let mut deps = Vec::new();
    let mut stack: Vec<String> = Vec::new();
    let mut current: Option<Map<String, Value>> = None;
    let mut saw_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().local_name().as_ref()).into_owned();
                if name == "dependency" {
                    current = Some(Map::new());
                }
                saw_root = true;
                stack.push(name);
            }
            Ok(Event::End(_)) => {
                if stack.pop().as_deref() == Some("dependency") {
                    if let Some(fields) = current.take() {
                        deps.push(pom_entry(fields));
                    }
                }
            }
            Ok(Event::Text(e)) => {
                let parent = stack.len().checked_sub(2).map(|i| stack[i].as_str());
                if let (Some("dependency"), Some(fields), Some(tag)) =
                    (parent, current.as_mut(), stack.last())
                {
                    if matches!(tag.as_str(), "groupId" | "artifactId" | "version" | "scope") {
                        let text = e.unescape().unwrap_or_default();
                        fields.insert(tag.clone(), Value::String(text.into_owned()));
                    }
                }
            }
            Ok(Event::Empty(_)) => saw_root = true,
            Ok(Event::Eof) => {
                if !saw_root {
                    bail!("malformed XML: no root element");
                }
                if let Some(open) = stack.last() {
                    bail!("malformed XML: unexpected end of file inside <{open}>");
                }
                break;
            }
            Err(e) => {
                return Err(anyhow!(
                    "malformed XML at byte {}: {}",
                    reader.buffer_position(),
                    e
                ))
            }
            _ => {}
        }
    }

    Ok(ParsedManifest::new(
        "pom_xml",
        Some("maven"),
        dependency_list(deps),
        excerpt(&content),
    ))
}

/// `groupId` and `artifactId` are always present (possibly null); `version`
/// and `scope` only when declared.
fn pom_entry(mut fields: Map<String, Value>) -> Value {
    let mut entry = Map::new();
    for key in ["groupId", "artifactId"] {
        entry.insert(key.to_string(), fields.remove(key).unwrap_or(Value::Null));
    }
    for key in ["version", "scope"] {
        if let Some(value) = fields.remove(key) {
            entry.insert(key.to_string(), value);
        }
    }
    Value::Object(entry)
}

/// Parse `build.gradle` or `build.gradle.kts` with regex.
///
/// Matches both Groovy (`implementation 'g:a:v'`) and Kotlin DSL
/// (`implementation("g:a:v")`) string notations, one per line.
pub fn parse_gradle(path: &Path) -> Result<ParsedManifest> {
    let content = read_manifest(path)?;
    let re = Regex::new(&format!(
        r#"^\s*({GRADLE_CONFIGURATIONS})(?:\s+|\s*\(\s*)['"]([^'"]+)['"]"#
    ))?;

    let mut deps = Vec::new();
    for line in content.lines() {
        if let Some(caps) = re.captures(line) {
            let mut entry = Map::new();
            entry.insert("configuration".to_string(), Value::String(caps[1].to_string()));
            entry.insert("notation".to_string(), Value::String(caps[2].to_string()));
            deps.push(Value::Object(entry));
        }
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "build.gradle".to_string());

    Ok(ParsedManifest::new(
        file_name,
        Some("gradle"),
        dependency_list(deps),
        excerpt(&content),
    ))
}
