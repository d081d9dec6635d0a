use std::path::Path;

use anyhow::{anyhow, bail, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

use super::helpers::{dependency_list, excerpt, read_manifest};
use crate::models::ParsedManifest;
use crate::registry::{ManifestParserRegistry, ParserRegistration};

pub fn register(registry: &mut ManifestParserRegistry) {
    registry.register(
        ParserRegistration::new(parse_project_file)
            .patterns(&["*.csproj", "*.fsproj", "*.vbproj"])
            .priority(70),
    );
}

/// A `<PackageReference>` being read; the version may arrive as an attribute
/// or as a child `<Version>` element.
struct PendingReference {
    package: String,
    version: Option<String>,
}

impl PendingReference {
    fn from_element(e: &BytesStart) -> Option<Self> {
        let mut package = None;
        let mut version = None;
        for attr in e.attributes().flatten() {
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let val = attr.unescape_value().unwrap_or_default().into_owned();
            match key.as_str() {
                "Include" => package = Some(val),
                "Version" => version = Some(val),
                _ => {}
            }
        }
        package
            .filter(|p| !p.is_empty())
            .map(|package| Self { package, version })
    }

    fn into_value(self) -> Value {
        let mut entry = Map::new();
        entry.insert("package".to_string(), Value::String(self.package));
        if let Some(version) = self.version.filter(|v| !v.is_empty()) {
            entry.insert("version".to_string(), Value::String(version));
        }
        Value::Object(entry)
    }
}

/// Parse SDK-style `*.csproj` / `*.fsproj` / `*.vbproj` `PackageReference` items.
pub fn parse_project_file(path: &Path) -> Result<ParsedManifest> {
    let content = read_manifest(path)?;
    let mut reader = Reader::from_str(&content);
    reader.config_mut().trim_text(true);

    let mut deps = Vec::new();
    let mut pending: Option<PendingReference> = None;
    let mut in_version = false;
    let mut depth = 0usize;
    let mut saw_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) => {
                saw_root = true;
                if e.name().local_name().as_ref() == b"PackageReference" {
                    if let Some(reference) = PendingReference::from_element(&e) {
                        deps.push(reference.into_value());
                    }
                }
            }
            Ok(Event::Start(e)) => {
                saw_root = true;
                depth += 1;
                match e.name().local_name().as_ref() {
                    b"PackageReference" => pending = PendingReference::from_element(&e),
                    b"Version" => in_version = pending.is_some(),
                    _ => {}
                }
            }
            Ok(Event::Text(e)) => {
                if in_version {
                    if let Some(reference) = pending.as_mut() {
                        if reference.version.is_none() {
                            let text = e.unescape().unwrap_or_default();
                            reference.version = Some(text.into_owned());
                        }
                    }
                }
            }
            Ok(Event::End(e)) => {
                depth = depth.saturating_sub(1);
                match e.name().local_name().as_ref() {
                    b"PackageReference" => {
                        if let Some(reference) = pending.take() {
                            deps.push(reference.into_value());
                        }
                    }
                    b"Version" => in_version = false,
                    _ => {}
                }
            }
            Ok(Event::Eof) => {
                if !saw_root {
                    bail!("malformed XML: no root element");
                }
                if depth > 0 {
                    bail!("malformed XML: unexpected end of file with {depth} unclosed element(s)");
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

    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(ParsedManifest::new(
        format!("{extension}_project"),
        Some(".net"),
        dependency_list(deps),
        excerpt(&content),
    ))
}
