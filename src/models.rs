use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Normalized description of one dependency manifest.
///
/// `data` is `None` when the manifest was read but nothing dependency-related
/// was found. A failed parse is signalled by `error`, never by `data` alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestRecord {
    /// Forward-slash path, relative to the scanned directory.
    pub path: String,
    #[serde(rename = "type")]
    pub manifest_type: String,
    pub manager: Option<String>,
    pub data: Option<Value>,
    pub raw_excerpt: Option<String>,
    pub error: Option<String>,
}

impl ManifestRecord {
    /// Attach a location to a parser's output.
    pub fn from_parsed(path: &Path, parsed: ParsedManifest) -> Self {
        Self {
            path: to_posix(path),
            manifest_type: parsed.manifest_type,
            manager: parsed.manager,
            data: parsed.data,
            raw_excerpt: parsed.raw_excerpt,
            error: None,
        }
    }

    /// Number of entries extracted, counted at the first level of `data`
    /// sections (objects and arrays) for display purposes.
    pub fn dependency_count(&self) -> usize {
        fn count(value: &Value) -> usize {
            match value {
                Value::Array(items) => items.len(),
                Value::Object(map) => map.len(),
                Value::Null => 0,
                _ => 1,
            }
        }

        match &self.data {
            Some(Value::Object(sections)) => sections.values().map(count).sum(),
            Some(other) => count(other),
            None => 0,
        }
    }
}

/// What a parser produces before the orchestrator attaches a path.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedManifest {
    pub manifest_type: String,
    pub manager: Option<String>,
    pub data: Option<Value>,
    pub raw_excerpt: Option<String>,
}

impl ParsedManifest {
    pub fn new(
        manifest_type: impl Into<String>,
        manager: Option<&str>,
        data: Option<Value>,
        raw_excerpt: String,
    ) -> Self {
        Self {
            manifest_type: manifest_type.into(),
            manager: manager.map(str::to_string),
            data,
            raw_excerpt: Some(raw_excerpt),
        }
    }
}

/// Result of a full scan: every record plus the manager digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyReport {
    pub manifests: Vec<ManifestRecord>,
    pub summary: BTreeMap<String, Vec<String>>,
}

impl DependencyReport {
    /// Wrap scanned records, deriving the summary from them.
    pub fn new(manifests: Vec<ManifestRecord>) -> Self {
        let summary = crate::metadata::build_summary(&manifests);
        Self { manifests, summary }
    }
}

/// Render a path with `/` separators regardless of platform.
pub fn to_posix(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
        .replace("//", "/")
}
