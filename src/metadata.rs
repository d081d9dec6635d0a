use std::collections::BTreeMap;
use std::path::Path;

use crate::models::ManifestRecord;

/// Summary key for records without a package manager.
pub const UNKNOWN_MANAGER: &str = "unknown";

/// Best-effort manifest type from the file name alone.
///
/// Used for records whose parser failed, so the type stays informative.
pub fn infer_manifest_type(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if name == "package.json" {
        return "package_json".to_string();
    }
    if path.extension().is_some_and(|ext| ext == "toml") {
        return name;
    }
    if name.to_lowercase().contains("requirements") {
        return "requirements_txt".to_string();
    }
    name
}

/// Group record paths by manager. Paths keep their input order.
pub fn build_summary(manifests: &[ManifestRecord]) -> BTreeMap<String, Vec<String>> {
    let mut summary: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for record in manifests {
        let manager = record.manager.as_deref().unwrap_or(UNKNOWN_MANAGER);
        summary
            .entry(manager.to_string())
            .or_default()
            .push(record.path.clone());
    }
    summary
}
