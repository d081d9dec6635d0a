use std::path::Path;

use anyhow::Result;

use super::helpers::{excerpt, read_manifest};
use crate::models::ParsedManifest;

/// Fallback for files no registration claims: excerpt only.
pub fn parse_generic_text(path: &Path) -> Result<ParsedManifest> {
    let content = read_manifest(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(ParsedManifest::new(file_name, None, None, excerpt(&content)))
}
