//! Manifest discovery.
//!
//! [`lister::FileLister`] walks the tree under the exclusion overlay;
//! [`iter_manifest_files`] narrows the walk to files on the manifest
//! allow-list. The allow-list always wins over the file/extension deny-list.

pub mod lister;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use crate::config::{ExclusionConfig, ManifestConfig};
use crate::glob::Glob;
use crate::ignore::IgnoreMatcher;

pub use lister::FileLister;

/// File names inspected even when a global exclusion would drop them.
pub const MANIFEST_FILENAMES: &[&str] = &[
    // JavaScript / TypeScript
    "package.json",
    // Python
    "requirements.txt",
    "requirements-dev.txt",
    "requirements_prod.txt",
    "requirements_dev.txt",
    "requirements.in",
    "Pipfile",
    "pyproject.toml",
    "setup.cfg",
    "setup.py",
    "environment.yml",
    "environment.yaml",
    // Rust
    "Cargo.toml",
    // Go
    "go.mod",
    // PHP
    "composer.json",
    // Java / Kotlin
    "pom.xml",
    "build.gradle",
    "build.gradle.kts",
    // Ruby
    "Gemfile",
    // Swift
    "Package.swift",
    // Elixir
    "mix.exs",
    // Clojure
    "deps.edn",
    "project.clj",
    // Julia
    "Project.toml",
    // Dart / Flutter
    "pubspec.yaml",
];

/// Glob patterns for manifest variants. Patterns containing `/` are matched
/// against the trailing components of the path.
pub const MANIFEST_PATTERNS: &[&str] = &[
    "requirements*.txt",
    "requirements/*.txt",
    "*.csproj",
    "*.fsproj",
    "*.vbproj",
    "*.gemspec",
];

/// Recognized manifest names and patterns.
#[derive(Debug, Clone)]
pub struct ManifestAllowList {
    names: HashSet<String>,
    patterns: Vec<Glob>,
}

impl Default for ManifestAllowList {
    fn default() -> Self {
        Self {
            names: MANIFEST_FILENAMES.iter().map(|s| s.to_string()).collect(),
            patterns: MANIFEST_PATTERNS.iter().map(|p| Glob::fnmatch(p)).collect(),
        }
    }
}

impl ManifestAllowList {
    /// Built-in list extended with the `[manifests]` config section.
    pub fn from_config(config: &ManifestConfig) -> Self {
        let mut list = Self::default();
        list.names.extend(config.extra_names.iter().cloned());
        list.patterns
            .extend(config.extra_patterns.iter().map(|p| Glob::fnmatch(p)));
        list
    }

    pub fn matches(&self, path: &Path) -> bool {
        let name = match path.file_name() {
            Some(name) => name.to_string_lossy(),
            None => return false,
        };
        if self.names.contains(name.as_ref()) {
            return true;
        }
        self.patterns.iter().any(|glob| {
            if glob.as_str().contains('/') {
                let depth = glob.as_str().split('/').count();
                glob.is_match(&trailing_components(path, depth))
            } else {
                glob.is_match(&name)
            }
        })
    }
}

/// Whether `path` is on the built-in manifest allow-list.
pub fn is_manifest_candidate(path: &Path) -> bool {
    static BUILT_IN: OnceLock<ManifestAllowList> = OnceLock::new();
    BUILT_IN.get_or_init(ManifestAllowList::default).matches(path)
}

/// Last `count` components of `path`, joined with `/`.
fn trailing_components(path: &Path, count: usize) -> String {
    let parts: Vec<_> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    let start = parts.len().saturating_sub(count);
    parts[start..].join("/")
}

/// Yield manifest files under `directory`, respecting exclusion rules.
///
/// The iterator is lazy; call again to restart the walk.
pub fn iter_manifest_files(
    directory: &Path,
    exclusions: &ExclusionConfig,
    allow_list: Arc<ManifestAllowList>,
    ignore: Option<Arc<dyn IgnoreMatcher>>,
    max_depth: usize,
) -> impl Iterator<Item = PathBuf> {
    let keep_list = Arc::clone(&allow_list);
    FileLister::new(directory, exclusions)
        .max_depth(max_depth)
        .ignore(ignore)
        .keep(move |path| keep_list.matches(path))
        .walk()
        .filter(move |path| allow_list.matches(path))
}
