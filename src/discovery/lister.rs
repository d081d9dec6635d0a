use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::config::ExclusionConfig;
use crate::ignore::IgnoreMatcher;

type KeepFn = dyn Fn(&Path) -> bool + Send + Sync;

/// Bounded, deterministic directory walk with an exclusion overlay.
///
/// Entries are visited in lexicographic file-name order. Excluded directories
/// are never descended; excluded file names and extensions are dropped unless
/// the `keep` override accepts the path. Unreadable entries are skipped.
#[derive(Clone)]
pub struct FileLister {
    filters: Filters,
}

#[derive(Clone)]
struct Filters {
    root: PathBuf,
    excluded_dirs: HashSet<String>,
    excluded_files: HashSet<String>,
    excluded_extensions: Vec<String>,
    max_depth: usize,
    ignore: Option<Arc<dyn IgnoreMatcher>>,
    keep: Option<Arc<KeepFn>>,
}

impl FileLister {
    pub fn new(root: impl Into<PathBuf>, exclusions: &ExclusionConfig) -> Self {
        Self {
            filters: Filters {
                root: root.into(),
                excluded_dirs: exclusions.dirs.iter().cloned().collect(),
                excluded_files: exclusions.files.iter().cloned().collect(),
                excluded_extensions: exclusions
                    .extensions
                    .iter()
                    .map(|e| e.to_lowercase())
                    .collect(),
                max_depth: usize::MAX,
                ignore: None,
                keep: None,
            },
        }
    }

    /// Number of directory levels below the root to descend. `0` lists only
    /// the root's own files.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.filters.max_depth = max_depth;
        self
    }

    pub fn ignore(mut self, ignore: Option<Arc<dyn IgnoreMatcher>>) -> Self {
        self.filters.ignore = ignore;
        self
    }

    /// Accept files even when their name or extension is excluded.
    pub fn keep(mut self, keep: impl Fn(&Path) -> bool + Send + Sync + 'static) -> Self {
        self.filters.keep = Some(Arc::new(keep));
        self
    }

    /// Start a fresh walk. Each call restarts from the root.
    pub fn walk(&self) -> impl Iterator<Item = PathBuf> {
        let filters = Arc::new(self.filters.clone());
        let entry_filters = Arc::clone(&filters);

        let root = filters.root.clone();
        let depth = filters.max_depth.saturating_add(1);

        WalkDir::new(root)
            .min_depth(1)
            .max_depth(depth)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| entry_filters.keep_entry(entry))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    debug!(error = %err, "skipping unreadable entry");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(move |entry| filters.keep_file(entry.path()))
            .map(DirEntry::into_path)
    }
}

impl Filters {
    fn keep_entry(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return true;
        }
        let is_dir = entry.file_type().is_dir();
        if is_dir {
            let name = entry.file_name().to_string_lossy();
            if self.excluded_dirs.contains(name.as_ref()) {
                return false;
            }
        }
        if let Some(ignore) = &self.ignore {
            let relative = entry.path().strip_prefix(&self.root).unwrap_or(entry.path());
            if ignore.is_ignored(relative, is_dir) {
                debug!(path = %relative.display(), "ignored by ignore file");
                return false;
            }
        }
        true
    }

    fn keep_file(&self, path: &Path) -> bool {
        if let Some(keep) = &self.keep {
            if keep(path) {
                return true;
            }
        }
        let name = match path.file_name() {
            Some(name) => name.to_string_lossy(),
            None => return false,
        };
        if self.excluded_files.contains(name.as_ref()) {
            return false;
        }
        let lower = name.to_lowercase();
        !self
            .excluded_extensions
            .iter()
            .any(|ext| lower.ends_with(ext.as_str()))
    }
}
