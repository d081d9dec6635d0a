//! Scan orchestration: discovery, parser resolution and record collection.
//!
//! Per-file parse failures become records with `error` set. The only error
//! that escapes a scan is [`ScanError::NoParser`], which requires a registry
//! assembled without a fallback parser.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use anyhow::anyhow;
use futures::future::join_all;
use indicatif::ProgressBar;
use tracing::{debug, warn};

use crate::config::{Config, ExclusionConfig};
use crate::discovery::{iter_manifest_files, ManifestAllowList};
use crate::error::ScanError;
use crate::ignore::IgnoreMatcher;
use crate::metadata::infer_manifest_type;
use crate::models::{to_posix, DependencyReport, ManifestRecord};
use crate::parsers::build_parser_registry;
use crate::parsers::helpers::{excerpt, read_manifest};
use crate::registry::ManifestParserRegistry;

/// Default for `[scan] max_depth`.
pub const DEFAULT_MAX_DEPTH: usize = 8;

/// The built-in registry, assembled on first use and shared afterwards.
pub fn default_registry() -> Arc<ManifestParserRegistry> {
    static REGISTRY: OnceLock<Arc<ManifestParserRegistry>> = OnceLock::new();
    Arc::clone(REGISTRY.get_or_init(|| Arc::new(build_parser_registry())))
}

/// Discovers and parses the manifests under a directory.
#[derive(Clone)]
pub struct Scanner {
    registry: Arc<ManifestParserRegistry>,
    exclusions: ExclusionConfig,
    allow_list: Arc<ManifestAllowList>,
    ignore: Option<Arc<dyn IgnoreMatcher>>,
    max_depth: usize,
    progress: Option<ProgressBar>,
}

impl Scanner {
    /// Scanner with default exclusions, the built-in allow-list and no ignore matcher.
    pub fn new(registry: Arc<ManifestParserRegistry>) -> Self {
        Self {
            registry,
            exclusions: ExclusionConfig::default(),
            allow_list: Arc::new(ManifestAllowList::default()),
            ignore: None,
            max_depth: DEFAULT_MAX_DEPTH,
            progress: None,
        }
    }

    /// Scanner using the `[scan]`, `[exclusions]` and `[manifests]` sections.
    pub fn from_config(registry: Arc<ManifestParserRegistry>, config: &Config) -> Self {
        Self::new(registry)
            .exclusions(config.exclusions.clone())
            .allow_list(ManifestAllowList::from_config(&config.manifests))
            .max_depth(config.scan.max_depth)
    }

    pub fn exclusions(mut self, exclusions: ExclusionConfig) -> Self {
        self.exclusions = exclusions;
        self
    }

    pub fn allow_list(mut self, allow_list: ManifestAllowList) -> Self {
        self.allow_list = Arc::new(allow_list);
        self
    }

    pub fn ignore(mut self, ignore: Option<Arc<dyn IgnoreMatcher>>) -> Self {
        self.ignore = ignore;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Advance `progress` once per parsed manifest in [`Scanner::scan_concurrent`].
    pub fn progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Manifest candidates under `directory`, in walk order.
    pub fn discover(&self, directory: &Path) -> impl Iterator<Item = PathBuf> {
        iter_manifest_files(
            directory,
            &self.exclusions,
            Arc::clone(&self.allow_list),
            self.ignore.clone(),
            self.max_depth,
        )
    }

    /// Parse every candidate sequentially. Records follow walk order.
    pub fn scan(&self, directory: &Path) -> Result<Vec<ManifestRecord>, ScanError> {
        self.discover(directory)
            .map(|path| parse_manifest(&self.registry, directory, &path))
            .collect()
    }

    /// Parse candidates on the blocking pool, at most `jobs` at a time.
    ///
    /// Records are sorted by path, so the output does not depend on scheduling.
    pub async fn scan_concurrent(
        &self,
        directory: &Path,
        jobs: usize,
    ) -> Result<Vec<ManifestRecord>, ScanError> {
        let paths: Vec<PathBuf> = self.discover(directory).collect();
        if let Some(pb) = &self.progress {
            pb.set_length(paths.len() as u64);
        }

        let mut records = Vec::with_capacity(paths.len());
        for batch in paths.chunks(jobs.max(1)) {
            let tasks: Vec<_> = batch
                .iter()
                .map(|path| {
                    let registry = Arc::clone(&self.registry);
                    let root = directory.to_path_buf();
                    let path = path.clone();
                    tokio::task::spawn_blocking(move || parse_manifest(&registry, &root, &path))
                })
                .collect();

            let results = join_all(tasks).await;

            for (path, joined) in batch.iter().zip(results) {
                let record = match joined {
                    Ok(result) => result?,
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "parser task failed");
                        failed_record(directory, path, &anyhow!("parser task failed: {e}"))
                    }
                };
                records.push(record);
                if let Some(pb) = &self.progress {
                    pb.inc(1);
                }
            }
        }

        if let Some(pb) = &self.progress {
            pb.finish_and_clear();
        }

        records.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(records)
    }
}

/// Resolve and run the parser for one file.
///
/// Parser failures are captured in the returned record; only a missing
/// parser is an error.
pub fn parse_manifest(
    registry: &ManifestParserRegistry,
    root: &Path,
    path: &Path,
) -> Result<ManifestRecord, ScanError> {
    let parser = registry.resolve(path)?;
    let relative = path.strip_prefix(root).unwrap_or(path);

    match parser.parse(path) {
        Ok(parsed) => {
            debug!(
                path = %relative.display(),
                manifest_type = %parsed.manifest_type,
                "parsed manifest"
            );
            Ok(ManifestRecord::from_parsed(relative, parsed))
        }
        Err(e) => {
            warn!(path = %relative.display(), error = %e, "failed to parse manifest");
            Ok(failed_record(root, path, &e))
        }
    }
}

fn failed_record(root: &Path, path: &Path, error: &anyhow::Error) -> ManifestRecord {
    let relative = path.strip_prefix(root).unwrap_or(path);
    ManifestRecord {
        path: to_posix(relative),
        manifest_type: infer_manifest_type(path),
        manager: None,
        data: None,
        raw_excerpt: read_manifest(path).ok().map(|content| excerpt(&content)),
        error: Some(format!("{error:#}")),
    }
}

/// Scan `directory` with the built-in registry and default exclusions.
pub fn scan(
    directory: &Path,
    ignore: Option<Arc<dyn IgnoreMatcher>>,
    max_depth: usize,
) -> Result<Vec<ManifestRecord>, ScanError> {
    Scanner::new(default_registry())
        .ignore(ignore)
        .max_depth(max_depth)
        .scan(directory)
}

/// [`scan`] plus the per-manager summary.
pub fn collect_dependency_info(
    directory: &Path,
    ignore: Option<Arc<dyn IgnoreMatcher>>,
    max_depth: usize,
) -> Result<DependencyReport, ScanError> {
    scan(directory, ignore, max_depth).map(DependencyReport::new)
}
