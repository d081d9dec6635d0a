use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::ScanError;

/// Root configuration structure, deserialized from `.depscan/config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scan: ScanConfig,
    /// Deny-list applied during discovery.
    pub exclusions: ExclusionConfig,
    /// Additions to the built-in manifest allow-list.
    pub manifests: ManifestConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Maximum number of directory levels to descend below the scan root.
    pub max_depth: usize,
    /// Number of manifests parsed concurrently. `1` keeps the scan sequential.
    pub jobs: usize,
    /// Honour `<root>/.gitignore` when present.
    pub respect_gitignore: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_depth: crate::scan::DEFAULT_MAX_DEPTH,
            jobs: 1,
            respect_gitignore: true,
        }
    }
}

/// Directory names, file names and extensions skipped during discovery.
///
/// Manifest names and patterns on the allow-list are scanned even when they
/// match `files` or `extensions`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExclusionConfig {
    pub dirs: Vec<String>,
    pub files: Vec<String>,
    /// Extensions including the leading dot, compared case-insensitively.
    pub extensions: Vec<String>,
}

impl Default for ExclusionConfig {
    fn default() -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            dirs: owned(&[
                ".git",
                ".hg",
                ".svn",
                ".idea",
                ".vscode",
                "node_modules",
                "bower_components",
                "target",
                "dist",
                "build",
                "out",
                "bin",
                "obj",
                "__pycache__",
                ".venv",
                "venv",
                ".tox",
                ".mypy_cache",
                ".pytest_cache",
                ".gradle",
                ".dart_tool",
                "_build",
                "vendor",
                ".next",
                "coverage",
            ]),
            files: owned(&[
                "package-lock.json",
                "yarn.lock",
                "pnpm-lock.yaml",
                "Cargo.lock",
                "poetry.lock",
                "Pipfile.lock",
                "composer.lock",
                "Gemfile.lock",
                "go.sum",
                "mix.lock",
                "pubspec.lock",
                "Package.resolved",
                ".DS_Store",
            ]),
            extensions: owned(&[
                ".pyc", ".pyo", ".so", ".dll", ".dylib", ".exe", ".class", ".jar", ".o", ".a",
                ".png", ".jpg", ".jpeg", ".gif", ".ico", ".svg", ".webp", ".pdf", ".zip",
                ".tar", ".gz", ".tgz", ".7z", ".lock", ".log", ".map", ".min.js", ".woff",
                ".woff2", ".ttf",
            ]),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    pub extra_names: Vec<String>,
    pub extra_patterns: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Compact,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

/// Load the scan configuration, searching in order:
///
/// 1. `config_override`: path passed via `--config`
/// 2. `<project_path>/.depscan/config.toml`
/// 3. `~/.config/depscan/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(project_path: &Path, config_override: Option<&Path>) -> Result<Config, ScanError> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let project_config = project_path.join(".depscan").join("config.toml");
    if project_config.exists() {
        return read_config(&project_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home.join(".config").join("depscan").join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    debug!("no config file found, using built-in defaults");
    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config, ScanError> {
    debug!(path = %path.display(), "loading config");
    let content = std::fs::read_to_string(path).map_err(|source| ScanError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|e| ScanError::Config {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
