use std::path::PathBuf;

/// Failures that escape a scan.
///
/// Per-file content problems never show up here; they are captured in the
/// `error` field of the corresponding [`ManifestRecord`](crate::models::ManifestRecord).
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// No registration matched and the registry has no fallback parser.
    #[error("no parser registered for manifest: {}", path.display())]
    NoParser { path: PathBuf },

    /// A configuration file could not be read or parsed.
    #[error("config error: {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },

    #[error("io error: {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
