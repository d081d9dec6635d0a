use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "depscan",
    about = "Discover dependency manifests and summarize them across ecosystems",
    version
)]
pub struct Cli {
    /// Project path to scan
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Config file [default: ./.depscan/config.toml, fallback ~/.config/depscan/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory levels to descend below the project root (overrides config)
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,

    /// Report format
    #[arg(long, default_value = "terminal", value_name = "FORMAT")]
    pub report: ReportFormat,

    /// Parse up to N manifests concurrently (overrides config)
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Do not apply the project's .gitignore
    #[arg(long)]
    pub no_gitignore: bool,

    /// Exit with status 1 when any manifest failed to parse
    #[arg(long)]
    pub strict: bool,

    /// Show excerpts of manifests without structured data
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print summary line
    #[arg(short, long)]
    pub quiet: bool,

    /// Log filter, e.g. `debug` or `depscan=trace` (overrides config; RUST_LOG wins)
    #[arg(long, value_name = "FILTER")]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Json,
}
