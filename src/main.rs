//! `depscan`: find dependency manifests and summarize them per package manager.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]).
//! 2. Load config ([`depscan::load_config`]) and apply CLI overrides.
//! 3. Initialize tracing ([`depscan::logging::init_tracing`]).
//! 4. Discover and parse manifests ([`depscan::Scanner`]), concurrently with `--jobs N`.
//! 5. Render the requested report.
//! 6. Exit `0`, or `1` when nothing was found or `--strict` sees a failed manifest.

mod cli;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use cli::{Cli, ReportFormat};
use depscan::logging::init_tracing;
use depscan::report;
use depscan::{default_registry, load_config, DependencyReport, GitIgnore, IgnoreMatcher, Scanner};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Resolve project path
    let path = cli
        .path
        .canonicalize()
        .unwrap_or_else(|_| cli.path.clone());

    let mut config = load_config(&path, cli.config.as_deref())?;
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config.logging)?;

    if let Some(max_depth) = cli.max_depth {
        config.scan.max_depth = max_depth;
    }
    if let Some(jobs) = cli.jobs {
        config.scan.jobs = jobs;
    }

    let ignore: Option<Arc<dyn IgnoreMatcher>> =
        if config.scan.respect_gitignore && !cli.no_gitignore {
            GitIgnore::from_root(&path).map(|g| Arc::new(g) as Arc<dyn IgnoreMatcher>)
        } else {
            None
        };

    let mut scanner = Scanner::from_config(default_registry(), &config).ignore(ignore);
    info!(
        path = %path.display(),
        max_depth = config.scan.max_depth,
        jobs = config.scan.jobs,
        "scanning"
    );

    let manifests = if config.scan.jobs > 1 {
        if !cli.quiet && matches!(cli.report, ReportFormat::Terminal) {
            scanner = scanner.progress(progress_bar()?);
        }
        scanner.scan_concurrent(&path, config.scan.jobs).await?
    } else {
        scanner.scan(&path)?
    };

    if manifests.is_empty() {
        eprintln!("No dependency manifests found in {}", path.display());
        std::process::exit(1);
    }

    let report = DependencyReport::new(manifests);

    match cli.report {
        ReportFormat::Terminal => {
            report::terminal::render(&report, &path, cli.verbose, cli.quiet)?;
        }
        ReportFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    // Exit code: 1 under --strict if any manifest failed to parse
    let has_errors = report.manifests.iter().any(|m| m.error.is_some());
    if cli.strict && has_errors {
        std::process::exit(1);
    }

    Ok(())
}

fn progress_bar() -> Result<ProgressBar> {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    pb.set_message("parsing manifests");
    Ok(pb)
}
