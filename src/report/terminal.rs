use std::path::Path;

use anyhow::Result;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::metadata::UNKNOWN_MANAGER;
use crate::models::{DependencyReport, ManifestRecord};

/// Render a colored terminal report.
pub fn render(report: &DependencyReport, path: &Path, verbose: bool, quiet: bool) -> Result<()> {
    let total = report.manifests.len();
    let error_count = report.manifests.iter().filter(|m| m.error.is_some()).count();
    let dependency_total: usize = report
        .manifests
        .iter()
        .map(ManifestRecord::dependency_count)
        .sum();

    if quiet {
        println!(
            "Manifests: {}  Managers: {}  Dependencies: {}  Errors: {}",
            total,
            report.summary.len(),
            dependency_total,
            if error_count > 0 {
                error_count.to_string().red()
            } else {
                error_count.to_string().green()
            },
        );
        return Ok(());
    }

    println!("\n {} v{}", "depscan".bold(), env!("CARGO_PKG_VERSION"));
    println!(" Scanning: {}\n", path.display());

    // Summary box
    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "SUMMARY".bold());
    println!(" │  {:<48} │", format!("Manifests          : {:>4}", total));
    println!(" │  {:<48} │", format!("Dependencies       : {:>4}", dependency_total));
    for (manager, paths) in &report.summary {
        let label = format!("{:<18} : {:>4}", manager, paths.len());
        let label = if manager == UNKNOWN_MANAGER {
            label.dimmed()
        } else {
            label.cyan()
        };
        println!(" │  {:<48} │", label);
    }
    let errors = format!("{}  Errors          : {:>4}", "✗", error_count);
    println!(
        " │  {:<48} │",
        if error_count > 0 { errors.red() } else { errors.normal() }
    );
    println!(" └────────────────────────────────────────────────────┘\n");

    if total > 0 {
        render_table(&report.manifests);
        println!();
    }

    if error_count > 0 {
        println!(" {} Manifests that failed to parse:\n", "[ERROR]".red().bold());
        for record in report.manifests.iter().filter(|m| m.error.is_some()) {
            println!(
                "   {} {}",
                record.path.bold(),
                record.error.as_deref().unwrap_or_default().red()
            );
        }
        println!();
    }

    // Verbose: excerpts of manifests that yielded no structured data
    if verbose {
        for record in report.manifests.iter().filter(|m| m.data.is_none()) {
            if let Some(excerpt) = record.raw_excerpt.as_deref().filter(|e| !e.is_empty()) {
                println!(" {} {}\n", "[EXCERPT]".dimmed().bold(), record.path);
                for line in excerpt.lines() {
                    println!("   {}", line.dimmed());
                }
                println!();
            }
        }
    }

    Ok(())
}

fn render_table(manifests: &[ManifestRecord]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Path").add_attribute(Attribute::Bold),
            Cell::new("Type").add_attribute(Attribute::Bold),
            Cell::new("Manager").add_attribute(Attribute::Bold),
            Cell::new("Deps").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
        ]);

    for record in manifests {
        let (status, status_color) = match (&record.error, &record.data) {
            (Some(_), _) => ("✗ error", Color::Red),
            (None, Some(_)) => ("✓ parsed", Color::Green),
            (None, None) => ("- no data", Color::DarkGrey),
        };
        let manager = record.manager.as_deref().unwrap_or(UNKNOWN_MANAGER);

        table.add_row(vec![
            Cell::new(&record.path),
            Cell::new(&record.manifest_type),
            Cell::new(manager).fg(if record.manager.is_some() {
                Color::Cyan
            } else {
                Color::DarkGrey
            }),
            Cell::new(record.dependency_count()).set_alignment(CellAlignment::Right),
            Cell::new(status)
                .fg(status_color)
                .set_alignment(CellAlignment::Center),
        ]);
    }

    println!("{}", table);
}
