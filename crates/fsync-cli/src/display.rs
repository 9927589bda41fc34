//! Console display utilities for the fsync CLI

use crate::sync::SyncReport;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Announce the run
pub fn print_banner(first: &Path, second: &Path, simulate: bool) {
    println!(
        "{} Synchronizing {} into {}",
        style("⟲").blue().bold(),
        style(first.display()).cyan(),
        style(second.display()).cyan()
    );
    if simulate {
        println!(
            "{} Simulation - no changes will be made",
            style("ℹ").yellow()
        );
    }
}

/// Spinner shown while the trees are walked
pub fn create_spinner(quiet: bool) -> Option<ProgressBar> {
    if quiet {
        return None;
    }

    let pb = ProgressBar::new_spinner();
    let template = ProgressStyle::default_spinner()
        .template("{spinner:.green} {pos} differences {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(template);
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

/// Print the summary of a finished run
pub fn print_report(report: &SyncReport) {
    let counts = &report.counts;
    let stats = &report.stats;

    println!();
    println!("{}", style("Differences:").bold().underlined());
    println!("  Created: {}", style(counts.created).green());
    println!("  Modified: {}", style(counts.modified).yellow());
    println!("  Deleted: {}", style(counts.deleted).red());
    println!("  Unchanged: {}", style(counts.unchanged).dim());

    if !report.simulated {
        println!();
        println!("{}", style("Copy Statistics:").bold().underlined());
        println!("  Files copied: {}", style(stats.files_copied).green());
        println!(
            "  Bytes copied: {}",
            style(format_bytes(stats.bytes_copied)).green()
        );
        println!(
            "  Directories created: {}",
            style(stats.directories_created).green()
        );
        println!("  Files deleted: {}", style(stats.files_deleted).green());
        println!("  Files skipped: {}", style(stats.files_skipped).yellow());
        println!(
            "  Transfer rate: {}",
            style(format!("{}/s", format_bytes(stats.transfer_rate() as u64))).blue()
        );
    }

    let error_count = report.errors.len() + report.copy_failures.len();
    println!(
        "  Errors: {}",
        if error_count > 0 {
            style(error_count).red()
        } else {
            style(error_count).green()
        }
    );
    println!("  Duration: {}", style(format_duration(report.duration)).blue());

    for failure in &report.copy_failures {
        println!(
            "  {} {} -> {}: {}{}",
            style("✗").red(),
            failure.item.source.display(),
            failure.item.destination.display(),
            style(&failure.message).dim(),
            if failure.retryable {
                style(" (retry later)").yellow().to_string()
            } else {
                String::new()
            }
        );
    }
    for message in &report.errors {
        println!("  {} {}", style("✗").red(), style(message).dim());
    }
}

/// Format bytes in human-readable format
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}

/// Format duration in human-readable format
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{:.2}s", duration.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
