//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Images
//! 001 a.png
//! 002 b.jpg
//!
//! Skipped
//! 001 notes.txt
//! ```
//!
//! ## Run
//!
//! ```text
//! Converting 2 images → 800x600 png
//! [  0%] 001/002 a.png
//!     resized_a.png 800x600 (12.4 KB)
//! [ 50%] 002/002 b.jpg
//!     resized_b.png 800x600 (9.8 KB)
//! [100%] resized_images.zip: 2 images, 22.2 KB
//! ```
//!
//! # Architecture
//!
//! Each piece of output has a `format_*` function (returns `Vec<String>`) for
//! testability. Format functions are pure: no I/O, no side effects.
//! [`print_lines`] is the single place that writes to stdout.

use crate::ingest::IngestReport;
use crate::process::{RunEvent, SessionStatus};
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Human-readable byte count.
fn format_bytes(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let b = bytes as f64;
    if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{} B", bytes)
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{} {}", n, word)
    } else {
        format!("{} {}s", n, word)
    }
}

/// Print formatted lines to stdout.
pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

// ============================================================================
// Ingest / check output
// ============================================================================

/// Format the `check` listing: which files would be ingested, which skipped.
pub fn format_check_output(report: &IngestReport) -> Vec<String> {
    let mut lines = vec!["Images".to_string()];
    if report.accepted.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (i, name) in report.accepted.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), name));
    }

    if !report.skipped.is_empty() {
        lines.push(String::new());
        lines.push("Skipped".to_string());
        for (i, name) in report.skipped.iter().enumerate() {
            lines.push(format!("{} {}", format_index(i + 1), name));
        }
    }
    lines
}

/// One-line summary of an ingest call.
pub fn format_ingest_summary(report: &IngestReport, batch_total: usize) -> Vec<String> {
    let mut line = format!(
        "Added {} (batch: {})",
        plural(report.accepted.len(), "image"),
        batch_total
    );
    if !report.skipped.is_empty() {
        line.push_str(&format!(", skipped {}", report.skipped.len()));
    }
    let mut lines = vec![line];
    for name in &report.skipped {
        lines.push(format!("{}skipped: {}", indent(1), name));
    }
    lines
}

// ============================================================================
// Run output
// ============================================================================

/// Format a single run progress event as display lines.
pub fn format_run_event(event: &RunEvent) -> Vec<String> {
    match event {
        RunEvent::Started {
            total,
            size,
            format,
        } => vec![format!(
            "Converting {} \u{2192} {} {}",
            plural(*total, "image"),
            size,
            format
        )],
        RunEvent::ImageStarted {
            index,
            total,
            name,
            percent,
        } => vec![format!(
            "[{:>3}%] {}/{} {}",
            percent,
            format_index(*index),
            format_index(*total),
            name
        )],
        RunEvent::ImageConverted {
            output,
            width,
            height,
            bytes,
            ..
        } => vec![format!(
            "{}{} {}x{} ({})",
            indent(1),
            output,
            width,
            height,
            format_bytes(*bytes)
        )],
        RunEvent::Completed {
            filename,
            images,
            bytes,
            percent,
        } => vec![format!(
            "[{:>3}%] {}: {}, {}",
            percent,
            filename,
            plural(*images, "image"),
            format_bytes(*bytes)
        )],
    }
}

/// Confirmation after an artifact is written.
pub fn format_delivery(path: &Path, bytes: usize) -> Vec<String> {
    vec![format!("Saved {} ({})", path.display(), format_bytes(bytes))]
}

// ============================================================================
// Session output
// ============================================================================

pub fn format_status(status: &SessionStatus) -> Vec<String> {
    vec![
        format!("{}{}", indent(1), plural(status.total, "image")),
        format!("{}processed: {}", indent(1), status.processed),
        format!("{}pending: {}", indent(1), status.pending),
        format!(
            "{}output: {}",
            indent(1),
            if status.has_output { "ready" } else { "none" }
        ),
    ]
}

pub fn format_session_help() -> Vec<String> {
    [
        "add <paths>...        add files or directories to the batch",
        "run [size] [format]   convert images added since the last run",
        "save [dir]            write the latest output",
        "status                show batch counts",
        "help                  show this help",
        "quit                  leave the session",
    ]
    .iter()
    .map(|line| format!("{}{}", indent(1), line))
    .collect()
}
