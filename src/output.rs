//! CLI output formatting for runs and dry-runs.
//!
//! Each command has a `format_*` function returning `Vec<String>` for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects.
//!
//! Entities follow a two-level pattern: a header line with a positional
//! index and the target path, then indented context lines (source folder,
//! reasons, version bumps).

use crate::publish::RunReport;
use crate::scan::{EntryKind, PlanPreview};

/// Header line for one entity: `001 a/b/c`.
fn entity_header(index: usize, name: &str) -> String {
    format!("{:03} {}", index + 1, name)
}

pub fn format_run(report: &RunReport) -> Vec<String> {
    let mut lines = Vec::new();

    for (title, targets) in [
        ("Created", &report.created),
        ("Updated", &report.updated),
        ("Deleted", &report.deleted),
    ] {
        if targets.is_empty() {
            continue;
        }
        lines.push(title.to_string());
        for (i, target) in targets.iter().enumerate() {
            lines.push(entity_header(i, target));
        }
        lines.push(String::new());
    }

    if !report.shared_bumped.is_empty() {
        lines.push("Shared assets".to_string());
        for (i, (from, to)) in report.shared_bumped.iter().enumerate() {
            lines.push(entity_header(i, from));
            lines.push(format!("    Published: {to}"));
        }
        lines.push(String::new());
    }

    if !report.failed.is_empty() {
        lines.push("Failed".to_string());
        for (i, failure) in report.failed.iter().enumerate() {
            lines.push(entity_header(i, &failure.target));
            lines.push(format!("    Reason: {}", failure.reason));
        }
        lines.push(String::new());
    }

    if !report.skipped.is_empty() {
        lines.push("Skipped".to_string());
        for (i, (source, reason)) in report.skipped.iter().enumerate() {
            lines.push(entity_header(i, source));
            lines.push(format!("    Reason: {reason}"));
        }
        lines.push(String::new());
    }

    lines.push(format!(
        "{} created, {} updated, {} deleted, {} failed",
        report.created.len(),
        report.updated.len(),
        report.deleted.len(),
        report.failed.len() + report.skipped.len()
    ));
    lines
}

pub fn print_run(report: &RunReport) {
    for line in format_run(report) {
        println!("{line}");
    }
}

pub fn format_preview(preview: &PlanPreview) -> Vec<String> {
    let mut lines = Vec::new();

    if preview.docs.is_empty() && preview.shared.is_empty() {
        lines.push("Inbox is empty".to_string());
        return lines;
    }

    if !preview.docs.is_empty() {
        lines.push("Documents".to_string());
        for (i, entry) in preview.docs.iter().enumerate() {
            let verb = match entry.kind {
                EntryKind::Create => "create",
                EntryKind::Update => "update",
                EntryKind::RefreshAssets => "refresh assets",
                EntryKind::Delete => "delete",
                EntryKind::Invalid => "invalid",
            };
            lines.push(entity_header(i, &entry.target));
            lines.push(format!("    Source: {}/", entry.source));
            lines.push(format!("    Action: {verb}"));
        }
        lines.push(String::new());
    }

    if !preview.shared.is_empty() {
        lines.push("Shared assets".to_string());
        for (i, name) in preview.shared.iter().enumerate() {
            lines.push(entity_header(i, name));
        }
        lines.push(String::new());
    }

    lines
}

pub fn print_preview(preview: &PlanPreview) {
    for line in format_preview(preview) {
        println!("{line}");
    }
}
