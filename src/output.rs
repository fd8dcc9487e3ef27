//! CLI output formatting for the index builder and the headless gallery.
//!
//! # Output Format
//!
//! ## Index
//!
//! ```text
//! Indexed 5 items → public/api/i/images.json
//!     2024 (3 items)
//!     2023 (2 items)
//! Skipped
//!     excluded: 2
//!     wrong extension: 1
//!     unmatched: 1
//! ```
//!
//! ## Show
//!
//! ```text
//! 5 photos · 2 years · 4 months
//!
//! 2024 (3 photos) ▼
//!     June (2)
//!         001 beach.jpg  2024-06-15
//!         002 Cat-Nap.png  2024-06-02
//!     January (1)
//!         003 snow.webp  2024-01-02
//! 2023 (2 photos) ▶
//! ```
//!
//! Card indices are 1-based positions in the visible subset, the same
//! positions the viewer navigates over.
//!
//! # Architecture
//!
//! Each display has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::gallery::filter::FilterCriteria;
use crate::gallery::loader::Stats;
use crate::gallery::timeline::{TimelineView, month_name};
use crate::scan::{ScanResult, ScanStats};
use std::collections::BTreeMap;
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

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

// ============================================================================
// Index output
// ============================================================================

/// Format the result of one index build.
///
/// Skip counters are only listed when non-zero.
pub fn format_scan_output(result: &ScanResult, manifest_path: &Path) -> Vec<String> {
    let items = &result.manifest.items;
    let mut lines = vec![format!(
        "Indexed {} → {}",
        plural(items.len(), "item", "items"),
        manifest_path.display()
    )];

    let mut per_year: BTreeMap<&str, usize> = BTreeMap::new();
    for item in items {
        *per_year.entry(item.year.as_str()).or_default() += 1;
    }
    for (year, count) in per_year.iter().rev() {
        lines.push(format!(
            "{}{} ({})",
            indent(1),
            year,
            plural(*count, "item", "items")
        ));
    }

    let skipped = skipped_lines(&result.stats);
    if !skipped.is_empty() {
        lines.push("Skipped".to_string());
        lines.extend(skipped);
    }
    lines
}

fn skipped_lines(stats: &ScanStats) -> Vec<String> {
    [
        ("excluded", stats.excluded),
        ("wrong extension", stats.wrong_extension),
        ("unmatched", stats.unmatched),
        ("unreadable", stats.unreadable),
    ]
    .into_iter()
    .filter(|(_, n)| *n > 0)
    .map(|(label, n)| format!("{}{}: {}", indent(1), label, n))
    .collect()
}

/// Print index output to stdout.
pub fn print_scan_output(result: &ScanResult, manifest_path: &Path) {
    for line in format_scan_output(result, manifest_path) {
        println!("{}", line);
    }
}

// ============================================================================
// Gallery output
// ============================================================================

/// One-line totals.
pub fn format_stats(stats: &Stats) -> Vec<String> {
    vec![format!(
        "{} · {} · {}",
        plural(stats.total, "photo", "photos"),
        plural(stats.years, "year", "years"),
        plural(stats.months, "month", "months")
    )]
}

/// Active filter criteria, or nothing when unfiltered.
pub fn format_criteria(criteria: &FilterCriteria) -> Vec<String> {
    let mut parts = Vec::new();
    if let Some(year) = &criteria.year {
        parts.push(format!("year {year}"));
    }
    if let Some(month) = &criteria.month {
        parts.push(format!("month {}", month_name(month)));
    }
    if let Some(search) = &criteria.search {
        parts.push(format!("search \"{search}\""));
    }
    if parts.is_empty() {
        Vec::new()
    } else {
        vec![format!("Filter: {}", parts.join(", "))]
    }
}

/// The grouped timeline as an indented tree.
pub fn format_timeline(view: &TimelineView) -> Vec<String> {
    if view.is_empty() {
        return vec!["No matching images".to_string()];
    }

    let mut lines = Vec::new();
    for year in &view.years {
        lines.push(format!(
            "{} ({}) {}",
            year.year,
            plural(year.count, "photo", "photos"),
            if year.expanded { "▼" } else { "▶" }
        ));
        for month in &year.months {
            lines.push(format!(
                "{}{} ({})",
                indent(1),
                month.name,
                month.entries.len()
            ));
            for entry in &month.entries {
                lines.push(format!(
                    "{}{} {}  {}",
                    indent(2),
                    format_index(entry.index + 1),
                    entry.item.filename,
                    entry.item.date
                ));
            }
        }
    }
    lines
}

/// Print stats, active filter and timeline to stdout.
pub fn print_gallery(stats: &Stats, criteria: &FilterCriteria, view: &TimelineView) {
    let mut lines = format_stats(stats);
    lines.extend(format_criteria(criteria));
    lines.push(String::new());
    lines.extend(format_timeline(view));
    for line in lines {
        println!("{}", line);
    }
}
