//! CLI output formatting for every command.
//!
//! # Output Format
//!
//! ## Generate
//!
//! ```text
//! 4 images found.
//! Excluding large
//! Processing Style thumbnail
//! Style thumbnail progress 25%
//! Style thumbnail progress 50%
//! Style thumbnail progress 75%
//! Style thumbnail progress 100%
//! Style thumbnail Processed
//! Derivatives: 4 generated, 0 skipped
//! ```
//!
//! ## Styles
//!
//! ```text
//! 001 thumbnail: Thumbnail (100×100)
//!     scale 100×100
//! 002 teaser
//!     scale and crop 300×200
//!     desaturate
//! ```
//!
//! ## Files
//!
//! ```text
//! 2 images found.
//! 001 public://xyz/a.jpg (image/jpeg)
//! 002 public://xyz/b.png (image/png)
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::driver::RunSummary;
use crate::index::FileRecord;
use crate::style::Style;
use crate::types::Event;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

// ============================================================================
// Events
// ============================================================================

pub fn format_event(event: &Event) -> Vec<String> {
    let line = match event {
        Event::FilesFound { count: 1 } => "1 image found.".to_string(),
        Event::FilesFound { count } => format!("{} images found.", count),
        Event::StyleExcluded { name } => format!("Excluding {}", name),
        Event::StyleStarted { name } => format!("Processing Style {}", name),
        Event::StyleProgress { name, percent } => {
            format!("Style {} progress {}%", name, percent)
        }
        Event::StyleFinished { name } => format!("Style {} Processed", name),
    };
    vec![line]
}

pub fn print_event(event: &Event) {
    for line in format_event(event) {
        println!("{}", line);
    }
}

pub fn format_summary(summary: &RunSummary) -> Vec<String> {
    vec![format!("Derivatives: {}", summary)]
}

pub fn print_summary(summary: &RunSummary) {
    for line in format_summary(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Listings
// ============================================================================

/// Styles in processing order, each followed by its effects.
pub fn format_style_list(styles: &[Style]) -> Vec<String> {
    if styles.is_empty() {
        return vec!["No styles configured.".to_string()];
    }
    let mut lines = Vec::new();
    for (i, style) in styles.iter().enumerate() {
        match &style.label {
            Some(label) => lines.push(format!("{} {}: {}", format_index(i + 1), style.name, label)),
            None => lines.push(format!("{} {}", format_index(i + 1), style.name)),
        }
        if style.effects.is_empty() {
            lines.push(format!("{}(no effects)", indent(1)));
        }
        for effect in &style.effects {
            lines.push(format!("{}{}", indent(1), effect));
        }
    }
    lines
}

pub fn print_style_list(styles: &[Style]) {
    for line in format_style_list(styles) {
        println!("{}", line);
    }
}

/// Selected originals in index order.
pub fn format_file_list(files: &[FileRecord]) -> Vec<String> {
    files
        .iter()
        .enumerate()
        .map(|(i, f)| format!("{} {} ({})", format_index(i + 1), f.uri, f.filemime))
        .collect()
}

pub fn print_file_list(files: &[FileRecord]) {
    for line in format_file_list(files) {
        println!("{}", line);
    }
}
