//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Each source is shown by its positional index and file name, with the full
//! key and other details as indented context lines. Run-level facts (counts,
//! manifest location) get one unindented line.
//!
//! # Output Format
//!
//! ## Optimize
//!
//! ```text
//! Sources (3 images)
//!     001 hero.jpg
//!         Source: hero.jpg
//!         Outputs: 10 → optimized/hero_*
//!     002 broken.png
//!         Source: broken.png
//!         Error: Image processing failed: ...
//!         Removed: 2 partial outputs
//! Manifest → src/assets/image-manifest.json (2 entries)
//! Processed 2 of 3 images, 1 failed
//! ```
//!
//! ## Check
//!
//! ```text
//! Sources
//!     001 pro1s1.PNG
//!         Source: pro1/pro1s1.PNG
//!         Slug: pro1_pro1s1
//! Found 1 image → 10 outputs in optimized/
//! ```
//!
//! ## Lookup
//!
//! ```text
//! pro1/pro1s1.PNG
//!     webp: /src/assets/optimized/pro1_pro1s1_800.webp
//!     jpg: /src/assets/optimized/pro1_pro1s1_800.jpg
//!     srcset (image/webp):
//!         /src/assets/optimized/pro1_pro1s1_320.webp 320w
//!         ...
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::image_ref::RenderSource;
use crate::process::{ProcessEvent, ProcessResult};
use crate::publish::PublishReport;
use crate::scan::Discovery;
use crate::types::OutputFormat;

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

/// Last path segment of a key.
fn file_name(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{} {}", count, one)
    } else {
        format!("{} {}", count, many)
    }
}

// ============================================================================
// Optimize
// ============================================================================

/// Format a single pipeline progress event as display lines.
pub fn format_process_event(event: &ProcessEvent, output_dir: &str) -> Vec<String> {
    match event {
        ProcessEvent::Discovered { count } => {
            vec![format!("Sources ({})", plural(*count, "image", "images"))]
        }
        ProcessEvent::PathSkipped { path, reason } => {
            vec![format!("{}Skipped: {} ({})", indent(1), path.display(), reason)]
        }
        ProcessEvent::SourceProcessed {
            index,
            key,
            slug,
            outputs,
        } => vec![
            format!("{}{} {}", indent(1), format_index(*index), file_name(key)),
            format!("{}Source: {}", indent(2), key),
            format!(
                "{}Outputs: {} \u{2192} {}/{}_*",
                indent(2),
                outputs,
                output_dir,
                slug
            ),
        ],
        ProcessEvent::SourceFailed {
            index,
            key,
            error,
            removed,
        } => {
            let mut lines = vec![
                format!("{}{} {}", indent(1), format_index(*index), file_name(key)),
                format!("{}Source: {}", indent(2), key),
                format!("{}Error: {}", indent(2), error),
            ];
            if *removed > 0 {
                lines.push(format!(
                    "{}Removed: {}",
                    indent(2),
                    plural(*removed, "partial output", "partial outputs")
                ));
            }
            lines
        }
        ProcessEvent::ManifestWritten { path, entries } => vec![format!(
            "Manifest \u{2192} {} ({})",
            path.display(),
            plural(*entries, "entry", "entries")
        )],
    }
}

/// Whether an event belongs on stderr.
pub fn is_failure(event: &ProcessEvent) -> bool {
    matches!(
        event,
        ProcessEvent::SourceFailed { .. } | ProcessEvent::PathSkipped { .. }
    )
}

/// One-line summary of a finished run.
pub fn format_process_summary(result: &ProcessResult) -> String {
    let mut summary = format!(
        "Processed {} of {}",
        result.manifest.len(),
        plural(result.discovered, "image", "images")
    );
    if !result.failures.is_empty() {
        summary.push_str(&format!(", {} failed", result.failures.len()));
    }
    if !result.skipped.is_empty() {
        summary.push_str(&format!(
            ", {} skipped",
            plural(result.skipped.len(), "path", "paths")
        ));
    }
    summary
}

// ============================================================================
// Check
// ============================================================================

/// Format the dry-run listing: what would be processed and under which slug.
///
/// `collisions` holds `(later, earlier)` key pairs.
pub fn format_check_output(
    found: &Discovery,
    collisions: &[(String, String)],
    outputs_per_source: usize,
    output_dir: &str,
) -> Vec<String> {
    let sources = &found.sources;
    let mut lines = Vec::new();
    if !sources.is_empty() {
        lines.push("Sources".to_string());
    }
    for (i, source) in sources.iter().enumerate() {
        lines.push(format!(
            "{}{} {}",
            indent(1),
            format_index(i + 1),
            source.file_name()
        ));
        lines.push(format!("{}Source: {}", indent(2), source.key));
        lines.push(format!("{}Slug: {}", indent(2), source.slug));
        if let Some((_, earlier)) = collisions.iter().find(|(later, _)| *later == source.key) {
            lines.push(format!(
                "{}Collision: slug already used by {}",
                indent(2),
                earlier
            ));
        }
    }

    if !found.skipped.is_empty() {
        lines.push("Skipped".to_string());
    }
    for skipped in &found.skipped {
        lines.push(format!(
            "{}{} ({})",
            indent(1),
            skipped.path.display(),
            skipped.reason
        ));
    }

    let processable = sources.len() - collisions.len();
    lines.push(format!(
        "Found {} \u{2192} {} in {}/",
        plural(sources.len(), "image", "images"),
        plural(processable * outputs_per_source, "output", "outputs"),
        output_dir
    ));
    lines
}

pub fn print_check_output(
    found: &Discovery,
    collisions: &[(String, String)],
    outputs_per_source: usize,
    output_dir: &str,
) {
    for line in format_check_output(found, collisions, outputs_per_source, output_dir) {
        println!("{}", line);
    }
}

// ============================================================================
// Lookup
// ============================================================================

/// Format what the UI would render for one image field.
pub fn format_lookup_output(raw: &str, source: &RenderSource) -> Vec<String> {
    match source {
        RenderSource::Url(url) => vec![raw.to_string(), format!("{}remote: {}", indent(1), url)],
        RenderSource::Placeholder => vec![
            raw.to_string(),
            format!("{}not in manifest (placeholder)", indent(1)),
        ],
        RenderSource::Picture(image) => {
            let mut lines = vec![
                raw.to_string(),
                format!("{}webp: {}", indent(1), image.webp),
                format!("{}jpg: {}", indent(1), image.jpg),
                format!("{}srcset ({}):", indent(1), OutputFormat::Webp.mime_type()),
            ];
            for variant in &image.webp_variants {
                lines.push(format!("{}{} {}w", indent(2), variant.url, variant.width));
            }
            lines
        }
    }
}

pub fn print_lookup_output(raw: &str, source: &RenderSource) {
    for line in format_lookup_output(raw, source) {
        println!("{}", line);
    }
}

/// Warnings for declared paths that fell back to a constructed URL.
pub fn format_fallback_warnings(unresolved: &[String], public_base: &str) -> Vec<String> {
    unresolved
        .iter()
        .map(|path| {
            format!(
                "warning: {} not in asset map, using {}/{}",
                path,
                public_base.trim_end_matches('/'),
                path
            )
        })
        .collect()
}

// ============================================================================
// Publish
// ============================================================================

pub fn format_publish_output(report: &PublishReport) -> Vec<String> {
    let published = report.copied + report.reused;
    let mut header = format!(
        "Published {} \u{2192} {}",
        plural(published, "file", "files"),
        report.map_path.display()
    );
    if report.reused > 0 {
        header.push_str(&format!(" ({} already present)", report.reused));
    }
    let mut lines = vec![header];
    for path in &report.missing {
        lines.push(format!("{}Missing: {}", indent(1), path));
    }
    lines
}

pub fn print_publish_output(report: &PublishReport) {
    for line in format_publish_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
