//! CLI output formatting.
//!
//! Output is **page-centric**: each line names a page by its position in the
//! site manifest and its href, with the generated file as secondary context.
//! Paths under the dist directory are shown relative to it.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Index → index.html
//! 001 a.xml → a.html
//! 002 chapters/one.xml → chapters/one.html
//!
//! Generated index and 2 pages (2 stylesheets compiled)
//! ```
//!
//! ## Check
//!
//! ```text
//! Config
//!     Build: /site/build
//!     Dist: /site/dist
//!     Manifest: /site/build/site.xml
//!     Index stylesheet: /site/tools/xslt/site2html.xsl
//!     Page stylesheet: /site/tools/xslt/page2html.xsl
//!
//! Pages
//! 001 a.xml → a.html
//! 002 chapters/one.xml → chapters/one.html
//! ```
//!
//! `check --json` prints the same information as a single JSON object.
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout or stderr.
//! Format functions are pure: no I/O, no side effects.

use crate::config::Config;
use crate::site::{BuildReport, SiteError};
use crate::types::Page;
use serde::Serialize;
use std::error::Error;
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

/// `path` relative to `base` when it lives under it, unchanged otherwise.
fn display_under(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn page_line(index: usize, page: &Page) -> String {
    format!("{} {} → {}", format_index(index), page.href, page.dest)
}

fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{count} {one}")
    } else {
        format!("{count} {many}")
    }
}

// ============================================================================
// Build
// ============================================================================

pub fn format_build_output(report: &BuildReport) -> Vec<String> {
    let mut lines = vec![format!(
        "Index → {}",
        display_under(&report.index, &report.dist_dir)
    )];
    for (i, built) in report.pages.iter().enumerate() {
        lines.push(page_line(i + 1, &built.page));
    }
    lines.push(String::new());
    lines.push(format!(
        "Generated index and {} ({} compiled)",
        plural(report.pages.len(), "page", "pages"),
        plural(report.stylesheets_compiled, "stylesheet", "stylesheets")
    ));
    lines
}

pub fn print_build_output(report: &BuildReport) {
    for line in format_build_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

pub fn format_check_output(config: &Config, pages: &[Page]) -> Vec<String> {
    let mut lines = vec!["Config".to_string()];
    let fields = [
        ("Build", &config.build_dir),
        ("Dist", &config.dist_dir),
        ("Manifest", &config.site_manifest),
        ("Index stylesheet", &config.index_stylesheet),
        ("Page stylesheet", &config.page_stylesheet),
    ];
    for (label, path) in fields {
        lines.push(format!("{}{}: {}", indent(1), label, path.display()));
    }

    lines.push(String::new());
    lines.push("Pages".to_string());
    if pages.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (i, page) in pages.iter().enumerate() {
        lines.push(page_line(i + 1, page));
    }
    lines
}

pub fn print_check_output(config: &Config, pages: &[Page]) {
    for line in format_check_output(config, pages) {
        println!("{}", line);
    }
}

#[derive(Serialize)]
struct CheckJson<'a> {
    config: &'a Config,
    pages: &'a [Page],
}

pub fn format_check_json(config: &Config, pages: &[Page]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&CheckJson { config, pages })
}

// ============================================================================
// Errors
// ============================================================================

/// The error and every cause beneath it, one per line.
///
/// Causes already spelled out in a parent's message are skipped.
pub fn format_error(err: &SiteError) -> Vec<String> {
    let mut lines = vec![format!("Error: {err}")];
    let mut shown = err.to_string();
    let mut cause = err.source();
    while let Some(current) = cause {
        let message = current.to_string();
        if !shown.contains(&message) {
            lines.push(format!("{}Caused by: {}", indent(1), message));
        }
        shown = message;
        cause = current.source();
    }
    lines
}

pub fn print_error(err: &SiteError) {
    for line in format_error(err) {
        eprintln!("{}", line);
    }
}
