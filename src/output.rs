//! CLI output formatting for the extract and generate stages.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Each post or page is
//! shown by its positional index and title, with the source document and
//! other details on indented context lines. The result reads as a content
//! inventory and still lets users trace every entry back to a file.
//!
//! # Output Format
//!
//! ## Extract
//!
//! ```text
//! Posts
//! 001 Quiet Week
//!     Date: February 20, 2018
//!     Source: 2018/02/20/quiet-week/index.html
//! 002 First Snow
//!     Date: July 11, 2017
//!     Source: 2017/07/11/first-snow/index.html
//!     Featured: /wp-content/uploads/2017/07/snow.jpg
//! 003 (2018/01/15/no-date)
//!     Source: 2018/01/15/no-date/index.html
//!
//! Pages
//! 001 About
//!     Source: about/index.html
//!
//! Extracted 3 posts, 1 page, 1 featured image
//! ```
//!
//! ## Generate
//!
//! ```text
//! Home → index.html
//! 001 Quiet Week → 2018/02/20/quiet-week/index.html
//! 002 First Snow → 2017/07/11/first-snow/index.html
//!
//! Pages
//! 001 About → about/index.html
//!
//! Generated 2 posts, 1 page
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::generate::{GenerateReport, PageKind};
use crate::types::ContentModel;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format an entity header: titled entries show the title, untitled ones
/// show their slug in parens.
///
/// ```text
/// 001 First Snow        // titled
/// 002 (2018/01/15/x)    // untitled: the slug IS the identity
/// ```
fn entity_line(index: usize, title: Option<&str>, slug: &str) -> String {
    match title {
        Some(t) if !t.is_empty() => format!("{} {}", format_index(index), t),
        _ => format!("{} ({})", format_index(index), slug),
    }
}

/// `1 post`, `2 posts`.
fn count(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

// ============================================================================
// Extract
// ============================================================================

pub fn format_extract_output(model: &ContentModel) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Posts".to_string());
    for (i, post) in model.posts.iter().enumerate() {
        lines.push(entity_line(i + 1, post.title.as_deref(), &post.slug));
        if let Some(date) = post.date_display.as_deref().filter(|d| !d.is_empty()) {
            lines.push(format!("{}Date: {}", indent(1), date));
        }
        lines.push(format!("{}Source: {}", indent(1), post.source_file));
        if !post.featured_image.is_empty() {
            lines.push(format!("{}Featured: {}", indent(1), post.featured_image));
        }
    }

    if !model.pages.is_empty() {
        lines.push(String::new());
        lines.push("Pages".to_string());
        for (i, page) in model.pages.iter().enumerate() {
            lines.push(entity_line(i + 1, page.title.as_deref(), &page.slug));
            lines.push(format!("{}Source: {}", indent(1), page.source_file));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Extracted {}, {}, {}",
        count(model.stats.total_posts, "post"),
        count(model.stats.total_pages, "page"),
        count(model.stats.total_featured_images, "featured image"),
    ));
    lines
}

pub fn print_extract_output(model: &ContentModel) {
    for line in format_extract_output(model) {
        println!("{}", line);
    }
}

// ============================================================================
// Generate
// ============================================================================

pub fn format_generate_output(report: &GenerateReport) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(home) = report.of_kind(PageKind::Index).next() {
        lines.push(format!("Home → {}", home.path));
    }

    let posts: Vec<_> = report.of_kind(PageKind::Post).collect();
    let about: Vec<_> = report.of_kind(PageKind::About).collect();

    for (i, post) in posts.iter().enumerate() {
        lines.push(format!("{} {} → {}", format_index(i + 1), post.title, post.path));
    }

    if !about.is_empty() {
        lines.push(String::new());
        lines.push("Pages".to_string());
        for (i, page) in about.iter().enumerate() {
            lines.push(format!("{} {} → {}", format_index(i + 1), page.title, page.path));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Generated {}, {}",
        count(posts.len(), "post"),
        count(about.len(), "page"),
    ));
    lines
}

pub fn print_generate_output(report: &GenerateReport) {
    for line in format_generate_output(report) {
        println!("{}", line);
    }
}
