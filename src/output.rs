//! CLI output formatting for every subcommand.
//!
//! # Information-First Display
//!
//! The index display leads with each page's positional index and title, as
//! the navigation shows it. Source paths and page slugs follow as indented
//! context lines, then the page's headings with their numbers and anchors:
//!
//! ```text
//! 001 Home
//!     Source: index.md
//!     Slug: home
//!     1 Home → #home--home
//!     1.1 Install → #home--install
//! 002 Guide
//!     Slug: guide
//!     2 Guide → #guide--guide
//!     001 Setup
//!         Source: guide/setup.md
//!         Slug: guide--setup
//!         2.1 Linux → #guide--setup--linux
//! ```
//!
//! Diagnostics go to stderr, one per line, prefixed with `warning:`.
//! Summaries name the page and heading counts and where output went.
//!
//! # Architecture
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that does the writing. Format
//! functions are pure: no I/O, no side effects.

use crate::combine::Combined;
use crate::diagnostics::Diagnostic;
use crate::page::{DocumentIndex, PageId, PageTree};
use serde::Serialize;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

fn heading_count(tree: &PageTree) -> usize {
    tree.pages().map(|p| p.headings().len()).sum()
}

// ============================================================================
// Tree walker
// ============================================================================

/// A page with its display depth and position among its siblings.
struct TreeNode {
    id: PageId,
    depth: usize,
    position: usize,
}

/// Walk the page tree in navigation order, assigning positional indices per
/// sibling level.
fn walk_tree(tree: &PageTree) -> Vec<TreeNode> {
    let mut counters: Vec<usize> = Vec::new();
    let mut nodes = Vec::new();
    for page in tree.pages() {
        let depth = tree.level(page.id) - 1;
        counters.truncate(depth + 1);
        if counters.len() <= depth {
            counters.resize(depth + 1, 0);
        }
        counters[depth] += 1;
        nodes.push(TreeNode {
            id: page.id,
            depth,
            position: counters[depth],
        });
    }
    nodes
}

// ============================================================================
// index
// ============================================================================

/// Format the indexed page tree with headings, numbers and anchors.
pub fn format_index_output(index: &DocumentIndex) -> Vec<String> {
    let tree = index.tree();
    let mut lines = Vec::new();

    for node in walk_tree(tree) {
        let page = tree.page(node.id);
        let header_indent = indent(node.depth);
        let detail_indent = indent(node.depth + 1);

        lines.push(format!("{header_indent}{} {}", format_index(node.position), page.title));
        if let Some(path) = &page.file_path {
            lines.push(format!("{detail_indent}Source: {path}"));
        }
        lines.push(format!("{detail_indent}Slug: {}", page.slug()));
        for heading in page.headings() {
            let label = match heading.number_string() {
                Some(number) => format!("{number} {}", heading.title),
                None => heading.title.clone(),
            };
            lines.push(format!("{detail_indent}{label} → #{}", heading.slug(tree)));
        }
    }

    lines
}

/// Print the index display to stdout.
pub fn print_index_output(index: &DocumentIndex) {
    for line in format_index_output(index) {
        println!("{}", line);
    }
}

/// JSON shape of `index --json`.
#[derive(Debug, Serialize)]
pub struct IndexManifest {
    pub pages: Vec<PageEntry>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Serialize)]
pub struct PageEntry {
    pub title: String,
    pub slug: String,
    pub level: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub headings: Vec<HeadingEntry>,
}

#[derive(Debug, Serialize)]
pub struct HeadingEntry {
    pub title: String,
    pub level: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    pub slug: String,
}

pub fn index_manifest(index: &DocumentIndex, diagnostics: &[Diagnostic]) -> IndexManifest {
    let tree = index.tree();
    let pages = tree
        .pages()
        .map(|page| PageEntry {
            title: page.title.clone(),
            slug: page.slug().to_string(),
            level: tree.level(page.id),
            file: page.file_path.clone(),
            parent: page.parent.map(|p| tree.page(p).slug().to_string()),
            headings: page
                .headings()
                .iter()
                .map(|h| HeadingEntry {
                    title: h.title.clone(),
                    level: h.level,
                    number: h.number_string(),
                    slug: h.slug(tree),
                })
                .collect(),
        })
        .collect();
    IndexManifest {
        pages,
        diagnostics: diagnostics.to_vec(),
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

pub fn format_diagnostics(diagnostics: &[Diagnostic]) -> Vec<String> {
    diagnostics.iter().map(|d| format!("warning: {d}")).collect()
}

/// Print diagnostics to stderr.
pub fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for line in format_diagnostics(diagnostics) {
        eprintln!("{}", line);
    }
}

// ============================================================================
// combine / html / check
// ============================================================================

/// One-line summary of a combine run.
///
/// ```text
/// Combined 4 pages, 17 headings → manual.md (2 warnings)
/// ```
pub fn format_combine_summary(combined: &Combined, destination: Option<&Path>) -> Vec<String> {
    let mut line = format!(
        "Combined {}, {}",
        plural(combined.pages_written, "page"),
        plural(heading_count(combined.index.tree()), "heading")
    );
    if let Some(path) = destination {
        line.push_str(&format!(" → {}", path.display()));
    }
    if !combined.diagnostics.is_empty() {
        line.push_str(&format!(" ({})", plural(combined.diagnostics.len(), "warning")));
    }
    vec![line]
}

/// Print the summary to stderr, so it never mixes with document output on
/// stdout.
pub fn print_combine_summary(combined: &Combined, destination: Option<&Path>) {
    for line in format_combine_summary(combined, destination) {
        eprintln!("{}", line);
    }
}

/// Result line of `check`.
pub fn format_check_output(combined: &Combined) -> Vec<String> {
    let tree = combined.index.tree();
    let verdict = if combined.diagnostics.is_empty() {
        "no problems".to_string()
    } else {
        plural(combined.diagnostics.len(), "warning")
    };
    vec![format!(
        "Checked {}, {}: {verdict}",
        plural(tree.len(), "page"),
        plural(heading_count(tree), "heading")
    )]
}

pub fn print_check_output(combined: &Combined) {
    for line in format_check_output(combined) {
        println!("{}", line);
    }
}

// ============================================================================
