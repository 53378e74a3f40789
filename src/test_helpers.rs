//! Shared test utilities for the md-combine test suite.
//!
//! Provides line builders and temp project setup for tests that work with
//! page content, the page tree and the combine pipeline.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = write_project("[output]\nnumbered_headings = true\n", &[
//!     ("index.md", "# Home"),
//!     ("guide/install.md", "# Install"),
//! ]);
//! let project = Project::load(&tmp.path().join("combine.toml"), &OutputOverrides::default())?;
//!
//! assert_eq!(find_page(project.index()?.index.tree(), "Install").slug(), "guide--install");
//! ```

use std::fs;
use tempfile::TempDir;

use crate::page::{Page, PageTree};

// =========================================================================
// Line builders
// =========================================================================

/// Owned lines from string literals.
pub fn lines(input: &[&str]) -> Vec<String> {
    input.iter().map(|l| l.to_string()).collect()
}

// =========================================================================
// Fixture setup
// =========================================================================

/// Create a temp project: `combine.toml` with `config` as its content and
/// each `(path, content)` pair written under `docs/`.
pub fn write_project(config: &str, files: &[(&str, &str)]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("combine.toml"), config).unwrap();
    let docs = tmp.path().join("docs");
    fs::create_dir_all(&docs).unwrap();
    for (path, content) in files {
        let file = docs.join(path);
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(file, content).unwrap();
    }
    tmp
}

// =========================================================================
// Tree lookups — panics with a clear message on miss
// =========================================================================

/// Find a page by title. Panics if not found.
pub fn find_page<'a>(tree: &'a PageTree, title: &str) -> &'a Page {
    tree.pages().find(|p| p.title == title).unwrap_or_else(|| {
        let titles: Vec<&str> = tree.pages().map(|p| p.title.as_str()).collect();
        panic!("page '{title}' not found. Available: {titles:?}")
    })
}

/// Titles of a page's headings, in load order.
pub fn heading_titles(page: &Page) -> Vec<&str> {
    page.headings().iter().map(|h| h.title.as_str()).collect()
}

// =========================================================================
// Tree shape assertion
// =========================================================================

/// Assert the page tree's titles and depths, in navigation order.
///
/// ```rust
/// assert_tree_shape(&tree, &[("Home", 1), ("Guide", 1), ("Install", 2)]);
/// ```
pub fn assert_tree_shape(tree: &PageTree, expected: &[(&str, usize)]) {
    let actual: Vec<(&str, usize)> = tree
        .pages()
        .map(|p| (p.title.as_str(), tree.level(p.id)))
        .collect();
    assert_eq!(actual, expected, "page tree shape mismatch");
}
