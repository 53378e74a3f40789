//! Navigation: the ordered list of pages to combine.
//!
//! Navigation comes from the `[[nav]]` tables of `combine.toml`, or, when
//! none are configured, from walking the docs directory. Either way it is
//! flattened into a [`PageTree`] parent-first, in reading order, which fixes
//! the order of both passes.
//!
//! ## Discovery
//!
//! ```text
//! docs/
//! ├── index.md              → "Home"       (index.md always first)
//! ├── 010-getting-started.md → "Getting started"
//! └── user_guide/           → section "User guide"
//!     ├── index.md          → "User guide"
//!     └── install.md        → "Install"
//! ```
//!
//! Entries are sorted by file name. Titles come from the file stem: an
//! optional `NNN-` ordering prefix is dropped, dashes and underscores become
//! spaces and the first letter is capitalised. Hidden entries and
//! directories without any markdown are skipped.

use crate::page::{PageId, PageTree};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum NavError {
    #[error("Navigation is empty: no [[nav]] entries and no markdown under the docs dir")]
    Empty,
    #[error("Nav entry '{0}' has neither a file nor children")]
    MissingFile(String),
    #[error("Cannot read docs dir: {0}")]
    Walk(#[from] walkdir::Error),
}

/// One navigation entry. A leaf has a `file`; a section has `children`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NavEntry {
    pub title: String,
    /// Path of the markdown source, relative to the docs dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavEntry>,
}

impl NavEntry {
    pub fn page(title: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            file: Some(file.into()),
            children: Vec::new(),
        }
    }

    pub fn section(title: impl Into<String>, children: Vec<NavEntry>) -> Self {
        Self {
            title: title.into(),
            file: None,
            children,
        }
    }
}

/// Flatten navigation into a page tree, parent before children.
pub fn build_tree(entries: &[NavEntry]) -> Result<PageTree, NavError> {
    if entries.is_empty() {
        return Err(NavError::Empty);
    }
    let mut tree = PageTree::new();
    add_entries(&mut tree, entries, None)?;
    Ok(tree)
}

fn add_entries(tree: &mut PageTree, entries: &[NavEntry], parent: Option<PageId>) -> Result<(), NavError> {
    for entry in entries {
        if entry.file.is_none() && entry.children.is_empty() {
            return Err(NavError::MissingFile(entry.title.clone()));
        }
        let id = tree.add_page(&entry.title, parent, entry.file.clone());
        add_entries(tree, &entry.children, Some(id))?;
    }
    Ok(())
}

/// Build navigation by walking `docs_dir`.
pub fn discover(docs_dir: &Path) -> Result<Vec<NavEntry>, NavError> {
    let entries = discover_dir(docs_dir, docs_dir)?;
    if entries.is_empty() {
        return Err(NavError::Empty);
    }
    Ok(entries)
}

fn discover_dir(dir: &Path, root: &Path) -> Result<Vec<NavEntry>, NavError> {
    let mut index = None;
    let mut entries = Vec::new();

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();
    for entry in walker {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy();
        if name.starts_with('.') {
            continue;
        }
        let path = entry.path();

        if entry.file_type().is_dir() {
            let children = discover_dir(path, root)?;
            if !children.is_empty() {
                entries.push(NavEntry::section(title_from_stem(&name), children));
            }
            continue;
        }

        let is_markdown = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("md"))
            .unwrap_or(false);
        if !is_markdown {
            continue;
        }

        let Some(rel) = relative_path(path, root) else {
            continue;
        };
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        if stem == "index" {
            let title = if dir == root {
                "Home".to_string()
            } else {
                dir.file_name()
                    .map(|n| title_from_stem(&n.to_string_lossy()))
                    .unwrap_or_else(|| "Home".to_string())
            };
            index = Some(NavEntry::page(title, rel));
        } else {
            entries.push(NavEntry::page(title_from_stem(&stem), rel));
        }
    }

    if let Some(index) = index {
        entries.insert(0, index);
    }
    Ok(entries)
}

/// `/`-separated path of `path` relative to `root`.
fn relative_path(path: &Path, root: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    Some(parts.join("/"))
}

/// Display title for a file stem or directory name.
///
/// - `"getting-started"` → `"Getting started"`
/// - `"010-user_guide"` → `"User guide"`
/// - `"010"` → `"010"` (nothing left after the prefix)
pub fn title_from_stem(stem: &str) -> String {
    let name = match stem.split_once('-') {
        Some((prefix, rest))
            if !prefix.is_empty() && !rest.is_empty() && prefix.bytes().all(|b| b.is_ascii_digit()) =>
        {
            rest
        }
        _ => stem,
    };
    let spaced = name.replace(['-', '_'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
