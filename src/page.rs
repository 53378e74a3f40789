//! The page tree: an arena of pages built from the navigation.
//!
//! Pages are created once, while the navigation is flattened, before any
//! content is read. Each page owns its headings and a local slug index. The
//! tree also owns the global index from normalized source path to page.
//!
//! ## Lifecycle
//!
//! ```text
//! PageTree::add_page      (navigation flattening)
//!        │
//!        ▼
//! Page::add_heading       (pass 1 only, append-only)
//!        │
//!        ▼
//! PageTree::freeze ─────► DocumentIndex   (read-only, pass 2)
//! ```
//!
//! [`DocumentIndex`] has no mutating methods, and the resolver only accepts
//! that type, so nothing can add a heading once resolution has started.
//!
//! ## Page slugs
//!
//! A page slug is the slugified titles of the page and its ancestors, root
//! first, joined with `--`:
//!
//! ```text
//! User Guide            user-guide
//! └── Setup             user-guide--setup
//!     └── Linux         user-guide--setup--linux
//! ```
//!
//! Sibling pages whose titles slugify identically would share a namespace;
//! the later one gets a `_<n>` suffix on its own segment and a diagnostic.

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::heading::{Heading, HeadingId};
use crate::slug::{PATH_SEPARATOR, UNIQUE_SEPARATOR, slugify};
use std::collections::{HashMap, HashSet};

/// Stable index of a page in its [`PageTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(usize);

impl PageId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
pub struct Page {
    pub id: PageId,
    pub title: String,
    pub parent: Option<PageId>,
    /// Normalized path relative to the docs root. `None` for sections.
    pub file_path: Option<String>,
    pub is_section: bool,
    segment: String,
    slug: String,
    headings: Vec<Heading>,
    heading_index: HashMap<String, usize>,
}

impl Page {
    /// Composite slug of this page, root-first.
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Headings in load order.
    pub fn headings(&self) -> &[Heading] {
        &self.headings
    }

    pub fn heading(&self, position: usize) -> &Heading {
        &self.headings[position]
    }

    /// Label used in diagnostics and errors: the source path, or the title
    /// for navigation sections.
    pub fn label(&self) -> &str {
        self.file_path.as_deref().unwrap_or(&self.title)
    }

    /// Add a heading, making its unique title slug unique on this page.
    ///
    /// The first heading is also registered under the page slug and becomes
    /// the page's anchor. Later headings whose unique slug is taken get
    /// their `unique_title_id` bumped until a free slug is found, so the
    /// n-th heading with a given title ends up with id `n - 1`.
    pub fn add_heading(&mut self, mut heading: Heading) -> HeadingId {
        let position = self.headings.len();
        if position == 0 {
            self.heading_index.insert(self.slug.clone(), position);
        } else {
            // At most `len` keys are taken, so one of the first `len + 1`
            // ids is always free.
            let bound = self.heading_index.len();
            while heading.unique_title_id <= bound
                && self.heading_index.contains_key(&heading.unique_title_slug())
            {
                heading.unique_title_id += 1;
            }
        }
        self.heading_index
            .insert(heading.unique_title_slug(), position);
        self.headings.push(heading);
        HeadingId {
            page: self.id,
            position,
        }
    }

    /// Exact lookup in the local index.
    pub fn lookup(&self, slug: &str) -> Option<HeadingId> {
        self.heading_index.get(slug).map(|&position| HeadingId {
            page: self.id,
            position,
        })
    }

    /// The first heading ever added, if any.
    pub fn anchor(&self) -> Option<HeadingId> {
        (!self.headings.is_empty()).then_some(HeadingId {
            page: self.id,
            position: 0,
        })
    }

    /// Lookup with fallback: an unknown slug resolves to the page anchor,
    /// so an empty or stale fragment still lands on the right page.
    pub fn get_heading(&self, slug: &str) -> Option<HeadingId> {
        self.lookup(slug).or_else(|| self.anchor())
    }
}

/// Arena of pages in navigation order, plus the global path index.
#[derive(Debug, Default)]
pub struct PageTree {
    pages: Vec<Page>,
    paths: HashMap<String, PageId>,
    slugs: HashSet<String>,
    diagnostics: Vec<Diagnostic>,
}

impl PageTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page. Pages must be added parent-first, in navigation
    /// order; that order is the document order for both passes.
    pub fn add_page(
        &mut self,
        title: impl Into<String>,
        parent: Option<PageId>,
        file_path: Option<String>,
    ) -> PageId {
        let title = title.into();
        let id = PageId(self.pages.len());

        let base = slugify(&title);
        let mut segment = base.clone();
        let mut slug = self.compose_slug(parent, &segment);
        let mut suffix = 0;
        while self.slugs.contains(&slug) {
            suffix += 1;
            segment = format!("{base}{UNIQUE_SEPARATOR}{suffix}");
            slug = self.compose_slug(parent, &segment);
        }
        if suffix > 0 {
            self.diagnostics.push(Diagnostic::new(
                file_path.as_deref().unwrap_or(&title),
                None,
                DiagnosticKind::DuplicatePageSlug {
                    title: title.clone(),
                    slug: slug.clone(),
                },
            ));
        }
        self.slugs.insert(slug.clone());

        let file_path = file_path.map(|p| normalize_path(&p));
        if let Some(path) = &file_path {
            self.paths.entry(path.clone()).or_insert(id);
        }
        let is_section = file_path.is_none();

        self.pages.push(Page {
            id,
            title,
            parent,
            file_path,
            is_section,
            segment,
            slug,
            headings: Vec::new(),
            heading_index: HashMap::new(),
        });
        id
    }

    pub fn page(&self, id: PageId) -> &Page {
        &self.pages[id.0]
    }

    pub fn page_mut(&mut self, id: PageId) -> &mut Page {
        &mut self.pages[id.0]
    }

    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = PageId> + use<> {
        (0..self.pages.len()).map(PageId)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn heading(&self, id: HeadingId) -> &Heading {
        self.page(id.page).heading(id.position)
    }

    /// Page whose source is at `path` (normalized, docs-root relative).
    pub fn page_for_path(&self, path: &str) -> Option<PageId> {
        self.paths.get(path).copied()
    }

    /// Depth in the navigation tree; top-level pages are level 1.
    pub fn level(&self, id: PageId) -> usize {
        let mut level = 0;
        let mut current = Some(id);
        while let Some(page) = current {
            level += 1;
            current = self.page(page).parent;
        }
        level
    }

    /// Diagnostics raised while building the tree.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// End of pass 1: no more headings can be added.
    pub fn freeze(self) -> DocumentIndex {
        DocumentIndex { tree: self }
    }

    /// Walk from `parent` to the root collecting slug segments, then join
    /// them root-first with `segment` last.
    fn compose_slug(&self, parent: Option<PageId>, segment: &str) -> String {
        let mut segments = vec![segment];
        let mut current = parent;
        while let Some(id) = current {
            let page = self.page(id);
            segments.push(&page.segment);
            current = page.parent;
        }
        segments.reverse();
        segments.join(PATH_SEPARATOR)
    }
}

/// Read-only view of a fully indexed [`PageTree`].
#[derive(Debug)]
pub struct DocumentIndex {
    tree: PageTree,
}

impl DocumentIndex {
    pub fn tree(&self) -> &PageTree {
        &self.tree
    }

    pub fn page(&self, id: PageId) -> &Page {
        self.tree.page(id)
    }

    pub fn heading(&self, id: HeadingId) -> &Heading {
        self.tree.heading(id)
    }

    pub fn page_for_path(&self, path: &str) -> Option<PageId> {
        self.tree.page_for_path(path)
    }
}

/// Normalize a `/`-separated relative path: drop `.` and empty segments,
/// fold `..` into its parent. Leading `..` that cannot be folded is kept.
pub fn normalize_path(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }
    parts.join("/")
}

/// Resolve a link target written on the page at `from` into a normalized
/// docs-root path. A leading `/` makes the target root-relative already;
/// otherwise it is relative to the directory of `from`. Sections have no
/// directory and resolve from the root.
pub fn resolve_link_path(from: Option<&str>, target: &str) -> String {
    if let Some(rooted) = target.strip_prefix('/') {
        return normalize_path(rooted);
    }
    let dir = from
        .and_then(|f| f.rsplit_once('/'))
        .map(|(dir, _)| dir)
        .unwrap_or("");
    if dir.is_empty() {
        normalize_path(target)
    } else {
        normalize_path(&format!("{dir}/{target}"))
    }
}
