//! Headings and the strings derived from them.
//!
//! A [`Heading`] is created by the indexer (pass 1) for every ATX heading
//! line and lives inside its [`Page`](crate::page::Page). Everything the
//! resolver (pass 2) writes back into the document is rendered from a
//! heading: the numbered heading line, the hyperlink reference and the text
//! reference.
//!
//! ## Slugs
//!
//! ```text
//! title            "Install Guide"
//! title slug       install-guide
//! unique slug      install-guide_2          (third heading with this title)
//! full slug        guide--setup--install-guide_2
//!                  └─ page slug ─┘
//! ```
//!
//! The full slug is unique across the whole document tree and is what
//! anchors and links use.

use crate::page::{PageId, PageTree};
use crate::slug::{PATH_SEPARATOR, UNIQUE_SEPARATOR, slugify};

/// Identity of a heading in the arena: its page plus its position in that
/// page's heading list.
///
/// Two headings are the same iff their full slugs are equal; since full
/// slugs are unique per tree, comparing ids is equivalent and does not need
/// the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeadingId {
    pub page: PageId,
    pub position: usize,
}

#[derive(Debug, Clone)]
pub struct Heading {
    /// Text after the `#` run, trimmed.
    pub title: String,
    /// Number of leading `#` (1–6).
    pub level: usize,
    /// Hierarchical number, e.g. `[1, 3, 2]`. `None` when numbering is off.
    pub number: Option<Vec<u32>>,
    /// Disambiguator among same-titled headings on the page; 0 = first.
    pub unique_title_id: usize,
    /// Owning page.
    pub page: PageId,
}

impl Heading {
    pub fn new(title: impl Into<String>, level: usize, page: PageId, number: Option<Vec<u32>>) -> Self {
        Self {
            title: title.into(),
            level,
            number,
            unique_title_id: 0,
            page,
        }
    }

    /// True when the number has exactly one component per level (or there
    /// is no number at all).
    pub fn number_matches_level(&self) -> bool {
        self.number.as_ref().is_none_or(|n| n.len() == self.level)
    }

    pub fn title_slug(&self) -> String {
        slugify(&self.title)
    }

    /// Title slug, suffixed with `_<id>` for every occurrence after the first.
    pub fn unique_title_slug(&self) -> String {
        let slug = self.title_slug();
        if self.unique_title_id == 0 {
            slug
        } else {
            format!("{slug}{UNIQUE_SEPARATOR}{}", self.unique_title_id)
        }
    }

    /// Globally unique slug: page slug, `--`, unique title slug.
    pub fn slug(&self, tree: &PageTree) -> String {
        format!(
            "{}{PATH_SEPARATOR}{}",
            tree.page(self.page).slug(),
            self.unique_title_slug()
        )
    }

    /// Dotted number, e.g. `"1.3.2"`.
    pub fn number_string(&self) -> Option<String> {
        self.number.as_ref().map(|n| {
            n.iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(".")
        })
    }

    /// Title with optional decorations.
    ///
    /// - `numbered`: prefix with the heading markers and number,
    ///   `"## 1.3  Title"`. Ignored when the heading has no number.
    /// - `with_anchor_id`: suffix with the anchor annotation,
    ///   `"Title {#page--title}"`.
    pub fn title(&self, tree: &PageTree, numbered: bool, with_anchor_id: bool) -> String {
        let mut title = self.title.clone();
        if numbered && let Some(number) = self.number_string() {
            title = format!("{} {number}  {}", self.markers(), self.title);
        }
        if with_anchor_id {
            title = format!("{title} {{#{}}}", self.slug(tree));
        }
        title
    }

    /// A complete heading line. Unlike [`title`](Self::title) this always
    /// starts with the `#` markers, numbered or not.
    pub fn heading_line(&self, tree: &PageTree, numbered: bool, with_anchor_id: bool) -> String {
        if numbered && self.number.is_some() {
            self.title(tree, true, with_anchor_id)
        } else {
            format!("{} {}", self.markers(), self.title(tree, false, with_anchor_id))
        }
    }

    /// `"(1.3) Title"`, or just the title when unnumbered.
    pub fn reference_title(&self) -> String {
        match self.number_string() {
            Some(number) => format!("({number}) {}", self.title),
            None => self.title.clone(),
        }
    }

    /// Markdown hyperlink to this heading: `[(1.3) Title](#page--title)`.
    pub fn reference_link(&self, tree: &PageTree) -> String {
        format!("[{}](#{})", self.reference_title(), self.slug(tree))
    }

    /// Link-free reference: ``**`(1.3) Title`**``. For outputs where anchors
    /// are unreliable, such as PDF.
    pub fn text_reference(&self) -> String {
        format!("**`{}`**", self.reference_title())
    }

    fn markers(&self) -> String {
        "#".repeat(self.level)
    }
}
