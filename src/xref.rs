//! Pass 2: cross-reference resolution.
//!
//! Runs over each page's prepared lines again, this time against the frozen
//! [`DocumentIndex`], and rewrites two things:
//!
//! - **Heading lines** are matched back to the headings pass 1 indexed. With
//!   numbering on they become `## 1.3  Title {#page--title}`.
//! - **Links** of the form `[text](file.md#fragment)`, `[text](file.md)` or
//!   `[text](#fragment)` become `[(1.3) Title](#page--title)`, or
//!   ``**`(1.3) Title`**`` when text references are requested.
//!
//! ## Matching repeated headings
//!
//! A page with two `## Foo` headings has them indexed as `foo` and `foo_1`.
//! The resolver remembers which headings it already matched on the page and
//! probes `foo`, `foo_1`, `foo_2`, ... until it finds one not yet consumed,
//! so the n-th occurrence in the text matches the n-th indexed heading. A
//! probe that misses the index entirely settles on the page anchor. Probing
//! is bounded by the page's heading count.
//!
//! ## Link targets
//!
//! The file part is resolved relative to the linking page's directory
//! (`/`-prefixed paths are docs-root relative) and must name a page in the
//! navigation; anything else is a [`XrefError::DanglingReference`]. A missing
//! or unknown fragment falls back to the target page's anchor heading.
//! A link title (`[t](file.md "Title")`) is accepted and dropped on rewrite.
//! Images, links with a URL scheme and links to non-markdown files are left
//! alone.

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::heading::{Heading, HeadingId};
use crate::lines::{FenceState, parse_heading};
use crate::page::{DocumentIndex, Page, PageId, resolve_link_path};
use regex::{Captures, Regex};
use std::collections::HashSet;
use std::sync::LazyLock;
use thiserror::Error;

static LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(!?)\[([^\]]*)\]\(([^)\s#]*)(?:#([^)\s]*))?(?:\s+(?:"[^"]*"|'[^']*'))?\)"#)
        .expect("link pattern is valid")
});

#[derive(Error, Debug)]
pub enum XrefError {
    #[error("{page}:{line}: link {link} points to '{target}', which is not in the navigation")]
    DanglingReference {
        page: String,
        line: usize,
        link: String,
        target: String,
    },
}

/// How resolved headings and links are written back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct XrefOptions {
    /// Rewrite heading lines with their number and anchor id.
    pub numbered: bool,
    /// Render links as bold text instead of hyperlinks.
    pub text_refs: bool,
    /// Add anchor ids to heading lines even when numbering is off.
    pub anchor_ids: bool,
}

/// Output of resolving one page.
#[derive(Debug, Default)]
pub struct ResolvedPage {
    pub lines: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct XrefResolver<'a> {
    index: &'a DocumentIndex,
    options: XrefOptions,
}

/// Per-page resolution state.
struct PageRun<'a> {
    page: &'a Page,
    consumed: HashSet<HeadingId>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> XrefResolver<'a> {
    pub fn new(index: &'a DocumentIndex, options: XrefOptions) -> Self {
        Self { index, options }
    }

    /// Rewrite one page's prepared lines.
    ///
    /// The lines must be the same ones pass 1 indexed for this page, or
    /// heading matching will drift.
    pub fn resolve_page(&self, page_id: PageId, lines: &[String]) -> Result<ResolvedPage, XrefError> {
        let mut run = PageRun {
            page: self.index.page(page_id),
            consumed: HashSet::new(),
            diagnostics: Vec::new(),
        };
        let mut fence = FenceState::default();
        let mut out = Vec::with_capacity(lines.len());

        for (i, line) in lines.iter().enumerate() {
            let line_no = i + 1;
            if fence.is_code(line) {
                out.push(line.clone());
                continue;
            }

            let mut line = line.clone();
            if let Some((level, title)) = parse_heading(&line)
                && let Some(id) = self.match_heading(&mut run, level, title, line_no)
            {
                run.consumed.insert(id);
                let heading = self.index.heading(id);
                let tree = self.index.tree();
                if self.options.numbered {
                    line = heading.heading_line(tree, true, true);
                } else if self.options.anchor_ids {
                    line = heading.heading_line(tree, false, true);
                }
            }

            out.push(self.rewrite_links(&mut run, &line, line_no)?);
        }

        Ok(ResolvedPage {
            lines: out,
            diagnostics: run.diagnostics,
        })
    }

    /// Find the indexed heading for a heading line, skipping ones already
    /// matched earlier on the page.
    fn match_heading(
        &self,
        run: &mut PageRun<'_>,
        level: usize,
        title: &str,
        line_no: usize,
    ) -> Option<HeadingId> {
        let mut probe = Heading::new(title, level, run.page.id, None);
        let bound = run.page.headings().len() + 1;

        for attempt in 0..bound {
            probe.unique_title_id = attempt;
            match run.page.lookup(&probe.unique_title_slug()) {
                Some(id) if !run.consumed.contains(&id) => return Some(id),
                Some(_) => continue,
                None => return run.page.anchor(),
            }
        }

        run.diagnostics.push(Diagnostic::new(
            run.page.label(),
            Some(line_no),
            DiagnosticKind::ProbeExhausted {
                title: title.to_string(),
                attempts: bound,
            },
        ));
        run.page.anchor()
    }

    /// Replace every cross-reference link on the line.
    fn rewrite_links(&self, run: &mut PageRun<'_>, line: &str, line_no: usize) -> Result<String, XrefError> {
        let mut out = String::with_capacity(line.len());
        let mut last = 0;

        for caps in LINK.captures_iter(line) {
            let Some(whole) = caps.get(0) else { continue };
            let Some(replacement) = self.resolve_link(run, &caps, line_no)? else {
                continue;
            };
            out.push_str(&line[last..whole.start()]);
            out.push_str(&replacement);
            last = whole.end();
        }

        out.push_str(&line[last..]);
        Ok(out)
    }

    /// Resolve one matched link. `Ok(None)` leaves the link as written.
    fn resolve_link(
        &self,
        run: &mut PageRun<'_>,
        caps: &Captures<'_>,
        line_no: usize,
    ) -> Result<Option<String>, XrefError> {
        let link = &caps[0];
        let file = caps.get(3).map_or("", |m| m.as_str());
        let fragment = caps.get(4).map_or("", |m| m.as_str());

        if !caps[1].is_empty() || (file.is_empty() && fragment.is_empty()) {
            return Ok(None);
        }
        if !file.is_empty() && (file.contains("://") || !file.ends_with(".md")) {
            return Ok(None);
        }

        let target = if file.is_empty() {
            run.page
        } else {
            let path = resolve_link_path(run.page.file_path.as_deref(), file);
            let id = self
                .index
                .page_for_path(&path)
                .ok_or_else(|| XrefError::DanglingReference {
                    page: run.page.label().to_string(),
                    line: line_no,
                    link: link.to_string(),
                    target: path,
                })?;
            self.index.page(id)
        };

        if !fragment.is_empty() && target.lookup(fragment).is_none() && target.anchor().is_some() {
            run.diagnostics.push(Diagnostic::new(
                run.page.label(),
                Some(line_no),
                DiagnosticKind::UnknownFragment {
                    fragment: fragment.to_string(),
                    target: target.label().to_string(),
                },
            ));
        }

        let Some(id) = target.get_heading(fragment) else {
            run.diagnostics.push(Diagnostic::new(
                run.page.label(),
                Some(line_no),
                DiagnosticKind::EmptyTarget {
                    link: link.to_string(),
                    target: target.label().to_string(),
                },
            ));
            return Ok(None);
        };

        let heading = self.index.heading(id);
        Ok(Some(if self.options.text_refs {
            heading.text_reference()
        } else {
            heading.reference_link(self.index.tree())
        }))
    }
}
