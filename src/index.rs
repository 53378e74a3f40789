//! Pass 1: heading indexing.
//!
//! Walks one page's prepared lines, creates a [`Heading`] for every ATX
//! heading outside fenced code, numbers it, and registers it on the page.
//! Lines are never rewritten here.
//!
//! ## Numbering
//!
//! Numbers continue across page boundaries: the indexer starts from the
//! number of the last heading of the previous page (`[0]` for the first
//! page) and, for each heading of level `n`:
//!
//! 1. truncates the carried number to `n` components if longer,
//! 2. appends a single `0` if shorter,
//! 3. increments the last component.
//!
//! ```text
//! carried [1, 2]   ## → [1, 3]    ### → [1, 3, 1]   ### → [1, 3, 2]
//! carried [1, 2, 3]  ## → [1, 3]
//! carried [1, 2]   #  → [2]
//! ```
//!
//! Jumping more than one level deeper (`[1]` then `###`) only pads once and
//! yields a number shorter than the level; that heading is reported as a
//! diagnostic and keeps the short number.

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::heading::Heading;
use crate::lines::{FenceState, parse_heading};
use crate::page::{PageId, PageTree};

/// Number carried into the first page.
pub fn initial_number() -> Vec<u32> {
    vec![0]
}

/// Apply the truncate / pad / increment rule for a heading at `level`.
pub fn next_number(carried: &[u32], level: usize) -> Vec<u32> {
    let mut number = carried.to_vec();
    number.truncate(level);
    if number.len() < level {
        number.push(0);
    }
    if let Some(last) = number.last_mut() {
        *last += 1;
    }
    number
}

/// Indexes pages one at a time, in navigation order.
#[derive(Debug)]
pub struct HeadingIndexer {
    numbered: bool,
    diagnostics: Vec<Diagnostic>,
}

impl HeadingIndexer {
    pub fn new(numbered: bool) -> Self {
        Self {
            numbered,
            diagnostics: Vec::new(),
        }
    }

    /// Index `lines` into the page `page_id`.
    ///
    /// `carried` is the number returned by the previous call (or
    /// [`initial_number`]); the return value seeds the next page. When
    /// numbering is off the carried value passes through untouched.
    pub fn index_page(
        &mut self,
        tree: &mut PageTree,
        page_id: PageId,
        lines: &[String],
        carried: Vec<u32>,
    ) -> Vec<u32> {
        let mut carried = carried;
        let mut fence = FenceState::default();

        for (i, line) in lines.iter().enumerate() {
            if fence.is_code(line) {
                continue;
            }
            let Some((level, title)) = parse_heading(line) else {
                continue;
            };

            let number = self.numbered.then(|| next_number(&carried, level));
            let heading = Heading::new(title, level, page_id, number);

            if !heading.number_matches_level() {
                let page = tree.page(page_id);
                self.diagnostics.push(Diagnostic::new(
                    page.label(),
                    Some(i + 1),
                    DiagnosticKind::NumberLevelMismatch {
                        title: heading.title.clone(),
                        level,
                        number: heading.number.clone().unwrap_or_default(),
                    },
                ));
            }

            if let Some(number) = &heading.number {
                carried = number.clone();
            }
            tree.page_mut(page_id).add_heading(heading);
        }

        carried
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
