//! # md-combine
//!
//! Combines a tree of markdown pages into a single document. Pages are read
//! in navigation order; links between pages are rewritten into anchors
//! inside the combined document, and headings can be numbered continuously
//! across page boundaries.
//!
//! # Architecture: Two Passes Over Prepared Lines
//!
//! ```text
//! 1. Index     prepared lines  →  DocumentIndex   (headings, numbers, slugs)
//! 2. Resolve   prepared lines  →  output lines    (headings + links rewritten)
//! ```
//!
//! Every page is prepared once (metadata stripped, heading levels offset,
//! unwanted sections removed) and both passes read the same lines. Pass 1
//! completes for every page before pass 2 starts, so a link may point at a
//! page further down the navigation. The page tree is consumed into a
//! read-only [`page::DocumentIndex`] between the passes; the resolver only
//! accepts that type.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`slug`] | Title → URL-safe slug |
//! | [`heading`] | Heading record, unique/full slugs, rendered heading lines and references |
//! | [`page`] | Page arena, per-page heading index, global path index, frozen `DocumentIndex` |
//! | [`lines`] | ATX heading and code fence recognition shared by both passes |
//! | [`index`] | Pass 1: heading indexer and the numbering rule |
//! | [`xref`] | Pass 2: heading matching and link rewriting |
//! | [`filters`] | Line filters: metadata strip, heading offset, heading strip, chapter heads |
//! | [`nav`] | Navigation entries, tree flattening, docs directory discovery |
//! | [`combine`] | The pipeline, page sources, project loading |
//! | [`config`] | `combine.toml` loading, merging, validation |
//! | [`render`] | HTML export via pulldown-cmark and maud |
//! | [`diagnostics`] | Non-fatal findings returned with the output |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Slugs From the Navigation Path
//!
//! A heading's anchor is its page's path in the navigation plus its own
//! title: `guide--install--requirements`. Two pages may both have a
//! "Requirements" heading without colliding, and anchors stay stable when a
//! page's file moves as long as its place in the navigation does not.
//!
//! ## Diagnostics, Not Prints
//!
//! The engine never writes to stdout or stderr. Recoverable findings (an
//! unknown fragment, a heading numbered at the wrong depth) are returned as
//! [`diagnostics::Diagnostic`] values and the CLI decides how to show them.
//! A link to a page outside the navigation is the one fatal condition.

pub mod combine;
pub mod config;
pub mod diagnostics;
pub mod filters;
pub mod heading;
pub mod index;
pub mod lines;
pub mod nav;
pub mod output;
pub mod page;
pub mod render;
pub mod slug;
pub mod xref;

#[cfg(test)]
pub(crate) mod test_helpers;
