//! Non-fatal findings collected while combining.
//!
//! The engine never prints. Anything worth telling the user that does not
//! stop the run becomes a [`Diagnostic`] and is returned next to the output;
//! the CLI formats them through [`crate::output`].

use serde::Serialize;
use std::fmt;

/// A warning tied to a page and, when known, a 1-based line of its
/// prepared content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Source path of the page, or its title for navigation sections.
    pub page: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub kind: DiagnosticKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A heading's number does not have one component per level.
    NumberLevelMismatch {
        title: String,
        level: usize,
        number: Vec<u32>,
    },
    /// Disambiguation probing hit its bound and settled on the page anchor.
    ProbeExhausted { title: String, attempts: usize },
    /// A link fragment names no heading; the link points at the page anchor.
    UnknownFragment { fragment: String, target: String },
    /// A link targets a page that has no headings to point at.
    EmptyTarget { link: String, target: String },
    /// Two sibling pages slugify to the same path; the later one was suffixed.
    DuplicatePageSlug { title: String, slug: String },
}

impl Diagnostic {
    pub fn new(page: impl Into<String>, line: Option<usize>, kind: DiagnosticKind) -> Self {
        Self {
            page: page.into(),
            line,
            kind,
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::NumberLevelMismatch {
                title,
                level,
                number,
            } => {
                let number: Vec<String> = number.iter().map(u32::to_string).collect();
                write!(
                    f,
                    "heading '{title}' is level {level} but numbered {}",
                    number.join(".")
                )
            }
            DiagnosticKind::ProbeExhausted { title, attempts } => write!(
                f,
                "no free match for heading '{title}' after {attempts} probes, using page anchor"
            ),
            DiagnosticKind::UnknownFragment { fragment, target } => {
                write!(f, "no heading '#{fragment}' in {target}, linking to page anchor")
            }
            DiagnosticKind::EmptyTarget { link, target } => {
                write!(f, "link {link} points at {target}, which has no headings")
            }
            DiagnosticKind::DuplicatePageSlug { title, slug } => {
                write!(f, "page '{title}' collides with a sibling, slugged as '{slug}'")
            }
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}: {}", self.page, line, self.kind),
            None => write!(f, "{}: {}", self.page, self.kind),
        }
    }
}
