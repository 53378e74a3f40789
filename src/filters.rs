//! Line filters applied around the two passes.
//!
//! Before indexing, every page goes through the same preparation chain so
//! that pass 1 and pass 2 see identical lines:
//!
//! ```text
//! read_lines → strip_metadata → offset_headings → strip_heading
//! ```
//!
//! After resolution, [`chapter_head`] lines are prepended to file pages.
//! They are never indexed, so they carry no number and no anchor of their
//! own.
//!
//! All filters are pure and fence-aware where headings are concerned.

use crate::lines::{FenceState, MAX_LEVEL, parse_heading};
use regex::Regex;
use std::sync::LazyLock;

/// MkDocs-style meta line: `Key: value`.
static META_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+:(\s|$)").expect("meta pattern is valid"));

const FRONT_MATTER: &str = "---";

/// Split file content into lines with trailing whitespace removed.
pub fn read_lines(content: &str) -> Vec<String> {
    content.lines().map(|l| l.trim_end().to_string()).collect()
}

/// Heading line standing in for a navigation section's content.
pub fn section_heading(level: usize, title: &str) -> String {
    format!("{} {title}", "#".repeat(level.clamp(1, MAX_LEVEL)))
}

/// Chapter title for a file page, plus the blank line after it.
pub fn chapter_head(level: usize, title: &str) -> Vec<String> {
    vec![
        format!("{} {{: .page-title}}", section_heading(level, title)),
        String::new(),
    ]
}

/// Drop leading page metadata.
///
/// Two forms are recognized, only at the very top of the page:
///
/// - YAML front matter: a `---` line, anything, a closing `---` or `...`.
///   Without a closing delimiter nothing is removed.
/// - MkDocs meta: consecutive `Key: value` lines, with indented
///   continuation lines, ending at the first blank line.
///
/// Blank lines following the metadata are dropped as well.
pub fn strip_metadata(lines: Vec<String>) -> Vec<String> {
    let Some(first) = lines.first() else {
        return lines;
    };

    let end = if first == FRONT_MATTER {
        match lines
            .iter()
            .skip(1)
            .position(|l| l == FRONT_MATTER || l == "...")
        {
            Some(close) => close + 2,
            None => return lines,
        }
    } else if META_LINE.is_match(first) {
        lines
            .iter()
            .position(|l| l.is_empty() || !(META_LINE.is_match(l) || l.starts_with("    ") || l.starts_with('\t')))
            .unwrap_or(lines.len())
    } else {
        return lines;
    };

    lines
        .into_iter()
        .skip(end)
        .skip_while(|l| l.is_empty())
        .collect()
}

/// Push every heading `offset` levels deeper, never past level 6.
pub fn offset_headings(lines: Vec<String>, offset: usize) -> Vec<String> {
    if offset == 0 {
        return lines;
    }
    let mut fence = FenceState::default();
    lines
        .into_iter()
        .map(|line| {
            if fence.is_code(&line) {
                return line;
            }
            let level = parse_heading(&line).map(|(level, _)| level);
            match level {
                Some(level) => {
                    let deeper = (level + offset).min(MAX_LEVEL);
                    format!("{}{}", "#".repeat(deeper), &line[level..])
                }
                None => line,
            }
        })
        .collect()
}

/// Remove every section titled `title`: the heading line and everything up
/// to the next heading of the same or a higher level.
pub fn strip_heading(lines: Vec<String>, title: &str) -> Vec<String> {
    let title = title.trim();
    let mut fence = FenceState::default();
    let mut skipping: Option<usize> = None;
    let mut out = Vec::with_capacity(lines.len());

    for line in lines {
        let heading = if fence.is_code(&line) {
            None
        } else {
            parse_heading(&line)
        };

        if let Some((level, text)) = heading {
            if skipping.is_some_and(|skip| level <= skip) {
                skipping = None;
            }
            if skipping.is_none() && text == title {
                skipping = Some(level);
            }
        }

        if skipping.is_none() {
            out.push(line);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::lines;

    // =========================================================================
    // Reading and synthesized lines
    // =========================================================================

    #[test]
    fn read_lines_trims_trailing_whitespace() {
        assert_eq!(read_lines("# A  \ntext\t\n\n"), lines(&["# A", "text", ""]));
    }

    #[test]
    fn section_heading_uses_level() {
        assert_eq!(section_heading(2, "Guide"), "## Guide");
        assert_eq!(section_heading(9, "Deep"), "###### Deep");
    }

    #[test]
    fn chapter_head_carries_class() {
        assert_eq!(
            chapter_head(1, "Home"),
            lines(&["# Home {: .page-title}", ""])
        );
    }

    // =========================================================================
    // Metadata
    // =========================================================================

    #[test]
    fn strips_yaml_front_matter() {
        let input = lines(&["---", "title: Home", "tags: [a]", "---", "", "# Home"]);
        assert_eq!(strip_metadata(input), lines(&["# Home"]));
    }

    #[test]
    fn unclosed_front_matter_kept() {
        let input = lines(&["---", "title: Home", "# Home"]);
        assert_eq!(strip_metadata(input.clone()), input);
    }

    #[test]
    fn strips_mkdocs_meta() {
        let input = lines(&[
            "Title: Home",
            "Authors: Ann",
            "    Bob",
            "",
            "# Home",
            "Note: kept",
        ]);
        assert_eq!(strip_metadata(input), lines(&["# Home", "Note: kept"]));
    }

    #[test]
    fn plain_page_untouched() {
        let input = lines(&["# Home", "Key: value"]);
        assert_eq!(strip_metadata(input.clone()), input);
        assert!(strip_metadata(Vec::new()).is_empty());
    }

    #[test]
    fn horizontal_rule_later_is_not_front_matter() {
        let input = lines(&["# Home", "---", "text", "---"]);
        assert_eq!(strip_metadata(input.clone()), input);
    }

    // =========================================================================
    // Heading offset
    // =========================================================================

    #[test]
    fn offset_pushes_headings_down() {
        let input = lines(&["# Home", "text", "## Sub"]);
        assert_eq!(
            offset_headings(input, 1),
            lines(&["## Home", "text", "### Sub"])
        );
    }

    #[test]
    fn offset_clamps_at_six() {
        let input = lines(&["##### Five", "###### Six"]);
        assert_eq!(
            offset_headings(input, 2),
            lines(&["###### Five", "###### Six"])
        );
    }

    #[test]
    fn offset_skips_fenced_code() {
        let input = lines(&["```", "# comment", "```", "# Real"]);
        assert_eq!(
            offset_headings(input, 1),
            lines(&["```", "# comment", "```", "## Real"])
        );
    }

    #[test]
    fn zero_offset_is_identity() {
        let input = lines(&["# Home"]);
        assert_eq!(offset_headings(input.clone(), 0), input);
    }

    // =========================================================================
    // Heading strip
    // =========================================================================

    #[test]
    fn strip_removes_section_until_same_level() {
        let input = lines(&[
            "# Doc",
            "## Changelog",
            "- fixed",
            "### 1.0",
            "- first",
            "## Next",
            "kept",
        ]);
        assert_eq!(
            strip_heading(input, "Changelog"),
            lines(&["# Doc", "## Next", "kept"])
        );
    }

    #[test]
    fn strip_stops_at_higher_level() {
        let input = lines(&["## Changelog", "x", "# Top"]);
        assert_eq!(strip_heading(input, "Changelog"), lines(&["# Top"]));
    }

    #[test]
    fn strip_runs_to_end_when_last() {
        let input = lines(&["# Doc", "## Changelog", "x"]);
        assert_eq!(strip_heading(input, "Changelog"), lines(&["# Doc"]));
    }

    #[test]
    fn strip_ignores_fenced_lookalike() {
        let input = lines(&["```", "## Changelog", "```", "text"]);
        assert_eq!(strip_heading(input.clone(), "Changelog"), input);
    }

    #[test]
    fn strip_removes_every_occurrence() {
        let input = lines(&["## Changelog", "a", "## Keep", "## Changelog", "b"]);
        assert_eq!(strip_heading(input, "Changelog"), lines(&["## Keep"]));
    }
}
