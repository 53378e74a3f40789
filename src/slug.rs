//! Anchor-safe slugs for titles.
//!
//! Every anchor in the combined document is built from slugs produced here:
//! page titles become the path segments of a page slug, heading titles become
//! the last segment of a heading slug.
//!
//! The transform is:
//! 1. trim surrounding whitespace
//! 2. spaces → `-`
//! 3. lowercase
//! 4. drop everything outside `[a-z0-9-_]`
//!
//! - `"Getting Started"` → `"getting-started"`
//! - `"What's new?"` → `"whats-new"`
//! - `"  API / v2  "` → `"api--v2"`

/// Separator between the segments of a composite page slug, and between a
/// page slug and a heading's unique title slug.
pub const PATH_SEPARATOR: &str = "--";

/// Separator between a title slug and its disambiguation counter.
pub const UNIQUE_SEPARATOR: char = '_';

/// Turn a title into an anchor-safe token.
pub fn slugify(title: &str) -> String {
    title
        .trim()
        .replace(' ', "-")
        .to_lowercase()
        .chars()
        .filter(|c| matches!(c, 'a'..='z' | '0'..='9' | '-' | '_'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spaces_become_dashes() {
        assert_eq!(slugify("Getting Started"), "getting-started");
    }

    #[test]
    fn surrounding_whitespace_trimmed() {
        assert_eq!(slugify("  Install  "), "install");
    }

    #[test]
    fn punctuation_stripped() {
        assert_eq!(slugify("What's new?"), "whats-new");
        assert_eq!(slugify("API / v2"), "api--v2");
    }

    #[test]
    fn uppercase_lowered() {
        assert_eq!(slugify("README"), "readme");
    }

    #[test]
    fn underscores_and_digits_kept() {
        assert_eq!(slugify("step_2 of 3"), "step_2-of-3");
    }

    #[test]
    fn non_ascii_letters_dropped() {
        assert_eq!(slugify("Café Menü"), "caf-men");
    }

    #[test]
    fn empty_title_gives_empty_slug() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("   "), "");
    }

    #[test]
    fn idempotent() {
        let samples = [
            "Getting Started",
            "  What's new?  ",
            "API / v2",
            "step_2 of 3",
            "Ünïcödé Tïtle",
            "--already-slugged--",
            "tabs\tand\nnewlines",
            "",
        ];
        for s in samples {
            let once = slugify(s);
            assert_eq!(slugify(&once), once, "not idempotent for {s:?}");
        }
    }
}
