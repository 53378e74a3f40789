//! HTML export of the combined document.
//!
//! The combined markdown is rendered with pulldown-cmark, heading attributes
//! enabled so the `{#slug}` anchors written by the resolver become element
//! ids, and wrapped in a standalone maud document.
//!
//! Chapter heads carry a Python-Markdown style `{: .page-title}` attribute
//! list. pulldown-cmark expects `{.page-title}`, so heading lines are
//! normalized before parsing.

use crate::lines::{FenceState, parse_heading};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Options, Parser, html as md_html};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

const CSS: &str = r#"
body { max-width: 48rem; margin: 2rem auto; padding: 0 1rem; font-family: system-ui, sans-serif; line-height: 1.5; }
h1, h2, h3, h4, h5, h6 { line-height: 1.2; }
.page-title { border-bottom: 1px solid #ccc; padding-bottom: 0.25em; }
pre { overflow-x: auto; padding: 0.75rem; background: #f5f5f5; }
table { border-collapse: collapse; }
th, td { border: 1px solid #ccc; padding: 0.25rem 0.5rem; }
"#;

/// Render combined markdown to a complete HTML document.
pub fn render_html(title: &str, markdown: &str) -> Markup {
    let source = normalize_attribute_lists(markdown);
    let mut options = Options::empty();
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);

    let parser = Parser::new_ext(&source, options);
    let mut body = String::new();
    md_html::push_html(&mut body, parser);

    base_document(title, html! { main { (PreEscaped(body)) } })
}

/// Render and write to `path`.
pub fn write_html(path: &Path, title: &str, markdown: &str) -> Result<(), RenderError> {
    fs::write(path, render_html(title, markdown).into_string())?;
    Ok(())
}

fn base_document(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(CSS)) }
            }
            body {
                (content)
            }
        }
    }
}

/// Turn `{: .class}` into `{.class}` on heading lines outside code.
fn normalize_attribute_lists(markdown: &str) -> String {
    let mut fence = FenceState::default();
    let mut out = String::with_capacity(markdown.len());
    for line in markdown.lines() {
        if !fence.is_code(line) && parse_heading(line).is_some() && line.ends_with('}') {
            out.push_str(&line.replace(" {: ", " {"));
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_has_doctype_and_title() {
        let doc = render_html("Manual", "# Hello").into_string();
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<title>Manual</title>"));
    }

    #[test]
    fn title_is_escaped() {
        let doc = render_html("A <b> & C", "text").into_string();
        assert!(doc.contains("<title>A &lt;b&gt; &amp; C</title>"));
    }

    #[test]
    fn anchor_ids_become_element_ids() {
        let doc = render_html("T", "# 1  Home {#home--home}\n\n[(1) Home](#home--home)").into_string();
        assert!(doc.contains(r#"<h1 id="home--home">1  Home</h1>"#));
        assert!(doc.contains(r##"<a href="#home--home">(1) Home</a>"##));
    }

    #[test]
    fn chapter_head_class_applied() {
        let doc = render_html("T", "# Home {: .page-title}\n").into_string();
        assert!(doc.contains(r#"class="page-title""#));
        assert!(!doc.contains("{:"));
    }

    #[test]
    fn attribute_lists_in_code_untouched() {
        let src = "```\n# x {: .y}\n```\n";
        assert_eq!(normalize_attribute_lists(src), src);
    }

    #[test]
    fn write_html_creates_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("out.html");
        write_html(&path, "T", "# Hi").unwrap();
        let written = fs::read_to_string(path).unwrap();
        assert!(written.contains("<h1>Hi</h1>"));
    }
}
