//! The combine pipeline: navigation in, one markdown document out.
//!
//! ```text
//! nav ──► PageTree ──► prepare ──► pass 1 (index) ──► freeze ──► pass 2 (resolve) ──► assemble
//! ```
//!
//! Every page is prepared once (read, metadata strip, heading offset,
//! heading strip) and the same prepared lines feed both passes. Pass 1 runs
//! over all pages before pass 2 starts, so forward references resolve.
//!
//! Page sources are read through [`DocsSource`]. [`FsSource`] reads from the
//! docs directory; [`MemorySource`] serves pages from a map, for tests and
//! for callers that already hold the content.

use crate::config::{self, CombineConfig, ConfigError, OutputConfig, OutputOverrides};
use crate::diagnostics::Diagnostic;
use crate::filters;
use crate::index::{HeadingIndexer, initial_number};
use crate::nav::{self, NavEntry, NavError};
use crate::page::{DocumentIndex, PageId, PageTree, normalize_path};
use crate::xref::{XrefError, XrefOptions, XrefResolver};
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CombineError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Navigation error: {0}")]
    Nav(#[from] NavError),
    #[error("Unresolved reference: {0}")]
    Xref(#[from] XrefError),
    #[error("Page source not found: {path}")]
    MissingSource { path: String },
}

/// Where page content comes from.
pub trait DocsSource {
    /// Read the page at `path` (docs-root relative, `/`-separated).
    ///
    /// A missing page must be reported as [`io::ErrorKind::NotFound`].
    fn read(&self, path: &str) -> io::Result<String>;
}

/// Reads pages from a docs directory on disk.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl DocsSource for FsSource {
    fn read(&self, path: &str) -> io::Result<String> {
        std::fs::read_to_string(self.root.join(path))
    }
}

/// Serves pages from memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }
}

impl DocsSource for MemorySource {
    fn read(&self, path: &str) -> io::Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.to_string()))
    }
}

/// Result of pass 1: the frozen index plus the prepared lines of every page,
/// indexed by [`PageId`].
#[derive(Debug)]
pub struct Indexed {
    pub index: DocumentIndex,
    pub prepared: Vec<Vec<String>>,
    pub diagnostics: Vec<Diagnostic>,
}

/// The combined document.
#[derive(Debug)]
pub struct Combined {
    pub lines: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
    pub index: DocumentIndex,
    /// Number of pages written to the output (excluded pages are not).
    pub pages_written: usize,
}

impl Combined {
    /// The document as a single string, newline-terminated.
    pub fn markdown(&self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

pub struct Combiner<'a, S: DocsSource> {
    source: &'a S,
    options: &'a OutputConfig,
}

impl<'a, S: DocsSource> Combiner<'a, S> {
    pub fn new(source: &'a S, options: &'a OutputConfig) -> Self {
        Self { source, options }
    }

    /// Build the page tree and run pass 1 over every page.
    pub fn index(&self, nav: &[NavEntry]) -> Result<Indexed, CombineError> {
        let mut tree = nav::build_tree(nav)?;

        let prepared = tree
            .ids()
            .map(|id| self.prepare(&tree, id))
            .collect::<Result<Vec<_>, _>>()?;

        let mut indexer = HeadingIndexer::new(self.options.numbered_headings);
        let mut carried = initial_number();
        for id in tree.ids() {
            carried = indexer.index_page(&mut tree, id, &prepared[id.index()], carried);
        }

        let mut diagnostics = tree.diagnostics().to_vec();
        diagnostics.extend(indexer.into_diagnostics());

        Ok(Indexed {
            index: tree.freeze(),
            prepared,
            diagnostics,
        })
    }

    /// Run both passes and assemble the output document.
    pub fn combine(&self, nav: &[NavEntry]) -> Result<Combined, CombineError> {
        let Indexed {
            index,
            prepared,
            mut diagnostics,
        } = self.index(nav)?;

        let excluded: HashSet<String> = self
            .options
            .exclude
            .iter()
            .map(|p| normalize_path(p))
            .collect();
        let resolver = XrefResolver::new(&index, self.xref_options());

        let mut lines = Vec::new();
        let mut pages_written = 0;
        for page in index.tree().pages() {
            if page
                .file_path
                .as_ref()
                .is_some_and(|path| excluded.contains(path))
            {
                continue;
            }

            let resolved = resolver.resolve_page(page.id, &prepared[page.id.index()])?;
            diagnostics.extend(resolved.diagnostics);

            if self.options.add_chapter_heads && !page.is_section {
                lines.extend(filters::chapter_head(index.tree().level(page.id), &page.title));
            }
            lines.extend(resolved.lines);
            lines.push(String::new());
            if self.options.add_page_break {
                lines.push("\\newpage".to_string());
                lines.push(String::new());
            }
            pages_written += 1;
        }

        Ok(Combined {
            lines,
            diagnostics,
            index,
            pages_written,
        })
    }

    /// Prepared lines for one page: the exact input of both passes.
    fn prepare(&self, tree: &PageTree, id: PageId) -> Result<Vec<String>, CombineError> {
        let page = tree.page(id);
        let level = tree.level(id);

        let Some(path) = &page.file_path else {
            return Ok(vec![filters::section_heading(level, &page.title)]);
        };

        let content = self.source.read(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => CombineError::MissingSource { path: path.clone() },
            _ => CombineError::Io(e),
        })?;

        let mut lines = filters::read_lines(&content);
        if self.options.strip_metadata {
            lines = filters::strip_metadata(lines);
        }
        // A top-level page keeps its levels; each nav level below adds one.
        if self.options.increase_heads {
            lines = filters::offset_headings(lines, level.saturating_sub(1));
        }
        if let Some(title) = &self.options.strip_heading {
            lines = filters::strip_heading(lines, title);
        }
        Ok(lines)
    }

    fn xref_options(&self) -> XrefOptions {
        XrefOptions {
            numbered: self.options.numbered_headings,
            text_refs: self.options.text_refs,
            anchor_ids: self.options.anchor_ids,
        }
    }
}

/// A loaded `combine.toml` with its navigation resolved.
#[derive(Debug, Clone)]
pub struct Project {
    pub config: CombineConfig,
    pub docs_root: PathBuf,
    pub nav: Vec<NavEntry>,
}

impl Project {
    /// Load the config at `config_path`, apply command-line overrides and
    /// resolve the navigation (configured, or discovered from the docs dir).
    pub fn load(config_path: &Path, overrides: &OutputOverrides) -> Result<Self, CombineError> {
        let mut config = config::load_config(config_path)?;
        config.output.apply(overrides);
        let docs_root = config.docs_root(config_path);
        let nav = if config.nav.is_empty() {
            nav::discover(&docs_root)?
        } else {
            config.nav.clone()
        };
        Ok(Self {
            config,
            docs_root,
            nav,
        })
    }

    pub fn index(&self) -> Result<Indexed, CombineError> {
        let source = FsSource::new(&self.docs_root);
        Combiner::new(&source, &self.config.output).index(&self.nav)
    }

    pub fn combine(&self) -> Result<Combined, CombineError> {
        let source = FsSource::new(&self.docs_root);
        Combiner::new(&source, &self.config.output).combine(&self.nav)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticKind;
    use crate::test_helpers::{assert_tree_shape, find_page, heading_titles, lines, write_project};

    fn home_about() -> (Vec<NavEntry>, MemorySource) {
        let nav = vec![
            NavEntry::page("Home", "index.md"),
            NavEntry::page("About", "about.md"),
        ];
        let source = MemorySource::new()
            .with("index.md", "# Home\n\n[see about](about.md)\n")
            .with("about.md", "# About\n\nWho we are.\n");
        (nav, source)
    }

    fn plain() -> OutputConfig {
        OutputConfig {
            add_chapter_heads: false,
            increase_heads: false,
            ..OutputConfig::default()
        }
    }

    // =========================================================================
    // Two-pass behavior
    // =========================================================================

    #[test]
    fn numbered_pages_and_resolved_link() {
        let (nav, source) = home_about();
        let options = OutputConfig {
            numbered_headings: true,
            ..plain()
        };
        let combined = Combiner::new(&source, &options).combine(&nav).unwrap();
        assert_eq!(
            combined.lines,
            lines(&[
                "# 1  Home {#home--home}",
                "",
                "[(2) About](#about--about)",
                "",
                "# 2  About {#about--about}",
                "",
                "Who we are.",
                "",
            ])
        );
        assert!(combined.diagnostics.is_empty());
        assert_eq!(combined.pages_written, 2);
    }

    #[test]
    fn numbered_with_default_layout() {
        let (nav, source) = home_about();
        let options = OutputConfig {
            numbered_headings: true,
            ..OutputConfig::default()
        };
        let combined = Combiner::new(&source, &options).combine(&nav).unwrap();
        assert_eq!(
            combined.lines,
            lines(&[
                "# Home {: .page-title}",
                "",
                "# 1  Home {#home--home}",
                "",
                "[(2) About](#about--about)",
                "",
                "# About {: .page-title}",
                "",
                "# 2  About {#about--about}",
                "",
                "Who we are.",
                "",
            ])
        );
        assert!(combined.diagnostics.is_empty());
    }

    #[test]
    fn forward_reference_to_later_heading_resolves() {
        let nav = vec![
            NavEntry::page("First", "first.md"),
            NavEntry::page("Second", "second.md"),
        ];
        let source = MemorySource::new()
            .with("first.md", "# First\nsee [later](second.md#details)")
            .with("second.md", "# Second\n## Details");
        let combined = Combiner::new(&source, &plain()).combine(&nav).unwrap();
        assert_eq!(combined.lines[1], "see [Details](#second--details)");
    }

    #[test]
    fn dangling_link_stops_combine() {
        let nav = vec![NavEntry::page("Home", "index.md")];
        let source = MemorySource::new().with("index.md", "# Home\n[x](missing.md)");
        let err = Combiner::new(&source, &plain()).combine(&nav).unwrap_err();
        assert!(matches!(
            err,
            CombineError::Xref(XrefError::DanglingReference { line: 2, .. })
        ));
    }

    #[test]
    fn missing_source_file_is_error() {
        let nav = vec![NavEntry::page("Home", "index.md")];
        let err = Combiner::new(&MemorySource::new(), &plain())
            .combine(&nav)
            .unwrap_err();
        assert!(matches!(err, CombineError::MissingSource { path } if path == "index.md"));
    }

    #[test]
    fn diagnostics_collected_from_both_passes() {
        let nav = vec![
            NavEntry::page("Home", "index.md"),
            NavEntry::page("Guide", "guide.md"),
        ];
        let source = MemorySource::new()
            .with("index.md", "# Home\n### Jump\n[x](guide.md#nowhere)")
            .with("guide.md", "# Guide");
        let options = OutputConfig {
            numbered_headings: true,
            ..plain()
        };
        let combined = Combiner::new(&source, &options).combine(&nav).unwrap();
        let kinds: Vec<&DiagnosticKind> = combined.diagnostics.iter().map(|d| &d.kind).collect();
        assert_eq!(kinds.len(), 2);
        assert!(matches!(kinds[0], DiagnosticKind::NumberLevelMismatch { .. }));
        assert!(matches!(kinds[1], DiagnosticKind::UnknownFragment { .. }));
    }

    // =========================================================================
    // Preparation and assembly
    // =========================================================================

    #[test]
    fn sections_synthesize_heading_and_nest_children() {
        let nav = vec![NavEntry::section(
            "Guide",
            vec![NavEntry::page("Install", "guide/install.md")],
        )];
        let source = MemorySource::new().with("guide/install.md", "# Steps\ntext");
        let options = OutputConfig {
            numbered_headings: true,
            ..OutputConfig::default()
        };
        let combined = Combiner::new(&source, &options).combine(&nav).unwrap();
        assert_eq!(
            combined.lines,
            lines(&[
                "# 1  Guide {#guide--guide}",
                "",
                "## Install {: .page-title}",
                "",
                "## 1.1  Steps {#guide--install--steps}",
                "text",
                "",
            ])
        );
        assert!(combined.diagnostics.is_empty());
    }

    #[test]
    fn metadata_stripped_before_indexing() {
        let nav = vec![NavEntry::page("Home", "index.md")];
        let source = MemorySource::new().with("index.md", "---\ntitle: x\n---\n# Home");
        let combined = Combiner::new(&source, &plain()).combine(&nav).unwrap();
        assert_eq!(combined.lines, lines(&["# Home", ""]));

        let keep = OutputConfig {
            strip_metadata: false,
            ..plain()
        };
        let combined = Combiner::new(&source, &keep).combine(&nav).unwrap();
        assert_eq!(combined.lines[0], "---");
    }

    #[test]
    fn stripped_heading_not_indexed() {
        let nav = vec![NavEntry::page("Home", "index.md")];
        let source =
            MemorySource::new().with("index.md", "# Home\n## Changelog\n- x\n## Usage\n[u](#usage)");
        let options = OutputConfig {
            strip_heading: Some("Changelog".into()),
            numbered_headings: true,
            ..plain()
        };
        let combined = Combiner::new(&source, &options).combine(&nav).unwrap();
        assert_eq!(
            combined.lines,
            lines(&[
                "# 1  Home {#home--home}",
                "## 1.1  Usage {#home--usage}",
                "[(1.1) Usage](#home--usage)",
                "",
            ])
        );
    }

    #[test]
    fn excluded_pages_indexed_but_not_written() {
        let nav = vec![
            NavEntry::page("Home", "index.md"),
            NavEntry::page("Old", "old.md"),
        ];
        let source = MemorySource::new()
            .with("index.md", "# Home\n[old](old.md)")
            .with("old.md", "# Old\n[x](nowhere.md)");
        let options = OutputConfig {
            exclude: vec!["./old.md".into()],
            ..plain()
        };
        let combined = Combiner::new(&source, &options).combine(&nav).unwrap();
        assert_eq!(combined.lines, lines(&["# Home", "[Old](#old--old)", ""]));
        assert_eq!(combined.pages_written, 1);
    }

    #[test]
    fn page_breaks_between_pages() {
        let (nav, source) = home_about();
        let options = OutputConfig {
            add_page_break: true,
            ..plain()
        };
        let combined = Combiner::new(&source, &options).combine(&nav).unwrap();
        let breaks = combined.lines.iter().filter(|l| *l == "\\newpage").count();
        assert_eq!(breaks, 2);
    }

    #[test]
    fn markdown_is_newline_terminated() {
        let (nav, source) = home_about();
        let combined = Combiner::new(&source, &plain()).combine(&nav).unwrap();
        let markdown = combined.markdown();
        assert!(markdown.starts_with("# Home\n"));
        assert!(markdown.ends_with('\n'));
    }

    #[test]
    fn index_runs_pass_one_only() {
        let nav = vec![NavEntry::page("Home", "index.md")];
        // Dangling link is only detected by pass 2.
        let source = MemorySource::new().with("index.md", "# Home\n[x](missing.md)");
        let indexed = Combiner::new(&source, &plain()).index(&nav).unwrap();
        assert_eq!(indexed.index.tree().len(), 1);
        assert_eq!(indexed.prepared[0], lines(&["# Home", "[x](missing.md)"]));
    }

    // =========================================================================
    // Project loading
    // =========================================================================

    #[test]
    fn project_discovers_nav_without_config_nav() {
        let tmp = write_project(
            "",
            &[("index.md", "# Home"), ("guide/install.md", "# Install")],
        );
        let project =
            Project::load(&tmp.path().join("combine.toml"), &OutputOverrides::default()).unwrap();
        let indexed = project.index().unwrap();
        let tree = indexed.index.tree();
        assert_tree_shape(tree, &[("Home", 1), ("Guide", 1), ("Install", 2)]);
        assert_eq!(find_page(tree, "Install").slug(), "guide--install");
        assert_eq!(heading_titles(find_page(tree, "Guide")), vec!["Guide"]);
    }

    #[test]
    fn project_overrides_apply() {
        let tmp = write_project(
            "[[nav]]\ntitle = \"Home\"\nfile = \"index.md\"\n",
            &[("index.md", "# Home")],
        );
        let overrides = OutputOverrides {
            numbered: true,
            no_chapter_heads: true,
            no_increase_heads: true,
            ..OutputOverrides::default()
        };
        let project = Project::load(&tmp.path().join("combine.toml"), &overrides).unwrap();
        let combined = project.combine().unwrap();
        assert_eq!(combined.lines[0], "# 1  Home {#home--home}");
    }
}
