//! `combine.toml`: one optional file next to the docs directory.
//!
//! The file is laid over [`CombineConfig::default`] as TOML, so it only needs
//! the keys it changes. Command-line flags go on top of that through
//! [`OutputOverrides`].
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! site_name = "Documentation"  # Title of the HTML export
//! docs_dir = "docs"            # Markdown sources, relative to combine.toml
//!
//! [output]
//! numbered_headings = false  # Prefix headings with 1.2.3 numbers
//! text_refs = false          # Render cross-references as bold text, not links
//! anchor_ids = false         # Emit {#slug} on headings even without numbering
//! add_chapter_heads = true   # Prepend each page's nav title as a heading
//! increase_heads = true      # Push nested pages' headings down one level per nav level
//! strip_metadata = true      # Drop front matter / MkDocs meta lines
//! add_page_break = false     # Emit \newpage between pages
//! # strip_heading = "Changelog"  # Remove sections with this title
//! exclude = []               # Files indexed for links but left out of output
//!
//! [[nav]]
//! title = "Home"
//! file = "index.md"
//!
//! [[nav]]
//! title = "Guide"
//! [[nav.children]]
//! title = "Install"
//! file = "guide/install.md"
//! ```
//!
//! Without any `[[nav]]` entries the docs dir is walked instead (see
//! [`nav::discover`](crate::nav::discover)).
//!
//! Unknown keys are rejected to catch typos early.

use crate::nav::NavEntry;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Project configuration loaded from `combine.toml`.
///
/// All fields have defaults; a user file only lists what it overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CombineConfig {
    /// Title used for the HTML export.
    pub site_name: String,
    /// Directory holding the markdown sources, relative to the config file.
    pub docs_dir: String,
    /// What the combined document looks like.
    pub output: OutputConfig,
    /// Reading order. Empty means discover from `docs_dir`.
    pub nav: Vec<NavEntry>,
}

impl Default for CombineConfig {
    fn default() -> Self {
        Self {
            site_name: "Documentation".to_string(),
            docs_dir: "docs".to_string(),
            output: OutputConfig::default(),
            nav: Vec::new(),
        }
    }
}

impl CombineConfig {
    /// Validate values that deserialize fine but cannot work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.docs_dir.trim().is_empty() {
            return Err(ConfigError::Validation("docs_dir must not be empty".into()));
        }
        if let Some(title) = &self.output.strip_heading
            && title.trim().is_empty()
        {
            return Err(ConfigError::Validation(
                "output.strip_heading must not be empty".into(),
            ));
        }
        validate_nav(&self.nav)
    }

    /// Docs directory resolved against the directory of `config_path`.
    pub fn docs_root(&self, config_path: &Path) -> PathBuf {
        match config_path.parent() {
            Some(dir) => dir.join(&self.docs_dir),
            None => PathBuf::from(&self.docs_dir),
        }
    }
}

fn validate_nav(entries: &[NavEntry]) -> Result<(), ConfigError> {
    for entry in entries {
        match &entry.file {
            Some(file) if !file.ends_with(".md") => {
                return Err(ConfigError::Validation(format!(
                    "nav entry '{}': file '{file}' is not a .md file",
                    entry.title
                )));
            }
            None if entry.children.is_empty() => {
                return Err(ConfigError::Validation(format!(
                    "nav entry '{}' needs a file or children",
                    entry.title
                )));
            }
            _ => {}
        }
        validate_nav(&entry.children)?;
    }
    Ok(())
}

/// Options shaping the combined output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub numbered_headings: bool,
    pub text_refs: bool,
    pub anchor_ids: bool,
    pub add_chapter_heads: bool,
    pub increase_heads: bool,
    pub strip_metadata: bool,
    pub add_page_break: bool,
    /// Title of sections to remove from every page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strip_heading: Option<String>,
    /// Source files to leave out of the output. Links to them still resolve.
    pub exclude: Vec<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            numbered_headings: false,
            text_refs: false,
            anchor_ids: false,
            add_chapter_heads: true,
            increase_heads: true,
            strip_metadata: true,
            add_page_break: false,
            strip_heading: None,
            exclude: Vec::new(),
        }
    }
}

/// Command-line overrides. A set flag wins over the config file; an unset
/// flag leaves the file's value alone.
#[derive(Debug, Clone, Default)]
pub struct OutputOverrides {
    pub numbered: bool,
    pub text_refs: bool,
    pub anchor_ids: bool,
    pub no_chapter_heads: bool,
    pub no_increase_heads: bool,
    pub keep_metadata: bool,
    pub page_break: bool,
    pub strip_heading: Option<String>,
    pub exclude: Vec<String>,
}

impl OutputConfig {
    pub fn apply(&mut self, overrides: &OutputOverrides) {
        self.numbered_headings |= overrides.numbered;
        self.text_refs |= overrides.text_refs;
        self.anchor_ids |= overrides.anchor_ids;
        self.add_page_break |= overrides.page_break;
        if overrides.no_chapter_heads {
            self.add_chapter_heads = false;
        }
        if overrides.no_increase_heads {
            self.increase_heads = false;
        }
        if overrides.keep_metadata {
            self.strip_metadata = false;
        }
        if overrides.strip_heading.is_some() {
            self.strip_heading = overrides.strip_heading.clone();
        }
        self.exclude.extend(overrides.exclude.iter().cloned());
    }
}

// =============================================================================
// Loading
// =============================================================================

/// `CombineConfig::default()` as a TOML table, the layer `combine.toml` is
/// laid over.
pub fn defaults_value() -> toml::Value {
    toml::Value::try_from(CombineConfig::default()).expect("default config must serialize")
}

/// Lay `overlay` over `base` in place.
///
/// Tables merge key by key, so `[output] text_refs = true` keeps every other
/// output default. Any other value replaces what was there: a `[[nav]]` list
/// in `combine.toml` is the whole navigation, never appended to.
pub fn merge_toml(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Parse `combine.toml` without interpreting it. A missing file is `None`;
/// a project without one runs on defaults and discovered navigation.
pub fn read_config_file(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(toml::from_str(&content)?))
}

/// Deserialize a fully merged value, rejecting unknown keys, then validate.
pub fn config_from_value(value: toml::Value) -> Result<CombineConfig, ConfigError> {
    let config: CombineConfig = value.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Defaults, with `combine.toml` at `path` laid over them when it exists.
pub fn load_config(path: &Path) -> Result<CombineConfig, ConfigError> {
    let mut value = defaults_value();
    if let Some(user) = read_config_file(path)? {
        merge_toml(&mut value, user);
    }
    config_from_value(value)
}

/// Returns a fully-commented stock `combine.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# md-combine Configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# Title of the HTML export.
site_name = "Documentation"

# Directory holding the markdown sources, relative to this file.
docs_dir = "docs"

# ---------------------------------------------------------------------------
# Combined output
# ---------------------------------------------------------------------------
[output]
# Prefix every heading with its hierarchical number (1, 1.1, 1.2, 2, ...).
# Numbers run continuously across pages.
numbered_headings = false

# Render cross-references as bold text instead of hyperlinks.
# Useful for print/PDF output where anchors do not survive.
text_refs = false

# Append {#slug} anchor ids to headings even when numbering is off.
anchor_ids = false

# Prepend every page with its navigation title as a chapter heading.
add_chapter_heads = true

# Push the headings of nested pages down one level for every navigation
# level below the top, so they nest under their section heading.
increase_heads = true

# Drop YAML front matter and MkDocs "Key: value" meta lines.
strip_metadata = true

# Emit a \newpage line between pages (for pandoc/LaTeX).
add_page_break = false

# Remove every section with this heading title, up to the next heading of
# the same or a higher level.
# strip_heading = "Changelog"

# Source files (relative to docs_dir) to index but leave out of the output.
# Links pointing into them still resolve.
exclude = []

# ---------------------------------------------------------------------------
# Navigation
# ---------------------------------------------------------------------------
# Reading order of the combined document. When no [[nav]] entries are given,
# docs_dir is walked: files sorted by name, index.md first, directories
# become sections.
#
# [[nav]]
# title = "Home"
# file = "index.md"
#
# [[nav]]
# title = "Guide"
# [[nav.children]]
# title = "Install"
# file = "guide/install.md"
"##
}
