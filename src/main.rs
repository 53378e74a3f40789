use clap::{Parser, Subcommand};
use md_combine::combine::Project;
use md_combine::config::{self, OutputOverrides};
use md_combine::{output, render};
use std::path::{Path, PathBuf};

/// Flags that override `[output]` in combine.toml.
#[derive(clap::Args, Clone, Default)]
struct OutputArgs {
    /// Number headings 1, 1.1, 1.2, ... across the whole document
    #[arg(long)]
    numbered: bool,

    /// Render cross-references as bold text instead of links
    #[arg(long)]
    text_refs: bool,

    /// Add {#slug} anchors to headings even without numbering
    #[arg(long)]
    anchor_ids: bool,

    /// Do not prepend page titles as chapter headings
    #[arg(long)]
    no_chapter_heads: bool,

    /// Keep page heading levels as written
    #[arg(long)]
    no_increase_heads: bool,

    /// Keep front matter and meta lines
    #[arg(long)]
    keep_metadata: bool,

    /// Emit \newpage between pages
    #[arg(long)]
    page_break: bool,

    /// Remove sections with this heading title
    #[arg(long, value_name = "TITLE")]
    strip_heading: Option<String>,

    /// Leave this file out of the output (repeatable); links to it still resolve
    #[arg(long, value_name = "FILE")]
    exclude: Vec<String>,
}

impl From<OutputArgs> for OutputOverrides {
    fn from(args: OutputArgs) -> Self {
        Self {
            numbered: args.numbered,
            text_refs: args.text_refs,
            anchor_ids: args.anchor_ids,
            no_chapter_heads: args.no_chapter_heads,
            no_increase_heads: args.no_increase_heads,
            keep_metadata: args.keep_metadata,
            page_break: args.page_break,
            strip_heading: args.strip_heading,
            exclude: args.exclude,
        }
    }
}

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "md-combine")]
#[command(about = "Combine a markdown documentation tree into one document")]
#[command(long_about = "\
Combine a markdown documentation tree into one document

Pages are read in navigation order and concatenated. Cross-references
between pages are rewritten into in-document anchors, and headings can be
numbered continuously across the whole document.

Project structure:

  combine.toml                # Config (optional; defaults shown by gen-config)
  docs/
  ├── index.md                # First page when navigation is discovered
  ├── about.md
  └── guide/                  # Directories become sections
      ├── install.md
      └── usage.md

Links rewritten:
  [text](guide/install.md)          → first heading of that page
  [text](guide/install.md#setup)    → heading 'Setup' on that page
  [text](#setup)                    → heading 'Setup' on the same page

A link to a file that is not part of the navigation stops the run.

Run 'md-combine gen-config' to generate a documented combine.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Path to combine.toml
    #[arg(long, default_value = "combine.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the combined markdown document
    Combine {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        flags: OutputArgs,
    },
    /// Write the combined document as standalone HTML
    Html {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        flags: OutputArgs,
    },
    /// Show the page tree with heading numbers and anchors
    Index {
        /// Print a JSON manifest instead
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        flags: OutputArgs,
    },
    /// Resolve every cross-reference without writing anything
    Check {
        #[command(flatten)]
        flags: OutputArgs,
    },
    /// Print a stock combine.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Combine { output: dest, flags } => {
            let project = load_project(&cli.config, flags)?;
            let combined = project.combine()?;
            output::print_diagnostics(&combined.diagnostics);
            write_or_print(dest.as_deref(), &combined.markdown())?;
            output::print_combine_summary(&combined, dest.as_deref());
        }
        Command::Html { output: dest, flags } => {
            let project = load_project(&cli.config, flags)?;
            let combined = project.combine()?;
            output::print_diagnostics(&combined.diagnostics);
            let title = &project.config.site_name;
            match &dest {
                Some(path) => render::write_html(path, title, &combined.markdown())?,
                None => print!("{}", render::render_html(title, &combined.markdown()).into_string()),
            }
            output::print_combine_summary(&combined, dest.as_deref());
        }
        Command::Index { json, flags } => {
            let project = load_project(&cli.config, flags)?;
            let indexed = project.index()?;
            if json {
                let manifest = output::index_manifest(&indexed.index, &indexed.diagnostics);
                println!("{}", serde_json::to_string_pretty(&manifest)?);
            } else {
                output::print_diagnostics(&indexed.diagnostics);
                output::print_index_output(&indexed.index);
            }
        }
        Command::Check { flags } => {
            let project = load_project(&cli.config, flags)?;
            let combined = project.combine()?;
            output::print_diagnostics(&combined.diagnostics);
            output::print_check_output(&combined);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn load_project(config_path: &Path, flags: OutputArgs) -> Result<Project, Box<dyn std::error::Error>> {
    Ok(Project::load(config_path, &OutputOverrides::from(flags))?)
}

fn write_or_print(path: Option<&Path>, content: &str) -> std::io::Result<()> {
    match path {
        Some(path) => std::fs::write(path, content),
        None => {
            print!("{content}");
            Ok(())
        }
    }
}
