//! Quill CLI - generate wiki documentation from Papyrus script sources

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

mod generate;
mod logger;

#[derive(Parser, Debug)]
#[command(name = "quill")]
#[command(version = quill_core::VERSION)]
#[command(about = "Generate wiki documentation from Papyrus script sources", long_about = None)]
struct Cli {
    /// A .psc file or a directory searched recursively for .psc files
    input: PathBuf,

    /// Output directory for pages and archives
    output: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = Mode::Wiki)]
    mode: Mode,

    /// SQLite database file (required with --mode sql)
    #[arg(long, required_if_eq("mode", "sql"))]
    db: Option<PathBuf>,

    /// Also write the Category:Papyrus index page
    #[arg(long)]
    index: bool,

    /// JSON array of extra type names to cross-link
    #[arg(long)]
    user_types: Option<PathBuf>,

    /// Project name used in the index and archive file names
    #[arg(long)]
    project_name: Option<String>,

    /// Contributor username recorded in XML dumps
    #[arg(long)]
    wiki_user: Option<String>,

    /// Site name recorded in XML dumps
    #[arg(long)]
    wiki_name: Option<String>,

    /// Base URL recorded in XML dumps
    #[arg(long)]
    wiki_base: Option<String>,

    /// Omit the generation marker comment from pages
    #[arg(long)]
    no_marker: bool,

    /// Drop seconds from the generation marker timestamp
    #[arg(long)]
    no_marker_seconds: bool,

    /// Syntax highlight language (normal, fallback, or a lexer name)
    #[arg(long)]
    syntax_language: Option<String>,

    /// Buffer SQL rows and insert them in batches
    #[arg(long)]
    sql_batch: bool,

    /// Rows per table before a batch is flushed
    #[arg(long)]
    sql_batch_size: Option<usize>,

    /// Tag recorded with each flushed batch
    #[arg(long)]
    sql_batch_id: Option<String>,

    /// Configuration file (defaults to quill.toml next to the input)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Disable colored log output
    #[arg(long)]
    no_color: bool,
}

/// Where generated documentation goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// One .wiki file per page
    Wiki,
    /// SQLite tables
    Sql,
    /// Zip archive of .wiki files
    Zip,
    /// MediaWiki XML import dump
    Xml,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init_logger(cli.verbose, cli.quiet, cli.no_color);

    let summary = generate::run(&cli)?;
    tracing::info!(
        scripts = summary.scripts,
        skipped = summary.skipped,
        "documentation generated"
    );
    if let Some(path) = summary.artifact {
        tracing::info!(path = %path.display(), "wrote archive");
    }
    Ok(())
}
