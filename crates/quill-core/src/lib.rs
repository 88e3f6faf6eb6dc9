//! Quill Core - documentation engine for Papyrus-style script sources
//!
//! This crate provides the core functionality:
//! - Parser: line-oriented scanner that builds a [`Script`] from source text
//! - Model: scripts, properties, functions, events and structs
//! - References: cross-reference extraction over parsed signatures
//! - Links: the type-link table used to cross-link rendered pages
//! - Render: wiki page generation for every entity
//! - Sinks: filesystem pages, SQLite tables, zip archives and MediaWiki XML dumps
//! - Index: the landing page that links every documented script
//! - Discover: recursive `.psc` source file collection

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Configuration file and option sections
pub mod config;

/// Source file discovery
pub mod discover;

/// Error types shared by the sinks and loaders
pub mod error;

/// Landing page generation
pub mod index;

/// Type-link table
pub mod links;

/// Documentation model
pub mod model;

/// Line parser
pub mod parser;

/// Cross-reference extraction
pub mod references;

/// Wiki page rendering
pub mod render;

/// Output sinks
pub mod sink;

pub use config::{ConfigOverrides, QuillConfig, RenderSection, SqlSection, WikiSection, CONFIG_FILE};
pub use discover::{collect_source_files, SOURCE_EXTENSION};
pub use error::{ConfigError, SinkError, TypeListError};
pub use index::{IndexBuilder, INDEX_TITLE};
pub use links::TypeLinkTable;
pub use model::{Event, Function, Parameter, Property, PropertyFlag, Script, Struct};
pub use parser::ScriptParser;
pub use references::extract_references;
pub use render::{GenerationMarker, Highlight, RenderOptions, Renderer};
pub use sink::{
    page_file_name, publish_script, DocSink, FsPageSink, SqlOptions, SqlSink, XmlDumpSink, XmlSiteInfo,
    ZipArchiveSink,
};
