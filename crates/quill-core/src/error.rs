//! Error types for sinks, configuration and user type lists

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by documentation sinks.
///
/// Every variant names the operation that failed so batch drivers can report
/// which write or flush went wrong.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("failed to {operation} '{}': {source}", .path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("database error during {operation}: {source}")]
    Database {
        operation: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("archive error during {operation}: {source}")]
    Archive {
        operation: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("failed to serialize XML dump: {0}")]
    Xml(#[source] std::io::Error),

    #[error("{sink} sink has already been finalized")]
    AlreadyFinalized { sink: &'static str },
}

impl SinkError {
    pub(crate) fn database(operation: impl Into<String>, source: rusqlite::Error) -> Self {
        Self::Database {
            operation: operation.into(),
            source,
        }
    }

    pub(crate) fn archive(operation: impl Into<String>, source: zip::result::ZipError) -> Self {
        Self::Archive {
            operation: operation.into(),
            source,
        }
    }
}

/// Errors that can occur when loading a `quill.toml` file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors that can occur when loading a user type list.
#[derive(Error, Debug)]
pub enum TypeListError {
    #[error("failed to read type list: {0}")]
    Io(#[from] std::io::Error),

    #[error("type list must be a JSON array of names: {0}")]
    Json(#[from] serde_json::Error),
}
