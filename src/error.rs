//! Crate error type
//!
//! Only setup and bookkeeping failures are errors. A simulation or capture
//! process that exits badly is an [`InvocationStatus`](crate::runner::InvocationStatus),
//! never an `Error`.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    ParseFile { path: PathBuf, message: String },

    #[error("no such batch: {0}")]
    UnknownBatch(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}
