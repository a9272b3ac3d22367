use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the consolidation pipeline.
#[derive(Error, Debug)]
pub enum PaddockError {
    /// A session folder name does not decompose into season + session type.
    #[error("Invalid session folder name: {0:?}")]
    InvalidSessionFolder(String),

    /// An expected raw table file does not exist.
    #[error("Table file not found: {0}")]
    TableMissing(PathBuf),

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A raw table file exists but is not well-formed CSV.
    #[error("Malformed table {path}: {source}")]
    MalformedTable {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A raw table file parsed cleanly but holds no data rows.
    #[error("Empty table: {0}")]
    EmptyTable(PathBuf),

    /// A consolidated table lacks a column a downstream step needs.
    #[error("Missing column {column:?} in {table} table")]
    MissingColumn { table: String, column: String },

    /// An output table could not be written.
    #[error("Failed to write {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the paddock crates.
pub type Result<T> = std::result::Result<T, PaddockError>;
