//! Error types for the pojo-proto-gen crate.

use std::path::PathBuf;

/// Errors that can occur while loading class descriptions or writing schemas.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A class description could not be loaded.
    #[error("failed to load class '{name}': {reason}")]
    ClassLoad { name: String, reason: String },

    /// A field type has no schema mapping.
    #[error("unsupported type '{type_name}' for field '{field}'")]
    UnsupportedFieldType { field: String, type_name: String },

    /// A type descriptor string is malformed.
    #[error("invalid type descriptor: {0}")]
    Descriptor(String),

    /// Failed to write generated proto files.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to read a file or directory from disk.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// JSON parse error with context.
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
