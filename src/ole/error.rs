//! Error types for compound file generation.
use thiserror::Error;

/// Errors raised while building an OLE2 compound document.
#[derive(Error, Debug)]
pub enum OleError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Inconsistent or unsupported writer input
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Entry name cannot be stored in a directory entry
    #[error("Invalid entry name: {0}")]
    InvalidName(String),

    /// A sibling with the same (case-insensitive) name already exists
    #[error("Duplicate directory entry: {0}")]
    DuplicateEntry(String),

    /// Stream exceeds the size a compound file of this version can describe
    #[error("Stream '{name}' is too large: {size} bytes")]
    StreamTooLarge { name: String, size: u64 },

    /// Directory would need more entries than a compound file can address
    #[error("Too many directory entries: {0}")]
    TooManyEntries(usize),
}

/// Result type for compound file operations.
pub type OleResult<T> = std::result::Result<T, OleError>;
