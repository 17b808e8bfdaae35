//! Error types for reader operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can abort a read.
///
/// Only the variants below ever surface to a caller. Recoverable per-entry
/// conditions (path-traversal names, undecodable or binary content,
/// oversized single entries, delegate-parser failures) are absorbed by the
/// extraction engine: the offending entry is dropped and the walk continues.
#[derive(Error, Debug)]
pub enum ReaderError {
    /// Input path does not exist
    #[error("input file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Cumulative extracted bytes passed the configured ceiling
    #[error("maximum total size exceeded ({extracted} bytes extracted, limit {limit} bytes)")]
    TotalSizeExceeded {
        /// Running total at the moment the ceiling was passed
        extracted: u64,
        /// Configured ceiling in bytes
        limit: u64,
    },

    /// Processed entry count passed the configured ceiling
    #[error("maximum file count exceeded (limit {limit} entries)")]
    FileCountExceeded {
        /// Configured ceiling
        limit: u64,
    },

    /// Nesting depth about to be entered passes the configured ceiling
    #[error("maximum depth exceeded (container nested {depth} levels, limit {limit})")]
    DepthExceeded {
        /// Depth the walk was about to enter
        depth: usize,
        /// Configured ceiling
        limit: usize,
    },

    /// Entry metadata announces a decompression-bomb-like expansion
    #[error("compression ratio {ratio:.1}:1 for entry '{name}' exceeds limit {limit:.1}:1")]
    CompressionRatioExceeded {
        /// Entry whose metadata tripped the check
        name: String,
        /// Declared uncompressed / compressed ratio
        ratio: f64,
        /// Configured ceiling
        limit: f64,
    },

    /// Container is corrupt or not the format its name claims
    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    /// Container requires a password
    #[error("archive is password-protected")]
    PasswordProtected,

    /// No reader or parser is available for the input's format
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// IO error while reading input
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for [`Result<T, ReaderError>`].
pub type Result<T> = std::result::Result<T, ReaderError>;
