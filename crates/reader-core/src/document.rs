//! Core document types
//!
//! A [`Document`] is the unit every reader produces: decoded text plus a
//! metadata object. Metadata is an open JSON map rather than a fixed struct
//! because callers attach their own fields (`ext_info`) and those fields are
//! authoritative when they collide with computed provenance keys.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata keys computed by the readers.
pub mod keys {
    /// Basename of the entry or file
    pub const FILE_NAME: &str = "file_name";
    /// Lowercased extension including the dot, empty when there is none
    pub const FILE_SUFFIX: &str = "file_suffix";
    /// `"{archive_root}::{archive_path}"` for archive entries, the input
    /// path for single files
    pub const FILE_PATH: &str = "file_path";
    /// Name of the outermost container
    pub const ARCHIVE_ROOT: &str = "archive_root";
    /// `/`-joined path from the container root to the entry
    pub const ARCHIVE_PATH: &str = "archive_path";
    /// Number of container boundaries crossed to reach the entry
    pub const ARCHIVE_DEPTH: &str = "archive_depth";
    /// Source-code language tag
    pub const LANGUAGE: &str = "language";
}

/// A single unit of extracted content with provenance metadata.
///
/// Documents are immutable once built: the extraction engine constructs the
/// metadata map in one pass and never touches it again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Decoded text; never empty or whitespace-only
    pub text: String,
    /// Provenance fields plus caller-supplied metadata
    pub metadata: Map<String, Value>,
}

impl Document {
    /// Create a document from text and an assembled metadata map
    #[inline]
    #[must_use = "creating a document that is not used is a waste of resources"]
    pub fn new(text: impl Into<String>, metadata: Map<String, Value>) -> Self {
        Self {
            text: text.into(),
            metadata,
        }
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }

    /// Basename recorded for this document
    #[inline]
    #[must_use = "returns the document's file name"]
    pub fn file_name(&self) -> Option<&str> {
        self.str_field(keys::FILE_NAME)
    }

    /// Lowercased extension including the dot
    #[inline]
    #[must_use = "returns the document's file suffix"]
    pub fn file_suffix(&self) -> Option<&str> {
        self.str_field(keys::FILE_SUFFIX)
    }

    /// Path from the container root to the entry
    #[inline]
    #[must_use = "returns the document's archive path"]
    pub fn archive_path(&self) -> Option<&str> {
        self.str_field(keys::ARCHIVE_PATH)
    }

    /// Name of the outermost container
    #[inline]
    #[must_use = "returns the document's archive root"]
    pub fn archive_root(&self) -> Option<&str> {
        self.str_field(keys::ARCHIVE_ROOT)
    }

    /// Number of container boundaries crossed to reach the entry
    #[inline]
    #[must_use = "returns the document's archive depth"]
    pub fn archive_depth(&self) -> Option<u64> {
        self.metadata.get(keys::ARCHIVE_DEPTH).and_then(Value::as_u64)
    }

    /// Source-code language tag, when the entry was recognized as code
    #[inline]
    #[must_use = "returns the document's language tag"]
    pub fn language(&self) -> Option<&str> {
        self.str_field(keys::LANGUAGE)
    }
}
