//! Generic file-reader facade for reader_rs
//!
//! [`FileReader`] turns any supported input path into documents:
//!
//! - container formats (`.zip`, `.rar`, `.7z`) forward to the
//!   nested-archive extraction engine in `reader-archive`
//! - text, markup and source-code files decode directly, with the same
//!   metadata keys the archive engine writes (minus archive provenance)
//! - office formats route through whatever [`DelegateParser`]s the caller
//!   registered
//!
//! # Usage
//!
//! ```no_run
//! use reader_file::FileReader;
//!
//! let reader = FileReader::new();
//! let docs = reader.load_data("bundle.zip", None)?;
//! let more = reader.load_data("notes.md", None)?;
//! # Ok::<(), reader_core::ReaderError>(())
//! ```

mod text;

use reader_archive::{ArchiveReader, ExtractionLimits};
use reader_core::{DelegateParser, Document, InputFormat, ReaderError, Result};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;

/// Reads documents from any supported file, dispatching on extension.
#[derive(Default)]
pub struct FileReader {
    archive: ArchiveReader,
}

impl FileReader {
    /// Create a reader with default extraction limits
    #[inline]
    #[must_use = "creating a reader that is not used is a waste of resources"]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a reader with explicit archive extraction limits
    #[inline]
    #[must_use = "creating a reader that is not used is a waste of resources"]
    pub fn with_limits(limits: ExtractionLimits) -> Self {
        Self {
            archive: ArchiveReader::with_limits(limits),
        }
    }

    /// Register a delegate parser, used both for standalone office files
    /// and for office entries inside archives
    pub fn register_parser(&mut self, parser: Arc<dyn DelegateParser>) {
        self.archive.register_parser(parser);
    }

    /// Read every document out of `file`.
    ///
    /// Container inputs may produce many documents; single files produce at
    /// most one (zero when the content is empty or whitespace-only).
    ///
    /// # Errors
    ///
    /// - [`ReaderError::NotFound`] when the path does not exist
    /// - [`ReaderError::UnsupportedFormat`] when no reader handles the
    ///   extension
    /// - archive errors as documented on [`ArchiveReader::load_data`]
    pub fn load_data<P: AsRef<Path>>(
        &self,
        file: P,
        ext_info: Option<Map<String, Value>>,
    ) -> Result<Vec<Document>> {
        let path = file.as_ref();
        if !path.exists() {
            return Err(ReaderError::NotFound(path.to_path_buf()));
        }

        let format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(InputFormat::from_extension)
            .ok_or_else(|| {
                ReaderError::UnsupportedFormat(format!(
                    "no reader for '{}'",
                    path.display()
                ))
            })?;

        if format.is_archive() {
            return self.archive.load_data(path, ext_info);
        }

        text::read_single_file(path, self.archive.parsers(), ext_info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_input() {
        let err = FileReader::new()
            .load_data("/no/such/file.txt", None)
            .unwrap_err();
        assert!(matches!(err, ReaderError::NotFound(_)));
    }

    #[test]
    fn test_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let err = FileReader::new().load_data(&path, None).unwrap_err();
        assert!(matches!(err, ReaderError::UnsupportedFormat(_)));
    }
}
