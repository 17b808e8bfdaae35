//! Top-level archive reader facade

use crate::container::{open_container, open_container_path, SharedBytes};
use crate::limits::ExtractionLimits;
use crate::walker::{walk, ExtractionContext};
use reader_core::{
    DelegateParser, Document, InputFormat, ParserRegistry, ReaderError, Result,
};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;

/// Extracts documents from archive files.
///
/// One reader can serve many `load_data` calls; no state crosses between
/// them. Limits and delegate parsers are configured up front.
///
/// # Examples
///
/// ```no_run
/// use reader_archive::{ArchiveReader, ExtractionLimits};
///
/// let reader = ArchiveReader::with_limits(
///     ExtractionLimits::default()
///         .with_max_files(1000)
///         .with_max_depth(3),
/// );
/// let docs = reader.load_data("reports.zip", None)?;
/// # Ok::<(), reader_core::ReaderError>(())
/// ```
#[derive(Default)]
pub struct ArchiveReader {
    limits: ExtractionLimits,
    parsers: ParserRegistry,
}

impl ArchiveReader {
    /// Create a reader with default limits and no delegate parsers
    #[inline]
    #[must_use = "creating a reader that is not used is a waste of resources"]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a reader with explicit limits
    #[inline]
    #[must_use = "creating a reader that is not used is a waste of resources"]
    pub fn with_limits(limits: ExtractionLimits) -> Self {
        Self {
            limits,
            parsers: ParserRegistry::new(),
        }
    }

    /// Register a delegate parser for office/binary formats
    pub fn register_parser(&mut self, parser: Arc<dyn DelegateParser>) {
        self.parsers.register(parser);
    }

    /// Configured limits
    #[inline]
    #[must_use]
    pub const fn limits(&self) -> &ExtractionLimits {
        &self.limits
    }

    /// Registered delegate parsers
    #[inline]
    #[must_use]
    pub const fn parsers(&self) -> &ParserRegistry {
        &self.parsers
    }

    /// Extract every document from an archive file.
    ///
    /// `ext_info` fields are merged into each document's metadata and win
    /// over computed provenance fields on key collision.
    ///
    /// # Errors
    ///
    /// - [`ReaderError::NotFound`] when the path does not exist
    /// - [`ReaderError::UnsupportedFormat`] when the extension is not a
    ///   container format
    /// - [`ReaderError::InvalidArchive`] / [`ReaderError::PasswordProtected`]
    ///   when the outer container cannot be opened
    /// - the fatal limit variants, with no partial result
    pub fn load_data<P: AsRef<Path>>(
        &self,
        file: P,
        ext_info: Option<Map<String, Value>>,
    ) -> Result<Vec<Document>> {
        let path = file.as_ref();
        if !path.exists() {
            return Err(ReaderError::NotFound(path.to_path_buf()));
        }

        let format = container_format_of(path)?;
        let archive_root = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let container = open_container_path(format, path, &self.limits)?;
        self.run(container, archive_root, ext_info)
    }

    /// Extract every document from an in-memory archive.
    ///
    /// `root_name` plays the role of the file name: it names the archive
    /// root in provenance metadata and its extension selects the container
    /// format.
    ///
    /// # Errors
    ///
    /// As [`ArchiveReader::load_data`], minus [`ReaderError::NotFound`].
    pub fn load_bytes(
        &self,
        bytes: Vec<u8>,
        root_name: &str,
        ext_info: Option<Map<String, Value>>,
    ) -> Result<Vec<Document>> {
        let format = container_format_of(Path::new(root_name))?;
        let container = open_container(format, SharedBytes::new(bytes), &self.limits)?;
        self.run(container, root_name.to_string(), ext_info)
    }

    fn run(
        &self,
        container: Box<dyn crate::container::Container>,
        archive_root: String,
        ext_info: Option<Map<String, Value>>,
    ) -> Result<Vec<Document>> {
        let mut ctx = ExtractionContext::new(
            archive_root,
            self.limits,
            ext_info.unwrap_or_default(),
            &self.parsers,
        );
        walk(container, &mut ctx)
    }
}

/// Resolve a path's extension to a container format.
fn container_format_of(path: &Path) -> Result<InputFormat> {
    let format = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(InputFormat::from_extension);

    match format {
        Some(format) if format.is_archive() => Ok(format),
        _ => Err(ReaderError::UnsupportedFormat(format!(
            "'{}' is not a supported archive",
            path.display()
        ))),
    }
}
