//! Container adapters
//!
//! A [`Container`] is the engine's uniform view over an archive: a listing
//! of [`EntryMeta`] plus on-demand entry bytes. Three adapters cover the
//! supported families:
//!
//! - [`ZipContainer`]: random access over an in-memory buffer via the `zip`
//!   crate; per-entry compressed sizes are available, so the walker can run
//!   the compression-ratio check
//! - [`SevenZContainer`]: 7Z solid blocks decompress sequentially, so
//!   entries are materialized once at open time under local size caps
//! - [`RarContainer`]: extraction through the `unar` command-line tool into
//!   a scratch directory, with an optional `lsar -j` probe for compressed
//!   sizes

use crate::limits::ExtractionLimits;
use log::{debug, warn};
use reader_core::{InputFormat, ReaderError, Result};
use sevenz_rust::{Password, SevenZReader};
use std::collections::HashMap;
use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use tempfile::TempDir;
use zip::ZipArchive;

/// Cheaply cloneable byte buffer, shared between the walk and the
/// extraction context's nested-container cache.
#[derive(Debug, Clone)]
pub struct SharedBytes(Arc<[u8]>);

impl SharedBytes {
    /// Wrap an owned buffer
    #[inline]
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes.into())
    }

    /// Buffer length in bytes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the buffer is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for SharedBytes {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for SharedBytes {
    #[inline]
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

/// One container listing item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMeta {
    /// Raw entry name as recorded by the container
    pub name: String,
    /// Compressed size, when the container records one per entry
    pub compressed_size: Option<u64>,
    /// Declared uncompressed size
    pub uncompressed_size: u64,
    /// Directory marker
    pub is_dir: bool,
}

/// Uniform access to a container's listing and entry bytes.
///
/// Entries are addressed by listing index; the walker consumes them in
/// listing order and never re-sorts.
pub trait Container {
    /// Number of entries in listing order
    fn len(&self) -> usize;

    /// Listing metadata for one entry
    ///
    /// # Errors
    ///
    /// Fails when the container's own metadata for this entry is unreadable.
    fn entry_meta(&mut self, index: usize) -> Result<EntryMeta>;

    /// Raw bytes of one entry
    ///
    /// # Errors
    ///
    /// Fails when the entry cannot be decompressed (corrupt or encrypted).
    fn read_entry(&mut self, index: usize) -> Result<Vec<u8>>;

    /// Whether the container has no entries
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn map_zip_err(err: zip::result::ZipError) -> ReaderError {
    match err {
        zip::result::ZipError::Io(e) => ReaderError::Io(e),
        other => ReaderError::InvalidArchive(other.to_string()),
    }
}

fn map_sevenz_err(err: &sevenz_rust::Error) -> ReaderError {
    let text = err.to_string();
    if text.contains("password") || text.contains("encrypted") {
        ReaderError::PasswordProtected
    } else {
        ReaderError::InvalidArchive(text)
    }
}

/// ZIP container backed by an in-memory buffer.
pub struct ZipContainer {
    archive: ZipArchive<Cursor<SharedBytes>>,
}

impl ZipContainer {
    /// Open a ZIP container from raw bytes.
    ///
    /// # Errors
    ///
    /// [`ReaderError::InvalidArchive`] when the bytes are not a readable
    /// ZIP central directory.
    pub fn from_bytes(bytes: SharedBytes) -> Result<Self> {
        let archive = ZipArchive::new(Cursor::new(bytes)).map_err(map_zip_err)?;
        Ok(Self { archive })
    }
}

impl Container for ZipContainer {
    fn len(&self) -> usize {
        self.archive.len()
    }

    fn entry_meta(&mut self, index: usize) -> Result<EntryMeta> {
        let file = self.archive.by_index(index).map_err(map_zip_err)?;
        Ok(EntryMeta {
            name: file.name().to_string(),
            compressed_size: Some(file.compressed_size()),
            uncompressed_size: file.size(),
            is_dir: file.is_dir(),
        })
    }

    fn read_entry(&mut self, index: usize) -> Result<Vec<u8>> {
        let mut file = self.archive.by_index(index).map_err(map_zip_err)?;
        if file.encrypted() {
            return Err(ReaderError::PasswordProtected);
        }
        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;
        Ok(contents)
    }
}

/// 7Z container with entries materialized at open time.
///
/// 7Z solid blocks decompress sequentially, so random access would repeat
/// the work per entry. The open pass enforces the single-entry and total
/// size ceilings as local caps: oversized entries keep their listing slot
/// but carry no bytes, and blowing the total cap aborts the open.
pub struct SevenZContainer {
    entries: Vec<EntryMeta>,
    contents: Vec<Option<Vec<u8>>>,
}

impl SevenZContainer {
    /// Open a 7Z container from raw bytes.
    ///
    /// # Errors
    ///
    /// [`ReaderError::InvalidArchive`] for unreadable input,
    /// [`ReaderError::PasswordProtected`] for encrypted archives, and
    /// [`ReaderError::TotalSizeExceeded`] when materializing the entries
    /// would pass `limits.max_total_size`.
    pub fn from_bytes(bytes: SharedBytes, limits: &ExtractionLimits) -> Result<Self> {
        let len = bytes.len() as u64;
        let mut sz = SevenZReader::new(Cursor::new(bytes), len, Password::empty())
            .map_err(|e| map_sevenz_err(&e))?;

        let mut entries = Vec::new();
        let mut contents: Vec<Option<Vec<u8>>> = Vec::new();
        let mut preloaded: u64 = 0;
        let mut overflow: Option<ReaderError> = None;
        let max_file = limits.max_file_size;
        let max_total = limits.max_total_size;

        sz.for_each_entries(|entry, reader| {
            if entry.is_directory() {
                entries.push(EntryMeta {
                    name: entry.name().to_string(),
                    compressed_size: None,
                    uncompressed_size: 0,
                    is_dir: true,
                });
                contents.push(None);
                return Ok(true);
            }

            let size = entry.size();
            let meta = EntryMeta {
                name: entry.name().to_string(),
                compressed_size: None,
                uncompressed_size: size,
                is_dir: false,
            };

            if size > max_file {
                // The walker skips this slot through its own file-size check
                entries.push(meta);
                contents.push(None);
                return Ok(true);
            }

            if preloaded.saturating_add(size) > max_total {
                overflow = Some(ReaderError::TotalSizeExceeded {
                    extracted: preloaded.saturating_add(size),
                    limit: max_total,
                });
                return Ok(false); // stop iterating
            }

            let mut buf = Vec::new();
            match reader.read_to_end(&mut buf) {
                Ok(_) => {
                    preloaded += buf.len() as u64;
                    entries.push(meta);
                    contents.push(Some(buf));
                }
                Err(err) => {
                    warn!("failed to read 7Z entry '{}': {err}", meta.name);
                    entries.push(meta);
                    contents.push(None);
                }
            }
            Ok(true)
        })
        .map_err(|e| map_sevenz_err(&e))?;

        if let Some(err) = overflow {
            return Err(err);
        }

        Ok(Self { entries, contents })
    }
}

impl Container for SevenZContainer {
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn entry_meta(&mut self, index: usize) -> Result<EntryMeta> {
        Ok(self.entries[index].clone())
    }

    fn read_entry(&mut self, index: usize) -> Result<Vec<u8>> {
        match self.contents[index].take() {
            Some(bytes) => Ok(bytes),
            None => Err(ReaderError::InvalidArchive(format!(
                "7Z entry '{}' has no extractable content",
                self.entries[index].name
            ))),
        }
    }
}

/// RAR container extracted through the `unar` command-line tool.
///
/// `unar` handles RAR4, RAR5 and multi-volume archives without license
/// restrictions. The archive is extracted once into a scratch directory
/// that lives as long as the container; entry bytes are read back from
/// disk on demand.
pub struct RarContainer {
    _scratch: TempDir,
    entries: Vec<EntryMeta>,
    paths: Vec<PathBuf>,
}

impl RarContainer {
    /// Open a RAR archive from a file on disk.
    ///
    /// # Errors
    ///
    /// [`ReaderError::PasswordProtected`] for encrypted archives,
    /// [`ReaderError::InvalidArchive`] when `unar` is missing or the
    /// extraction fails.
    pub fn from_path(path: &Path) -> Result<Self> {
        let scratch = TempDir::new()?;

        let output = Command::new("unar")
            .arg("-o")
            .arg(scratch.path())
            .arg("-D") // no wrapper subdirectory
            .arg("-f") // overwrite
            .arg(path)
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ReaderError::InvalidArchive(
                        "unar command not found; install unar to read RAR archives".to_string(),
                    )
                } else {
                    ReaderError::Io(e)
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("password") || stderr.contains("encrypted") {
                return Err(ReaderError::PasswordProtected);
            }
            return Err(ReaderError::InvalidArchive(format!(
                "unar extraction failed: {stderr}"
            )));
        }

        let compressed_sizes = probe_compressed_sizes(path);

        let mut entries = Vec::new();
        let mut paths = Vec::new();
        collect_extracted_files(
            scratch.path(),
            scratch.path(),
            &compressed_sizes,
            &mut entries,
            &mut paths,
        )?;

        Ok(Self {
            _scratch: scratch,
            entries,
            paths,
        })
    }

    /// Open a RAR archive from raw bytes (a nested entry) by staging them
    /// in a scratch file.
    ///
    /// # Errors
    ///
    /// As [`RarContainer::from_path`], plus IO errors writing the stage file.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut stage = tempfile::Builder::new().suffix(".rar").tempfile()?;
        stage.write_all(bytes)?;
        stage.flush()?;
        Self::from_path(stage.path())
    }
}

impl Container for RarContainer {
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn entry_meta(&mut self, index: usize) -> Result<EntryMeta> {
        Ok(self.entries[index].clone())
    }

    fn read_entry(&mut self, index: usize) -> Result<Vec<u8>> {
        Ok(fs::read(&self.paths[index])?)
    }
}

/// Best-effort `lsar -j` probe for per-entry compressed sizes.
///
/// RAR extraction via `unar` loses compression metadata, so without this
/// probe the ratio check cannot run for RAR entries. Absence of `lsar` or
/// unparseable output degrades to "no compressed sizes".
fn probe_compressed_sizes(path: &Path) -> HashMap<String, u64> {
    let mut sizes = HashMap::new();

    let output = match Command::new("lsar").arg("-j").arg(path).output() {
        Ok(output) if output.status.success() => output,
        Ok(_) | Err(_) => {
            debug!("lsar listing unavailable for {}", path.display());
            return sizes;
        }
    };

    let Ok(json) = serde_json::from_slice::<serde_json::Value>(&output.stdout) else {
        debug!("unparseable lsar output for {}", path.display());
        return sizes;
    };

    if let Some(items) = json["lsarContents"].as_array() {
        for item in items {
            let Some(name) = item["XADFileName"].as_str() else {
                continue;
            };
            if let Some(compressed) = item["XADCompressedSize"].as_u64() {
                sizes.insert(name.replace('\\', "/"), compressed);
            }
        }
    }

    sizes
}

/// Walk the extraction scratch directory, recording one entry per regular
/// file. Directories are traversed in name order so the listing is
/// deterministic across filesystems.
fn collect_extracted_files(
    dir: &Path,
    base: &Path,
    compressed_sizes: &HashMap<String, u64>,
    entries: &mut Vec<EntryMeta>,
    paths: &mut Vec<PathBuf>,
) -> Result<()> {
    let mut children: Vec<PathBuf> = fs::read_dir(dir)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|entry| entry.path())
        .collect();
    children.sort();

    for child in children {
        let metadata = fs::metadata(&child)?;
        if metadata.is_dir() {
            collect_extracted_files(&child, base, compressed_sizes, entries, paths)?;
        } else if metadata.is_file() {
            let relative = child.strip_prefix(base).unwrap_or(&child);
            let name = relative
                .to_string_lossy()
                .replace(std::path::MAIN_SEPARATOR, "/");
            entries.push(EntryMeta {
                compressed_size: compressed_sizes.get(&name).copied(),
                name,
                uncompressed_size: metadata.len(),
                is_dir: false,
            });
            paths.push(child);
        }
    }

    Ok(())
}

/// Open a container of a known format from raw bytes.
///
/// # Errors
///
/// Propagates the adapter's open error; [`ReaderError::UnsupportedFormat`]
/// when the format is not a container format.
pub fn open_container(
    format: InputFormat,
    bytes: SharedBytes,
    limits: &ExtractionLimits,
) -> Result<Box<dyn Container>> {
    match format {
        InputFormat::Zip => Ok(Box::new(ZipContainer::from_bytes(bytes)?)),
        InputFormat::SevenZ => Ok(Box::new(SevenZContainer::from_bytes(bytes, limits)?)),
        InputFormat::Rar => Ok(Box::new(RarContainer::from_bytes(bytes.as_ref())?)),
        other => Err(ReaderError::UnsupportedFormat(format!(
            "{other:?} is not a container format"
        ))),
    }
}

/// Open a container of a known format from a file on disk.
///
/// RAR archives open in place (the `unar` tool wants a path); other formats
/// are read into memory first.
///
/// # Errors
///
/// As [`open_container`], plus IO errors reading the file.
pub fn open_container_path(
    format: InputFormat,
    path: &Path,
    limits: &ExtractionLimits,
) -> Result<Box<dyn Container>> {
    match format {
        InputFormat::Rar => Ok(Box::new(RarContainer::from_path(path)?)),
        _ => {
            let bytes = SharedBytes::new(fs::read(path)?);
            open_container(format, bytes, limits)
        }
    }
}
