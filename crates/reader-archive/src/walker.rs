//! Iterative archive traversal
//!
//! The walk is an explicit work-list of container frames with an integer
//! depth counter, not native recursion: the depth ceiling is checked before
//! a nested container is pushed, so adversarially deep nesting can neither
//! blow the call stack nor allocate a frame past the limit. Frames pop as
//! soon as their listing is exhausted, releasing the parent container's
//! bytes while descendants are still being processed.

use crate::builder::build_document;
use crate::container::{open_container, Container, SharedBytes};
use crate::content::{classify, extract_text, Capability};
use crate::limits::{ExtractionLimits, ResourceTracker};
use crate::path::sanitize_entry_path;
use log::{debug, warn};
use reader_core::{Document, ParserRegistry, ReaderError, Result};
use serde_json::{Map, Value};
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

/// Ceiling on distinct buffers the nested-container cache retains.
const BYTE_CACHE_CAP: usize = 32;

/// Call-scoped cache of nested-container byte buffers, keyed by content
/// hash: identical archive bytes reached via different paths share one
/// allocation instead of being re-materialized.
///
/// Lives on the [`ExtractionContext`] so it can never leak state across
/// separate `load_data` calls.
#[derive(Debug, Default)]
pub(crate) struct ByteCache {
    buffers: HashMap<u64, SharedBytes>,
}

impl ByteCache {
    fn content_key(bytes: &[u8]) -> u64 {
        let mut hasher = DefaultHasher::new();
        bytes.hash(&mut hasher);
        hasher.finish()
    }

    /// Intern a buffer, returning the cached copy when the same bytes were
    /// seen before in this call.
    pub(crate) fn intern(&mut self, bytes: Vec<u8>) -> SharedBytes {
        let key = Self::content_key(&bytes);
        if let Some(hit) = self.buffers.get(&key) {
            debug!("nested container bytes served from the call-scoped cache");
            return hit.clone();
        }
        let shared = SharedBytes::new(bytes);
        if self.buffers.len() < BYTE_CACHE_CAP {
            self.buffers.insert(key, shared.clone());
        }
        shared
    }
}

/// Mutable state threaded through one extraction call.
///
/// Created by the reader facade per `load_data` invocation and discarded at
/// return; nothing in it survives across calls.
pub struct ExtractionContext<'a> {
    /// Name of the outermost container
    pub(crate) archive_root: String,
    /// Configured ceilings
    pub(crate) limits: ExtractionLimits,
    /// Caller-supplied metadata merged into every document
    pub(crate) ext_info: Map<String, Value>,
    /// Running totals shared by all frames
    pub(crate) tracker: ResourceTracker,
    /// Registered office-format parsers
    pub(crate) parsers: &'a ParserRegistry,
    /// Nested-container byte dedup
    nested_cache: ByteCache,
}

impl<'a> ExtractionContext<'a> {
    /// Build the context for one call.
    #[must_use = "creating a context that is not used is a waste of resources"]
    pub fn new(
        archive_root: String,
        limits: ExtractionLimits,
        ext_info: Map<String, Value>,
        parsers: &'a ParserRegistry,
    ) -> Self {
        Self {
            archive_root,
            limits,
            ext_info,
            tracker: ResourceTracker::new(),
            parsers,
            nested_cache: ByteCache::default(),
        }
    }
}

/// One open container on the work-list.
struct Frame {
    container: Box<dyn Container>,
    /// Sanitized container-entry paths from the root to this container
    breadcrumb: Vec<String>,
    /// Depth of this container's direct children
    depth: usize,
    /// Next listing index to process
    cursor: usize,
    /// Sanitized logical paths already processed in this container;
    /// duplicates resolve first-write-wins
    seen: HashSet<String>,
}

impl Frame {
    fn new(container: Box<dyn Container>, breadcrumb: Vec<String>, depth: usize) -> Self {
        Self {
            container,
            breadcrumb,
            depth,
            cursor: 0,
            seen: HashSet::new(),
        }
    }
}

/// Flatten a container into documents.
///
/// Entries are processed in listing order. Traversal-unsafe names,
/// unsupported formats, undecodable content, oversized single entries and
/// failing delegate parsers drop the entry and continue; aggregate limit
/// violations abort the whole call.
///
/// # Errors
///
/// The four `LimitExceeded` variants of [`ReaderError`]; no partial result
/// accompanies them.
pub fn walk(root: Box<dyn Container>, ctx: &mut ExtractionContext) -> Result<Vec<Document>> {
    let mut documents = Vec::new();
    let mut stack = vec![Frame::new(root, Vec::new(), 0)];

    while let Some(frame) = stack.last_mut() {
        if frame.cursor >= frame.container.len() {
            // Listing exhausted; the frame's container bytes release here
            stack.pop();
            continue;
        }

        if let Some(descend) = process_next_entry(frame, ctx, &mut documents)? {
            stack.push(descend);
        }
    }

    Ok(documents)
}

/// Handle the entry at the frame's cursor.
///
/// Returns a new frame when the entry is a nested container to descend
/// into.
fn process_next_entry(
    frame: &mut Frame,
    ctx: &mut ExtractionContext,
    documents: &mut Vec<Document>,
) -> Result<Option<Frame>> {
    let index = frame.cursor;
    frame.cursor += 1;

    let meta = match frame.container.entry_meta(index) {
        Ok(meta) => meta,
        Err(err) => {
            warn!("unreadable entry metadata at index {index}: {err}");
            return Ok(None);
        }
    };

    // Directory markers: no limiter checks, no document
    if meta.is_dir {
        return Ok(None);
    }

    let Some(entry_path) = sanitize_entry_path(&meta.name) else {
        warn!(
            "dropping traversal-unsafe entry '{}' in '{}'",
            meta.name, ctx.archive_root
        );
        return Ok(None);
    };

    if !frame.seen.insert(entry_path.clone()) {
        debug!("duplicate logical path '{entry_path}', keeping the first occurrence");
        return Ok(None);
    }

    let Some(capability) = classify(&entry_path) else {
        debug!("unsupported entry '{entry_path}', skipping");
        return Ok(None);
    };

    if let Capability::Container(format) = capability {
        let raw = match frame.container.read_entry(index) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("unreadable nested container '{entry_path}': {err}");
                return Ok(None);
            }
        };

        // Extension alone does not make a container; a text file named
        // *.zip must not trip the depth ceiling
        if !format.matches_magic(&raw) {
            debug!("entry '{entry_path}' lacks {format:?} magic bytes, skipping");
            return Ok(None);
        }

        let next_depth = frame.depth + 1;
        ctx.limits.check_depth(next_depth)?;

        let bytes = ctx.nested_cache.intern(raw);
        let nested = match open_container(format, bytes, &ctx.limits) {
            Ok(container) => container,
            // The 7Z open path enforces the total-size cap while
            // materializing; that violation stays fatal
            Err(err @ ReaderError::TotalSizeExceeded { .. }) => return Err(err),
            Err(err) => {
                warn!("nested container '{entry_path}' failed to open: {err}");
                return Ok(None);
            }
        };

        let mut breadcrumb = frame.breadcrumb.clone();
        breadcrumb.push(entry_path);
        return Ok(Some(Frame::new(nested, breadcrumb, next_depth)));
    }

    process_leaf(frame, ctx, index, capability, &entry_path, &meta, documents)?;
    Ok(None)
}

/// Run the limiter gauntlet over a leaf entry, then decode and emit.
fn process_leaf(
    frame: &mut Frame,
    ctx: &mut ExtractionContext,
    index: usize,
    capability: Capability,
    entry_path: &str,
    meta: &crate::container::EntryMeta,
    documents: &mut Vec<Document>,
) -> Result<()> {
    ctx.tracker.check_file_count(&ctx.limits)?;
    ctx.limits
        .check_compression_ratio(entry_path, meta.compressed_size, meta.uncompressed_size)?;

    if !ctx.limits.check_file_size(meta.uncompressed_size) {
        warn!(
            "skipping oversized entry '{entry_path}' ({} bytes, limit {} bytes)",
            meta.uncompressed_size, ctx.limits.max_file_size
        );
        return Ok(());
    }

    ctx.tracker
        .check_total_size(&ctx.limits, meta.uncompressed_size)?;

    let bytes = match frame.container.read_entry(index) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!("unreadable entry '{entry_path}': {err}");
            return Ok(());
        }
    };

    // Declared sizes can lie; bill any measured excess before decoding
    let measured = bytes.len() as u64;
    if measured > meta.uncompressed_size {
        ctx.tracker
            .check_total_size(&ctx.limits, measured - meta.uncompressed_size)?;
    }

    if let Some((text, language)) = extract_text(capability, entry_path, &bytes, ctx.parsers) {
        documents.push(build_document(
            text,
            entry_path,
            language,
            &frame.breadcrumb,
            frame.depth,
            ctx,
        ));
    }

    Ok(())
}
