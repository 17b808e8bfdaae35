//! Nested-archive content extraction for reader_rs
//!
//! This crate turns a compressed container file (ZIP, RAR, 7Z) into a flat
//! list of [`reader_core::Document`]s, recursing into archives nested inside
//! archives to a configurable depth. Every entry carries full provenance
//! metadata: the outermost container name, the `/`-joined path of container
//! and directory segments leading to it, and the nesting depth.
//!
//! Malformed and malicious inputs are first-class concerns:
//!
//! - **Path traversal**: entry names are sanitized; anything with a `..`
//!   segment or an absolute prefix is dropped before it is read
//! - **Decompression bombs**: per-entry compression ratios are checked from
//!   container metadata before decompression, and cumulative extracted bytes
//!   are capped
//! - **Unbounded recursion**: traversal uses an explicit work-list with a
//!   depth ceiling checked before descending, never native recursion
//! - **Resource exhaustion**: entry count, single-entry size and total size
//!   ceilings are enforced per call
//!
//! # Usage
//!
//! ```no_run
//! use reader_archive::{ArchiveReader, ExtractionLimits};
//!
//! let reader = ArchiveReader::with_limits(
//!     ExtractionLimits::default().with_max_depth(3),
//! );
//! let documents = reader.load_data("bundle.zip", None).unwrap();
//! for doc in documents {
//!     println!(
//!         "{} (depth {}): {} chars",
//!         doc.archive_path().unwrap_or("?"),
//!         doc.archive_depth().unwrap_or(0),
//!         doc.text.len(),
//!     );
//! }
//! ```
//!
//! Aggregate limit violations abort the whole call with an error naming the
//! limit; a single unreadable entry only shrinks the result set.

pub mod builder;
pub mod container;
pub mod content;
pub mod limits;
pub mod path;
pub mod reader;
pub mod walker;

pub use container::{Container, EntryMeta, SharedBytes};
pub use content::Capability;
pub use limits::{ExtractionLimits, ResourceTracker};
pub use path::sanitize_entry_path;
pub use reader::ArchiveReader;
pub use walker::ExtractionContext;
