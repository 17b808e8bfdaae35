//! Core types for the reader_rs knowledge-ingestion library
//!
//! This crate defines the vocabulary shared by every reader:
//!
//! - [`Document`]: the `{text, metadata}` unit produced by all readers
//! - [`InputFormat`]: extension-based format classification with magic-byte
//!   confirmation for container formats
//! - [`ReaderError`]: the single error taxonomy; only missing inputs and
//!   resource-limit violations abort a read, everything else degrades to a
//!   smaller result set
//! - [`DelegateParser`]: the seam through which office/binary formats
//!   (word, pdf, slides, spreadsheets) are handed to external parsers

pub mod delegate;
pub mod document;
pub mod error;
pub mod format;

pub use delegate::{DelegateParser, ParserRegistry};
pub use document::{keys, Document};
pub use error::{ReaderError, Result};
pub use format::InputFormat;
