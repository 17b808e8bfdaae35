//! Document assembly
//!
//! All documents leave the engine through [`build_document`], which merges
//! computed provenance with the caller's `ext_info`. Caller-supplied keys
//! are written last and therefore win on collision, so ingestion pipelines
//! can tag documents without being overridden.

use crate::walker::ExtractionContext;
use reader_core::{keys, Document};
use serde_json::Value;
use std::path::Path;

/// Assemble the output unit for one extracted entry.
#[must_use = "creating a document that is not used is a waste of resources"]
pub fn build_document(
    text: String,
    entry_path: &str,
    language: Option<&str>,
    breadcrumb: &[String],
    depth: usize,
    ctx: &ExtractionContext,
) -> Document {
    let file_name = entry_path.rsplit('/').next().unwrap_or(entry_path);
    let file_suffix = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_default();

    let archive_path = if breadcrumb.is_empty() {
        entry_path.to_string()
    } else {
        format!("{}/{}", breadcrumb.join("/"), entry_path)
    };

    let mut metadata = serde_json::Map::new();
    metadata.insert(keys::FILE_NAME.into(), file_name.into());
    metadata.insert(keys::FILE_SUFFIX.into(), file_suffix.into());
    metadata.insert(
        keys::FILE_PATH.into(),
        format!("{}::{}", ctx.archive_root, archive_path).into(),
    );
    metadata.insert(keys::ARCHIVE_ROOT.into(), ctx.archive_root.clone().into());
    metadata.insert(keys::ARCHIVE_PATH.into(), archive_path.into());
    metadata.insert(keys::ARCHIVE_DEPTH.into(), Value::from(depth as u64));
    if let Some(language) = language {
        metadata.insert(keys::LANGUAGE.into(), language.into());
    }

    // ext_info last: caller-supplied fields are authoritative on collision
    for (key, value) in &ctx.ext_info {
        metadata.insert(key.clone(), value.clone());
    }

    Document::new(text, metadata)
}
