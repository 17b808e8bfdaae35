//! Single-file readers for text, code and delegated office formats.

use log::warn;
use reader_archive::content::{classify, extract_text};
use reader_core::{keys, Document, ParserRegistry, Result};
use serde_json::{Map, Value};
use std::path::Path;

/// Read one non-container file into at most one document.
///
/// The metadata keys match the archive engine's output so downstream
/// consumers see one shape: `file_name`, `file_suffix`, `file_path` (here
/// the input path itself), plus a `language` tag for code. Empty or
/// undecodable content yields an empty list, not an error.
pub(crate) fn read_single_file(
    path: &Path,
    parsers: &ParserRegistry,
    ext_info: Option<Map<String, Value>>,
) -> Result<Vec<Document>> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let Some(capability) = classify(&file_name) else {
        // load_data resolved the format already; an unlisted capability
        // means empty output rather than a hard error
        warn!("no extraction capability for '{file_name}'");
        return Ok(Vec::new());
    };

    let bytes = std::fs::read(path)?;
    let Some((text, language)) = extract_text(capability, &file_name, &bytes, parsers) else {
        return Ok(Vec::new());
    };

    let file_suffix = Path::new(&file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_default();

    let mut metadata = Map::new();
    metadata.insert(keys::FILE_NAME.into(), file_name.into());
    metadata.insert(keys::FILE_SUFFIX.into(), file_suffix.into());
    metadata.insert(keys::FILE_PATH.into(), path.display().to_string().into());
    if let Some(language) = language {
        metadata.insert(keys::LANGUAGE.into(), language.into());
    }
    // caller-supplied fields are authoritative on collision
    for (key, value) in ext_info.unwrap_or_default() {
        metadata.insert(key, value);
    }

    Ok(vec![Document::new(text, metadata)])
}
