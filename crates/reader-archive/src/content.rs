//! Leaf-entry classification and text decoding
//!
//! Dispatch is a registered-capability table keyed by extension, built once:
//! looking up what to do with an entry is O(1) and adding a format is one
//! table row. Text-bearing entries decode as UTF-8 with BOM stripping;
//! anything that fails to decode is treated as opaque binary and skipped.

use log::{debug, warn};
use once_cell::sync::Lazy;
use reader_core::{InputFormat, ParserRegistry};
use std::collections::HashMap;
use std::path::Path;

/// What the engine can do with an entry of a given extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Decode as UTF-8 text
    Text,
    /// Decode as UTF-8 text and tag the document with a language label
    Code(&'static str),
    /// Hand raw bytes to a registered delegate parser
    Delegate,
    /// Recurse as a nested container
    Container(InputFormat),
}

/// Extension -> language label for source code.
static LANGUAGES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("py", "python"),
        ("js", "javascript"),
        ("ts", "typescript"),
        ("java", "java"),
        ("c", "c"),
        ("h", "c"),
        ("cpp", "cpp"),
        ("hpp", "cpp"),
        ("cs", "csharp"),
        ("go", "go"),
        ("rb", "ruby"),
        ("php", "php"),
        ("swift", "swift"),
        ("kt", "kotlin"),
        ("rs", "rust"),
        ("sh", "shell"),
        ("sql", "sql"),
    ])
});

/// Extension -> capability dispatch table.
static CAPABILITIES: Lazy<HashMap<&'static str, Capability>> = Lazy::new(|| {
    let mut table = HashMap::new();

    for ext in [
        "txt", "md", "markdown", "log", "conf", "ini", "cfg", "toml", "csv", "json", "yaml",
        "yml", "xml", "html", "htm", "css",
    ] {
        table.insert(ext, Capability::Text);
    }

    for (ext, language) in LANGUAGES.iter() {
        table.insert(*ext, Capability::Code(*language));
    }

    for ext in ["docx", "pdf", "pptx", "xlsx", "epub"] {
        table.insert(ext, Capability::Delegate);
    }

    table.insert("zip", Capability::Container(InputFormat::Zip));
    table.insert("rar", Capability::Container(InputFormat::Rar));
    table.insert("7z", Capability::Container(InputFormat::SevenZ));

    table
});

/// Lowercased extension of an entry name, without the dot.
#[must_use = "returns the entry's extension"]
pub fn extension_of(entry_name: &str) -> Option<String> {
    Path::new(entry_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
}

/// Classify an entry by extension.
///
/// `None` means the format is unsupported and the entry is skipped.
#[must_use = "a None result means the entry must be skipped"]
pub fn classify(entry_name: &str) -> Option<Capability> {
    let ext = extension_of(entry_name)?;
    CAPABILITIES.get(ext.as_str()).copied()
}

/// Strip a UTF-8 byte-order mark if present.
fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes)
}

/// Decode bytes as UTF-8 text.
///
/// Returns `None` for undecodable bytes (the entry is binary as far as the
/// engine is concerned) and for empty or whitespace-only content.
#[must_use = "a None result means the entry must be skipped"]
pub fn decode_text(bytes: &[u8]) -> Option<String> {
    let text = std::str::from_utf8(strip_bom(bytes)).ok()?;
    if text.trim().is_empty() {
        return None;
    }
    Some(text.to_string())
}

/// Turn a classified leaf entry's bytes into text.
///
/// Returns the decoded text and the language tag for code entries. `None`
/// covers every recoverable outcome: undecodable bytes, whitespace-only
/// content, no delegate parser registered, delegate parser failure.
#[must_use = "a None result means the entry must be skipped"]
pub fn extract_text(
    capability: Capability,
    entry_name: &str,
    bytes: &[u8],
    parsers: &ParserRegistry,
) -> Option<(String, Option<&'static str>)> {
    match capability {
        Capability::Text => decode_text(bytes).map(|text| (text, None)),
        Capability::Code(language) => decode_text(bytes).map(|text| (text, Some(language))),
        Capability::Delegate => {
            let ext = extension_of(entry_name)?;
            let Some(parser) = parsers.get(&ext) else {
                debug!("no delegate parser registered for '{entry_name}', skipping");
                return None;
            };
            match parser.parse(bytes, entry_name) {
                Ok(text) if !text.trim().is_empty() => Some((text, None)),
                Ok(_) => None,
                Err(err) => {
                    // One bad file must not abort its siblings
                    warn!("delegate parser failed for '{entry_name}': {err}");
                    None
                }
            }
        }
        // Containers are dispatched by the walker before leaf handling
        Capability::Container(_) => None,
    }
}
