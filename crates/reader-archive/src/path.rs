//! Entry-path sanitization
//!
//! Container entry names come straight from attacker-controllable metadata.
//! Sanitization runs before any limiter check or read: an entry whose name
//! cannot be normalized to a safe relative path simply does not exist as far
//! as the rest of the engine is concerned.

/// Normalize an archive entry path and refuse traversal attempts.
///
/// Splits on both `/` and `\` (archives built on Windows mix separators),
/// drops empty segments, `.` segments and drive prefixes (`C:`), and
/// returns the remaining segments joined by `/`.
///
/// Returns `None` when any segment is `..` or when nothing survives
/// normalization; callers skip such entries without failing the walk.
#[must_use = "a None result means the entry must be skipped"]
pub fn sanitize_entry_path(raw: &str) -> Option<String> {
    let mut segments: Vec<&str> = Vec::new();

    for segment in raw.split(['/', '\\']) {
        if segment.is_empty() || segment == "." {
            continue;
        }
        if segment == ".." {
            return None;
        }
        if is_drive_prefix(segment) {
            continue;
        }
        segments.push(segment);
    }

    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}

/// Windows drive prefix ("C:", "d:")
fn is_drive_prefix(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.len() == 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
