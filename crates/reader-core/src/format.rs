//! Input format classification
//!
//! Formats are detected from file extensions; container formats are
//! additionally confirmed against their magic bytes before the engine
//! recurses into them, so a text file renamed `notes.zip` is treated as an
//! opaque leaf rather than a corrupt archive.

use serde::{Deserialize, Serialize};

/// Input format recognized by the reader facade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InputFormat {
    /// ZIP archive (.zip)
    Zip,
    /// RAR archive (.rar), RAR4 and RAR5
    Rar,
    /// 7Z archive (.7z)
    #[serde(rename = "7Z")]
    SevenZ,
    /// Plain text and text-like config formats (.txt, .log, .conf, .ini, .cfg)
    Text,
    /// Markdown document (.md, .markdown)
    Md,
    /// CSV table, decoded as plain text
    Csv,
    /// HTML page, decoded as plain text
    Html,
    /// Structured-data text (.json, .yaml, .xml, .toml)
    Data,
    /// Source code with a language tag
    Code,
    /// Microsoft Word document (.docx), delegated
    Docx,
    /// PDF document, delegated
    Pdf,
    /// Microsoft PowerPoint (.pptx), delegated
    Pptx,
    /// Microsoft Excel (.xlsx), delegated
    Xlsx,
    /// EPUB e-book, delegated
    Epub,
}

impl InputFormat {
    /// Detect format from a file extension (without the dot, any case)
    #[inline]
    #[must_use = "detects format from file extension"]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "zip" => Some(Self::Zip),
            "rar" => Some(Self::Rar),
            "7z" => Some(Self::SevenZ),
            "txt" | "log" | "conf" | "ini" | "cfg" => Some(Self::Text),
            "md" | "markdown" => Some(Self::Md),
            "csv" => Some(Self::Csv),
            "html" | "htm" | "css" => Some(Self::Html),
            "json" | "yaml" | "yml" | "xml" | "toml" => Some(Self::Data),
            "py" | "js" | "ts" | "java" | "c" | "h" | "cpp" | "hpp" | "cs" | "go" | "rb"
            | "php" | "swift" | "kt" | "rs" | "sh" | "sql" => Some(Self::Code),
            "docx" => Some(Self::Docx),
            "pdf" => Some(Self::Pdf),
            "pptx" => Some(Self::Pptx),
            "xlsx" => Some(Self::Xlsx),
            "epub" => Some(Self::Epub),
            _ => None,
        }
    }

    /// Check if this is a container format the engine recurses into
    #[inline]
    #[must_use = "returns whether this is a container format"]
    pub const fn is_archive(&self) -> bool {
        matches!(self, Self::Zip | Self::Rar | Self::SevenZ)
    }

    /// Check if this format is handed to an external delegate parser
    #[inline]
    #[must_use = "returns whether this format requires a delegate parser"]
    pub const fn is_delegated(&self) -> bool {
        matches!(
            self,
            Self::Docx | Self::Pdf | Self::Pptx | Self::Xlsx | Self::Epub
        )
    }

    /// Confirm a container format against its leading magic bytes.
    ///
    /// Always true for non-container formats, which carry no reliable magic.
    #[inline]
    #[must_use = "returns whether the bytes look like this container format"]
    pub fn matches_magic(&self, bytes: &[u8]) -> bool {
        match self {
            // Local-file header or the empty-archive end-of-central-directory
            Self::Zip => bytes.starts_with(b"PK\x03\x04") || bytes.starts_with(b"PK\x05\x06"),
            Self::SevenZ => bytes.starts_with(&[0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C]),
            // Shared prefix of the RAR4 and RAR5 signatures
            Self::Rar => bytes.starts_with(b"Rar!\x1A\x07"),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(InputFormat::from_extension("zip"), Some(InputFormat::Zip));
        assert_eq!(InputFormat::from_extension("ZIP"), Some(InputFormat::Zip));
        assert_eq!(InputFormat::from_extension("rar"), Some(InputFormat::Rar));
        assert_eq!(InputFormat::from_extension("7z"), Some(InputFormat::SevenZ));
        assert_eq!(InputFormat::from_extension("txt"), Some(InputFormat::Text));
        assert_eq!(InputFormat::from_extension("md"), Some(InputFormat::Md));
        assert_eq!(InputFormat::from_extension("py"), Some(InputFormat::Code));
        assert_eq!(InputFormat::from_extension("docx"), Some(InputFormat::Docx));
        assert_eq!(InputFormat::from_extension("xyz"), None);
        assert_eq!(InputFormat::from_extension(""), None);
    }

    #[test]
    fn test_is_archive_classification() {
        assert!(InputFormat::Zip.is_archive());
        assert!(InputFormat::Rar.is_archive());
        assert!(InputFormat::SevenZ.is_archive());
        assert!(!InputFormat::Text.is_archive());
        assert!(!InputFormat::Docx.is_archive());
    }

    #[test]
    fn test_is_delegated() {
        assert!(InputFormat::Docx.is_delegated());
        assert!(InputFormat::Pdf.is_delegated());
        assert!(InputFormat::Epub.is_delegated());
        assert!(!InputFormat::Zip.is_delegated());
        assert!(!InputFormat::Code.is_delegated());
    }

    #[test]
    fn test_zip_magic() {
        assert!(InputFormat::Zip.matches_magic(b"PK\x03\x04rest"));
        assert!(InputFormat::Zip.matches_magic(b"PK\x05\x06"));
        assert!(!InputFormat::Zip.matches_magic(b"plain text"));
        assert!(!InputFormat::Zip.matches_magic(b""));
    }

    #[test]
    fn test_rar_and_7z_magic() {
        assert!(InputFormat::Rar.matches_magic(b"Rar!\x1A\x07\x00data"));
        assert!(InputFormat::Rar.matches_magic(b"Rar!\x1A\x07\x01\x00data"));
        assert!(!InputFormat::Rar.matches_magic(b"PK\x03\x04"));
        assert!(InputFormat::SevenZ.matches_magic(&[0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C, 0x00]));
        assert!(!InputFormat::SevenZ.matches_magic(b"7zip"));
    }

    #[test]
    fn test_magic_is_permissive_for_leaf_formats() {
        // Leaf formats have no magic contract; anything passes
        assert!(InputFormat::Text.matches_magic(b"\x00\x01\x02"));
        assert!(InputFormat::Pdf.matches_magic(b"not a pdf"));
    }

    #[test]
    fn test_serde_round_trip() {
        let json = serde_json::to_string(&InputFormat::SevenZ).unwrap();
        assert_eq!(json, "\"7Z\"");
        let back: InputFormat = serde_json::from_str(&json).unwrap();
        assert_eq!(back, InputFormat::SevenZ);
    }
}
