//! Delegate-parser seam for office and other binary document formats
//!
//! The extraction engine never parses word/pdf/slide/spreadsheet bytes
//! itself; it hands them to whatever [`DelegateParser`] the caller
//! registered for the extension. A missing or failing parser drops the
//! single entry; it must never abort extraction of sibling entries.

use std::collections::HashMap;
use std::sync::Arc;

/// Error type delegate parsers may return; the engine only logs it.
pub type ParseError = Box<dyn std::error::Error + Send + Sync>;

/// An external parser that turns raw bytes of one format family into text.
pub trait DelegateParser: Send + Sync {
    /// Lowercased extensions (without the dot) this parser handles
    fn extensions(&self) -> &[&str];

    /// Extract plain text from raw bytes.
    ///
    /// # Errors
    ///
    /// Implementations return any error; the caller treats a failure as
    /// "this one entry could not be read" and continues.
    fn parse(&self, bytes: &[u8], file_name: &str) -> Result<String, ParseError>;
}

/// Registry of delegate parsers keyed by extension.
///
/// Registration order matters only on extension collision: the parser
/// registered last wins for that extension.
#[derive(Clone, Default)]
pub struct ParserRegistry {
    by_ext: HashMap<String, Arc<dyn DelegateParser>>,
}

impl ParserRegistry {
    /// Create an empty registry
    #[inline]
    #[must_use = "creating a registry that is not used is a waste of resources"]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a parser for every extension it advertises
    pub fn register(&mut self, parser: Arc<dyn DelegateParser>) {
        for ext in parser.extensions() {
            self.by_ext.insert(ext.to_lowercase(), Arc::clone(&parser));
        }
    }

    /// Look up the parser for an extension (without the dot, any case)
    #[must_use = "returns the parser registered for the extension"]
    pub fn get(&self, ext: &str) -> Option<&Arc<dyn DelegateParser>> {
        self.by_ext.get(&ext.to_lowercase())
    }

    /// Number of registered extensions
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_ext.len()
    }

    /// Whether no parser has been registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_ext.is_empty()
    }
}

impl std::fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut extensions: Vec<&str> = self.by_ext.keys().map(String::as_str).collect();
        extensions.sort_unstable();
        f.debug_struct("ParserRegistry")
            .field("extensions", &extensions)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct UpperParser;

    impl DelegateParser for UpperParser {
        fn extensions(&self) -> &[&str] {
            &["docx", "pdf"]
        }

        fn parse(&self, bytes: &[u8], _file_name: &str) -> Result<String, ParseError> {
            Ok(String::from_utf8_lossy(bytes).to_uppercase())
        }
    }

    struct FailingParser;

    impl DelegateParser for FailingParser {
        fn extensions(&self) -> &[&str] {
            &["pdf"]
        }

        fn parse(&self, _bytes: &[u8], file_name: &str) -> Result<String, ParseError> {
            Err(format!("cannot parse {file_name}").into())
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ParserRegistry::new();
        assert!(registry.is_empty());

        registry.register(Arc::new(UpperParser));
        assert_eq!(registry.len(), 2);
        assert!(registry.get("docx").is_some());
        assert!(registry.get("DOCX").is_some());
        assert!(registry.get("xlsx").is_none());
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = ParserRegistry::new();
        registry.register(Arc::new(UpperParser));
        registry.register(Arc::new(FailingParser));

        // pdf now routes to FailingParser, docx still to UpperParser
        let pdf = registry.get("pdf").unwrap();
        assert!(pdf.parse(b"x", "a.pdf").is_err());
        let docx = registry.get("docx").unwrap();
        assert_eq!(docx.parse(b"hi", "a.docx").unwrap(), "HI");
    }
}
