//! Dispatch behavior of the generic file-reader facade.

use reader_core::{keys, DelegateParser, ReaderError};
use reader_file::FileReader;
use serde_json::{Map, Value};
use std::io::{Cursor, Write};
use std::sync::Arc;
use zip::write::{FileOptions, ZipWriter};

fn write_zip(dir: &tempfile::TempDir, name: &str, entries: &[(&str, &[u8])]) -> std::path::PathBuf {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options: FileOptions<()> = FileOptions::default();
    for (entry_name, contents) in entries {
        writer.start_file(*entry_name, options).unwrap();
        writer.write_all(contents).unwrap();
    }
    let path = dir.path().join(name);
    std::fs::write(&path, writer.finish().unwrap().into_inner()).unwrap();
    path
}

#[test]
fn test_zip_inputs_route_to_the_archive_engine() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_zip(
        &dir,
        "bundle.zip",
        &[
            ("docs/a.txt", b"alpha".as_slice()),
            ("docs/b.txt", b"beta".as_slice()),
        ],
    );

    let docs = FileReader::new().load_data(&path, None).unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].archive_root(), Some("bundle.zip"));
    assert_eq!(docs[0].archive_depth(), Some(0));
}

#[test]
fn test_plain_text_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "standalone note").unwrap();

    let docs = FileReader::new().load_data(&path, None).unwrap();
    assert_eq!(docs.len(), 1);
    let doc = &docs[0];
    assert_eq!(doc.text, "standalone note");
    assert_eq!(doc.file_name(), Some("notes.txt"));
    assert_eq!(doc.file_suffix(), Some(".txt"));
    // single files carry no archive provenance
    assert_eq!(doc.archive_root(), None);
    assert_eq!(doc.archive_depth(), None);
}

#[test]
fn test_code_file_gets_language_tag() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("script.py");
    std::fs::write(&path, "print('standalone')").unwrap();

    let docs = FileReader::new().load_data(&path, None).unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].language(), Some("python"));
}

#[test]
fn test_empty_text_file_yields_no_documents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blank.txt");
    std::fs::write(&path, "   \n").unwrap();

    let docs = FileReader::new().load_data(&path, None).unwrap();
    assert!(docs.is_empty());
}

#[test]
fn test_ext_info_reaches_single_file_documents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tagged.md");
    std::fs::write(&path, "# heading").unwrap();

    let mut ext_info = Map::new();
    ext_info.insert("collection".into(), "handbook".into());

    let docs = FileReader::new().load_data(&path, Some(ext_info)).unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(
        docs[0].metadata.get("collection").and_then(Value::as_str),
        Some("handbook")
    );
    assert_eq!(
        docs[0].metadata.get(keys::FILE_PATH).and_then(Value::as_str),
        Some(path.display().to_string().as_str())
    );
}

struct StubDocxParser;

impl DelegateParser for StubDocxParser {
    fn extensions(&self) -> &[&str] {
        &["docx"]
    }

    fn parse(
        &self,
        _bytes: &[u8],
        _file_name: &str,
    ) -> Result<String, reader_core::delegate::ParseError> {
        Ok("delegated body".to_string())
    }
}

#[test]
fn test_office_file_routes_through_registered_parser() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.docx");
    std::fs::write(&path, [0xD0, 0xCF, 0x11, 0xE0]).unwrap();

    let mut reader = FileReader::new();
    reader.register_parser(Arc::new(StubDocxParser));

    let docs = reader.load_data(&path, None).unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].text, "delegated body");
}

#[test]
fn test_office_file_without_parser_yields_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deck.pptx");
    std::fs::write(&path, [0x50, 0x4B, 0x03, 0x04]).unwrap();

    let docs = FileReader::new().load_data(&path, None).unwrap();
    assert!(docs.is_empty());
}

#[test]
fn test_registered_parser_also_serves_archive_entries() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_zip(
        &dir,
        "with_office.zip",
        &[("inner/report.docx", [0xD0, 0xCF].as_slice())],
    );

    let mut reader = FileReader::new();
    reader.register_parser(Arc::new(StubDocxParser));

    let docs = reader.load_data(&path, None).unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].text, "delegated body");
    assert_eq!(docs[0].archive_path(), Some("inner/report.docx"));
}

#[test]
fn test_unsupported_extension_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.bin");
    std::fs::write(&path, [0u8; 16]).unwrap();

    let err = FileReader::new().load_data(&path, None).unwrap_err();
    assert!(matches!(err, ReaderError::UnsupportedFormat(_)));
}
