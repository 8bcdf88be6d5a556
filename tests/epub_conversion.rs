mod common;

use netprobe::cli::commands::epub::{run_with_converter, EpubArgs};
use netprobe::epub::{batch_convert, convert_epub, ScriptConverter, TraditionalToSimplified};
use pretty_assertions::assert_eq;
use std::fs::{self, File};
use tempfile::TempDir;

use common::{read_entry, write_epub};

/// Deterministic stand-in for the dictionary-backed converter
struct TinyDictionary;

impl ScriptConverter for TinyDictionary {
    fn convert(&self, text: &str) -> String {
        text.replace('體', "体").replace('書', "书").replace('國', "国")
    }
}

const CHAPTER: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<html xmlns="http://www.w3.org/1999/xhtml"><head><title>國</title></head>
<body><p class="體">繁體</p><!-- 體 --></body></html>"#;

#[test]
fn test_convert_epub_rewrites_text_only() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("book.epub");
    let output = dir.path().join("out").join("simplified_book.epub");
    write_epub(&input, &[("ch1.xhtml", CHAPTER), ("ch2.html", "<p>書</p>")]);

    let report = convert_epub(&input, &output, &TinyDictionary).unwrap();
    assert_eq!(report.files_converted, 2);

    let ch1 = String::from_utf8(read_entry(&output, "OEBPS/ch1.xhtml")).unwrap();
    assert_eq!(
        ch1,
        r#"<?xml version="1.0" encoding="utf-8"?>
<html xmlns="http://www.w3.org/1999/xhtml"><head><title>国</title></head>
<body><p class="體">繁体</p><!-- 體 --></body></html>"#
    );
    assert_eq!(read_entry(&output, "OEBPS/ch2.html"), "<p>书</p>".as_bytes());

    // Non-markup entries are carried over untouched
    assert_eq!(
        read_entry(&output, "OEBPS/content.opf"),
        "<package><metadata><dc:title>繁體書名</dc:title></metadata></package>".as_bytes()
    );
    assert_eq!(
        read_entry(&output, "OEBPS/images/cover.png"),
        vec![0x89, b'P', b'N', b'G', 0x00, 0xFF, 0x10]
    );
}

#[test]
fn test_mimetype_is_first_and_stored() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("book.epub");
    let output = dir.path().join("converted.epub");
    write_epub(&input, &[("ch1.xhtml", CHAPTER)]);

    convert_epub(&input, &output, &TinyDictionary).unwrap();

    let mut archive = zip::ZipArchive::new(File::open(&output).unwrap()).unwrap();
    let first = archive.by_index(0).unwrap();
    assert_eq!(first.name(), "mimetype");
    assert_eq!(first.compression(), zip::CompressionMethod::Stored);
    drop(first);
    assert_eq!(read_entry(&output, "mimetype"), b"application/epub+zip");
}

#[test]
fn test_batch_converts_each_epub_and_skips_other_files() {
    let dir = TempDir::new().unwrap();
    let input_dir = dir.path().join("input");
    let output_dir = dir.path().join("converted_epubs");
    fs::create_dir_all(&input_dir).unwrap();

    write_epub(&input_dir.join("a.epub"), &[("ch.xhtml", "<p>體</p>")]);
    write_epub(&input_dir.join("b.EPUB"), &[("ch.xhtml", "<p>書</p>")]);
    fs::write(input_dir.join("notes.txt"), "not a book").unwrap();

    let report = batch_convert(&input_dir, &output_dir, &TinyDictionary).unwrap();

    assert_eq!(report.converted(), 2);
    assert_eq!(report.failed(), 0);
    assert_eq!(
        read_entry(&output_dir.join("simplified_a.epub"), "OEBPS/ch.xhtml"),
        "<p>体</p>".as_bytes()
    );
    assert_eq!(
        read_entry(&output_dir.join("simplified_b.EPUB"), "OEBPS/ch.xhtml"),
        "<p>书</p>".as_bytes()
    );
    assert!(!output_dir.join("simplified_notes.txt").exists());
}

#[test]
fn test_batch_continues_past_a_corrupt_book() {
    let dir = TempDir::new().unwrap();
    let input_dir = dir.path().join("input");
    let output_dir = dir.path().join("output");
    fs::create_dir_all(&input_dir).unwrap();

    fs::write(input_dir.join("broken.epub"), b"this is not a zip archive").unwrap();
    write_epub(&input_dir.join("good.epub"), &[("ch.xhtml", "<p>國</p>")]);

    let report = batch_convert(&input_dir, &output_dir, &TinyDictionary).unwrap();

    assert_eq!(report.converted(), 1);
    assert_eq!(report.failed(), 1);
    let broken = report
        .books
        .iter()
        .find(|b| b.input.ends_with("broken.epub"))
        .unwrap();
    assert!(broken.outcome.is_err());
    assert_eq!(
        read_entry(&output_dir.join("simplified_good.epub"), "OEBPS/ch.xhtml"),
        "<p>国</p>".as_bytes()
    );
}

#[test]
fn test_real_converter_on_a_book() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("book.epub");
    let output = dir.path().join("simplified_book.epub");
    write_epub(
        &input,
        &[("ch1.xhtml", "<p>漢字</p>"), ("ch2.xhtml", "<p>&#28450;字 &amp; &nbsp;</p>")],
    );

    convert_epub(&input, &output, &TraditionalToSimplified).unwrap();

    assert_eq!(
        read_entry(&output, "OEBPS/ch1.xhtml"),
        "<p>汉字</p>".as_bytes()
    );
    assert_eq!(
        read_entry(&output, "OEBPS/ch2.xhtml"),
        "<p>汉字 &amp; &nbsp;</p>".as_bytes()
    );
}

#[test]
fn test_single_file_input_writes_prefixed_book() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("novel.epub");
    let output_dir = dir.path().join("converted_epubs");
    write_epub(&input, &[("ch1.xhtml", "<p>繁體</p>")]);

    let args = EpubArgs {
        input: input.clone(),
        output: output_dir.clone(),
    };
    run_with_converter(args, &TinyDictionary).unwrap();

    let output = output_dir.join("simplified_novel.epub");
    assert!(output.is_file());
    assert_eq!(read_entry(&output, "OEBPS/ch1.xhtml"), "<p>繁体</p>".as_bytes());
    assert_eq!(fs::read_dir(&output_dir).unwrap().count(), 1);
}

#[test]
fn test_batch_with_failed_book_returns_error() {
    let dir = TempDir::new().unwrap();
    let input_dir = dir.path().join("input");
    let output_dir = dir.path().join("output");
    fs::create_dir_all(&input_dir).unwrap();

    fs::write(input_dir.join("broken.epub"), b"not a zip").unwrap();
    write_epub(&input_dir.join("good.epub"), &[("ch.xhtml", "<p>書</p>")]);

    let args = EpubArgs {
        input: input_dir,
        output: output_dir.clone(),
    };
    let err = run_with_converter(args, &TinyDictionary).unwrap_err();

    assert!(err.to_string().contains("1 book(s) could not be converted"));
    // The good book is still written
    assert!(output_dir.join("simplified_good.epub").is_file());
}

#[test]
fn test_batch_without_failures_succeeds() {
    let dir = TempDir::new().unwrap();
    let input_dir = dir.path().join("input");
    fs::create_dir_all(&input_dir).unwrap();
    write_epub(&input_dir.join("one.epub"), &[("ch.xhtml", "<p>國</p>")]);

    let args = EpubArgs {
        input: input_dir,
        output: dir.path().join("output"),
    };
    assert!(run_with_converter(args, &TinyDictionary).is_ok());
}
