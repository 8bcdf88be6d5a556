use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::convert::ScriptConverter;
use super::markup::convert_markup;
use crate::{NetprobeError, Result};

/// EPUB readers expect this entry first and uncompressed
const MIMETYPE_ENTRY: &str = "mimetype";

const MARKUP_EXTENSIONS: &[&str] = &["html", "xhtml", "htm"];

/// Prefix given to converted books in batch mode
pub const OUTPUT_PREFIX: &str = "simplified_";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EpubReport {
    pub files_converted: usize,
}

#[derive(Debug)]
pub struct BookResult {
    pub input: PathBuf,
    pub output: PathBuf,
    pub outcome: Result<EpubReport>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub books: Vec<BookResult>,
}

impl BatchReport {
    pub fn converted(&self) -> usize {
        self.books.iter().filter(|b| b.outcome.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.books.len() - self.converted()
    }
}

pub fn extract_epub(epub_path: &Path, destination: &Path) -> Result<()> {
    let file = File::open(epub_path)?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;
    archive.extract(destination)?;
    debug!(epub = %epub_path.display(), entries = archive.len(), "extracted");
    Ok(())
}

fn is_markup(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| MARKUP_EXTENSIONS.iter().any(|m| m.eq_ignore_ascii_case(ext)))
}

/// Rewrite every HTML/XHTML document under `root` in place.
pub fn convert_tree(root: &Path, converter: &dyn ScriptConverter) -> Result<usize> {
    let mut converted = 0;

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_markup(entry.path()) {
            continue;
        }

        let original = fs::read_to_string(entry.path()).map_err(|e| {
            let path = entry.path().display();
            NetprobeError::Parse(format!("{} is not valid UTF-8 text: {}", path, e))
        })?;
        fs::write(entry.path(), convert_markup(&original, converter))?;
        converted += 1;
    }

    Ok(converted)
}

/// Archive name of `path` relative to `root`, always `/`-separated.
fn entry_name(root: &Path, path: &Path) -> Result<String> {
    let relative = path.strip_prefix(root).map_err(|_| {
        NetprobeError::InvalidInput(format!("{} is outside {}", path.display(), root.display()))
    })?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

/// Pack a directory tree into an EPUB, `mimetype` first and stored.
pub fn pack_epub(root: &Path, output: &Path) -> Result<()> {
    let mut writer = ZipWriter::new(BufWriter::new(File::create(output)?));
    let stored = FileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let mimetype = root.join(MIMETYPE_ENTRY);
    if mimetype.is_file() {
        writer.start_file(MIMETYPE_ENTRY, stored)?;
        io::copy(&mut File::open(&mimetype)?, &mut writer)?;
    } else {
        warn!(root = %root.display(), "no mimetype entry; output may not open as an EPUB");
    }

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || entry.path() == mimetype {
            continue;
        }
        writer.start_file(entry_name(root, entry.path())?, deflated)?;
        io::copy(&mut File::open(entry.path())?, &mut writer)?;
    }

    writer.finish()?;
    Ok(())
}

/// Unpack, convert and repack one book through a private scratch directory.
pub fn convert_epub(
    input: &Path,
    output: &Path,
    converter: &dyn ScriptConverter,
) -> Result<EpubReport> {
    let scratch = tempfile::tempdir()?;

    extract_epub(input, scratch.path())?;
    let files_converted = convert_tree(scratch.path(), converter)?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    pack_epub(scratch.path(), output)?;

    info!(input = %input.display(), output = %output.display(), files_converted, "converted book");
    Ok(EpubReport { files_converted })
}

fn is_epub(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("epub"))
}

/// Convert every `*.epub` in `input_dir` into `output_dir/simplified_<name>`.
///
/// A book that fails is recorded in the report and the batch moves on.
pub fn batch_convert(
    input_dir: &Path,
    output_dir: &Path,
    converter: &dyn ScriptConverter,
) -> Result<BatchReport> {
    if !input_dir.is_dir() {
        return Err(NetprobeError::InvalidInput(format!(
            "{} is not a directory",
            input_dir.display()
        )));
    }
    fs::create_dir_all(output_dir)?;

    let mut inputs: Vec<PathBuf> = fs::read_dir(input_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_epub(path))
        .collect();
    inputs.sort();

    let mut report = BatchReport::default();
    for input in inputs {
        let file_name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let output = output_dir.join(format!("{}{}", OUTPUT_PREFIX, file_name));

        info!(input = %input.display(), "converting");
        let outcome = convert_epub(&input, &output, converter);
        if let Err(e) = &outcome {
            warn!(input = %input.display(), error = %e, "conversion failed");
        }
        report.books.push(BookResult { input, output, outcome });
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_markup() {
        assert!(is_markup(Path::new("OEBPS/ch1.xhtml")));
        assert!(is_markup(Path::new("index.HTML")));
        assert!(is_markup(Path::new("a.htm")));
        assert!(!is_markup(Path::new("content.opf")));
        assert!(!is_markup(Path::new("html")));
    }

    #[test]
    fn test_entry_name_uses_forward_slashes() {
        let root = Path::new("/tmp/book");
        let path = root.join("OEBPS").join("text").join("ch1.xhtml");
        assert_eq!(entry_name(root, &path).unwrap(), "OEBPS/text/ch1.xhtml");
    }

    #[test]
    fn test_batch_rejects_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let converter = crate::epub::TraditionalToSimplified;
        let err = batch_convert(&missing, dir.path(), &converter).unwrap_err();
        assert!(matches!(err, NetprobeError::InvalidInput(_)));
    }
}
