/// The `epub-t2s` command: traditional to simplified Chinese EPUB conversion
use clap::Args;
use std::path::PathBuf;

use crate::cli::output;
use crate::epub::{batch_convert, convert_epub, ScriptConverter, TraditionalToSimplified};
use crate::NetprobeError;

#[derive(Args, Debug)]
pub struct EpubArgs {
    /// An EPUB file, or a directory whose *.epub files are all converted
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Directory the converted books are written to
    #[arg(value_name = "OUTPUT_DIR", default_value = "converted_epubs")]
    pub output: PathBuf,
}

pub fn run(args: EpubArgs) -> anyhow::Result<()> {
    run_with_converter(args, &TraditionalToSimplified)
}

pub fn run_with_converter(args: EpubArgs, converter: &dyn ScriptConverter) -> anyhow::Result<()> {
    if args.input.is_file() {
        let file_name = args.input.file_name().ok_or_else(|| {
            NetprobeError::InvalidInput(format!("{} has no file name", args.input.display()))
        })?;
        let output = args.output.join(format!(
            "{}{}",
            crate::epub::archive::OUTPUT_PREFIX,
            file_name.to_string_lossy()
        ));

        output::action(&format!("Converting {}...", args.input.display()));
        let report = convert_epub(&args.input, &output, converter)?;
        output::success(&format!(
            "Done: {} documents converted, saved to {}",
            report.files_converted,
            output.display()
        ));
        return Ok(());
    }

    let report = batch_convert(&args.input, &args.output, converter)?;
    for book in &report.books {
        match &book.outcome {
            Ok(r) => output::success(&format!(
                "{} -> {} ({} documents)",
                book.input.display(),
                book.output.display(),
                r.files_converted
            )),
            Err(e) => output::error(&format!("{}: {}", book.input.display(), e)),
        }
    }

    if report.books.is_empty() {
        output::warning(&format!("No .epub files found in {}", args.input.display()));
    } else {
        output::info(&format!(
            "All files processed: {} converted, {} failed",
            report.converted(),
            report.failed()
        ));
    }

    if report.failed() > 0 {
        anyhow::bail!("{} book(s) could not be converted", report.failed());
    }
    Ok(())
}
