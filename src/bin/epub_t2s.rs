use clap::Parser;
use colored::*;
use netprobe::cli::{self, commands::epub::EpubArgs};
use std::process;

#[derive(Parser)]
#[command(
    name = "epub-t2s",
    version,
    about = "Convert EPUB books from traditional to simplified Chinese"
)]
struct EpubCli {
    #[command(flatten)]
    args: EpubArgs,
}

fn main() {
    cli::init_logging();

    let args = EpubCli::parse();

    if let Err(e) = cli::commands::epub::run(args.args) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);

        let exit_code = match e.downcast_ref::<netprobe::NetprobeError>() {
            Some(netprobe::NetprobeError::InvalidInput(_)) => 2,
            Some(netprobe::NetprobeError::Io(_)) => 3,
            Some(netprobe::NetprobeError::Archive(_))
            | Some(netprobe::NetprobeError::Parse(_)) => 4,
            _ => 1,
        };
        process::exit(exit_code);
    }
}
