use clap::Parser;
use colored::*;
use netprobe::cli::{self, Cli};
use std::process;

fn main() {
    cli::init_logging();

    let args = Cli::parse();

    if let Err(e) = cli::commands::speed::run(args) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);

        let exit_code = match e.downcast_ref::<netprobe::NetprobeError>() {
            Some(netprobe::NetprobeError::Configuration(_)) => 2,
            Some(netprobe::NetprobeError::Io(_)) => 3,
            _ => 1,
        };
        process::exit(exit_code);
    }
}
