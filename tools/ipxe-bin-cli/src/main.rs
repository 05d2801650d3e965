//! # `ipxe-bin`
//!
//! Operator tool for the firmware embedded in the `ipxe-bin` crate: list the
//! registry, checksum an image, or write it out with the startup script
//! marker replaced, exactly as a boot server would serve it.
//!
//! ```bash
//! ipxe-bin list
//! ipxe-bin info ipxe.efi
//! ipxe-bin extract ipxe.efi --patch 'chain http://10.0.0.1/auto.ipxe' -o ipxe.efi
//! ipxe-bin patch build/undionly.kpxe --patch-file boot.ipxe -o undionly.kpxe
//! ```

mod cli;
mod commands;
mod error;
mod logger;

use clap::Parser;
use log::debug;
use std::io;
use std::process::ExitCode;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::logger::StderrLogger;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    StderrLogger::new(cli.log_level).init()?;
    debug!("{:?}", cli.command);

    let mut stdout = io::stdout().lock();
    match cli.command {
        Command::List => commands::list(&mut stdout).map_err(CliError::Stdout),
        Command::Info { name } => commands::info(&name, &mut stdout),
        Command::Extract {
            name,
            payload,
            output,
        } => commands::extract(&name, &payload.load()?, output.as_deref(), &mut stdout),
        Command::Patch {
            input,
            payload,
            output,
        } => commands::patch_file(&input, &payload.load()?, output.as_deref(), &mut stdout),
    }
}
