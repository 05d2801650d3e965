use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use std::fs;
use std::path::PathBuf;

use crate::error::CliError;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Maximum level of log messages written to stderr
    #[arg(
        long,
        global = true,
        env = "IPXE_BIN_LOG",
        default_value = "warn",
        value_name = "LEVEL"
    )]
    pub log_level: LevelFilter,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the embedded firmware assets
    List,
    /// Show size, checksum and marker location of an asset
    Info {
        /// Asset name, e.g. `ipxe.efi`
        #[arg(value_name = "NAME")]
        name: String,
    },
    /// Write an embedded asset, optionally patched
    Extract {
        /// Asset name, e.g. `ipxe.efi`
        #[arg(value_name = "NAME")]
        name: String,

        #[command(flatten)]
        payload: PayloadArgs,

        /// Output file; stdout when omitted
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Patch the marker of a firmware file on disk
    Patch {
        /// Firmware image to read
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        #[command(flatten)]
        payload: PayloadArgs,

        /// Output file; stdout when omitted
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Default, Args)]
#[group(multiple = false)]
pub struct PayloadArgs {
    /// Script fragment that replaces the marker
    #[arg(long, value_name = "TEXT")]
    pub patch: Option<String>,

    /// Read the replacement from a file
    #[arg(long, value_name = "PATH")]
    pub patch_file: Option<PathBuf>,
}

impl PayloadArgs {
    /// The payload bytes; empty when neither option was given.
    ///
    /// # Errors
    /// Fails if `--patch-file` cannot be read.
    pub fn load(&self) -> Result<Vec<u8>, CliError> {
        if let Some(text) = &self.patch {
            return Ok(text.clone().into_bytes());
        }

        match &self.patch_file {
            Some(path) => fs::read(path).map_err(|source| CliError::Read {
                path: path.clone(),
                source,
            }),
            None => Ok(Vec::new()),
        }
    }
}
