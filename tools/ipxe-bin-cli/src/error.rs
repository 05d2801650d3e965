use ipxe_bin::{PatchError, UnknownAsset};
use log::SetLoggerError;
use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write to stdout: {0}")]
    Stdout(#[source] io::Error),
    #[error(transparent)]
    UnknownAsset(#[from] UnknownAsset),
    #[error(transparent)]
    Patch(#[from] PatchError),
    #[error("failed to install logger: {0}")]
    Logger(#[from] SetLoggerError),
}
