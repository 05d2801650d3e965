use ipxe_bin::{Asset, UnknownAsset, assets, marker_offset, patch};
use log::{debug, warn};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::CliError;

/// One row per asset: name, kind, size in bytes, marker offset.
pub fn list(out: &mut impl Write) -> io::Result<()> {
    for asset in assets::all() {
        writeln!(
            out,
            "{:<26} {:<38} {:>10} {}",
            asset.name(),
            asset.kind().to_string(),
            asset.content().len(),
            format_offset(asset.marker_offset())
        )?;
    }
    Ok(())
}

pub fn info(name: &str, out: &mut impl Write) -> Result<(), CliError> {
    let asset = find(name)?;
    describe(asset, out).map_err(CliError::Stdout)
}

fn describe(asset: &Asset, out: &mut impl Write) -> io::Result<()> {
    let digest = Sha256::digest(asset.content());
    writeln!(out, "name:    {}", asset.name())?;
    writeln!(out, "kind:    {}", asset.kind())?;
    writeln!(out, "size:    {} bytes", asset.content().len())?;
    writeln!(out, "sha256:  {}", hex::encode(digest))?;
    writeln!(out, "marker:  {}", format_offset(asset.marker_offset()))
}

pub fn extract(
    name: &str,
    payload: &[u8],
    output: Option<&Path>,
    stdout: &mut impl Write,
) -> Result<(), CliError> {
    let asset = find(name)?;
    if !payload.is_empty() && asset.marker_offset().is_none() {
        warn!("{name} has no marker, writing it unmodified");
    }

    let content = asset.patched(payload)?;
    emit(&content, output, stdout)
}

pub fn patch_file(
    input: &Path,
    payload: &[u8],
    output: Option<&Path>,
    stdout: &mut impl Write,
) -> Result<(), CliError> {
    let content = fs::read(input).map_err(|source| CliError::Read {
        path: input.to_path_buf(),
        source,
    })?;

    if !payload.is_empty() && marker_offset(&content).is_none() {
        warn!("{} has no marker, writing it unmodified", input.display());
    }

    let patched = patch(&content, payload)?;
    emit(&patched, output, stdout)
}

fn find(name: &str) -> Result<&'static Asset, CliError> {
    assets::find(name).ok_or_else(|| UnknownAsset(name.into()).into())
}

fn emit(content: &[u8], output: Option<&Path>, stdout: &mut impl Write) -> Result<(), CliError> {
    match output {
        Some(path) => {
            fs::write(path, content).map_err(|source| CliError::Write {
                path: PathBuf::from(path),
                source,
            })?;
            debug!("wrote {} bytes to {}", content.len(), path.display());
            Ok(())
        }
        None => stdout
            .write_all(content)
            .and_then(|()| stdout.flush())
            .map_err(CliError::Stdout),
    }
}

fn format_offset(offset: Option<usize>) -> String {
    offset.map_or_else(|| String::from("-"), |offset| format!("{offset:#x}"))
}
