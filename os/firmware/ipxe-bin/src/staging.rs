//! Lookup of prebuilt firmware for `build.rs`.
//!
//! The build script includes this file via `#[path]`; the library compiles it
//! only for its own tests.

use std::{
    ffi::OsStr,
    fs, io,
    path::{Path, PathBuf},
};

use crate::magic::MAGIC_STRING;

#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error(
        "{name} not found in {}; add it there or enable the `stand-ins` feature",
        .dir.display()
    )]
    Missing { name: String, dir: PathBuf },
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("{} is empty", .0.display())]
    Empty(PathBuf),
}

/// A firmware file found in the source directory.
#[derive(Debug)]
pub struct Prebuilt {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

impl Prebuilt {
    pub fn carries_marker(&self) -> bool {
        count_occurrences(&self.bytes, MAGIC_STRING) > 0
    }
}

/// The firmware source directory: `binary/` unless overridden.
///
/// Relative overrides resolve against the crate directory.
pub fn bin_dir(manifest_dir: &Path, overridden: Option<&OsStr>) -> PathBuf {
    overridden.map_or_else(|| manifest_dir.join("binary"), |dir| manifest_dir.join(dir))
}

/// First candidate present in `dir`, in lookup order.
pub fn find_prebuilt(dir: &Path, candidates: &[&str]) -> Option<PathBuf> {
    candidates
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Reads the firmware for `name`.
///
/// Returns `Ok(None)` for a missing file only if `stand_ins` is set; the
/// caller then generates a replacement.
pub fn load(
    dir: &Path,
    name: &str,
    candidates: &[&str],
    stand_ins: bool,
) -> Result<Option<Prebuilt>, StageError> {
    let Some(path) = find_prebuilt(dir, candidates) else {
        if stand_ins {
            return Ok(None);
        }
        return Err(StageError::Missing {
            name: name.into(),
            dir: dir.to_path_buf(),
        });
    };

    let bytes = fs::read(&path).map_err(|source| StageError::Read {
        path: path.clone(),
        source,
    })?;
    if bytes.is_empty() {
        return Err(StageError::Empty(path));
    }

    Ok(Some(Prebuilt { path, bytes }))
}

pub fn count_occurrences(haystack: &[u8], needle: &[u8]) -> usize {
    haystack
        .windows(needle.len())
        .filter(|window| *window == needle)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ROCK_5B: &[&str] = &[
        "rk3588-rock-5b.dtb",
        "rockchip-rk3588-rock-5b.dtb--6.8-edge.dtb",
    ];

    fn stage(dir: &TempDir, name: &str, content: impl AsRef<[u8]>) {
        fs::write(dir.path().join(name), content).unwrap();
    }

    #[test]
    fn device_tree_is_found_under_its_armbian_name() {
        let dir = tempfile::tempdir().unwrap();
        stage(&dir, "rockchip-rk3588-rock-5b.dtb--6.8-edge.dtb", "armbian");

        let found = load(dir.path(), "rk3588-rock-5b.dtb", ROCK_5B, false)
            .unwrap()
            .unwrap();
        assert!(found.path.ends_with("rockchip-rk3588-rock-5b.dtb--6.8-edge.dtb"));
        assert_eq!(found.bytes, b"armbian");
    }

    #[test]
    fn canonical_name_wins_over_alias() {
        let dir = tempfile::tempdir().unwrap();
        stage(&dir, "rk3588-rock-5b.dtb", "canonical");
        stage(&dir, "rockchip-rk3588-rock-5b.dtb--6.8-edge.dtb", "armbian");

        let found = load(dir.path(), "rk3588-rock-5b.dtb", ROCK_5B, false)
            .unwrap()
            .unwrap();
        assert!(found.path.ends_with("rk3588-rock-5b.dtb"));
        assert_eq!(found.bytes, b"canonical");
    }

    #[test]
    fn directories_are_not_candidates() {
        let dir = tempfile::tempdir().unwrap();
        stage(&dir, "rockchip-rk3588-rock-5b.dtb--6.8-edge.dtb", "armbian");
        fs::create_dir(dir.path().join("rk3588-rock-5b.dtb")).unwrap();

        let found = find_prebuilt(dir.path(), ROCK_5B).unwrap();
        assert!(found.ends_with("rockchip-rk3588-rock-5b.dtb--6.8-edge.dtb"));
    }

    #[test]
    fn empty_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        stage(&dir, "ipxe.efi", "");

        let err = load(dir.path(), "ipxe.efi", &["ipxe.efi"], true).unwrap_err();
        assert!(matches!(&err, StageError::Empty(path) if path.ends_with("ipxe.efi")));
        assert!(err.to_string().ends_with("ipxe.efi is empty"));
    }

    #[test]
    fn missing_file_fails_without_stand_ins() {
        let dir = tempfile::tempdir().unwrap();

        let err = load(dir.path(), "undionly.kpxe", &["undionly.kpxe"], false).unwrap_err();
        assert!(matches!(&err, StageError::Missing { name, .. } if name == "undionly.kpxe"));
        assert!(err.to_string().contains("`stand-ins` feature"), "{err}");
    }

    #[test]
    fn missing_file_is_left_to_stand_ins() {
        let dir = tempfile::tempdir().unwrap();
        let found = load(dir.path(), "undionly.kpxe", &["undionly.kpxe"], true).unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn stand_ins_never_replace_a_present_file() {
        let dir = tempfile::tempdir().unwrap();
        stage(&dir, "snp.efi", "real loader");
        let found = load(dir.path(), "snp.efi", &["snp.efi"], true).unwrap().unwrap();
        assert_eq!(found.bytes, b"real loader");
    }

    #[test]
    fn loader_without_marker_is_detected() {
        let mut scripted = b"MZ header ".to_vec();
        scripted.extend_from_slice(MAGIC_STRING);
        let dir = tempfile::tempdir().unwrap();
        stage(&dir, "ipxe.efi", &scripted);
        stage(&dir, "snp.efi", "MZ built without EMBED");

        let with = load(dir.path(), "ipxe.efi", &["ipxe.efi"], false).unwrap().unwrap();
        let without = load(dir.path(), "snp.efi", &["snp.efi"], false).unwrap().unwrap();
        assert!(with.carries_marker());
        assert!(!without.carries_marker());
    }

    #[test]
    fn override_replaces_the_binary_directory() {
        let manifest = Path::new("/src/os/firmware/ipxe-bin");

        assert_eq!(bin_dir(manifest, None), manifest.join("binary"));
        assert_eq!(
            bin_dir(manifest, Some(OsStr::new("../firmware"))),
            manifest.join("../firmware")
        );
        assert_eq!(
            bin_dir(manifest, Some(OsStr::new("/srv/tftp"))),
            Path::new("/srv/tftp")
        );
    }

    #[test]
    fn override_is_where_files_are_looked_up() {
        let dir = tempfile::tempdir().unwrap();
        stage(&dir, "ipxe.iso", "ISO 9660");
        let resolved = bin_dir(Path::new("/nonexistent"), Some(dir.path().as_os_str()));

        let found = load(&resolved, "ipxe.iso", &["ipxe.iso"], false).unwrap().unwrap();
        assert_eq!(found.bytes, b"ISO 9660");
    }

    #[test]
    fn counts_every_occurrence() {
        let mut twice = MAGIC_STRING.to_vec();
        twice.extend_from_slice(b"\n");
        twice.extend_from_slice(MAGIC_STRING);

        assert_eq!(count_occurrences(&twice, MAGIC_STRING), 2);
        assert_eq!(count_occurrences(b"short", MAGIC_STRING), 0);
    }
}
