//! # Asset Registry
//!
//! The fixed set of firmware images compiled into the crate. The table is a
//! `static` built from `include_bytes!`, so lookups never allocate and every
//! caller observes the same bytes for the lifetime of the process.

use alloc::borrow::Cow;
use alloc::string::String;
use core::fmt;

use crate::patch::{self, PatchError};

/// Embed one staged asset from `$OUT_DIR` (see `build.rs`).
macro_rules! embed {
    ($name:literal) => {
        include_bytes!(concat!(env!("OUT_DIR"), "/", $name))
    };
}

/// CPU architecture a loader runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    X86_64,
    Arm64,
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X86_64 => f.write_str("x86_64"),
            Self::Arm64 => f.write_str("arm64"),
        }
    }
}

/// Single-board computers a device tree is shipped for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Board {
    /// Radxa ROCK 5B (Rockchip RK3588).
    Rock5b,
    /// Xunlong Orange Pi 3B (Rockchip RK3566).
    OrangePi3b,
    /// Hardkernel ODROID-HC4 (Amlogic S905X3).
    OdroidHc4,
}

impl Board {
    /// Stable board identifier; the asset is served as `<id>.dtb`.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Rock5b => "rk3588-rock-5b",
            Self::OrangePi3b => "rk3566-orangepi-3b",
            Self::OdroidHc4 => "meson-sm1-odroid-hc4",
        }
    }

    #[must_use]
    pub const fn model(self) -> &'static str {
        match self {
            Self::Rock5b => "Radxa ROCK 5B",
            Self::OrangePi3b => "Xunlong Orange Pi 3B",
            Self::OdroidHc4 => "Hardkernel ODROID-HC4",
        }
    }
}

/// What an asset is, independent of its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// Legacy BIOS PXE loader using the UNDI driver of the option ROM.
    BiosLoader(Arch),
    /// UEFI application loader.
    UefiLoader(Arch),
    /// Bootable ISO image.
    Iso,
    /// Flattened device tree for one board.
    DeviceTree(Board),
}

impl AssetKind {
    /// Whether the asset is built with the embedded startup script.
    #[must_use]
    pub const fn is_scripted(self) -> bool {
        !matches!(self, Self::DeviceTree(_))
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BiosLoader(arch) => write!(f, "BIOS loader ({arch})"),
            Self::UefiLoader(arch) => write!(f, "UEFI loader ({arch})"),
            Self::Iso => f.write_str("ISO image"),
            Self::DeviceTree(board) => write!(f, "device tree ({})", board.model()),
        }
    }
}

/// An immutable, named firmware image.
#[derive(Debug)]
pub struct Asset {
    name: &'static str,
    kind: AssetKind,
    content: &'static [u8],
}

impl Asset {
    const fn new(name: &'static str, kind: AssetKind, content: &'static [u8]) -> Self {
        Self {
            name,
            kind,
            content,
        }
    }

    /// Canonical name clients request the asset by.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn kind(&self) -> AssetKind {
        self.kind
    }

    #[must_use]
    pub const fn content(&self) -> &'static [u8] {
        self.content
    }

    /// Offset of the startup script marker, if this image carries one.
    #[must_use]
    pub fn marker_offset(&self) -> Option<usize> {
        patch::marker_offset(self.content)
    }

    /// Content with the marker replaced by `payload`.
    ///
    /// # Errors
    /// Returns [`PatchError::PatchTooLong`] if the payload does not fit the marker.
    pub fn patched(&self, payload: &[u8]) -> Result<Cow<'static, [u8]>, PatchError> {
        patch::patch(self.content, payload)
    }
}

/// No asset is registered under the requested name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no firmware asset named {0:?}")]
pub struct UnknownAsset(pub String);

/// All registered assets in a fixed order.
pub static ASSETS: [Asset; 7] = [
    Asset::new(
        "undionly.kpxe",
        AssetKind::BiosLoader(Arch::X86_64),
        embed!("undionly.kpxe"),
    ),
    Asset::new(
        "ipxe.efi",
        AssetKind::UefiLoader(Arch::X86_64),
        embed!("ipxe.efi"),
    ),
    Asset::new(
        "snp.efi",
        AssetKind::UefiLoader(Arch::Arm64),
        embed!("snp.efi"),
    ),
    Asset::new("ipxe.iso", AssetKind::Iso, embed!("ipxe.iso")),
    Asset::new(
        "rk3588-rock-5b.dtb",
        AssetKind::DeviceTree(Board::Rock5b),
        embed!("rk3588-rock-5b.dtb"),
    ),
    Asset::new(
        "rk3566-orangepi-3b.dtb",
        AssetKind::DeviceTree(Board::OrangePi3b),
        embed!("rk3566-orangepi-3b.dtb"),
    ),
    Asset::new(
        "meson-sm1-odroid-hc4.dtb",
        AssetKind::DeviceTree(Board::OdroidHc4),
        embed!("meson-sm1-odroid-hc4.dtb"),
    ),
];

#[must_use]
pub fn all() -> &'static [Asset] {
    &ASSETS
}

/// Look up the full descriptor for `name`.
#[must_use]
pub fn find(name: &str) -> Option<&'static Asset> {
    ASSETS.iter().find(|asset| asset.name == name)
}

/// Content registered under `name`.
///
/// # Errors
/// Returns [`UnknownAsset`] if no asset has that name.
pub fn get(name: &str) -> Result<&'static [u8], UnknownAsset> {
    find(name)
        .map(Asset::content)
        .ok_or_else(|| UnknownAsset(name.into()))
}

/// Names of all registered assets.
pub fn names() -> impl ExactSizeIterator<Item = &'static str> + Clone {
    ASSETS.iter().map(Asset::name)
}
