//! # Embedded iPXE Firmware
//!
//! This crate carries the network boot firmware handed out to PXE clients and
//! the one transform applied to it on the way out: overwriting a placeholder
//! in the loaders' embedded startup script with a per-request script fragment.
//!
//! ## Overview
//!
//! The firmware images are compiled into the crate at build time and exposed
//! as `&'static [u8]`; nothing in here reads files, touches the environment or
//! talks to the network. A serving component (TFTP, HTTP) looks up an image by
//! name, patches it and forwards the result verbatim.
//!
//! ```text
//! binary/ or $IPXE_BIN_DIR
//!     ↓  build.rs
//! $OUT_DIR/<asset>
//!     ↓  include_bytes!
//! assets::ASSETS ──get(name)──→ &'static [u8]
//!     ↓
//! patch::patch(content, payload)
//!     ↓
//! Cow::Borrowed (no-op) | Cow::Owned (patched copy) | PatchError
//! ```
//!
//! ## Registry
//!
//! | Name                       | Kind                  |
//! |----------------------------|-----------------------|
//! | `undionly.kpxe`            | BIOS loader, x86-64   |
//! | `ipxe.efi`                 | UEFI loader, x86-64   |
//! | `snp.efi`                  | UEFI loader, AArch64  |
//! | `ipxe.iso`                 | bootable ISO image    |
//! | `rk3588-rock-5b.dtb`       | Radxa ROCK 5B         |
//! | `rk3566-orangepi-3b.dtb`   | Xunlong Orange Pi 3B  |
//! | `meson-sm1-odroid-hc4.dtb` | Hardkernel ODROID-HC4 |
//!
//! ## Marker Patching
//!
//! Every loader is built with [`EMBEDDED_SCRIPT`], which contains
//! [`MAGIC_STRING`] on two comment lines. [`patch()`] replaces the first
//! occurrence with the caller's payload and pads the rest of the region with
//! spaces, so the script stays printable text. The registry content itself is
//! never written to; a successful patch always returns a fresh buffer.
//!
//! ```rust
//! use ipxe_bin::{assets, patch};
//!
//! let efi = assets::get("ipxe.efi").expect("registered asset");
//! let patched = patch(efi, b"chain http://10.0.0.1/auto.ipxe").expect("payload fits");
//! assert_eq!(patched.len(), efi.len());
//! ```
//!
//! ## Building With Real Firmware
//!
//! Drop the prebuilt images into `binary/` (or point `IPXE_BIN_DIR` at a
//! directory holding them). The build fails if any image is missing. The
//! `stand-ins` feature, enabled by this workspace's tests only, replaces
//! missing images with generated placeholders and reports each one as a
//! build warning; never enable it for a crate that serves firmware.

#![cfg_attr(not(any(test, doctest)), no_std)]

extern crate alloc;

pub mod assets;
mod magic;
pub mod patch;
#[cfg(test)]
mod staging;

pub use assets::{Arch, Asset, AssetKind, Board, UnknownAsset};
pub use magic::MAGIC_STRING;
pub use patch::{PatchError, marker_offset, patch};

/// The iPXE script embedded into every loader at firmware build time.
pub const EMBEDDED_SCRIPT: &[u8] = include_bytes!("../script/embed.ipxe");
