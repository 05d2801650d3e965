//! # Startup Script Marker Patching

use alloc::borrow::Cow;
use log::{debug, trace};

use crate::MAGIC_STRING;

/// Fill byte for the part of the marker region the payload does not cover.
pub const PADDING: u8 = b' ';

/// Longest payload that fits into the marker region.
pub const MAX_PATCH_LEN: usize = MAGIC_STRING.len();

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatchError {
    #[error("patch is {len} bytes long, the marker only holds {max}")]
    PatchTooLong { len: usize, max: usize },
}

/// Offset of the first occurrence of [`MAGIC_STRING`] in `content`.
#[must_use]
pub fn marker_offset(content: &[u8]) -> Option<usize> {
    memchr::memmem::find(content, MAGIC_STRING)
}

/// Replace the marker in `content` with `payload`.
///
/// Returns `content` itself when `payload` is empty or `content` has no
/// marker. Otherwise returns a copy in which the first marker occurrence is
/// overwritten by `payload` followed by [`PADDING`] up to the marker length.
/// `content` is never modified.
///
/// # Errors
/// Returns [`PatchError::PatchTooLong`] when `content` has a marker and
/// `payload` is longer than [`MAX_PATCH_LEN`].
pub fn patch<'a>(content: &'a [u8], payload: &[u8]) -> Result<Cow<'a, [u8]>, PatchError> {
    if payload.is_empty() {
        return Ok(Cow::Borrowed(content));
    }

    let Some(offset) = marker_offset(content) else {
        debug!("no marker in {} byte content, passing through", content.len());
        return Ok(Cow::Borrowed(content));
    };

    if payload.len() > MAX_PATCH_LEN {
        return Err(PatchError::PatchTooLong {
            len: payload.len(),
            max: MAX_PATCH_LEN,
        });
    }

    // The source is shared with every other request; write into a copy.
    let mut patched = content.to_vec();
    let region = &mut patched[offset..offset + MAX_PATCH_LEN];
    region.fill(PADDING);
    region[..payload.len()].copy_from_slice(payload);

    trace!(
        "patched {} byte payload into marker at offset {offset:#x}",
        payload.len()
    );
    Ok(Cow::Owned(patched))
}
