#![allow(dead_code)]
//! Small shared constants and checked primitive-read helpers.
use std::io::Read;

use crate::errors::DecodeErrors;

/// Absolute ceiling on `width * height` a frame header may declare.
///
/// Rejecting absurd dimensions up front keeps a hostile `SOF` segment from
/// driving [`crate::spectra::Spectra`] into an unbounded allocation before a
/// single byte of entropy-coded data has been read.
pub const MAX_DIMENSIONS: usize = 1 << 27;

/// Options controlling the in-scope surface of the decoder.
///
/// Thread count and output colorspace, which the teacher crate also exposes,
/// are not meaningful here: there is no pixel pipeline in this core to
/// parallelize or convert, so they are dropped rather than carried as dead
/// configuration (see DESIGN.md).
#[derive(Debug, Copy, Clone)]
pub struct DecoderOptions {
    /// Reject any frame whose `width * height` exceeds this many pixels.
    pub max_dimensions: usize,
    /// Whether informational markers (APPn, COM) are logged at `debug!` as
    /// they are skipped, or skipped silently.
    pub log_informational_markers: bool,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        DecoderOptions {
            max_dimensions: MAX_DIMENSIONS,
            log_informational_markers: true,
        }
    }
}

/// Read a single byte from `reader`, failing with [`DecodeErrors::Stream`]
/// rather than panicking on a short read.
#[inline]
pub fn read_u8<R: Read>(reader: &mut R) -> Result<u8, DecodeErrors> {
    let mut tmp = [0u8; 1];
    reader.read_exact(&mut tmp).map_err(|_| DecodeErrors::Stream)?;
    Ok(tmp[0])
}

/// Read a big-endian `u16` from `reader`, failing with
/// [`DecodeErrors::Stream`] on a short read.
#[inline]
pub fn read_u16_be<R: Read>(reader: &mut R) -> Result<u16, DecodeErrors> {
    let mut tmp = [0u8; 2];
    reader.read_exact(&mut tmp).map_err(|_| DecodeErrors::Stream)?;
    Ok(u16::from_be_bytes(tmp))
}
