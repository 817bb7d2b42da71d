//! Big-endian primitive reads and marker scanning over an input byte stream.
use std::io::Read;

use crate::errors::DecodeErrors;
use crate::misc::{read_u16_be, read_u8};

/// Wraps any [`Read`] implementation and exposes the primitive operations
/// the marker-driven parser needs.
///
/// Mirrors the teacher's `BufReader<R>` / `Cursor<Vec<u8>>` read path: this
/// crate does not care whether the bytes come from a file, a network socket
/// or an in-memory buffer.
pub struct ByteSource<R> {
    reader: R,
}

impl<R: Read> ByteSource<R> {
    /// Wrap `reader`.
    pub fn new(reader: R) -> ByteSource<R> {
        ByteSource { reader }
    }

    /// Read a single byte, failing with [`DecodeErrors::Stream`] at EOF.
    #[inline]
    pub fn read_byte(&mut self) -> Result<u8, DecodeErrors> {
        read_u8(&mut self.reader)
    }

    /// Read a big-endian 16-bit integer, failing with
    /// [`DecodeErrors::Stream`] on a short read.
    #[inline]
    pub fn read_u16_be(&mut self) -> Result<u16, DecodeErrors> {
        read_u16_be(&mut self.reader)
    }

    /// Read a marker's length-prefixed payload: a big-endian `u16` length
    /// `L` followed by `L - 2` payload bytes.
    ///
    /// Every marker segment in a JPEG stream (other than `SOI`, `EOI` and
    /// restart markers, which carry no length) is shaped this way.
    pub fn read_marker_payload(&mut self) -> Result<Vec<u8>, DecodeErrors> {
        let len = self.read_u16_be()?;
        if len < 2 {
            return Err(DecodeErrors::Syntax(
                "marker segment length is smaller than the length field itself".to_string(),
            ));
        }
        let mut payload = vec![0u8; usize::from(len) - 2];
        self.reader
            .read_exact(&mut payload)
            .map_err(|_| DecodeErrors::Stream)?;
        Ok(payload)
    }

    /// Require the next byte to be `0xFF`, then return the first subsequent
    /// byte that is not `0xFF` (collapsing any run of fill bytes).
    pub fn read_next_marker(&mut self) -> Result<u8, DecodeErrors> {
        let prefix = self.read_byte()?;
        if prefix != 0xFF {
            return Err(DecodeErrors::Structural);
        }
        loop {
            let byte = self.read_byte()?;
            if byte != 0xFF {
                return Ok(byte);
            }
        }
    }

    /// Borrow the underlying reader; used by the entropy-coded-segment
    /// reader, which reads raw bytes directly rather than through the
    /// marker-oriented helpers above.
    pub fn inner_mut(&mut self) -> &mut R {
        &mut self.reader
    }
}
