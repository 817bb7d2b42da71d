//! Produces the de-stuffed byte payload of one entropy-coded segment and
//! reports the marker that terminated it.
use std::io::Read;

use crate::byte_source::ByteSource;
use crate::errors::DecodeErrors;

/// Read one entropy-coded segment: raw bytes up to (but not including) the
/// next real marker, with `0xFF 0x00` byte-stuffing undone.
///
/// Returns the de-stuffed payload and the marker byte that terminated the
/// segment. That byte is consumed from the stream here (the marker
/// introducer and any run of `0xFF` fill bytes preceding it are consumed
/// too) but is handed back uninterpreted, so the caller dispatches on it
/// exactly as if it had just called `read_next_marker`.
pub fn read_entropy_segment<R: Read>(
    source: &mut ByteSource<R>,
) -> Result<(Vec<u8>, u8), DecodeErrors> {
    let mut payload = Vec::new();
    loop {
        let byte = source.read_byte()?;
        if byte != 0xFF {
            payload.push(byte);
            continue;
        }
        let mut next = source.read_byte()?;
        if next == 0x00 {
            payload.push(0xFF);
            continue;
        }
        // marker fill: a run of extra 0xFF bytes before the real marker byte.
        while next == 0xFF {
            next = source.read_byte()?;
        }
        return Ok((payload, next));
    }
}
