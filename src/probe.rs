use crate::Decoder;

/// Probe a buffer and report whether it decodes as a JPEG this crate
/// understands.
#[must_use]
pub fn probe(buffer: &[u8]) -> bool {
    Decoder::new().decode_buffer(buffer).is_ok()
}
