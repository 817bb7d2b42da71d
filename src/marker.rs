//! JPEG marker codes.
//!
//! Markers are always preceded by one or more `0xFF` fill bytes. This enum
//! is the decoded representation the rest of the crate dispatches on.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum Marker {
    /// Start of Image, `0xFFD8`.
    SOI,
    /// End of Image, `0xFFD9`.
    EOI,
    /// Start of Frame, carries the SOF number (0 = baseline, 1 = extended, 2 = progressive, ...).
    SOF(u8),
    /// Define Huffman Table, `0xFFC4`.
    DHT,
    /// Define Arithmetic Coding conditioning, `0xFFCC`.
    DAC,
    /// Define Quantization Table, `0xFFDB`.
    DQT,
    /// Define Restart Interval, `0xFFDD`.
    DRI,
    /// Define Number of Lines, `0xFFDC`.
    DNL,
    /// Start of Scan, `0xFFDA`.
    SOS,
    /// Restart marker, carries the restart number 0..7.
    RST(u8),
    /// Application segment, carries the APPn number 0..15.
    APP(u8),
    /// Comment segment, `0xFFFE`.
    COM,
    /// Any other marker byte not otherwise recognized.
    Unknown(u8),
}

impl Marker {
    /// Construct a [`Marker`] from the byte following a `0xFF` prefix.
    #[must_use]
    pub fn from_u8(byte: u8) -> Option<Marker> {
        match byte {
            0xD8 => Some(Marker::SOI),
            0xD9 => Some(Marker::EOI),
            0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF => {
                Some(Marker::SOF(byte - 0xC0))
            }
            0xC4 => Some(Marker::DHT),
            0xCC => Some(Marker::DAC),
            0xDB => Some(Marker::DQT),
            0xDD => Some(Marker::DRI),
            0xDC => Some(Marker::DNL),
            0xDA => Some(Marker::SOS),
            0xD0..=0xD7 => Some(Marker::RST(byte - 0xD0)),
            0xE0..=0xEF => Some(Marker::APP(byte - 0xE0)),
            0xFE => Some(Marker::COM),
            0x00 | 0xFF => None,
            _ => Some(Marker::Unknown(byte)),
        }
    }

    /// `true` if this SOF variant is one this crate can decode
    /// (baseline, extended sequential, or progressive Huffman DCT).
    #[must_use]
    pub fn is_supported_sof(self) -> bool {
        matches!(self, Marker::SOF(0) | Marker::SOF(1) | Marker::SOF(2))
    }
}
