//! Common errors that may be encountered parsing a JPEG segment stream.
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// Common decode errors.
#[allow(clippy::module_name_repetitions)]
pub enum DecodeErrors {
    /// The external collaborator that opened the input could not do so.
    FileError(String),
    /// The first marker in the stream was not Start of Image.
    FiletypeError,
    /// Ran out of bytes mid-read.
    Stream,
    /// A marker prefix byte was not `0xFF` where one was required.
    Structural,
    /// No APP0 JFIF segment was found after Start of Image.
    MissingJFIFHeader,
    /// An APP0 JFIF segment was found but is malformed.
    InvalidJFIFHeader(String),
    /// No SOFn marker was seen before scan data.
    MissingFrameHeader,
    /// A frame header was present but malformed.
    InvalidFrameHeader(String),
    /// No scan header was seen where one was expected.
    MissingScanHeader,
    /// A scan header was present but malformed.
    InvalidScanHeader(String),
    /// A DQT segment failed to parse into a usable table.
    InvalidQuantizationTable(String),
    /// A DHT segment failed to build a valid canonical table.
    InvalidHuffmanTable(String),
    /// A DNL segment was malformed.
    InvalidDNLSegment,
    /// Catch-all payload integrity failure.
    Syntax(String),
    /// The input is well formed but uses a feature this crate does not implement.
    Unsupported(String),
    /// The input uses a feature this crate will eventually support.
    Unimplemented(String),
}

impl Debug for DecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self {
            Self::FileError(ref e) => write!(f, "Could not open file: {}", e),
            Self::FiletypeError => write!(
                f,
                "First marker is not Start of Image, is this a JPEG file?"
            ),
            Self::Stream => write!(f, "Unexpected end of stream while reading bytes"),
            Self::Structural => write!(
                f,
                "Expected a marker prefix byte (0xFF) but did not find one"
            ),
            Self::MissingJFIFHeader => write!(f, "No JFIF (APP0) header found after Start of Image"),
            Self::InvalidJFIFHeader(ref e) => write!(f, "Invalid JFIF header. Reason: {}", e),
            Self::MissingFrameHeader => {
                write!(f, "No Start of Frame header found before scan data")
            }
            Self::InvalidFrameHeader(ref e) => write!(f, "Invalid frame header. Reason: {}", e),
            Self::MissingScanHeader => write!(
                f,
                "No Start of Scan header found where one was expected"
            ),
            Self::InvalidScanHeader(ref e) => write!(f, "Invalid scan header. Reason: {}", e),
            Self::InvalidQuantizationTable(ref e) => {
                write!(f, "Invalid quantization table. Reason: {}", e)
            }
            Self::InvalidHuffmanTable(ref e) => {
                write!(f, "Invalid Huffman table. Reason: {}", e)
            }
            Self::InvalidDNLSegment => write!(f, "Invalid DNL segment"),
            Self::Syntax(ref e) => write!(f, "Syntax error: {}", e),
            Self::Unsupported(ref e) => write!(f, "Unsupported feature: {}", e),
            Self::Unimplemented(ref e) => write!(f, "Not yet implemented: {}", e),
        }
    }
}

impl Display for DecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self, f)
    }
}

impl Error for DecodeErrors {}
