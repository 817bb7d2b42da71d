//! Parsers for the metadata and layout segments: JFIF (`APP0`), frame
//! headers (`SOFn`) and scan headers (`SOS`).
//!
//! A good guide on markers can be found
//! [here](http://vip.sugovica.hu/Sardi/kepnezo/JPEG%20File%20Layout%20and%20Format.htm).
use std::ops::Range;

use crate::errors::DecodeErrors;

/// The subset of `SOFn` encodings this crate can decode.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameEncoding {
    /// SOF0.
    Baseline,
    /// SOF1.
    Extended,
    /// SOF2.
    Progressive,
}

impl FrameEncoding {
    /// Map an SOF number (`marker byte - 0xC0`) to the encoding it names,
    /// or `None` if this crate does not support it.
    #[must_use]
    pub fn from_sof_number(n: u8) -> Option<FrameEncoding> {
        match n {
            0 => Some(FrameEncoding::Baseline),
            1 => Some(FrameEncoding::Extended),
            2 => Some(FrameEncoding::Progressive),
            _ => None,
        }
    }
}

/// The JFIF (`APP0`) application segment.
#[derive(Debug, Copy, Clone)]
pub struct JfifSegment {
    pub version_major: u8,
    pub version_minor: u8,
    pub density_unit: u8,
    pub density_x: u16,
    pub density_y: u16,
}

/// Parse an `APP0` payload as a JFIF segment.
///
/// Expects the literal identifier `b"JFIF\0"`, a one-byte major/minor
/// version pair, a density unit, and big-endian X/Y density. Thumbnail
/// bytes that may follow are ignored.
pub fn parse_jfif(payload: &[u8]) -> Result<JfifSegment, DecodeErrors> {
    if payload.len() < 14 {
        return Err(DecodeErrors::InvalidJFIFHeader(
            "APP0 payload is too short to hold a JFIF header".to_string(),
        ));
    }
    if &payload[0..5] != b"JFIF\0" {
        return Err(DecodeErrors::InvalidJFIFHeader(
            "APP0 payload does not begin with the JFIF identifier".to_string(),
        ));
    }
    let version_major = payload[5];
    let version_minor = payload[6];
    if version_major != 1 || version_minor > 2 {
        return Err(DecodeErrors::InvalidJFIFHeader(format!(
            "unsupported JFIF version {}.{:02}",
            version_major, version_minor
        )));
    }
    let density_unit = payload[7];
    if density_unit > 2 {
        return Err(DecodeErrors::InvalidJFIFHeader(format!(
            "density unit {} is not one of 0, 1, 2",
            density_unit
        )));
    }
    let density_x = u16::from_be_bytes([payload[8], payload[9]]);
    let density_y = u16::from_be_bytes([payload[10], payload[11]]);

    Ok(JfifSegment {
        version_major,
        version_minor,
        density_unit,
        density_x,
        density_y,
    })
}

/// One component as declared by a frame header.
#[derive(Debug, Copy, Clone)]
pub struct FrameComponent {
    pub id: u8,
    pub sampling_x: u8,
    pub sampling_y: u8,
    pub quant_table_idx: u8,
}

/// A parsed `SOFn` segment. `height` is the only field ever mutated after
/// construction, by a later `DNL` segment.
#[derive(Debug, Clone)]
pub struct FrameHeader {
    pub encoding: FrameEncoding,
    pub precision: u8,
    pub width: u16,
    pub height: u16,
    pub components: Vec<FrameComponent>,
}

impl FrameHeader {
    /// Overwrite `height` from a `DNL` segment's value.
    pub fn update_height(&mut self, height: u16) {
        self.height = height;
    }

    /// `width * height`, for dimension-ceiling checks.
    #[must_use]
    pub fn pixel_count(&self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }
}

/// Parse an `SOFn` payload given the encoding its marker named.
pub fn parse_frame_header(
    encoding: FrameEncoding,
    payload: &[u8],
) -> Result<FrameHeader, DecodeErrors> {
    if payload.len() < 6 {
        return Err(DecodeErrors::InvalidFrameHeader(
            "frame header payload is shorter than the fixed 6-byte prefix".to_string(),
        ));
    }
    let precision = payload[0];
    let expected_precisions: &[u8] = match encoding {
        FrameEncoding::Baseline => &[8],
        FrameEncoding::Extended | FrameEncoding::Progressive => &[8, 12],
    };
    if !expected_precisions.contains(&precision) {
        return Err(DecodeErrors::InvalidFrameHeader(format!(
            "precision {} is not valid for {:?}",
            precision, encoding
        )));
    }
    let height = u16::from_be_bytes([payload[1], payload[2]]);
    let width = u16::from_be_bytes([payload[3], payload[4]]);
    let num_components = payload[5] as usize;

    let max_components = if encoding == FrameEncoding::Progressive {
        4
    } else {
        255
    };
    if num_components == 0 || num_components > max_components {
        return Err(DecodeErrors::InvalidFrameHeader(format!(
            "component count {} is out of range 1..={}",
            num_components, max_components
        )));
    }

    let expected_len = 6 + 3 * num_components;
    if payload.len() != expected_len {
        return Err(DecodeErrors::InvalidFrameHeader(format!(
            "frame header payload length {} does not match 6 + 3*{} components",
            payload.len(),
            num_components
        )));
    }

    let mut components = Vec::with_capacity(num_components);
    for chunk in payload[6..].chunks_exact(3) {
        let id = chunk[0];
        let sampling_x = chunk[1] >> 4;
        let sampling_y = chunk[1] & 0x0F;
        let quant_table_idx = chunk[2];
        if !(1..=4).contains(&sampling_x) || !(1..=4).contains(&sampling_y) {
            return Err(DecodeErrors::InvalidFrameHeader(format!(
                "component {} has sampling factors out of range 1..=4",
                id
            )));
        }
        if quant_table_idx > 3 {
            return Err(DecodeErrors::InvalidFrameHeader(format!(
                "component {} references quantization table {} out of range 0..=3",
                id, quant_table_idx
            )));
        }
        if components.iter().any(|c: &FrameComponent| c.id == id) {
            return Err(DecodeErrors::InvalidFrameHeader(format!(
                "duplicate component id {}",
                id
            )));
        }
        components.push(FrameComponent {
            id,
            sampling_x,
            sampling_y,
            quant_table_idx,
        });
    }

    Ok(FrameHeader {
        encoding,
        precision,
        width,
        height,
        components,
    })
}

/// Parse a `DNL` payload: exactly two bytes, the true frame height.
pub fn parse_dnl(payload: &[u8]) -> Result<u16, DecodeErrors> {
    if payload.len() != 2 {
        return Err(DecodeErrors::InvalidDNLSegment);
    }
    Ok(u16::from_be_bytes([payload[0], payload[1]]))
}

/// One component's table selectors as named by a scan header.
#[derive(Debug, Copy, Clone)]
pub struct ScanComponent {
    pub component_id: u8,
    pub dc_table_idx: u8,
    pub ac_table_idx: u8,
}

/// A parsed `SOS` payload.
#[derive(Debug, Clone)]
pub struct ScanHeader {
    pub components: Vec<ScanComponent>,
    /// Half-open spectral band `[Ss, Se + 1)`.
    pub band: Range<usize>,
    /// `Al`, the successive-approximation low bit position.
    pub exponent: u8,
}

/// Parse an `SOS` payload.
///
/// Returns the [`ScanHeader`] alongside `Ah`, which is validated here but,
/// per the data model, not retained on the struct itself — a progressive
/// decoder needs it only to pick first-scan vs. refinement-scan behavior
/// for the band this header names, not as persistent state.
pub fn parse_scan_header(payload: &[u8]) -> Result<(ScanHeader, u8), DecodeErrors> {
    if payload.is_empty() {
        return Err(DecodeErrors::InvalidScanHeader(
            "scan header payload is empty".to_string(),
        ));
    }
    let ns = payload[0] as usize;
    if !(1..=4).contains(&ns) {
        return Err(DecodeErrors::InvalidScanHeader(format!(
            "scan component count {} is out of range 1..=4",
            ns
        )));
    }
    let expected_len = 1 + 2 * ns + 3;
    if payload.len() != expected_len {
        return Err(DecodeErrors::InvalidScanHeader(format!(
            "scan header payload length {} does not match 1 + 2*{} + 3",
            payload.len(),
            ns
        )));
    }

    let mut components = Vec::with_capacity(ns);
    for chunk in payload[1..1 + 2 * ns].chunks_exact(2) {
        components.push(ScanComponent {
            component_id: chunk[0],
            dc_table_idx: chunk[1] >> 4,
            ac_table_idx: chunk[1] & 0x0F,
        });
    }

    let ss = payload[1 + 2 * ns] as usize;
    let se = payload[2 + 2 * ns] as usize;
    let ah_al = payload[3 + 2 * ns];
    let ah = ah_al >> 4;
    let al = ah_al & 0x0F;

    if ss > 63 || se > 63 || ss > se {
        return Err(DecodeErrors::InvalidScanHeader(format!(
            "spectral selection Ss={} Se={} is not a valid band over 0..64",
            ss, se
        )));
    }
    if ah > 13 || al > 13 {
        return Err(DecodeErrors::InvalidScanHeader(format!(
            "successive approximation Ah={} Al={} is out of range",
            ah, al
        )));
    }

    Ok((
        ScanHeader {
            components,
            band: ss..se + 1,
            exponent: al,
        },
        ah,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_jfif_segment() {
        let payload = [
            b'J', b'F', b'I', b'F', 0x00, 0x01, 0x01, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00,
        ];
        let jfif = parse_jfif(&payload).unwrap();
        assert_eq!(jfif.version_major, 1);
        assert_eq!(jfif.version_minor, 1);
        assert_eq!(jfif.density_unit, 0);
        assert_eq!(jfif.density_x, 1);
        assert_eq!(jfif.density_y, 1);
    }

    #[test]
    fn rejects_bad_jfif_identifier() {
        let mut payload = vec![b'x', b'x', b'x', b'x', 0x00];
        payload.extend([1, 1, 0, 0, 1, 0, 1, 0, 0]);
        assert!(parse_jfif(&payload).is_err());
    }

    #[test]
    fn parses_baseline_frame_header() {
        let payload = [8, 0, 10, 0, 20, 1, 1, 0x11, 0];
        let frame = parse_frame_header(FrameEncoding::Baseline, &payload).unwrap();
        assert_eq!(frame.width, 20);
        assert_eq!(frame.height, 10);
        assert_eq!(frame.components.len(), 1);
        assert_eq!(frame.components[0].sampling_x, 1);
        assert_eq!(frame.components[0].sampling_y, 1);
    }

    #[test]
    fn rejects_too_many_components_for_progressive() {
        let mut payload = vec![8u8, 0, 10, 0, 20, 5];
        for id in 1..=5u8 {
            payload.extend([id, 0x11, 0]);
        }
        assert!(parse_frame_header(FrameEncoding::Progressive, &payload).is_err());
    }

    #[test]
    fn parses_scan_header() {
        let payload = [1, 1, 0x00, 0, 63, 0x00];
        let (scan, ah) = parse_scan_header(&payload).unwrap();
        assert_eq!(scan.components.len(), 1);
        assert_eq!(scan.band, 0..64);
        assert_eq!(scan.exponent, 0);
        assert_eq!(ah, 0);
    }

    #[test]
    fn parses_dnl_segment() {
        assert_eq!(parse_dnl(&[0x01, 0x2C]).unwrap(), 300);
        assert!(parse_dnl(&[0x01]).is_err());
    }
}
