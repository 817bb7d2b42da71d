//! The outer state machine: drives reads, dispatches on markers, and
//! sequences JFIF -> Frame -> (Tables -> Scan -> Entropy)* -> EOI.
use std::fs;
use std::io::{Cursor, Read};

use crate::bitstream::Bitstream;
use crate::byte_source::ByteSource;
use crate::context::Context;
use crate::entropy::read_entropy_segment;
use crate::errors::DecodeErrors;
use crate::headers::{
    parse_dnl, parse_frame_header, parse_jfif, parse_scan_header, FrameEncoding, FrameHeader,
    JfifSegment, ScanHeader,
};
use crate::marker::Marker;
use crate::misc::DecoderOptions;
use crate::spectra::{decode_scan_baseline, decode_scan_progressive, ProgressiveState, Spectra};

/// One decoded scan: the header that described it and the coefficients it
/// produced. A progressive frame yields several of these (DC scan, one or
/// more AC scans, any refinement passes); a baseline/extended frame
/// yields exactly one.
pub struct DecodedScan {
    pub header: ScanHeader,
    pub spectra: Spectra,
}

/// Everything a caller gets back from a successful decode of the segment
/// layer: the JFIF density info, the final frame header (height possibly
/// retrofitted by a `DNL` segment), and every scan's coefficients.
pub struct DecodeOutput {
    pub jfif: JfifSegment,
    pub frame: FrameHeader,
    pub scans: Vec<DecodedScan>,
}

/// Drives a JPEG byte stream from `SOI` to `EOI`.
pub struct Decoder {
    options: DecoderOptions,
}

impl Default for Decoder {
    fn default() -> Self {
        Decoder::new()
    }
}

impl Decoder {
    /// Create a decoder with default options.
    #[must_use]
    pub fn new() -> Decoder {
        Decoder {
            options: DecoderOptions::default(),
        }
    }

    /// Create a decoder with explicit options.
    #[must_use]
    pub fn with_options(options: DecoderOptions) -> Decoder {
        Decoder { options }
    }

    /// Decode an in-memory buffer.
    pub fn decode_buffer(&mut self, buf: &[u8]) -> Result<DecodeOutput, DecodeErrors> {
        self.decode_reader(Cursor::new(buf))
    }

    /// Read a file from disk and decode it.
    pub fn decode_file(&mut self, path: &str) -> Result<DecodeOutput, DecodeErrors> {
        let bytes = fs::read(path).map_err(|e| DecodeErrors::FileError(e.to_string()))?;
        self.decode_buffer(&bytes)
    }

    /// Decode any stream implementing [`Read`].
    pub fn decode_reader<R: Read>(&mut self, reader: R) -> Result<DecodeOutput, DecodeErrors> {
        let mut source = ByteSource::new(reader);
        let mut ctx = Context::new();

        let soi = source.read_next_marker()?;
        if Marker::from_u8(soi) != Some(Marker::SOI) {
            return Err(DecodeErrors::FiletypeError);
        }
        debug!("Start of Image marker found");

        let next = source.read_next_marker()?;
        let jfif = match Marker::from_u8(next) {
            Some(Marker::APP(0)) => {
                let payload = source.read_marker_payload()?;
                parse_jfif(&payload)?
            }
            _ => return Err(DecodeErrors::MissingJFIFHeader),
        };
        debug!(
            "JFIF header: version {}.{:02}, density {}x{}",
            jfif.version_major, jfif.version_minor, jfif.density_x, jfif.density_y
        );

        let mut marker = {
            let byte = source.read_next_marker()?;
            Marker::from_u8(byte).ok_or(DecodeErrors::Structural)?
        };
        ctx.update(&mut source, &mut marker, &self.options)?;

        let frame = match marker {
            Marker::SOF(n) => {
                if !marker.is_supported_sof() {
                    warn!("Capabilities for processing marker {:?} not implemented", marker);
                    return Err(DecodeErrors::Unsupported(format!(
                        "SOF variant {} (arithmetic coding / hierarchical / lossless modes) is not supported",
                        n
                    )));
                }
                let encoding =
                    FrameEncoding::from_sof_number(n).expect("checked by is_supported_sof");
                let payload = source.read_marker_payload()?;
                parse_frame_header(encoding, &payload)?
            }
            _ => return Err(DecodeErrors::MissingFrameHeader),
        };
        info!(
            "Frame header: {:?}, {}x{}, {} components",
            frame.encoding,
            frame.width,
            frame.height,
            frame.components.len()
        );
        let mut frame = frame;
        if frame.pixel_count() > self.options.max_dimensions {
            return Err(DecodeErrors::Unsupported(format!(
                "frame declares {} pixels, exceeding the configured ceiling of {}",
                frame.pixel_count(),
                self.options.max_dimensions
            )));
        }

        let mut dc_pred = vec![0i16; frame.components.len()];
        let mut scans = Vec::new();
        let mut first_scan = true;
        // Progressive coefficient stores persist across scans so refinement
        // passes accumulate onto the coefficients a first pass wrote: one
        // shared store for the (interleaved) DC scans, one per frame
        // component for the (non-interleaved) AC scans.
        let mut dc_spectra: Option<Spectra> = None;
        let mut ac_spectra: Vec<Option<Spectra>> = vec![None; frame.components.len()];

        marker = {
            let byte = source.read_next_marker()?;
            Marker::from_u8(byte).ok_or(DecodeErrors::Structural)?
        };

        while marker != Marker::EOI {
            ctx.update(&mut source, &mut marker, &self.options)?;

            if marker == Marker::DNL {
                let payload = source.read_marker_payload()?;
                let height = parse_dnl(&payload)?;
                frame.update_height(height);
                debug!("DNL segment retrofit frame height to {}", height);
                marker = {
                    let byte = source.read_next_marker()?;
                    Marker::from_u8(byte).ok_or(DecodeErrors::Structural)?
                };
                continue;
            }

            if marker != Marker::SOS {
                return Err(DecodeErrors::MissingScanHeader);
            }
            let payload = source.read_marker_payload()?;
            let (scan_header, ah) = parse_scan_header(&payload)?;
            debug!(
                "Scan header: {} components, band {:?}, Ah={} Al={}",
                scan_header.components.len(),
                scan_header.band,
                ah,
                scan_header.exponent
            );

            let (bytes, terminator) = read_entropy_segment(&mut source)?;
            let mut bitstream = Bitstream::new(&bytes);

            // The EOB run carried by `ProgressiveState` is scoped to a single
            // scan (ITU-T T.81 resets it at each scan's start), so each scan
            // gets its own, but the coefficient store itself is looked up
            // from the persistent per-frame slots above.
            let mut prog_state = ProgressiveState::default();
            let spectra = if frame.encoding == FrameEncoding::Progressive {
                let is_dc = scan_header.band.start == 0;
                let spectra = if is_dc {
                    if dc_spectra.is_none() {
                        let blocks_per_group = if scan_header.components.len() > 1 {
                            frame
                                .components
                                .iter()
                                .map(|c| usize::from(c.sampling_x) * usize::from(c.sampling_y))
                                .sum()
                        } else {
                            1
                        };
                        dc_spectra = Some(Spectra::new(blocks_per_group));
                    }
                    dc_spectra.as_mut().expect("just initialized above")
                } else {
                    let comp_id = scan_header.components[0].component_id;
                    let idx = frame
                        .components
                        .iter()
                        .position(|c| c.id == comp_id)
                        .ok_or_else(|| {
                            DecodeErrors::InvalidScanHeader(format!(
                                "scan references component id {} not present in the frame header",
                                comp_id
                            ))
                        })?;
                    if ac_spectra[idx].is_none() {
                        ac_spectra[idx] = Some(Spectra::new(1));
                    }
                    ac_spectra[idx].as_mut().expect("just initialized above")
                };
                decode_scan_progressive(
                    &mut bitstream,
                    &ctx,
                    &frame,
                    &scan_header,
                    ah,
                    &mut dc_pred,
                    &mut prog_state,
                    spectra,
                )?;
                spectra.clone()
            } else {
                decode_scan_baseline(&mut bitstream, &ctx, &frame, &scan_header, &mut dc_pred)?
            };
            scans.push(DecodedScan {
                header: scan_header,
                spectra,
            });

            let mut terminator_marker =
                Marker::from_u8(terminator).ok_or(DecodeErrors::Structural)?;
            if ctx.restart_interval > 0 && matches!(terminator_marker, Marker::RST(_)) {
                warn!("Restart marker resynchronization is not implemented");
                return Err(DecodeErrors::Unimplemented(
                    "restart interval resynchronization".to_string(),
                ));
            }
            if first_scan && terminator_marker == Marker::DNL {
                let payload = source.read_marker_payload()?;
                let height = parse_dnl(&payload)?;
                frame.update_height(height);
                debug!("DNL segment retrofit frame height to {}", height);
                terminator_marker = {
                    let byte = source.read_next_marker()?;
                    Marker::from_u8(byte).ok_or(DecodeErrors::Structural)?
                };
            }
            first_scan = false;
            marker = terminator_marker;
        }
        debug!("End of Image marker found");

        Ok(DecodeOutput { jfif, frame, scans })
    }
}
