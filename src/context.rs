//! Holds the currently-installed quantization and Huffman tables plus the
//! restart interval, and ingests the ancillary segments that set them.
use std::io::Read;

use crate::byte_source::ByteSource;
use crate::errors::DecodeErrors;
use crate::huffman::HuffmanTable;
use crate::marker::Marker;
use crate::misc::DecoderOptions;
use crate::quant::QuantizationTable;

/// Four selector-addressed slots each of quantization, DC-Huffman and
/// AC-Huffman tables, plus the restart interval.
///
/// Created once per decode; mutated by `DQT`/`DHT`/`DRI` segments; consumed
/// by scans. A new table replacing a slot's previous occupant simply drops
/// it — ownership never crosses into the scan decoder.
#[derive(Default)]
pub struct Context {
    pub quant_tables: [Option<QuantizationTable>; 4],
    pub dc_tables: [Option<HuffmanTable>; 4],
    pub ac_tables: [Option<HuffmanTable>; 4],
    pub restart_interval: u16,
}

impl Context {
    pub fn new() -> Context {
        Context::default()
    }

    /// Consume ancillary segments (`DQT`, `DHT`, `DRI`, `DAC`, `APPn`,
    /// `COM`) starting at `*marker`, advancing past each one. Stops and
    /// leaves `*marker` pointing at the first marker that is none of
    /// those, for the caller to dispatch.
    pub fn update<R: Read>(
        &mut self,
        source: &mut ByteSource<R>,
        marker: &mut Marker,
        options: &DecoderOptions,
    ) -> Result<(), DecodeErrors> {
        loop {
            match *marker {
                Marker::DQT => {
                    let payload = source.read_marker_payload()?;
                    for (slot, table) in QuantizationTable::parse_dqt(&payload)? {
                        debug!("Loading quantization table at slot {}", slot);
                        self.quant_tables[usize::from(slot)] = Some(table);
                    }
                }
                Marker::DHT => {
                    let payload = source.read_marker_payload()?;
                    self.load_huffman_tables(&payload)?;
                }
                Marker::DRI => {
                    let payload = source.read_marker_payload()?;
                    if payload.len() != 2 {
                        return Err(DecodeErrors::Syntax(
                            "DRI payload must be exactly 2 bytes".to_string(),
                        ));
                    }
                    self.restart_interval = u16::from_be_bytes([payload[0], payload[1]]);
                    debug!("Restart interval set to {}", self.restart_interval);
                }
                Marker::DAC => {
                    warn!("Arithmetic coding conditioning (DAC) is not supported");
                    return Err(DecodeErrors::Unsupported(
                        "arithmetic coding is not supported".to_string(),
                    ));
                }
                Marker::APP(_) | Marker::COM => {
                    let payload = source.read_marker_payload()?;
                    if options.log_informational_markers {
                        debug!(
                            "Skipping {:?} segment ({} bytes)",
                            *marker,
                            payload.len()
                        );
                    }
                }
                _ => return Ok(()),
            }
            let next = source.read_next_marker()?;
            *marker = Marker::from_u8(next).ok_or(DecodeErrors::Structural)?;
        }
    }

    /// A `DHT` payload may pack multiple sub-tables back to back.
    fn load_huffman_tables(&mut self, payload: &[u8]) -> Result<(), DecodeErrors> {
        let mut pos = 0usize;
        while pos < payload.len() {
            let flags = payload[pos];
            pos += 1;
            let class = flags >> 4;
            let slot = flags & 0x0F;
            if slot > 3 {
                return Err(DecodeErrors::InvalidHuffmanTable(format!(
                    "Huffman table destination {} is out of range 0..3",
                    slot
                )));
            }
            if pos + 16 > payload.len() {
                return Err(DecodeErrors::InvalidHuffmanTable(
                    "DHT payload ran short of the 16 leaf-count bytes".to_string(),
                ));
            }
            let mut leaf_counts = [0u8; 16];
            leaf_counts.copy_from_slice(&payload[pos..pos + 16]);
            pos += 16;

            let total: usize = leaf_counts.iter().map(|&c| c as usize).sum();
            if pos + total > payload.len() {
                return Err(DecodeErrors::InvalidHuffmanTable(
                    "DHT payload ran short of its leaf values".to_string(),
                ));
            }
            let values = &payload[pos..pos + total];
            let table = HuffmanTable::new(leaf_counts, values)?;
            pos += total;

            match class {
                0 => {
                    debug!("Loading DC Huffman table at slot {}", slot);
                    self.dc_tables[usize::from(slot)] = Some(table);
                }
                1 => {
                    debug!("Loading AC Huffman table at slot {}", slot);
                    self.ac_tables[usize::from(slot)] = Some(table);
                }
                other => {
                    return Err(DecodeErrors::InvalidHuffmanTable(format!(
                        "Huffman table class nibble {} is not 0 (DC) or 1 (AC)",
                        other
                    )))
                }
            }
        }
        Ok(())
    }
}

/// `true` if `marker` is a restart marker (`RST0..RST7`).
#[must_use]
pub fn is_restart(marker: Marker) -> bool {
    matches!(marker, Marker::RST(_))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn a_second_dqt_replaces_the_first_in_the_same_slot() {
        let mut ctx = Context::new();

        let mut first = vec![0x00u8]; // precision=8-bit, slot=0
        first.extend(1u8..=64);
        let mut second = vec![0x00u8];
        second.extend((1u8..=64).map(|v| v.wrapping_mul(2)));

        for payload in [&first, &second] {
            let mut bytes = Vec::new();
            bytes.push(0xFFu8);
            bytes.push(0xDB); // DQT
            bytes.extend(((payload.len() + 2) as u16).to_be_bytes());
            bytes.extend(payload);
            bytes.push(0xFF);
            bytes.push(0xDA); // stand-in terminating marker (SOS)

            let mut source = ByteSource::new(Cursor::new(bytes));
            let byte = source.read_next_marker().unwrap();
            let mut marker = Marker::from_u8(byte).unwrap();
            ctx.update(&mut source, &mut marker, &DecoderOptions::default())
                .unwrap();
            assert_eq!(marker, Marker::SOS);
        }

        match ctx.quant_tables[0].as_ref().unwrap() {
            QuantizationTable::Bits8(values) => assert_eq!(values[0], 2),
            QuantizationTable::Bits16(_) => panic!("expected an 8-bit table"),
        }
    }

    #[test]
    fn dac_segment_is_rejected() {
        let bytes = [0xFFu8, 0xCC, 0x00, 0x03, 0x00];
        let mut source = ByteSource::new(Cursor::new(bytes));
        let byte = source.read_next_marker().unwrap();
        let mut marker = Marker::from_u8(byte).unwrap();
        let mut ctx = Context::new();
        assert!(ctx
            .update(&mut source, &mut marker, &DecoderOptions::default())
            .is_err());
    }
}
