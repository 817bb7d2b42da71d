//! Quantization tables (`DQT` segment payloads).
use crate::errors::DecodeErrors;

/// A single 64-element quantization table, in either 8-bit or 16-bit
/// precision as declared by the `DQT` segment that built it.
///
/// Stored in the natural (zig-zag scan) order the segment lists
/// coefficients in; un-zig-zagging happens downstream, at the (out of
/// scope) point coefficients are handed to the inverse DCT.
#[derive(Debug, Clone)]
pub enum QuantizationTable {
    /// Baseline 8-bit precision table.
    Bits8([u8; 64]),
    /// Extended 16-bit precision table.
    Bits16([u16; 64]),
}

impl QuantizationTable {
    /// Parse every table packed into a single `DQT` payload.
    ///
    /// Returns `(slot, table)` pairs in the order they appear; a payload
    /// that runs short mid-table is rejected.
    pub fn parse_dqt(payload: &[u8]) -> Result<Vec<(u8, QuantizationTable)>, DecodeErrors> {
        let mut tables = Vec::new();
        let mut pos = 0usize;

        while pos < payload.len() {
            let flags = payload[pos];
            pos += 1;
            let precision = flags >> 4;
            let slot = flags & 0x0F;
            if slot > 3 {
                return Err(DecodeErrors::InvalidQuantizationTable(format!(
                    "quantization table destination {} is out of range 0..3",
                    slot
                )));
            }

            let table = match precision {
                0 => {
                    if pos + 64 > payload.len() {
                        return Err(DecodeErrors::InvalidQuantizationTable(
                            "DQT payload ran short of a full 8-bit table".to_string(),
                        ));
                    }
                    let mut values = [0u8; 64];
                    values.copy_from_slice(&payload[pos..pos + 64]);
                    pos += 64;
                    QuantizationTable::Bits8(values)
                }
                1 => {
                    if pos + 128 > payload.len() {
                        return Err(DecodeErrors::InvalidQuantizationTable(
                            "DQT payload ran short of a full 16-bit table".to_string(),
                        ));
                    }
                    let mut values = [0u16; 64];
                    for (i, chunk) in payload[pos..pos + 128].chunks_exact(2).enumerate() {
                        values[i] = u16::from_be_bytes([chunk[0], chunk[1]]);
                    }
                    pos += 128;
                    QuantizationTable::Bits16(values)
                }
                other => {
                    return Err(DecodeErrors::InvalidQuantizationTable(format!(
                        "quantization table precision nibble {:#x} is not 0 or 1",
                        other
                    )))
                }
            };
            tables.push((slot, table));
        }
        Ok(tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_8_bit_table() {
        let mut payload = vec![0x00u8];
        payload.extend(1u8..=64);
        let tables = QuantizationTable::parse_dqt(&payload).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].0, 0);
        match &tables[0].1 {
            QuantizationTable::Bits8(values) => assert_eq!(values[0], 1),
            QuantizationTable::Bits16(_) => panic!("expected 8-bit table"),
        }
    }

    #[test]
    fn parses_16_bit_table_with_endian_swap() {
        let mut payload = vec![0x11u8];
        for i in 0u16..64 {
            payload.extend_from_slice(&(i * 4).to_be_bytes());
        }
        let tables = QuantizationTable::parse_dqt(&payload).unwrap();
        assert_eq!(tables[0].0, 1);
        match &tables[0].1 {
            QuantizationTable::Bits16(values) => {
                assert_eq!(values[1], 4);
                assert_eq!(values[63], 252);
            }
            QuantizationTable::Bits8(_) => panic!("expected 16-bit table"),
        }
    }

    #[test]
    fn rejects_short_payload() {
        let payload = vec![0x00u8, 1, 2, 3];
        assert!(QuantizationTable::parse_dqt(&payload).is_err());
    }

    #[test]
    fn rejects_bad_slot() {
        let mut payload = vec![0x04u8];
        payload.extend([0u8; 64]);
        assert!(QuantizationTable::parse_dqt(&payload).is_err());
    }
}
