//! Accumulates dequantized... no — *undequantized* spectral coefficients:
//! this module stops at the raw decoded coefficient, in scan (zig-zag)
//! order, and hands the store to the (out of scope) IDCT/dequantization
//! stage untouched, exactly as the teacher crate only applies `UN_ZIGZAG`
//! at the point coefficients reach `idct::dequantize_and_idct_int`, never
//! inside the entropy decoder itself.
use crate::bitstream::Bitstream;
use crate::context::Context;
use crate::errors::DecodeErrors;
use crate::headers::{FrameHeader, ScanHeader};

/// Decode a signed JPEG coefficient from a `count`-bit magnitude category
/// and the 16-bit bitstream window it was read from.
///
/// `window` is expected already aligned so its top `count` bits hold the
/// encoded magnitude (this is exactly what [`Bitstream::peek`] returns).
#[inline]
#[must_use]
pub fn amplitude(count: u8, window: u16) -> i16 {
    if count == 0 {
        return 0;
    }
    let extracted = window >> (16 - count);
    let sign_bit = 1u16 << (count - 1);
    if extracted & sign_bit != 0 {
        extracted as i16
    } else {
        // bias computed in u16 space: `1i16 << 15` overflows on count == 15,
        // a category that 12-bit-precision DC differences legitimately reach.
        extracted as i16 - (((1u16 << count) - 1) as i16)
    }
}

/// A per-frame, lazily-growing store of decoded spectral coefficients,
/// indexed `[group, block, k]`.
///
/// `group` is an MCU (or, in a non-interleaved scan, a lone block) index;
/// `block` indexes a block within the group; `k` is the coefficient
/// position 0..64. The backing buffer grows in `group` as decoding
/// proceeds rather than being sized up front, since the total MCU count
/// for a scan is a derived quantity the caller may not want to compute
/// before it starts decoding.
#[derive(Clone)]
pub struct Spectra {
    storage: Vec<i16>,
    /// Elements per group: `blocks_per_group * 64`.
    group_stride: usize,
    /// Elements per block: always 64.
    block_stride: usize,
}

impl Spectra {
    /// Create a store for a scan whose groups each hold `blocks_per_group`
    /// 8x8 blocks.
    #[must_use]
    pub fn new(blocks_per_group: usize) -> Spectra {
        Spectra {
            storage: Vec::new(),
            group_stride: blocks_per_group * 64,
            block_stride: 64,
        }
    }

    /// Grow the backing buffer, zero-initialized, so `group` is addressable.
    fn ensure_group(&mut self, group: usize) {
        let needed = (group + 1) * self.group_stride;
        if self.storage.len() < needed {
            self.storage.resize(needed, 0);
        }
    }

    /// Mutable access to the 64 coefficients of `block` within `group`,
    /// growing the store first if needed.
    pub fn block_mut(&mut self, group: usize, block: usize) -> &mut [i16] {
        self.ensure_group(group);
        let start = group * self.group_stride + block * self.block_stride;
        &mut self.storage[start..start + self.block_stride]
    }

    /// Read-only access to a block already decoded.
    #[must_use]
    pub fn block(&self, group: usize, block: usize) -> &[i16] {
        let start = group * self.group_stride + block * self.block_stride;
        &self.storage[start..start + self.block_stride]
    }

    /// Number of groups currently allocated.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.storage.len() / self.group_stride.max(1)
    }
}

/// One component's place in a scan: its index into `FrameHeader.components`
/// and how many blocks of it fall in each MCU (or, for a non-interleaved
/// scan, always `1x1`).
struct ScanComponentPlan {
    frame_component_idx: usize,
    blocks_x: usize,
    blocks_y: usize,
    dc_table_idx: u8,
    ac_table_idx: u8,
}

/// The geometry of one scan: which components participate, how many
/// blocks each contributes per group, and how many groups the scan covers.
struct ScanPlan {
    components: Vec<ScanComponentPlan>,
    blocks_per_group: usize,
    group_count: usize,
}

fn div_ceil(a: usize, b: usize) -> usize {
    (a + b - 1) / b
}

/// Work out the MCU/block geometry for `scan` against `frame`.
///
/// An interleaved scan (more than one component) groups blocks into MCUs
/// sized by the frame's maximum sampling factors; a non-interleaved scan
/// (exactly one component) iterates that component's own block grid one
/// block per group, per ITU-T T.81 Section A.2.
fn build_scan_plan(frame: &FrameHeader, scan: &ScanHeader) -> Result<ScanPlan, DecodeErrors> {
    let h_max = frame.components.iter().map(|c| c.sampling_x).max().unwrap_or(1) as usize;
    let v_max = frame.components.iter().map(|c| c.sampling_y).max().unwrap_or(1) as usize;

    let mut components = Vec::with_capacity(scan.components.len());
    for sc in &scan.components {
        let idx = frame
            .components
            .iter()
            .position(|fc| fc.id == sc.component_id)
            .ok_or_else(|| {
                DecodeErrors::InvalidScanHeader(format!(
                    "scan references component id {} not present in the frame header",
                    sc.component_id
                ))
            })?;
        components.push(ScanComponentPlan {
            frame_component_idx: idx,
            blocks_x: frame.components[idx].sampling_x as usize,
            blocks_y: frame.components[idx].sampling_y as usize,
            dc_table_idx: sc.dc_table_idx,
            ac_table_idx: sc.ac_table_idx,
        });
    }

    let (blocks_per_group, group_count) = if components.len() > 1 {
        let blocks_per_group = components.iter().map(|c| c.blocks_x * c.blocks_y).sum();
        let mcu_width = 8 * h_max;
        let mcu_height = 8 * v_max;
        let mcus_x = div_ceil(usize::from(frame.width), mcu_width);
        let mcus_y = div_ceil(usize::from(frame.height), mcu_height);
        (blocks_per_group, mcus_x * mcus_y)
    } else {
        let comp = &frame.components[components[0].frame_component_idx];
        let width_samples = div_ceil(usize::from(frame.width) * comp.sampling_x as usize, h_max);
        let height_samples =
            div_ceil(usize::from(frame.height) * comp.sampling_y as usize, v_max);
        let blocks_x = div_ceil(width_samples, 8);
        let blocks_y = div_ceil(height_samples, 8);
        components[0].blocks_x = 1;
        components[0].blocks_y = 1;
        (1, blocks_x * blocks_y)
    };

    Ok(ScanPlan {
        components,
        blocks_per_group,
        group_count,
    })
}

/// Decode a baseline/extended-sequential DC coefficient and fold it into
/// the running per-component prediction.
fn decode_dc_baseline(
    bitstream: &mut Bitstream,
    ctx: &Context,
    dc_table_idx: u8,
    dc_pred: &mut i16,
    block: &mut [i16],
) -> Result<(), DecodeErrors> {
    let table = ctx.dc_tables[usize::from(dc_table_idx)]
        .as_ref()
        .ok_or_else(|| DecodeErrors::Syntax("scan references an unset DC Huffman table".to_string()))?;
    let (size, length) = table.decode(bitstream.front());
    if length == 16 {
        return Err(DecodeErrors::Syntax(
            "reserved Huffman codeword encountered decoding a DC coefficient".to_string(),
        ));
    }
    bitstream.pop(length);

    let diff = if size == 0 {
        0
    } else {
        let window = bitstream.front();
        bitstream.pop(size);
        amplitude(size, window)
    };
    *dc_pred += diff;
    block[0] = *dc_pred;
    Ok(())
}

/// Decode the AC coefficients of a baseline/extended-sequential block.
fn decode_ac_baseline(
    bitstream: &mut Bitstream,
    ctx: &Context,
    ac_table_idx: u8,
    block: &mut [i16],
) -> Result<(), DecodeErrors> {
    let table = ctx.ac_tables[usize::from(ac_table_idx)]
        .as_ref()
        .ok_or_else(|| DecodeErrors::Syntax("scan references an unset AC Huffman table".to_string()))?;

    let mut k = 1usize;
    while k < 64 {
        let (rs, length) = table.decode(bitstream.front());
        if length == 16 {
            return Err(DecodeErrors::Syntax(
                "reserved Huffman codeword encountered decoding an AC coefficient".to_string(),
            ));
        }
        bitstream.pop(length);
        let run = rs >> 4;
        let size = rs & 0x0F;

        if size == 0 {
            if run == 15 {
                // ZRL: skip 16 zero coefficients.
                k += 16;
                continue;
            }
            // EOB: remaining coefficients stay zero.
            break;
        }
        k += usize::from(run);
        if k >= 64 {
            return Err(DecodeErrors::Syntax(
                "AC zero-run advanced past the end of a block".to_string(),
            ));
        }
        let window = bitstream.front();
        bitstream.pop(size);
        block[k] = amplitude(size, window);
        k += 1;
    }
    Ok(())
}

/// Decode one full (non-progressive) scan, writing into `spectra`.
///
/// `dc_pred` holds one running DC prediction per frame component and
/// persists across scans within the same component, per ITU-T T.81.
pub fn decode_scan_baseline(
    bitstream: &mut Bitstream,
    ctx: &Context,
    frame: &FrameHeader,
    scan: &ScanHeader,
    dc_pred: &mut [i16],
) -> Result<Spectra, DecodeErrors> {
    let plan = build_scan_plan(frame, scan)?;
    let mut spectra = Spectra::new(plan.blocks_per_group);

    for group in 0..plan.group_count {
        let mut block_idx = 0usize;
        for comp in &plan.components {
            for _ in 0..(comp.blocks_x * comp.blocks_y) {
                let mut coeffs = [0i16; 64];
                decode_dc_baseline(
                    bitstream,
                    ctx,
                    comp.dc_table_idx,
                    &mut dc_pred[comp.frame_component_idx],
                    &mut coeffs,
                )?;
                decode_ac_baseline(bitstream, ctx, comp.ac_table_idx, &mut coeffs)?;
                spectra.block_mut(group, block_idx).copy_from_slice(&coeffs);
                block_idx += 1;
            }
        }
    }
    Ok(spectra)
}

/// State threaded through a progressive scan: the running EOB run length
/// (coefficients already known to be zero through the end of several
/// blocks, carried across block boundaries within one AC scan).
#[derive(Default)]
pub struct ProgressiveState {
    pub eob_run: u16,
}

/// Decode one progressive DC-first scan (`Ah == 0`): identical to the
/// baseline DC decode except the raw difference is left-shifted by the
/// successive-approximation exponent before being added to the prediction.
fn decode_dc_first(
    bitstream: &mut Bitstream,
    ctx: &Context,
    dc_table_idx: u8,
    dc_pred: &mut i16,
    exponent: u8,
    block: &mut [i16],
) -> Result<(), DecodeErrors> {
    let table = ctx.dc_tables[usize::from(dc_table_idx)]
        .as_ref()
        .ok_or_else(|| DecodeErrors::Syntax("scan references an unset DC Huffman table".to_string()))?;
    let (size, length) = table.decode(bitstream.front());
    if length == 16 {
        return Err(DecodeErrors::Syntax(
            "reserved Huffman codeword encountered decoding a DC coefficient".to_string(),
        ));
    }
    bitstream.pop(length);
    let diff = if size == 0 {
        0
    } else {
        let window = bitstream.front();
        bitstream.pop(size);
        amplitude(size, window)
    };
    *dc_pred += diff;
    block[0] = *dc_pred << exponent;
    Ok(())
}

/// Decode one progressive DC-refinement scan (`Ah != 0`): one bit per
/// block, ORed into the coefficient at the refinement's bit position.
fn decode_dc_refine(bitstream: &mut Bitstream, exponent: u8, block: &mut [i16]) {
    let bit = bitstream.take(1);
    if bit != 0 {
        block[0] |= 1i16 << exponent;
    }
}

/// Decode one progressive AC-first scan band for a single block.
fn decode_ac_first(
    bitstream: &mut Bitstream,
    ctx: &Context,
    ac_table_idx: u8,
    band: std::ops::Range<usize>,
    exponent: u8,
    state: &mut ProgressiveState,
    block: &mut [i16],
) -> Result<(), DecodeErrors> {
    if state.eob_run > 0 {
        state.eob_run -= 1;
        return Ok(());
    }
    let table = ctx.ac_tables[usize::from(ac_table_idx)]
        .as_ref()
        .ok_or_else(|| DecodeErrors::Syntax("scan references an unset AC Huffman table".to_string()))?;

    let mut k = band.start.max(1);
    while k < band.end {
        let (rs, length) = table.decode(bitstream.front());
        if length == 16 {
            return Err(DecodeErrors::Syntax(
                "reserved Huffman codeword encountered decoding an AC coefficient".to_string(),
            ));
        }
        bitstream.pop(length);
        let run = rs >> 4;
        let size = rs & 0x0F;

        if size == 0 {
            if run == 15 {
                k += 16;
                continue;
            }
            // EOB run: `run` names the number of *extra* blocks (beyond this
            // one) that are entirely EOB, coded as `run` extra bits.
            state.eob_run = (1u16 << run) - 1;
            if run > 0 {
                state.eob_run += bitstream.take(run as u8);
            }
            break;
        }
        k += usize::from(run);
        if k >= band.end {
            return Err(DecodeErrors::Syntax(
                "AC zero-run advanced past the end of the spectral band".to_string(),
            ));
        }
        let window = bitstream.front();
        bitstream.pop(size);
        block[k] = amplitude(size, window) << exponent;
        k += 1;
    }
    Ok(())
}

/// Decode one progressive AC-refinement scan band for a single block, per
/// ITU-T T.81 Annex G.
fn decode_ac_refine(
    bitstream: &mut Bitstream,
    ctx: &Context,
    ac_table_idx: u8,
    band: std::ops::Range<usize>,
    exponent: u8,
    state: &mut ProgressiveState,
    block: &mut [i16],
) -> Result<(), DecodeErrors> {
    let positive = 1i16 << exponent;
    let negative = -1i16 << exponent;
    let mut k = band.start.max(1);

    if state.eob_run == 0 {
        let table = ctx.ac_tables[usize::from(ac_table_idx)].as_ref().ok_or_else(|| {
            DecodeErrors::Syntax("scan references an unset AC Huffman table".to_string())
        })?;
        while k < band.end {
            let (rs, length) = table.decode(bitstream.front());
            if length == 16 {
                return Err(DecodeErrors::Syntax(
                    "reserved Huffman codeword encountered decoding an AC coefficient".to_string(),
                ));
            }
            bitstream.pop(length);
            let mut run = i32::from(rs >> 4);
            let size = rs & 0x0F;
            let mut new_value = 0i16;

            if size == 0 {
                if run != 15 {
                    state.eob_run = (1u16 << run) - 1;
                    if run > 0 {
                        state.eob_run += bitstream.take(run as u8);
                    }
                    break;
                }
                // ZRL: run of 16 zero-history coefficients to skip over,
                // refining any nonzero coefficients found along the way.
            } else {
                new_value = if bitstream.take(1) != 0 { positive } else { negative };
            }

            while k < band.end {
                if block[k] != 0 {
                    if bitstream.take(1) != 0 && (block[k] & positive) == 0 {
                        block[k] += if block[k] > 0 { positive } else { negative };
                    }
                } else {
                    if run == 0 {
                        if new_value != 0 {
                            block[k] = new_value;
                        }
                        k += 1;
                        break;
                    }
                    run -= 1;
                }
                k += 1;
            }
        }
    }

    if state.eob_run > 0 {
        while k < band.end {
            if block[k] != 0 && bitstream.take(1) != 0 && (block[k] & positive) == 0 {
                block[k] += if block[k] > 0 { positive } else { negative };
            }
            k += 1;
        }
        state.eob_run -= 1;
    }
    Ok(())
}

/// Decode one progressive scan, dispatching on whether it carries DC or AC
/// coefficients and whether it is a first or refinement pass (`Ah == 0` vs
/// `Ah != 0`, taken from `ah`, which the scan header validates but the
/// scan header type itself does not retain).
#[allow(clippy::too_many_arguments)]
pub fn decode_scan_progressive(
    bitstream: &mut Bitstream,
    ctx: &Context,
    frame: &FrameHeader,
    scan: &ScanHeader,
    ah: u8,
    dc_pred: &mut [i16],
    state: &mut ProgressiveState,
    spectra: &mut Spectra,
) -> Result<(), DecodeErrors> {
    let plan = build_scan_plan(frame, scan)?;
    let is_dc = scan.band.start == 0;

    for group in 0..plan.group_count {
        let mut block_idx = 0usize;
        for comp in &plan.components {
            for _ in 0..(comp.blocks_x * comp.blocks_y) {
                let block = spectra.block_mut(group, block_idx);
                if is_dc {
                    if ah == 0 {
                        decode_dc_first(
                            bitstream,
                            ctx,
                            comp.dc_table_idx,
                            &mut dc_pred[comp.frame_component_idx],
                            scan.exponent,
                            block,
                        )?;
                    } else {
                        decode_dc_refine(bitstream, scan.exponent, block);
                    }
                } else if ah == 0 {
                    decode_ac_first(
                        bitstream,
                        ctx,
                        comp.ac_table_idx,
                        scan.band.clone(),
                        scan.exponent,
                        state,
                        block,
                    )?;
                } else {
                    decode_ac_refine(
                        bitstream,
                        ctx,
                        comp.ac_table_idx,
                        scan.band.clone(),
                        scan.exponent,
                        state,
                        block,
                    )?;
                }
                block_idx += 1;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amplitude_matches_worked_positive_example() {
        assert_eq!(amplitude(5, 0b1_0110_0000_0000_000), 22);
    }

    #[test]
    fn amplitude_matches_worked_negative_example() {
        assert_eq!(amplitude(5, 0b0_1001_0000_0000_000), -22);
    }

    #[test]
    fn amplitude_round_trips_every_magnitude_category() {
        // category `count` covers magnitudes in [2^(count-1), 2^count - 1],
        // signed either way.
        for count in 1u8..=15 {
            let lo = 1i16 << (count - 1);
            let hi = (1i16 << count) - 1;
            for magnitude in lo..=hi {
                for &v in &[magnitude, -magnitude] {
                    let encoded = if v >= 0 {
                        v as u16
                    } else {
                        (v + (1i16 << count) - 1) as u16
                    };
                    let window = encoded << (16 - count);
                    assert_eq!(amplitude(count, window), v, "count={count} v={v}");
                }
            }
        }
    }

    #[test]
    fn spectra_grows_lazily_and_zero_initializes() {
        let mut spectra = Spectra::new(2);
        spectra.block_mut(3, 1)[0] = 42;
        assert_eq!(spectra.group_count(), 4);
        assert_eq!(spectra.block(3, 1)[0], 42);
        assert_eq!(spectra.block(3, 0)[0], 0);
        assert_eq!(spectra.block(0, 0)[0], 0);
    }
}
