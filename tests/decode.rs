//! A full, minimal baseline decode: one 8x8 block, one component, trivial
//! single-codeword Huffman tables producing an all-zero block.
use jpeg_core::Decoder;

#[rustfmt::skip]
fn tiny_baseline_jpeg() -> Vec<u8> {
    let mut data = Vec::new();
    // SOI
    data.extend([0xFF, 0xD8]);
    // APP0 / JFIF
    data.extend([0xFF, 0xE0, 0x00, 0x10]);
    data.extend(*b"JFIF\0");
    data.extend([0x01, 0x01, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00]);
    // DHT: one DC sub-table (slot 0) and one AC sub-table (slot 0), each a
    // single 1-bit code "0" mapping to value 0x00.
    data.extend([0xFF, 0xC4, 0x00, 0x26]);
    data.extend([0x00]); // class=DC, slot=0
    data.extend([1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    data.extend([0x00]);
    data.extend([0x10]); // class=AC, slot=0
    data.extend([1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    data.extend([0x00]);
    // SOF0: 8x8, 1 component, 1x1 sampling, quant table 0.
    data.extend([0xFF, 0xC0, 0x00, 0x0B]);
    data.extend([8, 0x00, 0x08, 0x00, 0x08, 0x01]);
    data.extend([0x01, 0x11, 0x00]);
    // SOS: 1 component, DC/AC table 0, full spectral band, Ah=Al=0.
    data.extend([0xFF, 0xDA, 0x00, 0x08]);
    data.extend([0x01, 0x01, 0x00, 0x00, 0x3F, 0x00]);
    // entropy data: "0" (DC, diff 0) then "0" (AC, EOB) packed into one byte.
    data.extend([0x00]);
    // EOI
    data.extend([0xFF, 0xD9]);
    data
}

#[test]
fn decodes_a_single_block_grayscale_image() {
    let data = tiny_baseline_jpeg();
    let output = Decoder::new().decode_buffer(&data).expect("valid tiny JPEG");

    assert_eq!(output.frame.width, 8);
    assert_eq!(output.frame.height, 8);
    assert_eq!(output.frame.components.len(), 1);
    assert_eq!(output.scans.len(), 1);

    let scan = &output.scans[0];
    assert_eq!(scan.spectra.group_count(), 1);
    let block = scan.spectra.block(0, 0);
    assert!(block.iter().all(|&c| c == 0));
}

#[test]
fn probe_recognizes_the_tiny_image() {
    let data = tiny_baseline_jpeg();
    assert!(jpeg_core::probe::probe(&data));
    assert!(!jpeg_core::probe::probe(&[0x00, 0x01, 0x02]));
}
