//! End-to-end decoder scenarios built from crafted in-memory JPEG byte
//! buffers, in the style of the teacher crate's own integration tests.
use jpeg_core::errors::DecodeErrors;
use jpeg_core::Decoder;

#[test]
fn jfif_only_stream_fails_with_missing_frame_header() {
    #[rustfmt::skip]
    let data: &[u8] = &[
        0xFF, 0xD8,
        0xFF, 0xE0, 0x00, 0x10,
        b'J', b'F', b'I', b'F', 0x00,
        0x01, 0x01,
        0x00,
        0x00, 0x01,
        0x00, 0x01,
        0x00, 0x00,
        0xFF, 0xD9,
    ];
    let err = Decoder::new().decode_buffer(data).unwrap_err();
    assert!(matches!(err, DecodeErrors::MissingFrameHeader));
}

#[test]
fn stream_not_starting_with_soi_fails_with_filetype_error() {
    let data: &[u8] = &[0xFF, 0xD9, 0xFF, 0xD8];
    let err = Decoder::new().decode_buffer(data).unwrap_err();
    assert!(matches!(err, DecodeErrors::FiletypeError));
}

#[test]
fn soi_without_app0_fails_with_missing_jfif_header() {
    // a second SOI immediately after the first is not an APP0 segment.
    let data: &[u8] = &[0xFF, 0xD8, 0xFF, 0xD8];
    let err = Decoder::new().decode_buffer(data).unwrap_err();
    assert!(matches!(err, DecodeErrors::MissingJFIFHeader));
}

#[test]
fn unsupported_sof_is_rejected() {
    #[rustfmt::skip]
    let data: &[u8] = &[
        0xFF, 0xD8,
        0xFF, 0xE0, 0x00, 0x10,
        b'J', b'F', b'I', b'F', 0x00,
        0x01, 0x01, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00,
        // SOF3: lossless sequential Huffman, not supported.
        0xFF, 0xC3, 0x00, 0x0B,
        0x08, 0x00, 0x01, 0x00, 0x01, 0x01, 0x01, 0x11, 0x00,
        0xFF, 0xD9,
    ];
    let err = Decoder::new().decode_buffer(data).unwrap_err();
    assert!(matches!(err, DecodeErrors::Unsupported(_)));
}

#[test]
fn dac_segment_is_rejected_as_unsupported() {
    #[rustfmt::skip]
    let data: &[u8] = &[
        0xFF, 0xD8,
        0xFF, 0xE0, 0x00, 0x10,
        b'J', b'F', b'I', b'F', 0x00,
        0x01, 0x01, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00,
        0xFF, 0xCC, 0x00, 0x03, 0x00,
        0xFF, 0xD9,
    ];
    let err = Decoder::new().decode_buffer(data).unwrap_err();
    assert!(matches!(err, DecodeErrors::Unsupported(_)));
}
