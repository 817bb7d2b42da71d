#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut d = jpeg_core::Decoder::new();
    let _ = d.decode_buffer(data);
});
