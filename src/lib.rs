#![allow(clippy::needless_return, clippy::similar_names, clippy::inline_always)]
#![warn(clippy::correctness, clippy::perf, clippy::pedantic, clippy::inline_always)]
#[macro_use]
extern crate log;

pub use crate::decoder::{DecodeOutput, DecodedScan, Decoder};
pub use crate::misc::DecoderOptions;

pub mod bitstream;
pub mod byte_source;
mod context;
mod decoder;
pub mod entropy;
pub mod errors;
pub mod headers;
pub mod huffman;
pub mod marker;
mod misc;
pub mod probe;
pub mod quant;
pub mod spectra;
