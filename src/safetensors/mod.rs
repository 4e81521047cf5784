//! Safetensors header format
//!
//! A safetensors file starts with an 8-byte little-endian length `L`,
//! followed by `L` bytes of UTF-8 JSON mapping tensor names to
//! `{dtype, shape, data_offsets}`, followed by raw tensor data.

mod decoder;
mod error;
mod header;

pub use decoder::HeaderDecoder;
pub use error::DecodeError;
pub use header::{read_header_length, SafetensorsHeader, TensorInfo, HEADER_PREFIX_LEN, METADATA_KEY};
