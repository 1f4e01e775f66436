//! Protocol Layer: Length-Prefixed Binary Encoding
//!
//! Prinsip desain:
//! - Fixed byte order: semua field numerik little-endian, tidak pernah host order
//! - Explicit length: string tidak pernah ditulis sebagai memory image
//! - Single pass: decode membaca berurutan, tanpa look-ahead dan tanpa over-read

mod encoder;
mod error;
mod record;

pub use encoder::{
    decode, decode_from_slice, encode, encode_into, CodecConfig, Decoder, Encoder, RecordCodec,
};
pub use error::CodecError;
pub use record::{Field, Record, FIXED_SIZE, ID_WIDTH, LENGTH_WIDTH, SCORE_WIDTH};
