//! Recbin - Length-Prefixed Binary Record Codec
//!
//! Arsitektur:
//! - Fixed-width fields: `id` dan `score` selalu little-endian
//! - Length-prefixed strings: panjang `name` ditulis eksplisit sebelum bytes-nya
//! - Versioned files: record file diawali header magic + version
//! - Zero-copy read: record file bisa di-mmap dan di-decode langsung

pub mod protocol;
pub mod storage;

pub use protocol::{
    decode, decode_from_slice, encode, encode_into, CodecConfig, CodecError, Decoder, Encoder,
    Field, Record, RecordCodec,
};
pub use storage::{MmapRecords, RecordReader, RecordWriter};
