//! Storage Layer: record file di atas codec
//!
//! - `RecordWriter` / `RecordReader`: streaming, buffered file I/O
//! - `MmapRecords`: read-only scan via mmap

mod mmap_records;
mod record_file;

pub use mmap_records::MmapRecords;
pub use record_file::{
    FileHeader, RecordReader, RecordWriter, FILE_HEADER_SIZE, FILE_MAGIC, FILE_VERSION,
};
