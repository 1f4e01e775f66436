//! Record Format (fixed-shape, length-prefixed)
//!
//! Layout (semua field numerik little-endian):
//! ┌──────────────┬────────────────┬──────────────────────┬─────────────────────┐
//! │ id (i32, 4)  │ score (f64, 8) │ name_length (u64, 8) │ name (variable)     │
//! └──────────────┴────────────────┴──────────────────────┴─────────────────────┘
//!
//! `name` ditulis apa adanya tanpa terminator, jadi zero byte di dalam name aman.

use std::fmt;
use std::mem;

/// Lebar field `id` dalam bytes
pub const ID_WIDTH: usize = mem::size_of::<i32>();
/// Lebar field `score` dalam bytes (IEEE-754 binary64)
pub const SCORE_WIDTH: usize = mem::size_of::<f64>();
/// Lebar length prefix untuk `name`
pub const LENGTH_WIDTH: usize = mem::size_of::<u64>();
/// Ukuran record dengan name kosong
pub const FIXED_SIZE: usize = ID_WIDTH + SCORE_WIDTH + LENGTH_WIDTH;

/// Satu record terstruktur: identifier, nama, dan skor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub id: i32,
    pub name: String,
    pub score: f64,
}

impl Record {
    /// Membuat record baru
    pub fn new(id: i32, name: impl Into<String>, score: f64) -> Self {
        Self {
            id,
            name: name.into(),
            score,
        }
    }

    /// Jumlah bytes hasil encode record ini
    #[inline(always)]
    pub fn encoded_len(&self) -> usize {
        FIXED_SIZE + self.name.len()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ID: {}, Name: {}, Score: {}", self.id, self.name, self.score)
    }
}

/// Posisi dalam layout, dipakai untuk melaporkan dimana input terpotong
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// File header (magic + version), hanya untuk record file
    Header,
    Id,
    Score,
    NameLength,
    Name,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Header => "file header",
            Self::Id => "id",
            Self::Score => "score",
            Self::NameLength => "name length",
            Self::Name => "name",
        };
        f.write_str(name)
    }
}
