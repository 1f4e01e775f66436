//! Error taxonomy untuk codec dan record file

use std::io;

use super::record::Field;

/// Codec errors.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Sink/source gagal menerima atau menghasilkan bytes. Diteruskan apa adanya.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Input habis sebelum field selesai dibaca
    #[error("Truncated input while reading {field}")]
    Truncated { field: Field },

    /// Name payload bukan UTF-8 valid
    #[error("Invalid UTF-8 in record name")]
    InvalidUtf8,

    /// Name melebihi batas yang dikonfigurasi
    #[error("Name too long: {len} bytes (max {max})")]
    NameTooLong { len: u64, max: u64 },

    /// Record file tidak diawali magic yang benar
    #[error("Bad file magic: {found:02x?}")]
    BadMagic { found: [u8; 4] },

    /// Versi record file tidak dikenal
    #[error("Unsupported format version: {0}")]
    UnsupportedVersion(u16),
}

impl CodecError {
    /// Error untuk input yang terpotong di `field`
    #[inline]
    pub fn truncated(field: Field) -> Self {
        CodecError::Truncated { field }
    }

    /// Apakah error ini akibat input terpotong
    pub fn is_truncated(&self) -> bool {
        matches!(self, CodecError::Truncated { .. })
    }

    /// Klasifikasi error I/O saat membaca `field`.
    ///
    /// `UnexpectedEof` berarti source kehabisan bytes, bukan kegagalan transport.
    pub(crate) fn from_read(err: io::Error, field: Field) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            CodecError::truncated(field)
        } else {
            CodecError::Io(err)
        }
    }
}
