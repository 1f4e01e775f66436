//! Memory-Mapped Record File Reader
//!
//! File di-mmap read-only, lalu record di-decode langsung dari page cache:
//! - Zero-copy scan: tidak ada read() syscall per record
//! - Kernel-managed paging: file besar tidak perlu muat di heap

use std::fs::File;
use std::path::Path;

use memmap2::Mmap;
use tracing::{debug, warn};

use super::record_file::{FileHeader, FILE_HEADER_SIZE};
use crate::protocol::{CodecError, Decoder, Field, Record, RecordCodec};

/// Mmap-backed view atas record file
pub struct MmapRecords {
    mmap: Mmap,
    header: FileHeader,
    codec: RecordCodec,
}

impl MmapRecords {
    /// Membuka dan memvalidasi record file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CodecError> {
        Self::open_with_codec(path, RecordCodec::default())
    }

    pub fn open_with_codec<P: AsRef<Path>>(
        path: P,
        codec: RecordCodec,
    ) -> Result<Self, CodecError> {
        let path = path.as_ref();
        let file = File::open(path)?;

        // File kosong tidak bisa di-mmap di semua platform, cek dulu
        let len = file.metadata()?.len();
        if len < FILE_HEADER_SIZE as u64 {
            warn!(path = %path.display(), len, "record file shorter than header");
            return Err(CodecError::truncated(Field::Header));
        }

        // SAFETY: Mapping read-only. File tidak boleh di-truncate proses lain
        // selama MmapRecords masih hidup.
        let mmap = unsafe { Mmap::map(&file)? };

        // File bisa menyusut setelah cek metadata, jangan slice langsung
        let header = match FileHeader::parse(&mmap) {
            Ok(header) => header,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "rejecting record file header");
                return Err(e);
            }
        };

        debug!(path = %path.display(), bytes = mmap.len(), "mapped record file");

        Ok(Self {
            mmap,
            header,
            codec,
        })
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// Ukuran file termasuk header
    #[inline(always)]
    pub fn len_bytes(&self) -> usize {
        self.mmap.len()
    }

    /// Bytes record setelah header (zero-copy)
    #[inline(always)]
    pub fn payload(&self) -> &[u8] {
        &self.mmap[FILE_HEADER_SIZE..]
    }

    /// Iterator record langsung dari mapped region
    pub fn iter(&self) -> Decoder<'_> {
        Decoder::with_codec(self.payload(), self.codec)
    }

    /// Decode semua record
    pub fn read_all(&self) -> Result<Vec<Record>, CodecError> {
        self.iter().collect()
    }
}
