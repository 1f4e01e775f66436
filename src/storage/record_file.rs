//! Versioned Record File
//!
//! Layout:
//! ┌─────────────────────────────────────────────────────┐
//! │ FileHeader (8 bytes): magic "RCBN" | version | flags│
//! ├─────────────────────────────────────────────────────┤
//! │ Record 1 (length-prefixed, lihat protocol::record)  │
//! ├─────────────────────────────────────────────────────┤
//! │ Record 2 ...                                        │
//! └─────────────────────────────────────────────────────┘
//!
//! Record di dalam file identik byte-per-byte dengan output `encode`,
//! header hanya ditambahkan di level file.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use tracing::{debug, trace, warn};

use crate::protocol::{CodecError, Field, Record, RecordCodec};

/// Magic bytes identifying a record file: "RCBN"
pub const FILE_MAGIC: [u8; 4] = *b"RCBN";

/// Current record file format version
pub const FILE_VERSION: u16 = 1;

/// Size of file header in bytes
pub const FILE_HEADER_SIZE: usize = 8;

/// Record file header (8 bytes, little-endian)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    /// Magic bytes: "RCBN"
    pub magic: [u8; 4],
    /// Format version
    pub version: u16,
    /// Reserved, selalu 0 untuk version 1
    pub flags: u16,
}

impl Default for FileHeader {
    fn default() -> Self {
        Self {
            magic: FILE_MAGIC,
            version: FILE_VERSION,
            flags: 0,
        }
    }
}

impl FileHeader {
    pub fn to_bytes(&self) -> [u8; FILE_HEADER_SIZE] {
        let mut bytes = [0u8; FILE_HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4..6].copy_from_slice(&self.version.to_le_bytes());
        bytes[6..8].copy_from_slice(&self.flags.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8; FILE_HEADER_SIZE]) -> Self {
        Self {
            magic: [bytes[0], bytes[1], bytes[2], bytes[3]],
            version: u16::from_le_bytes([bytes[4], bytes[5]]),
            flags: u16::from_le_bytes([bytes[6], bytes[7]]),
        }
    }

    /// Parse dan validasi header dari awal `bytes`
    pub fn parse(bytes: &[u8]) -> Result<Self, CodecError> {
        let header_bytes: &[u8; FILE_HEADER_SIZE] = bytes
            .get(..FILE_HEADER_SIZE)
            .and_then(|s| s.try_into().ok())
            .ok_or(CodecError::truncated(Field::Header))?;
        let header = Self::from_bytes(header_bytes);
        header.validate()?;
        Ok(header)
    }

    /// Validasi magic dan version
    pub fn validate(&self) -> Result<(), CodecError> {
        if self.magic != FILE_MAGIC {
            return Err(CodecError::BadMagic { found: self.magic });
        }
        if self.version != FILE_VERSION {
            return Err(CodecError::UnsupportedVersion(self.version));
        }
        Ok(())
    }

    /// Baca dan validasi header dari awal source
    pub(crate) fn read_from<R: Read>(reader: &mut R) -> Result<Self, CodecError> {
        let mut bytes = [0u8; FILE_HEADER_SIZE];
        reader
            .read_exact(&mut bytes)
            .map_err(|e| CodecError::from_read(e, Field::Header))?;

        let header = Self::from_bytes(&bytes);
        if let Err(e) = header.validate() {
            warn!(error = %e, "rejecting record file header");
            return Err(e);
        }
        Ok(header)
    }
}

/// Sequential record file writer
///
/// Header ditulis saat konstruksi. Sink dimiliki writer dan dilepas saat drop;
/// pakai `finish` agar error flush tidak hilang.
pub struct RecordWriter<W: Write> {
    inner: W,
    codec: RecordCodec,
    written: u64,
}

impl RecordWriter<BufWriter<File>> {
    /// Membuat (atau menimpa) record file di `path`
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, CodecError> {
        Self::create_with_codec(path, RecordCodec::default())
    }

    pub fn create_with_codec<P: AsRef<Path>>(
        path: P,
        codec: RecordCodec,
    ) -> Result<Self, CodecError> {
        let path = path.as_ref();
        let file = File::create(path)?;
        debug!(path = %path.display(), "created record file");
        Self::with_codec(BufWriter::new(file), codec)
    }

    /// Flush buffer lalu fsync file
    pub fn finish_sync(self) -> Result<File, CodecError> {
        let written = self.written;
        let file = self
            .inner
            .into_inner()
            .map_err(|e| CodecError::Io(e.into_error()))?;
        file.sync_all()?;
        debug!(records = written, "record file synced");
        Ok(file)
    }
}

impl<W: Write> RecordWriter<W> {
    pub fn new(inner: W) -> Result<Self, CodecError> {
        Self::with_codec(inner, RecordCodec::default())
    }

    pub fn with_codec(mut inner: W, codec: RecordCodec) -> Result<Self, CodecError> {
        inner.write_all(&FileHeader::default().to_bytes())?;
        Ok(Self {
            inner,
            codec,
            written: 0,
        })
    }

    /// Append satu record
    pub fn append(&mut self, record: &Record) -> Result<(), CodecError> {
        self.codec.encode_into(&mut self.inner, record)?;
        self.written += 1;
        trace!(id = record.id, len = record.encoded_len(), "record appended");
        Ok(())
    }

    /// Jumlah record yang sudah di-append
    pub fn records_written(&self) -> u64 {
        self.written
    }

    /// Flush dan kembalikan sink
    pub fn finish(mut self) -> Result<W, CodecError> {
        self.inner.flush()?;
        debug!(records = self.written, "record writer finished");
        Ok(self.inner)
    }
}

/// Sequential record file reader
///
/// Header divalidasi saat konstruksi. Sebagai `Iterator`, reader berhenti
/// setelah error pertama.
pub struct RecordReader<R: Read> {
    inner: R,
    codec: RecordCodec,
    header: FileHeader,
    read: u64,
    failed: bool,
}

impl RecordReader<BufReader<File>> {
    /// Membuka record file di `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CodecError> {
        Self::open_with_codec(path, RecordCodec::default())
    }

    pub fn open_with_codec<P: AsRef<Path>>(
        path: P,
        codec: RecordCodec,
    ) -> Result<Self, CodecError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        debug!(path = %path.display(), "opened record file");
        Self::with_codec(BufReader::new(file), codec)
    }
}

impl<R: Read> RecordReader<R> {
    pub fn new(inner: R) -> Result<Self, CodecError> {
        Self::with_codec(inner, RecordCodec::default())
    }

    pub fn with_codec(mut inner: R, codec: RecordCodec) -> Result<Self, CodecError> {
        let header = FileHeader::read_from(&mut inner)?;
        Ok(Self {
            inner,
            codec,
            header,
            read: 0,
            failed: false,
        })
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// Jumlah record yang sudah berhasil dibaca
    pub fn records_read(&self) -> u64 {
        self.read
    }

    /// Baca record berikutnya.
    ///
    /// Returns `Ok(None)` jika file habis tepat di batas record.
    pub fn next_record(&mut self) -> Result<Option<Record>, CodecError> {
        match self.codec.decode_next(&mut self.inner) {
            Ok(Some(record)) => {
                self.read += 1;
                Ok(Some(record))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                warn!(error = %e, records_read = self.read, "failed to read record");
                Err(e)
            }
        }
    }

    /// Baca semua record yang tersisa
    pub fn read_all(mut self) -> Result<Vec<Record>, CodecError> {
        let mut records = Vec::new();
        while let Some(record) = self.next_record()? {
            records.push(record);
        }
        Ok(records)
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<Record, CodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{encode, CodecConfig, FIXED_SIZE};

    #[test]
    fn test_header_layout() {
        let bytes = FileHeader::default().to_bytes();
        assert_eq!(&bytes[0..4], b"RCBN");
        assert_eq!(&bytes[4..6], &1u16.to_le_bytes());
        assert_eq!(&bytes[6..8], &[0, 0]);
        assert_eq!(FileHeader::from_bytes(&bytes), FileHeader::default());
    }

    #[test]
    fn test_parse_short_slice() {
        let bytes = FileHeader::default().to_bytes();
        assert_eq!(FileHeader::parse(&bytes).unwrap(), FileHeader::default());

        let err = FileHeader::parse(&bytes[..5]).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Truncated {
                field: Field::Header
            }
        ));
    }

    #[test]
    fn test_write_read_in_memory() {
        let records = vec![
            Record::new(101, "Alice Smith", 3.85),
            Record::new(102, "Bob", 2.5),
            Record::default(),
        ];

        let mut writer = RecordWriter::new(Vec::new()).unwrap();
        for record in &records {
            writer.append(record).unwrap();
        }
        assert_eq!(writer.records_written(), 3);
        let bytes = writer.finish().unwrap();

        // Header + record bytes persis sama dengan encode()
        let expected_body: Vec<u8> = records.iter().flat_map(encode).collect();
        assert_eq!(&bytes[FILE_HEADER_SIZE..], expected_body.as_slice());

        let reader = RecordReader::new(bytes.as_slice()).unwrap();
        assert_eq!(reader.header().version, FILE_VERSION);
        assert_eq!(reader.read_all().unwrap(), records);
    }

    #[test]
    fn test_empty_file_has_no_records() {
        let bytes = RecordWriter::new(Vec::new()).unwrap().finish().unwrap();
        assert_eq!(bytes.len(), FILE_HEADER_SIZE);

        let mut reader = RecordReader::new(bytes.as_slice()).unwrap();
        assert!(reader.next_record().unwrap().is_none());
        assert_eq!(reader.records_read(), 0);
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = FileHeader::default().to_bytes().to_vec();
        bytes[0] = b'X';

        let err = RecordReader::new(bytes.as_slice()).err().unwrap();
        assert!(matches!(err, CodecError::BadMagic { found } if &found == b"XCBN"));
    }

    #[test]
    fn test_unsupported_version() {
        let header = FileHeader {
            version: 9,
            ..FileHeader::default()
        };
        let bytes = header.to_bytes();

        let err = RecordReader::new(&bytes[..]).err().unwrap();
        assert!(matches!(err, CodecError::UnsupportedVersion(9)));
    }

    #[test]
    fn test_truncated_header() {
        let bytes = FileHeader::default().to_bytes();
        let err = RecordReader::new(&bytes[..5]).err().unwrap();
        assert!(matches!(
            err,
            CodecError::Truncated {
                field: Field::Header
            }
        ));
    }

    #[test]
    fn test_partial_trailing_record() {
        let mut writer = RecordWriter::new(Vec::new()).unwrap();
        writer.append(&Record::new(1, "complete", 1.0)).unwrap();
        writer.append(&Record::new(2, "partial", 2.0)).unwrap();
        let mut bytes = writer.finish().unwrap();
        bytes.truncate(bytes.len() - 3);

        let mut reader = RecordReader::new(bytes.as_slice()).unwrap();
        assert_eq!(reader.next().unwrap().unwrap().id, 1);
        assert!(reader.next().unwrap().unwrap_err().is_truncated());
        assert!(reader.next().is_none());
        assert_eq!(reader.records_read(), 1);
    }

    #[test]
    fn test_codec_limit_applies_to_reader() {
        let mut writer = RecordWriter::new(Vec::new()).unwrap();
        writer.append(&Record::new(1, "0123456789", 0.0)).unwrap();
        let bytes = writer.finish().unwrap();
        assert_eq!(bytes.len(), FILE_HEADER_SIZE + FIXED_SIZE + 10);

        let codec = RecordCodec::new(CodecConfig::default().with_max_name_len(5));
        let mut reader = RecordReader::with_codec(bytes.as_slice(), codec).unwrap();
        let err = reader.next_record().unwrap_err();
        assert!(matches!(err, CodecError::NameTooLong { len: 10, max: 5 }));
    }
}
