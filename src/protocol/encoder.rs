//! Record Encoder/Decoder
//!
//! Encode langsung ke `Vec<u8>` atau ke sembarang `Write` sink,
//! decode dari sembarang `Read` source secara sequential, satu pass.

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::error::CodecError;
use super::record::{Field, Record, ID_WIDTH};

/// Batas pre-allocation untuk name payload.
///
/// Buffer tumbuh mengikuti bytes yang benar-benar ada, sehingga length prefix
/// yang korup tidak bisa memaksa alokasi besar sebelum truncation terdeteksi.
const NAME_PREALLOC_LIMIT: usize = 64 * 1024;

/// Konfigurasi codec
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodecConfig {
    /// Panjang maksimum name dalam bytes. `None` = dibatasi memory saja.
    pub max_name_len: Option<u64>,
}

impl CodecConfig {
    /// Set batas panjang name
    pub fn with_max_name_len(mut self, max: u64) -> Self {
        self.max_name_len = Some(max);
        self
    }
}

/// Stateless record codec
///
/// Aman dipakai bersamaan dari banyak thread selama setiap call
/// memegang sink/source-nya sendiri.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordCodec {
    config: CodecConfig,
}

impl RecordCodec {
    /// Membuat codec dengan konfigurasi tertentu
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Konfigurasi yang dipakai codec ini
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    #[inline(always)]
    fn check_name_len(&self, len: u64) -> Result<(), CodecError> {
        match self.config.max_name_len {
            Some(max) if len > max => Err(CodecError::NameTooLong { len, max }),
            _ => Ok(()),
        }
    }

    /// Encode record ke buffer baru
    pub fn encode(&self, record: &Record) -> Result<Vec<u8>, CodecError> {
        self.check_name_len(record.name.len() as u64)?;
        let mut buf = Vec::with_capacity(record.encoded_len());
        write_record(&mut buf, record);
        Ok(buf)
    }

    /// Encode record langsung ke sink.
    ///
    /// Error dari sink diteruskan tanpa diubah sebagai `CodecError::Io`.
    pub fn encode_into<W: Write + ?Sized>(
        &self,
        writer: &mut W,
        record: &Record,
    ) -> Result<(), CodecError> {
        self.check_name_len(record.name.len() as u64)?;

        writer.write_i32::<LittleEndian>(record.id)?;
        writer.write_f64::<LittleEndian>(record.score)?;
        writer.write_u64::<LittleEndian>(record.name.len() as u64)?;
        writer.write_all(record.name.as_bytes())?;
        Ok(())
    }

    /// Decode satu record dari source.
    ///
    /// Source yang sudah habis sebelum byte pertama dianggap truncated.
    pub fn decode<R: Read>(&self, reader: &mut R) -> Result<Record, CodecError> {
        self.decode_next(reader)?
            .ok_or(CodecError::truncated(Field::Id))
    }

    /// Decode record berikutnya dari stream.
    ///
    /// Returns `Ok(None)` jika source habis tepat di batas record (nol bytes tersedia).
    /// Record hanya dikembalikan jika semua field lengkap.
    pub fn decode_next<R: Read>(&self, reader: &mut R) -> Result<Option<Record>, CodecError> {
        let mut id_bytes = [0u8; ID_WIDTH];
        match read_up_to(reader, &mut id_bytes)? {
            0 => return Ok(None),
            n if n < ID_WIDTH => return Err(CodecError::truncated(Field::Id)),
            _ => {}
        }
        let id = i32::from_le_bytes(id_bytes);

        let score = reader
            .read_f64::<LittleEndian>()
            .map_err(|e| CodecError::from_read(e, Field::Score))?;

        let name_len = reader
            .read_u64::<LittleEndian>()
            .map_err(|e| CodecError::from_read(e, Field::NameLength))?;

        // Cek limit sebelum membaca payload
        self.check_name_len(name_len)?;
        let name = read_name(reader, name_len)?;

        Ok(Some(Record { id, name, score }))
    }
}

/// Encode record dengan konfigurasi default. Tidak pernah gagal.
pub fn encode(record: &Record) -> Vec<u8> {
    let mut buf = Vec::with_capacity(record.encoded_len());
    write_record(&mut buf, record);
    buf
}

/// Encode record ke sink dengan konfigurasi default
pub fn encode_into<W: Write + ?Sized>(writer: &mut W, record: &Record) -> Result<(), CodecError> {
    RecordCodec::default().encode_into(writer, record)
}

/// Decode record dari source dengan konfigurasi default
pub fn decode<R: Read>(reader: &mut R) -> Result<Record, CodecError> {
    RecordCodec::default().decode(reader)
}

/// Decode record dari awal slice.
///
/// Returns record dan jumlah bytes yang dikonsumsi.
pub fn decode_from_slice(buf: &[u8]) -> Result<(Record, usize), CodecError> {
    let mut cursor = buf;
    let record = decode(&mut cursor)?;
    Ok((record, buf.len() - cursor.len()))
}

#[inline(always)]
fn write_record(buf: &mut Vec<u8>, record: &Record) {
    buf.extend_from_slice(&record.id.to_le_bytes());
    buf.extend_from_slice(&record.score.to_le_bytes());
    buf.extend_from_slice(&(record.name.len() as u64).to_le_bytes());
    buf.extend_from_slice(record.name.as_bytes());
}

/// Baca sampai `buf` penuh atau source habis. Returns jumlah bytes terbaca.
///
/// Source boleh menandai habis lewat `Ok(0)` atau `UnexpectedEof`.
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize, CodecError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(ref e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(CodecError::Io(e)),
        }
    }
    Ok(filled)
}

fn read_name<R: Read>(reader: &mut R, len: u64) -> Result<String, CodecError> {
    // Payload lebih besar dari address space tidak mungkin lengkap
    let expected = usize::try_from(len).map_err(|_| CodecError::truncated(Field::Name))?;

    let mut bytes = Vec::with_capacity(expected.min(NAME_PREALLOC_LIMIT));
    // take() menjamin tidak ada over-read melewati payload
    (&mut *reader)
        .take(len)
        .read_to_end(&mut bytes)
        .map_err(|e| CodecError::from_read(e, Field::Name))?;

    if bytes.len() != expected {
        return Err(CodecError::truncated(Field::Name));
    }

    String::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)
}

/// Pre-allocated encoder buffer
///
/// Record di-append ke buffer internal, cocok untuk batching banyak record
/// menjadi satu write.
pub struct Encoder {
    buffer: Vec<u8>,
    codec: RecordCodec,
    records: usize,
}

impl Encoder {
    /// Membuat encoder dengan kapasitas awal tertentu
    pub fn new(capacity: usize) -> Self {
        Self::with_codec(capacity, RecordCodec::default())
    }

    /// Membuat encoder dengan codec tertentu (mis. dengan batas name)
    pub fn with_codec(capacity: usize, codec: RecordCodec) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            codec,
            records: 0,
        }
    }

    /// Reset encoder untuk reuse. Kapasitas buffer dipertahankan.
    #[inline(always)]
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.records = 0;
    }

    /// Append satu record ke buffer
    ///
    /// Returns slice ke bytes record yang baru di-encode.
    pub fn encode(&mut self, record: &Record) -> Result<&[u8], CodecError> {
        self.codec.check_name_len(record.name.len() as u64)?;

        let start = self.buffer.len();
        write_record(&mut self.buffer, record);
        self.records += 1;

        Ok(&self.buffer[start..])
    }

    /// Get current buffer content
    #[inline(always)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Jumlah record di buffer sejak reset terakhir
    #[inline(always)]
    pub fn record_count(&self) -> usize {
        self.records
    }
}

/// Zero-copy decoder di atas slice
///
/// Berhenti (fused) setelah error pertama, karena posisi record berikutnya
/// tidak bisa diketahui lagi.
pub struct Decoder<'a> {
    buffer: &'a [u8],
    read_pos: usize,
    codec: RecordCodec,
    failed: bool,
}

impl<'a> Decoder<'a> {
    /// Membuat decoder dari buffer
    pub fn new(buffer: &'a [u8]) -> Self {
        Self::with_codec(buffer, RecordCodec::default())
    }

    /// Membuat decoder dengan codec tertentu
    pub fn with_codec(buffer: &'a [u8], codec: RecordCodec) -> Self {
        Self {
            buffer,
            read_pos: 0,
            codec,
            failed: false,
        }
    }

    /// Offset record berikutnya di dalam buffer
    #[inline(always)]
    pub fn position(&self) -> usize {
        self.read_pos
    }

    /// Remaining bytes
    #[inline(always)]
    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.read_pos)
    }
}

impl<'a> Iterator for Decoder<'a> {
    type Item = Result<Record, CodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.remaining() == 0 {
            return None;
        }

        let mut cursor = &self.buffer[self.read_pos..];
        let before = cursor.len();

        match self.codec.decode(&mut cursor) {
            Ok(record) => {
                self.read_pos += before - cursor.len();
                Some(Ok(record))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
