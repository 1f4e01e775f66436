//! Record file integration test
//!
//! Tulis record ke file sungguhan, baca kembali lewat buffered reader dan mmap.
//!
//! Usage:
//!   cargo test --test record_file_test

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};

use recbin::storage::{FILE_HEADER_SIZE, FILE_MAGIC};
use recbin::{encode, CodecError, Field, MmapRecords, Record, RecordReader, RecordWriter};
use tempfile::tempdir;

fn sample_records() -> Vec<Record> {
    vec![
        Record::new(101, "Alice Smith", 3.85),
        Record::new(102, "", 0.0),
        Record::new(-1, "nul\0inside", -273.15),
        Record::new(i32::MAX, "日本語の名前", f64::MAX),
        Record::new(i32::MIN, "x".repeat(10_000), f64::MIN_POSITIVE),
    ]
}

#[test]
fn test_alice_file_roundtrip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("students.bin");

    let original = Record::new(101, "Alice Smith", 3.85);
    {
        let mut writer = RecordWriter::create(&path).unwrap();
        writer.append(&original).unwrap();
        writer.finish_sync().unwrap();
    }

    // Header + 20 bytes fixed + 11 bytes name
    assert_eq!(
        fs::metadata(&path).unwrap().len(),
        (FILE_HEADER_SIZE + 31) as u64
    );

    let mut reader = RecordReader::open(&path).unwrap();
    let restored = reader.next_record().unwrap().unwrap();
    assert_eq!(restored, original);
    assert!(reader.next_record().unwrap().is_none());
}

#[test]
fn test_buffered_and_mmap_agree() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("many.bin");
    let records = sample_records();

    let mut writer = RecordWriter::create(&path).unwrap();
    for record in &records {
        writer.append(record).unwrap();
    }
    assert_eq!(writer.records_written(), records.len() as u64);
    writer.finish_sync().unwrap();

    let buffered = RecordReader::open(&path).unwrap().read_all().unwrap();
    let mapped = MmapRecords::open(&path).unwrap().read_all().unwrap();

    assert_eq!(buffered, records);
    assert_eq!(mapped, records);
}

#[test]
fn test_file_body_is_plain_encoding() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("body.bin");
    let records = sample_records();

    let mut writer = RecordWriter::create(&path).unwrap();
    for record in &records {
        writer.append(record).unwrap();
    }
    writer.finish().unwrap();

    let bytes = fs::read(&path).unwrap();
    assert_eq!(&bytes[..4], &FILE_MAGIC);

    let body: Vec<u8> = records.iter().flat_map(encode).collect();
    assert_eq!(&bytes[FILE_HEADER_SIZE..], body.as_slice());
}

#[test]
fn test_truncated_file_reports_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cut.bin");

    let mut writer = RecordWriter::create(&path).unwrap();
    writer.append(&Record::new(1, "kept", 1.0)).unwrap();
    writer.append(&Record::new(2, "lost in the crash", 2.0)).unwrap();
    writer.finish_sync().unwrap();

    // Potong di tengah length prefix record kedua
    let full = fs::metadata(&path).unwrap().len();
    let cut = full - ("lost in the crash".len() as u64) - 4;
    OpenOptions::new()
        .write(true)
        .open(&path)
        .unwrap()
        .set_len(cut)
        .unwrap();

    let results: Vec<_> = RecordReader::open(&path).unwrap().collect();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].as_ref().unwrap().id, 1);
    assert!(matches!(
        results[1],
        Err(CodecError::Truncated {
            field: Field::NameLength
        })
    ));

    let mapped = MmapRecords::open(&path).unwrap();
    let mut iter = mapped.iter();
    assert!(iter.next().unwrap().is_ok());
    assert!(iter.next().unwrap().unwrap_err().is_truncated());
    assert!(iter.next().is_none());
}

#[test]
fn test_foreign_file_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("foreign.bin");

    let mut file = BufWriter::new(File::create(&path).unwrap());
    file.write_all(b"PK\x03\x04 not a record file").unwrap();
    file.flush().unwrap();
    drop(file);

    assert!(matches!(
        RecordReader::open(&path).err().unwrap(),
        CodecError::BadMagic { .. }
    ));
    assert!(matches!(
        MmapRecords::open(&path).err().unwrap(),
        CodecError::BadMagic { .. }
    ));
}

#[test]
fn test_rewrite_replaces_contents() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rewrite.bin");

    let mut writer = RecordWriter::create(&path).unwrap();
    writer.append(&Record::new(1, "old", 0.0)).unwrap();
    writer.append(&Record::new(2, "old", 0.0)).unwrap();
    writer.finish().unwrap();

    let mut writer = RecordWriter::create(&path).unwrap();
    writer.append(&Record::new(3, "new", 0.0)).unwrap();
    writer.finish().unwrap();

    let records = RecordReader::open(&path).unwrap().read_all().unwrap();
    assert_eq!(records, vec![Record::new(3, "new", 0.0)]);
}
