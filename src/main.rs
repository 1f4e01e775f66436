//! Recbin - Length-Prefixed Binary Record Codec
//!
//! Demo latency untuk setiap layer:
//! - Encode: record -> bytes (pre-allocated Encoder)
//! - Decode: bytes -> record (slice Decoder)
//! - Mmap scan: record file -> records tanpa read() per record

use std::time::Instant;

use recbin::{decode, encode, CodecError, Decoder, Encoder, MmapRecords, Record, RecordWriter};

fn main() -> Result<(), CodecError> {
    println!("📦 Recbin Record Codec - v0.1");
    println!("=============================\n");

    let original = Record::new(101, "Alice Smith", 3.85);
    let bytes = encode(&original);
    let decoded = decode(&mut bytes.as_slice())?;
    println!("  Original: {}", original);
    println!("  Encoded:  {} bytes", bytes.len());
    println!("  Decoded:  {}", decoded);
    println!(
        "  Match:    {}\n",
        if decoded == original { "✅" } else { "❌" }
    );

    benchmark_encode()?;
    benchmark_decode()?;
    benchmark_mmap_scan()?;

    println!("\n✅ All benchmarks complete!");
    println!("\nTo inspect a file: cargo run --release --bin record_tool -- dump <path>");
    Ok(())
}

fn sample_records(count: usize, name_len: usize) -> Vec<Record> {
    let name = "x".repeat(name_len);
    (0..count)
        .map(|i| Record::new(i as i32, name.clone(), i as f64 * 0.5))
        .collect()
}

fn benchmark_encode() -> Result<(), CodecError> {
    println!("📊 Encode Benchmark (Reusable Buffer)");
    println!("-------------------------------------");

    const ITERATIONS: usize = 1_000_000;
    const NAME_LEN: usize = 32;

    let records = sample_records(1024, NAME_LEN);
    let mut encoder = Encoder::new(1024 * 1024); // 1MB buffer

    let start = Instant::now();
    for i in 0..ITERATIONS {
        if encoder.len() > 512 * 1024 {
            encoder.reset();
        }
        encoder.encode(&records[i % records.len()])?;
    }
    let duration = start.elapsed();

    let ns = duration.as_nanos() as f64 / ITERATIONS as f64;
    println!("  Name size: {} bytes", NAME_LEN);
    println!("  Operations: {}", ITERATIONS);
    println!("  Encode latency: {:.2} ns/op ({:.3} μs/op)", ns, ns / 1000.0);
    println!(
        "  Throughput:     {:.2} M records/sec\n",
        ITERATIONS as f64 / duration.as_secs_f64() / 1_000_000.0
    );
    Ok(())
}

fn benchmark_decode() -> Result<(), CodecError> {
    println!("📊 Decode Benchmark (Slice Decoder)");
    println!("-----------------------------------");

    const ROUNDS: usize = 100;
    const RECORDS: usize = 10_000;

    let mut encoder = Encoder::new(1024 * 1024);
    for record in &sample_records(RECORDS, 32) {
        encoder.encode(record)?;
    }
    let encoded = encoder.as_bytes().to_vec();

    let start = Instant::now();
    let mut decoded = 0usize;
    for _ in 0..ROUNDS {
        for record in Decoder::new(&encoded) {
            record?;
            decoded += 1;
        }
    }
    let duration = start.elapsed();

    let ns = duration.as_nanos() as f64 / decoded as f64;
    println!("  Records decoded: {}", decoded);
    println!("  Decode latency: {:.2} ns/op ({:.3} μs/op)\n", ns, ns / 1000.0);
    Ok(())
}

fn benchmark_mmap_scan() -> Result<(), CodecError> {
    println!("📊 Mmap Scan Benchmark (Zero-Copy)");
    println!("----------------------------------");

    const RECORDS: usize = 100_000;

    let path = std::env::temp_dir().join("recbin_bench.bin");
    let mut writer = RecordWriter::create(&path)?;

    let start = Instant::now();
    for record in &sample_records(RECORDS, 48) {
        writer.append(record)?;
    }
    writer.finish_sync()?;
    let write_duration = start.elapsed();

    let mapped = MmapRecords::open(&path)?;
    let start = Instant::now();
    let mut count = 0usize;
    for record in mapped.iter() {
        record?;
        count += 1;
    }
    let scan_duration = start.elapsed();

    println!("  File size: {} bytes", mapped.len_bytes());
    println!("  Records: {}", count);
    println!(
        "  Write latency: {:.2} ns/record",
        write_duration.as_nanos() as f64 / RECORDS as f64
    );
    println!(
        "  Scan latency:  {:.2} ns/record",
        scan_duration.as_nanos() as f64 / count.max(1) as f64
    );
    println!(
        "  Scan throughput: {:.2} MB/sec",
        mapped.len_bytes() as f64 / scan_duration.as_secs_f64() / 1_000_000.0
    );

    drop(mapped);
    std::fs::remove_file(&path).ok();
    Ok(())
}
