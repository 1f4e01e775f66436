//! Record Tool - tulis, dump, dan verifikasi record file
//!
//! Usage:
//!   cargo run --bin record_tool -- write data.bin --id 101 --name "Alice Smith" --score 3.85
//!   cargo run --bin record_tool -- dump data.bin [--mmap]
//!   cargo run --bin record_tool -- verify [path] [--keep]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{debug, warn, Level};

use recbin::{CodecConfig, CodecError, MmapRecords, Record, RecordCodec, RecordReader, RecordWriter};

#[derive(Parser, Debug)]
#[command(
    name = "record_tool",
    version,
    about = "Write, dump and verify length-prefixed record files"
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Reject names longer than this many bytes
    #[arg(long, global = true, value_name = "BYTES")]
    max_name_len: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a single record to a new file (overwrites)
    Write {
        path: PathBuf,
        #[arg(long, allow_hyphen_values = true)]
        id: i32,
        #[arg(long)]
        name: String,
        #[arg(long, allow_hyphen_values = true)]
        score: f64,
    },
    /// Print every record in a file
    Dump {
        path: PathBuf,
        /// Scan via mmap instead of buffered reads
        #[arg(long)]
        mmap: bool,
    },
    /// Write a sample record, read it back and compare
    Verify {
        #[arg(default_value = "records.bin")]
        path: PathBuf,
        /// Keep the file after verification
        #[arg(long)]
        keep: bool,
    },
}

impl Cli {
    fn codec(&self) -> RecordCodec {
        let config = match self.max_name_len {
            Some(max) => CodecConfig::default().with_max_name_len(max),
            None => CodecConfig::default(),
        };
        RecordCodec::new(config)
    }
}

fn write_record(path: &Path, record: &Record, codec: RecordCodec) -> Result<(), CodecError> {
    let mut writer = RecordWriter::create_with_codec(path, codec)?;
    writer.append(record)?;
    writer.finish_sync()?;
    println!("✅ Wrote {} to {}", record, path.display());
    Ok(())
}

fn dump(path: &Path, use_mmap: bool, codec: RecordCodec) -> Result<(), CodecError> {
    let mut count = 0usize;

    if use_mmap {
        let mapped = MmapRecords::open_with_codec(path, codec)?;
        for record in mapped.iter() {
            println!("{}", record?);
            count += 1;
        }
    } else {
        let reader = RecordReader::open_with_codec(path, codec)?;
        for record in reader {
            println!("{}", record?);
            count += 1;
        }
    }

    println!("📊 {} record(s) in {}", count, path.display());
    Ok(())
}

/// Returns `true` jika record yang dibaca kembali sama persis
fn verify(path: &Path, keep: bool, codec: RecordCodec) -> Result<bool, CodecError> {
    let original = Record::new(101, "Alice Smith", 3.85);
    println!("Original Record: {}", original);

    {
        let mut writer = RecordWriter::create_with_codec(path, codec)?;
        writer.append(&original)?;
        writer.finish_sync()?;
    }
    println!("Record serialized to {}", path.display());

    let restored = {
        let mut reader = RecordReader::open_with_codec(path, codec)?;
        reader.next_record()?
    };

    let matched = match restored {
        Some(record) => {
            println!("Deserialized Record: {}", record);
            record == original
        }
        None => {
            warn!(path = %path.display(), "file contains no records");
            false
        }
    };

    if matched {
        println!("✅ Verification successful! Original and deserialized data match.");
    } else {
        println!("❌ Verification failed! Data mismatch.");
    }

    if !keep {
        if let Err(e) = std::fs::remove_file(path) {
            warn!(path = %path.display(), error = %e, "failed to remove verification file");
        } else {
            debug!(path = %path.display(), "removed verification file");
        }
    }

    Ok(matched)
}

fn run(cli: &Cli) -> Result<bool, CodecError> {
    let codec = cli.codec();
    match &cli.command {
        Command::Write {
            path,
            id,
            name,
            score,
        } => write_record(path, &Record::new(*id, name.as_str(), *score), codec).map(|_| true),
        Command::Dump { path, mmap } => dump(path, *mmap, codec).map(|_| true),
        Command::Verify { path, keep } => verify(path, *keep, codec),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
