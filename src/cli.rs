use clap::Parser;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wave_loader::config;
use wave_loader::wave::{
    ExtensionMode, MagicPolicy, WaveError, WaveParser, WaveRecord, PCM_FORMAT,
};

/// Inspect the header and payload of a WAVE audio file
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the input WAV file
    #[arg(required = true)]
    wav_file: String,

    /// Print the header as JSON instead of a table
    #[arg(short, long)]
    json: bool,

    /// Reject files whose byte rate or block alignment don't add up
    #[arg(short, long)]
    strict: bool,

    /// Warn about bad chunk tags instead of failing
    #[arg(long)]
    lenient_magic: bool,

    /// Skip format extension bytes declared by the fmt chunk size
    #[arg(long)]
    format_size: bool,

    /// Configuration file to use instead of ./config.toml
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wave_loader=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn build_parser(cli: &Cli) -> Result<WaveParser, Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => config::load_config_from(path)?,
        None => config::load_config()?,
    };

    // Flags override the config file
    let mut options = config.parser.to_options();
    if cli.strict {
        options.check_consistency = true;
    }
    if cli.lenient_magic {
        options.magic = MagicPolicy::Warn;
    }
    if cli.format_size {
        options.extension = ExtensionMode::FormatSize;
    }
    tracing::debug!(?options, "parser options");

    Ok(WaveParser::with_options(options))
}

fn print_record(record: &WaveRecord) {
    let summary = record.summary();
    let format_name = if summary.audio_format == PCM_FORMAT {
        "PCM"
    } else {
        "compressed"
    };

    println!("WAVE File Information:");
    println!("----------------------");
    println!("Chunk:           {} ({} bytes)", summary.chunk_id, summary.chunk_size);
    println!("Format:          {}", summary.format);
    println!("Format chunk:    {} ({} bytes)", summary.subchunk1_id, summary.subchunk1_size);
    println!("Audio format:    {} ({})", summary.audio_format, format_name);
    println!("Channels:        {}", summary.num_channels);
    println!("Sample rate:     {} Hz", summary.sample_rate);
    println!("Byte rate:       {} bytes/s", summary.byte_rate);
    println!("Block align:     {} bytes", summary.block_align);
    println!("Bits per sample: {}", summary.bits_per_sample);
    if let Some(extension) = summary.extension {
        println!("Skipped chunk:   {} ({} bytes)", extension.tag, extension.len);
    }
    println!("Data chunk:      {} ({} bytes)", summary.subchunk2_id, summary.subchunk2_size);
    println!("Frames:          {}", summary.num_frames);
    println!("Duration:        {:.3} s", summary.duration_secs);

    for issue in record.consistency_issues() {
        println!("Warning: {}", issue);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let wav_path = Path::new(&cli.wav_file);
    if !wav_path.exists() {
        return Err(WaveError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("WAV file not found: {}", cli.wav_file),
        ))
        .into());
    }

    let parser = build_parser(&cli)?;
    let record = parser.load(wav_path)?;

    if cli.json {
        let json = serde_json::to_string_pretty(&record.summary())?;
        writeln!(io::stdout(), "{}", json)?;
    } else {
        print_record(&record);
    }

    Ok(())
}

fn main() {
    init_tracing();

    if let Err(err) = run() {
        eprintln!("\nERROR: {}\n", err);
        match err.downcast_ref::<WaveError>() {
            Some(WaveError::Io(ref io_err)) if io_err.kind() == io::ErrorKind::NotFound => {
                eprintln!("Please check that:");
                eprintln!("1. The file path is correct");
                eprintln!("2. The file exists");
                eprintln!("3. You have permission to read the file");
            }
            Some(WaveError::InvalidFormat { .. }) => {
                eprintln!("Use --lenient-magic to parse the file anyway.");
            }
            Some(WaveError::TruncatedInput { .. }) => {
                eprintln!("The file ends before its declared sizes; it may be incomplete.");
            }
            _ => {}
        }
        process::exit(1);
    }
}
