// Integration tests for the WAVE loader
//
// These tests verify the end-to-end path from a file on disk to a parsed
// record. They load the checked-in samples, cross-check against files
// written by `hound`, and drive the parser through `config.toml` settings
// the same way the CLI does.
//
// The integration tests ensure:
// 1. Sample files load with the expected header and payload
// 2. Files produced by an independent writer parse to the same samples
// 3. Configuration files map onto parser options correctly

use pretty_assertions::assert_eq;
use std::fs;
use std::io;
use wave_loader::config::{self, Config};
use wave_loader::wave::{
    self, ExtensionMode, FourCc, MagicPolicy, ParseOptions, WaveError, WaveParser,
};

use test_utils::{
    validate_test_files, WaveBuilder, WAV_EXTENSION_CHUNK, WAV_MONO_8BIT_PCM,
    WAV_TRUNCATED_AFTER_FMT,
};

/// Test loading the minimal mono sample from disk.
#[test]
fn test_load_mono_sample() {
    validate_test_files();
    let record = wave::load_wave_file(WAV_MONO_8BIT_PCM).expect("Failed to load sample");

    assert_eq!(record.num_channels, 1);
    assert_eq!(record.sample_rate, 8000);
    assert_eq!(record.subchunk2_size, 4);
    assert_eq!(record.payload, vec![1, 2, 3, 4]);
}

/// Test loading the sample with an extension chunk before "data".
#[test]
fn test_load_extension_sample() {
    let record = wave::load_wave_file(WAV_EXTENSION_CHUNK).expect("Failed to load sample");

    assert_eq!(record.subchunk1_size, 18);
    assert_eq!(record.num_channels, 2);
    assert_eq!(record.subchunk2_size, 8);
    assert_eq!(record.payload, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    assert_eq!(record.extension.map(|e| e.tag), Some(FourCc(*b"fact")));
}

/// Test the truncated sample reports truncation, not a zero-filled record.
#[test]
fn test_load_truncated_sample() {
    let err = wave::load_wave_file(WAV_TRUNCATED_AFTER_FMT).unwrap_err();
    assert!(
        matches!(err, WaveError::TruncatedInput { offset: 16, available: 0, .. }),
        "unexpected error: {:?}",
        err
    );
}

/// Test that a missing file is an IO error.
#[test]
fn test_load_missing_file() {
    match wave::load_wave_file("non_existent_file.wav") {
        Err(WaveError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::NotFound),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

/// Test that built streams written to disk load like in-memory ones.
#[test]
fn test_load_matches_parse_bytes() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("built.wav");
    let bytes = WaveBuilder::pcm(2, 22050, 16)
        .extension(b"LIST", b"INFOabcd")
        .payload(&[1, 2, 3, 4, 5, 6, 7, 8])
        .build();
    fs::write(&path, &bytes).expect("Failed to write sample");

    let from_file = wave::load_wave_file(&path).expect("Failed to load");
    let from_bytes = wave::parse_wave_bytes(&bytes).expect("Failed to parse");
    assert_eq!(from_file, from_bytes);
}

/// Test a file shorter than its declared payload is rejected from the file length.
#[test]
fn test_load_truncated_payload() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("short.wav");
    let bytes = WaveBuilder::pcm(1, 8000, 8)
        .subchunk2_size(1_000_000)
        .payload(&[0; 10])
        .build();
    fs::write(&path, &bytes).expect("Failed to write sample");

    let err = wave::load_wave_file(&path).unwrap_err();
    assert!(matches!(
        err,
        WaveError::TruncatedInput {
            field: "payload",
            needed: 1_000_000,
            available: 10,
            ..
        }
    ));
}

/// Test parsing a 16-bit stereo file written by hound.
///
/// This test verifies:
/// - The header matches the spec hound was given
/// - The payload decodes to the exact samples that were written
#[test]
fn test_hound_written_pcm16() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("stereo.wav");
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: 44100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let samples: Vec<i16> = (0..200).map(|i| ((i * 331) % 65536 - 32768) as i16).collect();
    let mut writer = hound::WavWriter::create(&path, spec).expect("Failed to create writer");
    for &sample in &samples {
        writer.write_sample(sample).expect("Failed to write sample");
    }
    writer.finalize().expect("Failed to finalize");

    let record = wave::load_wave_file(&path).expect("Failed to load hound file");
    assert!(record.is_pcm());
    assert_eq!(record.num_channels, 2);
    assert_eq!(record.sample_rate, 44100);
    assert_eq!(record.bits_per_sample, 16);
    assert_eq!(record.block_align, 4);
    assert_eq!(record.byte_rate, 44100 * 4);
    assert!(record.consistency_issues().is_empty());
    assert_eq!(record.num_frames(), 100);

    let decoded: Vec<i16> = record
        .payload
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    assert_eq!(decoded, samples);

    let reader = hound::WavReader::open(&path).expect("hound failed to reopen");
    assert_eq!(reader.len() as usize, record.payload.len() / 2);
}

/// Test a hound-written 24-bit file with an extensible format chunk.
///
/// The 40-byte format chunk carries untagged extension bytes, so it only
/// parses in format-size mode.
#[test]
fn test_hound_written_extensible_format_size_mode() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("mono24.wav");
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 48000,
        bits_per_sample: 24,
        sample_format: hound::SampleFormat::Int,
    };

    let samples = [0i32, 1, -1, 8_388_607, -8_388_608];
    let mut writer = hound::WavWriter::create(&path, spec).expect("Failed to create writer");
    for &sample in &samples {
        writer.write_sample(sample).expect("Failed to write sample");
    }
    writer.finalize().expect("Failed to finalize");

    let parser = WaveParser::with_options(ParseOptions {
        extension: ExtensionMode::FormatSize,
        ..ParseOptions::default()
    });
    let record = parser.load(&path).expect("Failed to load extensible file");

    assert_eq!(record.subchunk1_size, 40);
    assert_eq!(record.bits_per_sample, 24);
    assert_eq!(record.subchunk2_size, 15);

    let decoded: Vec<i32> = record
        .payload
        .chunks_exact(3)
        .map(|s| i32::from_le_bytes([0, s[0], s[1], s[2]]) >> 8)
        .collect();
    assert_eq!(decoded, samples.to_vec());
}

/// Test that a missing config file yields the defaults.
#[test]
fn test_config_defaults_when_missing() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = config::load_config_from(dir.path().join("config.toml"))
        .expect("missing config should fall back to defaults");

    assert_eq!(config.parser.to_options(), ParseOptions::default());
    assert_eq!(Config::default().parser.to_options(), ParseOptions::default());
}

/// Test that config.toml settings reach the parser options.
#[test]
fn test_config_file_maps_to_options() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[parser]
magic_policy = "warn"
extension_mode = "format_size"
check_consistency = true
max_payload_mb = 2
"#,
    )
    .expect("Failed to write config");

    let options = config::load_config_from(&path)
        .expect("Failed to load config")
        .parser
        .to_options();

    assert_eq!(
        options,
        ParseOptions {
            magic: MagicPolicy::Warn,
            extension: ExtensionMode::FormatSize,
            check_consistency: true,
            max_payload_len: Some(2 * 1024 * 1024),
        }
    );
}

/// Test that a partial config keeps defaults for the rest, and bad values fail.
#[test]
fn test_config_partial_and_invalid() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    let partial = dir.path().join("partial.toml");
    fs::write(&partial, "[parser]\nextension_mode = \"tagged\"\n").expect("write failed");
    let options = config::load_config_from(&partial)
        .expect("Failed to load partial config")
        .parser
        .to_options();
    assert_eq!(options, ParseOptions::default());

    let invalid = dir.path().join("invalid.toml");
    fs::write(&invalid, "[parser]\nmagic_policy = \"ignore\"\n").expect("write failed");
    assert!(config::load_config_from(&invalid).is_err());
}

/// Test the JSON form of the header summary.
#[test]
fn test_summary_json() {
    let record = wave::load_wave_file(WAV_EXTENSION_CHUNK).expect("Failed to load sample");
    let json = serde_json::to_value(record.summary()).expect("Failed to serialize");

    assert_eq!(json["chunk_id"], "RIFF");
    assert_eq!(json["subchunk1_id"], "fmt ");
    assert_eq!(json["subchunk2_id"], "data");
    assert_eq!(json["sample_rate"], 8000);
    assert_eq!(json["extension"]["tag"], "fact");
    assert_eq!(json["extension"]["len"], 2);
    assert_eq!(json["num_frames"], 2);
    assert!(json.get("payload").is_none());
}
