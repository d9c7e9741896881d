/// WAVE parsing module for turning a RIFF/WAVE byte stream into a [`WaveRecord`].
///
/// This module provides functionality to:
/// - Decode little-endian integers independently of the host byte order
/// - Read exact-length fields from any byte source, bounded by what is left
/// - Parse the canonical `fmt `/`data` layout, skipping one extension chunk
/// - Load a WAVE file from disk
mod endian;
mod parser;
mod reader;
mod types;

pub use endian::{decode_le, decode_le_on, ByteOrder};
pub use parser::{
    load_wave_file, parse_wave, parse_wave_bytes, ExtensionMode, MagicPolicy, ParseOptions,
    WaveParser,
};
pub use reader::FieldReader;
pub use types::{FourCc, SkippedChunk, WaveError, WaveRecord, WaveSummary, PCM_FORMAT};
