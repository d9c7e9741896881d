use super::reader::FieldReader;
use super::types::{FourCc, SkippedChunk, WaveError, WaveRecord};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, warn};

/// Size of the canonical PCM format subchunk body
const CANONICAL_FMT_SIZE: u32 = 16;

/// What to do when a chunk tag is not the expected magic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MagicPolicy {
    /// Fail with `InvalidFormat`
    #[default]
    Reject,
    /// Log a warning and keep parsing
    Warn,
}

/// How bytes between the format fields and `data` are located
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum ExtensionMode {
    /// A tag other than `data` starts a chunk: 4-byte tag, 4-byte length, body.
    #[default]
    #[serde(rename = "tagged", alias = "tagged_chunk")]
    TaggedChunk,
    /// First skip `subchunk1_size - 16` bytes of format extension, then
    /// look for a tagged chunk as above.
    #[serde(rename = "format_size")]
    FormatSize,
}

/// Options controlling how strict a [`WaveParser`] is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions {
    /// Handling of mismatched RIFF, WAVE, fmt and data tags
    pub magic: MagicPolicy,
    /// How the bytes before the data chunk are skipped
    pub extension: ExtensionMode,
    /// Reject headers whose `byte_rate` or `block_align` disagree with the
    /// channel count, sample rate and bit depth
    pub check_consistency: bool,
    /// Largest payload, in bytes, the parser will allocate
    pub max_payload_len: Option<u64>,
}

/// Parses WAVE streams into [`WaveRecord`]s.
///
/// A parser holds no state between calls; one instance can parse any
/// number of sources, from any number of threads.
#[derive(Debug, Clone, Default)]
pub struct WaveParser {
    options: ParseOptions,
}

impl WaveParser {
    /// Creates a parser with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser with the given options.
    pub fn with_options(options: ParseOptions) -> Self {
        WaveParser { options }
    }

    /// The options this parser was created with
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parses a WAVE stream from a source of unknown length.
    ///
    /// The source must be positioned at the `RIFF` tag. It is read strictly
    /// forward and never past the end of the payload.
    ///
    /// # Arguments
    /// * `source` - Any byte source, e.g. an open file or a network stream
    ///
    /// # Returns
    /// * `Result<WaveRecord, WaveError>` - The complete record or an error
    ///
    /// # Errors
    /// * `InvalidFormat` if a magic tag mismatches and the policy is `Reject`
    /// * `TruncatedInput` if the source ends before the record is complete
    /// * `AllocationFailure` if the payload cannot be allocated
    /// * `Inconsistent` if consistency checks are enabled and fail
    pub fn parse<R: Read>(&self, source: R) -> Result<WaveRecord, WaveError> {
        self.parse_fields(FieldReader::new(source))
    }

    /// Parses a WAVE stream held in memory.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<WaveRecord, WaveError> {
        self.parse_fields(FieldReader::with_len(bytes, bytes.len() as u64))
    }

    /// Opens and parses a WAVE file.
    ///
    /// For regular files the file length bounds every length-prefixed read,
    /// so a corrupt size field fails before the payload is allocated.
    ///
    /// # Arguments
    /// * `path` - Path to the WAVE file to read
    ///
    /// # Errors
    /// * `Io` if the file cannot be opened or read
    /// * Any error from [`WaveParser::parse`]
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<WaveRecord, WaveError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let metadata = file.metadata()?;
        debug!(path = %path.display(), len = metadata.len(), "loading wave file");

        let source = BufReader::new(file);
        if metadata.is_file() {
            self.parse_fields(FieldReader::with_len(source, metadata.len()))
        } else {
            self.parse_fields(FieldReader::new(source))
        }
    }

    fn parse_fields<R: Read>(&self, mut reader: FieldReader<R>) -> Result<WaveRecord, WaveError> {
        // RIFF header
        let chunk_id = reader.read_tag("chunk_id")?;
        self.expect_tag("chunk_id", FourCc::RIFF, chunk_id)?;
        let chunk_size = reader.read_u32("chunk_size")?;
        let format = reader.read_tag("format")?;
        self.expect_tag("format", FourCc::WAVE, format)?;

        // "fmt " subchunk
        let subchunk1_id = reader.read_tag("subchunk1_id")?;
        self.expect_tag("subchunk1_id", FourCc::FMT, subchunk1_id)?;
        let subchunk1_size = reader.read_u32("subchunk1_size")?;
        let audio_format = reader.read_u16("audio_format")?;
        let num_channels = reader.read_u16("num_channels")?;
        let sample_rate = reader.read_u32("sample_rate")?;
        let byte_rate = reader.read_u32("byte_rate")?;
        let block_align = reader.read_u16("block_align")?;
        let bits_per_sample = reader.read_u16("bits_per_sample")?;

        if self.options.extension == ExtensionMode::FormatSize
            && subchunk1_size > CANONICAL_FMT_SIZE
        {
            let extra = u64::from(subchunk1_size - CANONICAL_FMT_SIZE);
            debug!(extra, "skipping format extension bytes");
            reader.skip(extra, "format extension")?;
        }

        // "data" subchunk, possibly behind one extension chunk
        let lookahead = reader.read_tag("subchunk2_id")?;
        let (subchunk2_id, extension) = if lookahead == FourCc::DATA {
            (lookahead, None)
        } else {
            let len = reader.read_u32("extension length")?;
            debug!(tag = %lookahead, len, offset = reader.position(), "skipping extension chunk");
            reader.skip(u64::from(len), "extension body")?;

            let id = reader.read_tag("subchunk2_id")?;
            self.expect_tag("subchunk2_id", FourCc::DATA, id)?;
            (id, Some(SkippedChunk { tag: lookahead, len }))
        };
        let subchunk2_size = reader.read_u32("subchunk2_size")?;

        let record_header = WaveRecord {
            chunk_id: chunk_id.to_decoded(),
            chunk_size,
            format: format.to_decoded(),
            subchunk1_id: subchunk1_id.to_decoded(),
            subchunk1_size,
            audio_format,
            num_channels,
            sample_rate,
            byte_rate,
            block_align,
            bits_per_sample,
            subchunk2_id: subchunk2_id.to_decoded(),
            subchunk2_size,
            payload: Vec::new(),
            extension,
        };

        if self.options.check_consistency {
            let issues = record_header.consistency_issues();
            if !issues.is_empty() {
                return Err(WaveError::Inconsistent(issues.join("; ")));
            }
        }

        let payload = reader.read_payload(
            u64::from(subchunk2_size),
            self.options.max_payload_len,
            "payload",
        )?;
        debug!(
            channels = num_channels,
            sample_rate,
            bits_per_sample,
            payload_len = payload.len(),
            "parsed wave stream"
        );

        Ok(WaveRecord {
            payload,
            ..record_header
        })
    }

    fn expect_tag(
        &self,
        field: &'static str,
        expected: FourCc,
        found: FourCc,
    ) -> Result<(), WaveError> {
        if found == expected {
            return Ok(());
        }

        match self.options.magic {
            MagicPolicy::Reject => Err(WaveError::InvalidFormat {
                field,
                expected,
                found,
            }),
            MagicPolicy::Warn => {
                warn!(field, %expected, %found, "unexpected chunk tag, continuing anyway");
                Ok(())
            }
        }
    }
}

/// Parses a WAVE stream with default options.
pub fn parse_wave<R: Read>(source: R) -> Result<WaveRecord, WaveError> {
    WaveParser::new().parse(source)
}

/// Parses an in-memory WAVE stream with default options.
pub fn parse_wave_bytes(bytes: &[u8]) -> Result<WaveRecord, WaveError> {
    WaveParser::new().parse_bytes(bytes)
}

/// Reads and parses a WAVE file with default options.
///
/// # Arguments
/// * `path` - Path to the WAVE file to read
///
/// # Returns
/// * `Result<WaveRecord, WaveError>` - Parsed record or an error
pub fn load_wave_file<P: AsRef<Path>>(path: P) -> Result<WaveRecord, WaveError> {
    WaveParser::new().load(path)
}
