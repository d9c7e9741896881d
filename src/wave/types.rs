use super::endian::decode_le;
use serde::{Serialize, Serializer};
use std::fmt;

/// `audio_format` value for uncompressed linear PCM
pub const PCM_FORMAT: u16 = 1;

/// A four character chunk tag such as `RIFF` or `fmt `.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCc(pub [u8; 4]);

impl FourCc {
    pub const RIFF: FourCc = FourCc(*b"RIFF");
    pub const WAVE: FourCc = FourCc(*b"WAVE");
    pub const FMT: FourCc = FourCc(*b"fmt ");
    pub const DATA: FourCc = FourCc(*b"data");

    /// Recovers the tag from the integer it was decoded into.
    ///
    /// Tags are stored as decoded little-endian integers, so writing the
    /// integer back out little-endian gives the original four bytes.
    pub fn from_decoded(value: u32) -> Self {
        FourCc(value.to_le_bytes())
    }

    /// The tag bytes decoded as a little-endian integer
    pub fn to_decoded(self) -> u32 {
        decode_le(&self.0) as u32
    }
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{}", byte.escape_ascii())?;
        }
        Ok(())
    }
}

impl fmt::Debug for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCc(\"{}\")", self)
    }
}

impl Serialize for FourCc {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A chunk that sat between the format fields and `data` and was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SkippedChunk {
    /// Tag read in place of `data`
    pub tag: FourCc,
    /// Declared body length, all of which was discarded
    pub len: u32,
}

/// Represents a parsed WAVE file: every header field in file order plus the raw samples.
///
/// The four tag fields hold the tag bytes decoded as little-endian integers;
/// use [`WaveRecord::chunk_tag`] and friends to get them back as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveRecord {
    /// `RIFF`
    pub chunk_id: u32,
    /// Size of the rest of the file after this field (file size - 8)
    pub chunk_size: u32,
    /// `WAVE`
    pub format: u32,
    /// `fmt `
    pub subchunk1_id: u32,
    /// 16 for canonical PCM, larger when format extension bytes follow
    pub subchunk1_size: u32,
    /// 1 for PCM, anything else is a compressed encoding
    pub audio_format: u16,
    /// Mono = 1, Stereo = 2, etc.
    pub num_channels: u16,
    /// Samples per second per channel
    pub sample_rate: u32,
    /// sample_rate * num_channels * bits_per_sample / 8
    pub byte_rate: u32,
    /// Bytes per frame across all channels
    pub block_align: u16,
    /// Bit depth of one sample
    pub bits_per_sample: u16,
    /// `data`
    pub subchunk2_id: u32,
    /// Length of `payload` in bytes
    pub subchunk2_size: u32,
    /// Raw interleaved samples, exactly `subchunk2_size` bytes
    pub payload: Vec<u8>,
    /// The extension chunk skipped before `data`, if there was one
    pub extension: Option<SkippedChunk>,
}

impl WaveRecord {
    /// `chunk_id` as its tag, normally `RIFF`
    pub fn chunk_tag(&self) -> FourCc {
        FourCc::from_decoded(self.chunk_id)
    }

    /// `format` as its tag, normally `WAVE`
    pub fn format_tag(&self) -> FourCc {
        FourCc::from_decoded(self.format)
    }

    /// `subchunk1_id` as its tag, normally `fmt `
    pub fn subchunk1_tag(&self) -> FourCc {
        FourCc::from_decoded(self.subchunk1_id)
    }

    /// `subchunk2_id` as its tag, normally `data`
    pub fn subchunk2_tag(&self) -> FourCc {
        FourCc::from_decoded(self.subchunk2_id)
    }

    /// True for uncompressed linear PCM
    pub fn is_pcm(&self) -> bool {
        self.audio_format == PCM_FORMAT
    }

    /// Bytes per frame as implied by the channel count and bit depth,
    /// rounding partial bytes up.
    pub fn bytes_per_frame(&self) -> u32 {
        u32::from(self.num_channels) * u32::from(self.bits_per_sample).div_ceil(8)
    }

    /// Number of whole frames in the payload, using `block_align`.
    pub fn num_frames(&self) -> usize {
        match self.block_align {
            0 => 0,
            align => self.payload.len() / usize::from(align),
        }
    }

    /// Length of the audio in seconds, or 0.0 when the sample rate is zero.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.num_frames() as f64 / f64::from(self.sample_rate)
    }

    /// Lists arithmetic disagreements between the format fields.
    ///
    /// Nothing here is checked during a default parse; an empty list means
    /// `byte_rate` and `block_align` match the channel count, sample rate
    /// and bit depth.
    ///
    /// # Returns
    /// * `Vec<String>` - One human readable message per mismatch
    pub fn consistency_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        let frame = u64::from(self.num_channels) * u64::from(self.bits_per_sample) / 8;

        let expected_byte_rate = u64::from(self.sample_rate) * frame;
        if u64::from(self.byte_rate) != expected_byte_rate {
            issues.push(format!(
                "byte_rate is {} but sample_rate * num_channels * bits_per_sample / 8 is {}",
                self.byte_rate, expected_byte_rate
            ));
        }

        if u64::from(self.block_align) != frame {
            issues.push(format!(
                "block_align is {} but num_channels * bits_per_sample / 8 is {}",
                self.block_align, frame
            ));
        }

        issues
    }

    /// Header-only view of the record, suitable for printing or serializing
    pub fn summary(&self) -> WaveSummary {
        WaveSummary {
            chunk_id: self.chunk_tag(),
            chunk_size: self.chunk_size,
            format: self.format_tag(),
            subchunk1_id: self.subchunk1_tag(),
            subchunk1_size: self.subchunk1_size,
            audio_format: self.audio_format,
            num_channels: self.num_channels,
            sample_rate: self.sample_rate,
            byte_rate: self.byte_rate,
            block_align: self.block_align,
            bits_per_sample: self.bits_per_sample,
            subchunk2_id: self.subchunk2_tag(),
            subchunk2_size: self.subchunk2_size,
            extension: self.extension,
            num_frames: self.num_frames(),
            duration_secs: self.duration_secs(),
        }
    }
}

/// The header of a [`WaveRecord`] with tags as text and without the payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaveSummary {
    pub chunk_id: FourCc,
    pub chunk_size: u32,
    pub format: FourCc,
    pub subchunk1_id: FourCc,
    pub subchunk1_size: u32,
    pub audio_format: u16,
    pub num_channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    pub subchunk2_id: FourCc,
    pub subchunk2_size: u32,
    pub extension: Option<SkippedChunk>,
    pub num_frames: usize,
    pub duration_secs: f64,
}

/// Errors that can occur while loading a WAVE file
#[derive(Debug, thiserror::Error)]
pub enum WaveError {
    /// IO errors other than running out of input
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A magic tag did not match
    #[error("Invalid format: expected \"{expected}\" for {field}, found \"{found}\"")]
    InvalidFormat {
        field: &'static str,
        expected: FourCc,
        found: FourCc,
    },

    /// The source ended before a field or payload was complete
    #[error(
        "Truncated input: {field} at offset {offset} needs {needed} bytes but only {available} are available"
    )]
    TruncatedInput {
        field: &'static str,
        offset: u64,
        needed: u64,
        available: u64,
    },

    /// The payload buffer could not be sized as declared
    #[error("Allocation failure: cannot reserve {requested} bytes for the payload")]
    AllocationFailure { requested: u64 },

    /// Format fields disagree with each other (strict parsing only)
    #[error("Inconsistent header: {0}")]
    Inconsistent(String),
}
