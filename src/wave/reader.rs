use super::endian::decode_le;
use super::types::{FourCc, WaveError};
use std::io::{self, ErrorKind, Read};

/// Largest up-front reservation for a payload read from a source of unknown length
const UNBOUNDED_RESERVE: u64 = 64 * 1024;

/// Sequential reader that consumes exact-length fields from a byte source.
///
/// The cursor only moves forward. When the total length of the source is
/// known up front (see [`FieldReader::with_len`]) every read is checked
/// against what is left before anything is read or allocated, so a length
/// field pointing past the end fails immediately instead of after a large
/// allocation.
#[derive(Debug)]
pub struct FieldReader<R> {
    source: R,
    position: u64,
    remaining: Option<u64>,
}

impl<R: Read> FieldReader<R> {
    /// Wraps a source of unknown length.
    pub fn new(source: R) -> Self {
        FieldReader {
            source,
            position: 0,
            remaining: None,
        }
    }

    /// Wraps a source that holds exactly `len` more bytes.
    pub fn with_len(source: R, len: u64) -> Self {
        FieldReader {
            source,
            position: 0,
            remaining: Some(len),
        }
    }

    /// Number of bytes consumed so far
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Bytes left in the source, if its length is known
    pub fn remaining(&self) -> Option<u64> {
        self.remaining
    }

    /// Gives back the underlying source, positioned after the last field read
    pub fn into_inner(self) -> R {
        self.source
    }

    /// Reads a four character chunk tag.
    pub fn read_tag(&mut self, field: &'static str) -> Result<FourCc, WaveError> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf, field)?;
        Ok(FourCc(buf))
    }

    /// Reads a 2 byte little-endian field.
    pub fn read_u16(&mut self, field: &'static str) -> Result<u16, WaveError> {
        let mut buf = [0u8; 2];
        self.fill(&mut buf, field)?;
        Ok(decode_le(&buf) as u16)
    }

    /// Reads a 4 byte little-endian field.
    pub fn read_u32(&mut self, field: &'static str) -> Result<u32, WaveError> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf, field)?;
        Ok(decode_le(&buf) as u32)
    }

    /// Reads and discards exactly `len` bytes without buffering them.
    pub fn skip(&mut self, len: u64, field: &'static str) -> Result<(), WaveError> {
        self.check_available(field, len)?;

        let copied = io::copy(&mut self.source.by_ref().take(len), &mut io::sink());
        let skipped = copied.map_err(|e| self.read_error(e, field, len, 0))?;
        if skipped < len {
            return Err(self.truncated(field, len, skipped));
        }

        self.advance(skipped);
        Ok(())
    }

    /// Reads exactly `len` bytes into a freshly allocated buffer.
    ///
    /// With a known source length the buffer is sized to `len` exactly.
    /// Without one at most 64 KiB is reserved up front, so a bogus length
    /// on a short stream ends in `TruncatedInput` rather than a huge
    /// allocation.
    ///
    /// # Arguments
    /// * `len` - Declared length of the block
    /// * `cap` - Optional upper bound; a larger `len` fails before allocating
    /// * `field` - Field name used in error messages
    ///
    /// # Errors
    /// * `TruncatedInput` if the source holds fewer than `len` bytes
    /// * `AllocationFailure` if `len` exceeds `cap` or the buffer cannot be reserved
    pub fn read_payload(
        &mut self,
        len: u64,
        cap: Option<u64>,
        field: &'static str,
    ) -> Result<Vec<u8>, WaveError> {
        self.check_available(field, len)?;

        if cap.is_some_and(|cap| len > cap) {
            return Err(WaveError::AllocationFailure { requested: len });
        }

        // Only a length already bounded by the source is reserved in full;
        // otherwise the buffer grows with the bytes that actually arrive.
        let initial = match self.remaining {
            Some(_) => usize::try_from(len)
                .map_err(|_| WaveError::AllocationFailure { requested: len })?,
            None => len.min(UNBOUNDED_RESERVE) as usize,
        };

        let mut payload = Vec::new();
        payload
            .try_reserve_exact(initial)
            .map_err(|_| WaveError::AllocationFailure { requested: len })?;

        let result = self.source.by_ref().take(len).read_to_end(&mut payload);
        let read = result.map_err(|e| self.read_error(e, field, len, 0))? as u64;
        if read < len {
            return Err(self.truncated(field, len, read));
        }

        self.advance(read);
        Ok(payload)
    }

    fn fill(&mut self, buf: &mut [u8], field: &'static str) -> Result<(), WaveError> {
        let needed = buf.len() as u64;
        self.check_available(field, needed)?;

        let mut filled = 0;
        while filled < buf.len() {
            match self.source.read(&mut buf[filled..]) {
                Ok(0) => return Err(self.truncated(field, needed, filled as u64)),
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(self.read_error(e, field, needed, filled as u64)),
            }
        }

        self.advance(needed);
        Ok(())
    }

    fn check_available(&self, field: &'static str, needed: u64) -> Result<(), WaveError> {
        match self.remaining {
            Some(available) if needed > available => Err(self.truncated(field, needed, available)),
            _ => Ok(()),
        }
    }

    fn advance(&mut self, n: u64) {
        self.position += n;
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining = remaining.saturating_sub(n);
        }
    }

    fn truncated(&self, field: &'static str, needed: u64, available: u64) -> WaveError {
        WaveError::TruncatedInput {
            field,
            offset: self.position,
            needed,
            available,
        }
    }

    // Sources that report running dry as an error still count as truncation.
    fn read_error(&self, e: io::Error, field: &'static str, needed: u64, read: u64) -> WaveError {
        if e.kind() == ErrorKind::UnexpectedEof {
            self.truncated(field, needed, read)
        } else {
            WaveError::Io(e)
        }
    }
}
