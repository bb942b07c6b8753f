//! Canonical PCM WAV header parsing
//!
//! Accepts only the 44-byte canonical layout (RIFF/WAVE, a 16-byte `fmt `
//! chunk with PCM format 1, immediately followed by the `data` chunk).
//! See <https://ccrma.stanford.edu/courses/422/projects/WaveFormat/>.
//!
//! Validation happens in two passes:
//! 1. Fixed bytes are compared against the template; the first mismatch
//!    fails with its byte offset.
//! 2. Variable fields are cross-checked. Every failed check is collected
//!    before the parse fails, so one run reports all problems in a file.

use crate::error::{HeaderField, HeaderViolation, WavError};
use std::io::{Read, Seek, SeekFrom};
use tracing::{debug, info};

/// Length of the canonical WAV header
pub const WAV_HEADER_LEN: usize = 44;

/// Sample rates the playback hardware supports
pub const SUPPORTED_SAMPLE_RATES: [u32; 6] = [44_100, 48_000, 88_200, 96_000, 176_400, 192_000];

/// Fixed header bytes as (offset, expected bytes). Everything else is a field.
const FIXED_BYTES: [(usize, &[u8]); 6] = [
    (0, b"RIFF"),
    (8, b"WAVE"),
    (12, b"fmt "),
    (16, &[0x10, 0x00, 0x00, 0x00]), // Subchunk1Size = 16 for PCM
    (20, &[0x01, 0x00]),             // AudioFormat = 1 (PCM)
    (36, b"data"),
];

/// Bytes of RIFF chunk counted before the data payload
const RIFF_OVERHEAD: u64 = 36;

/// Raw header fields, decoded but not yet validated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub chunk_size: u32,
    pub num_channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    pub data_size: u32,
}

impl WavHeader {
    /// Decode the variable fields from a template-checked header
    fn from_bytes(bytes: &[u8; WAV_HEADER_LEN]) -> Self {
        let u16_at = |i: usize| u16::from_le_bytes([bytes[i], bytes[i + 1]]);
        let u32_at =
            |i: usize| u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);

        Self {
            chunk_size: u32_at(4),
            num_channels: u16_at(22),
            sample_rate: u32_at(24),
            byte_rate: u32_at(28),
            block_align: u16_at(32),
            bits_per_sample: u16_at(34),
            data_size: u32_at(40),
        }
    }

    /// Bytes per mono sample (bits / 8, truncating)
    pub fn bytes_per_sample(&self) -> u16 {
        self.bits_per_sample >> 3
    }

    /// Whole stereo samples in the data chunk; any remainder is dropped
    pub fn num_samples(&self) -> u64 {
        let frame = u64::from(self.bytes_per_sample()) * u64::from(self.num_channels);
        u64::from(self.data_size).checked_div(frame).unwrap_or(0)
    }

    /// Playing time in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.num_samples() as f64 / f64::from(self.sample_rate)
    }

    /// Cross-check all derived fields, collecting every violation
    pub fn validate(&self) -> Vec<HeaderViolation> {
        let mut violations = Vec::new();

        let channels = u64::from(self.num_channels);
        let bytes_per_sample = u64::from(self.bytes_per_sample());

        let expected_chunk = u64::from(self.data_size) + RIFF_OVERHEAD;
        if expected_chunk != u64::from(self.chunk_size) {
            violations.push(HeaderViolation::HeaderArithmeticMismatch {
                field: HeaderField::ChunkSize,
                expected: expected_chunk,
                found: u64::from(self.chunk_size),
            });
        }

        if self.num_channels != 2 {
            violations.push(HeaderViolation::UnsupportedChannelCount(self.num_channels));
        }

        if !SUPPORTED_SAMPLE_RATES.contains(&self.sample_rate) {
            violations.push(HeaderViolation::UnsupportedSampleRate(self.sample_rate));
        }

        let expected_byte_rate = u64::from(self.sample_rate) * channels * bytes_per_sample;
        if expected_byte_rate != u64::from(self.byte_rate) {
            violations.push(HeaderViolation::HeaderArithmeticMismatch {
                field: HeaderField::ByteRate,
                expected: expected_byte_rate,
                found: u64::from(self.byte_rate),
            });
        }

        let expected_block_align = channels * bytes_per_sample;
        if expected_block_align != u64::from(self.block_align) {
            violations.push(HeaderViolation::HeaderArithmeticMismatch {
                field: HeaderField::BlockAlign,
                expected: expected_block_align,
                found: u64::from(self.block_align),
            });
        }

        if !(2..=4).contains(&self.bytes_per_sample()) {
            violations.push(HeaderViolation::UnsupportedBytesPerSample(
                self.bytes_per_sample(),
            ));
        }

        violations
    }

    /// Log every header field (verbose diagnostics)
    pub fn log_summary(&self, verbose: bool) {
        macro_rules! report {
            ($($arg:tt)*) => {
                if verbose { info!($($arg)*) } else { debug!($($arg)*) }
            };
        }

        report!("ChunkSize = {}", self.chunk_size);
        report!("NumChannels = {}", self.num_channels);
        report!("SampleRate = {}", self.sample_rate);
        report!("ByteRate = {}", self.byte_rate);
        report!("BlockAlign = {}", self.block_align);
        // Bytes per MONO sample, x2 for stereo
        report!("BytesPerSample = {}", self.bytes_per_sample());
        report!("SubChunk2Size = {}", self.data_size);
        report!("NumSamples = {}", self.num_samples());
        report!("Duration = {:.3}s", self.duration_secs());
    }
}

/// Validated stream format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavFormat {
    /// Always 2
    pub num_channels: u16,
    /// One of `SUPPORTED_SAMPLE_RATES`
    pub sample_rate: u32,
    /// 2, 3 or 4
    pub bytes_per_sample: u8,
    /// Stereo samples declared by the data chunk
    pub num_samples: u64,
}

impl WavFormat {
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * u32::from(self.num_channels) * u32::from(self.bytes_per_sample)
    }

    pub fn block_align(&self) -> u16 {
        self.num_channels * u16::from(self.bytes_per_sample)
    }

    /// Raw bytes per interleaved stereo frame
    pub fn frame_bytes(&self) -> usize {
        usize::from(self.block_align())
    }

    pub fn duration_secs(&self) -> f64 {
        self.num_samples as f64 / f64::from(self.sample_rate)
    }
}

impl TryFrom<WavHeader> for WavFormat {
    type Error = WavError;

    fn try_from(header: WavHeader) -> Result<Self, Self::Error> {
        let violations = header.validate();
        if !violations.is_empty() {
            return Err(WavError::Invalid(violations));
        }

        Ok(Self {
            num_channels: header.num_channels,
            sample_rate: header.sample_rate,
            // validate() guarantees 2..=4
            bytes_per_sample: header.bytes_per_sample() as u8,
            num_samples: header.num_samples(),
        })
    }
}

/// Read the 44 header bytes from the start of `stream` and check the template
///
/// Leaves the stream positioned at the first data byte on success.
pub fn read_header<R: Read + Seek>(stream: &mut R) -> Result<WavHeader, WavError> {
    stream.seek(SeekFrom::Start(0))?;

    let mut bytes = [0u8; WAV_HEADER_LEN];
    let read = read_full(stream, &mut bytes)?;
    if read != WAV_HEADER_LEN {
        return Err(WavError::TruncatedHeader { read });
    }

    if let Some(offset) = first_template_mismatch(&bytes) {
        return Err(WavError::MalformedHeader { offset });
    }

    Ok(WavHeader::from_bytes(&bytes))
}

/// Parse and fully validate a WAV header
pub fn parse<R: Read + Seek>(stream: &mut R) -> Result<WavFormat, WavError> {
    parse_header(stream).map(|(_, format)| format)
}

/// Parse a WAV header, returning raw fields alongside the validated format
pub fn parse_header<R: Read + Seek>(stream: &mut R) -> Result<(WavHeader, WavFormat), WavError> {
    let header = read_header(stream)?;
    let format = WavFormat::try_from(header)?;
    Ok((header, format))
}

/// Offset of the first fixed byte that differs from the template
fn first_template_mismatch(bytes: &[u8; WAV_HEADER_LEN]) -> Option<usize> {
    FIXED_BYTES.iter().find_map(|(start, expected)| {
        expected
            .iter()
            .zip(&bytes[*start..])
            .position(|(want, got)| want != got)
            .map(|i| start + i)
    })
}

/// Read until `buf` is full or the stream ends; returns bytes read
pub(crate) fn read_full<R: Read>(stream: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match stream.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn header_bytes(rate: u32, bits: u16, samples: u32) -> Vec<u8> {
        let bps = u32::from(bits / 8);
        let data = samples * 2 * bps;
        let mut h = Vec::with_capacity(WAV_HEADER_LEN);
        h.extend_from_slice(b"RIFF");
        h.extend_from_slice(&(data + 36).to_le_bytes());
        h.extend_from_slice(b"WAVEfmt ");
        h.extend_from_slice(&16u32.to_le_bytes());
        h.extend_from_slice(&1u16.to_le_bytes());
        h.extend_from_slice(&2u16.to_le_bytes());
        h.extend_from_slice(&rate.to_le_bytes());
        h.extend_from_slice(&(rate * 2 * bps).to_le_bytes());
        h.extend_from_slice(&((2 * bps) as u16).to_le_bytes());
        h.extend_from_slice(&bits.to_le_bytes());
        h.extend_from_slice(b"data");
        h.extend_from_slice(&data.to_le_bytes());
        h
    }

    #[test]
    fn test_parse_valid_header() {
        let mut cursor = Cursor::new(header_bytes(96_000, 24, 1000));
        let format = parse(&mut cursor).unwrap();
        assert_eq!(format.num_channels, 2);
        assert_eq!(format.sample_rate, 96_000);
        assert_eq!(format.bytes_per_sample, 3);
        assert_eq!(format.num_samples, 1000);
        assert_eq!(cursor.position(), 44);
    }

    #[test]
    fn test_parse_rewinds_before_reading() {
        let mut cursor = Cursor::new(header_bytes(44_100, 16, 10));
        cursor.set_position(20);
        assert!(parse(&mut cursor).is_ok());
    }

    #[test]
    fn test_truncated_header() {
        let mut bytes = header_bytes(48_000, 16, 10);
        bytes.truncate(43);
        let err = parse(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, WavError::TruncatedHeader { read: 43 }));
    }

    #[test]
    fn test_malformed_reports_first_offset() {
        let mut bytes = header_bytes(48_000, 16, 10);
        bytes[13] = b'x'; // "fxt "
        bytes[37] = b'x'; // later mismatch is not reported
        let err = parse(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, WavError::MalformedHeader { offset: 13 }));
    }

    #[test]
    fn test_data_remainder_is_dropped() {
        let mut bytes = header_bytes(48_000, 16, 10);
        // 3 stray bytes beyond 10 whole samples, chunk size kept consistent
        bytes[40..44].copy_from_slice(&43u32.to_le_bytes());
        bytes[4..8].copy_from_slice(&(43u32 + 36).to_le_bytes());
        let format = parse(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(format.num_samples, 10);
    }

    #[test]
    fn test_zero_bits_per_sample_does_not_divide_by_zero() {
        let mut bytes = header_bytes(48_000, 16, 10);
        bytes[34..36].copy_from_slice(&0u16.to_le_bytes());
        let err = parse(&mut Cursor::new(bytes)).unwrap_err();
        assert!(err
            .violations()
            .contains(&HeaderViolation::UnsupportedBytesPerSample(0)));
    }

    #[test]
    fn test_duration() {
        let header = read_header(&mut Cursor::new(header_bytes(48_000, 16, 24_000))).unwrap();
        assert!((header.duration_secs() - 0.5).abs() < 1e-9);
    }
}
