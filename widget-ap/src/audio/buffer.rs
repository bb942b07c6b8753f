//! In-memory sample buffer and the decode step that fills it
//!
//! A whole file is decoded up front: the engine only starts playing a
//! file once every declared sample is in RAM. The buffer is read by the
//! pull path through a monotonically increasing cursor; once the cursor
//! reaches the decoded length, reads produce silence.

use crate::audio::convert::SampleConverter;
use crate::audio::types::{SampleWidth, StereoSample};
use crate::audio::wav::{read_full, WavFormat};
use crate::error::{DecodeError, Result};
use std::io::Read;
use tracing::{debug, error};

/// Decoded stereo samples plus the playback read cursor
#[derive(Debug, Clone, Default)]
pub struct SampleBuffer {
    samples: Vec<StereoSample>,
    read_cursor: usize,
    declared: u64,
}

impl SampleBuffer {
    /// Empty buffer with room for `declared` samples
    ///
    /// Uses a fallible reservation: a corrupt header declaring an absurd
    /// length fails here instead of aborting the process.
    pub fn with_declared(declared: u64) -> std::result::Result<Self, DecodeError> {
        let capacity =
            usize::try_from(declared).map_err(|_| DecodeError::Allocation { samples: declared })?;
        let mut samples = Vec::new();
        samples
            .try_reserve_exact(capacity)
            .map_err(|_| DecodeError::Allocation { samples: declared })?;

        Ok(Self {
            samples,
            read_cursor: 0,
            declared,
        })
    }

    /// Buffer over already-converted samples (all valid)
    pub fn from_samples(samples: Vec<StereoSample>) -> Self {
        let declared = samples.len() as u64;
        Self {
            samples,
            read_cursor: 0,
            declared,
        }
    }

    /// Append one decoded sample
    pub fn push(&mut self, sample: StereoSample) {
        self.samples.push(sample);
    }

    /// Samples successfully decoded
    pub fn valid_count(&self) -> usize {
        self.samples.len()
    }

    /// Samples the header declared
    pub fn declared_count(&self) -> u64 {
        self.declared
    }

    /// Index of the next sample to play
    pub fn read_cursor(&self) -> usize {
        self.read_cursor
    }

    /// True once every valid sample has been consumed
    pub fn is_exhausted(&self) -> bool {
        self.read_cursor >= self.samples.len()
    }

    /// Decoded samples, regardless of cursor position
    pub fn samples(&self) -> &[StereoSample] {
        &self.samples
    }

    /// Copy samples from the cursor into `out`, padding with silence
    ///
    /// Returns the number of real (non-padding) samples written. Never
    /// allocates; safe for the audio thread.
    #[inline]
    pub fn read_into(&mut self, out: &mut [StereoSample]) -> usize {
        let available = &self.samples[self.read_cursor.min(self.samples.len())..];
        let n = available.len().min(out.len());

        out[..n].copy_from_slice(&available[..n]);
        out[n..].fill(StereoSample::SILENCE);
        self.read_cursor += n;
        n
    }

    /// Next sample, or silence once exhausted
    #[inline]
    pub fn next_sample(&mut self) -> StereoSample {
        match self.samples.get(self.read_cursor) {
            Some(sample) => {
                self.read_cursor += 1;
                *sample
            }
            None => StereoSample::SILENCE,
        }
    }
}

/// Decode the data chunk of a parsed WAV stream into a buffer
///
/// `stream` must be positioned at the first data byte (as `wav::parse`
/// leaves it). Reads one stereo frame at a time. A short read stops the
/// decode immediately and the partial buffer is returned; the caller
/// decides whether `decoded < format.num_samples` is acceptable.
///
/// # Returns
/// The buffer and the number of samples decoded into it.
pub fn decode_into_buffer<R: Read>(
    stream: &mut R,
    format: &WavFormat,
    target: SampleWidth,
) -> Result<(SampleBuffer, u64)> {
    let converter = SampleConverter::new(usize::from(format.bytes_per_sample), target)?;
    let mut buffer = SampleBuffer::with_declared(format.num_samples)?;

    let frame_bytes = converter.frame_bytes();
    let mut raw = [0u8; 8];
    let mut decoded: u64 = 0;

    while decoded < format.num_samples {
        let got = read_full(stream, &mut raw[..frame_bytes])?;
        if got != frame_bytes {
            error!(
                "Short read at sample {}: got {} of {} frame bytes",
                decoded, got, frame_bytes
            );
            break;
        }

        buffer.push(converter.convert(&raw[..frame_bytes]));
        decoded += 1;
    }

    debug!(
        "Decoded {} of {} samples ({} -> {})",
        decoded, format.num_samples, format.bytes_per_sample, target
    );

    Ok((buffer, decoded))
}

/// Fail with `ShortRead` unless every declared sample was decoded
pub fn ensure_complete(format: &WavFormat, decoded: u64) -> std::result::Result<(), DecodeError> {
    if decoded < format.num_samples {
        return Err(DecodeError::ShortRead {
            expected: format.num_samples,
            actual: decoded,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn format(bytes_per_sample: u8, num_samples: u64) -> WavFormat {
        WavFormat {
            num_channels: 2,
            sample_rate: 48_000,
            bytes_per_sample,
            num_samples,
        }
    }

    #[test]
    fn test_decode_24_bit_to_four_byte() {
        let raw: Vec<u8> = vec![0x01, 0x02, 0x03, 0xFF, 0xFF, 0xFF];
        let (buffer, decoded) =
            decode_into_buffer(&mut Cursor::new(raw), &format(3, 1), SampleWidth::Four).unwrap();

        assert_eq!(decoded, 1);
        assert_eq!(buffer.samples(), &[StereoSample::new(0x0302_0100, -256)]);
    }

    #[test]
    fn test_short_read_returns_partial_count() {
        // Two full 16-bit frames and half of a third
        let raw = vec![0u8; 4 * 2 + 2];
        let fmt = format(2, 3);
        let (buffer, decoded) =
            decode_into_buffer(&mut Cursor::new(raw), &fmt, SampleWidth::Three).unwrap();

        assert_eq!(decoded, 2);
        assert_eq!(buffer.valid_count(), 2);
        assert_eq!(buffer.declared_count(), 3);
        assert_eq!(
            ensure_complete(&fmt, decoded),
            Err(DecodeError::ShortRead {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn test_decode_stops_at_declared_count() {
        // Trailing bytes beyond the declared samples are left unread
        let raw = vec![0u8; 8 * 4];
        let mut cursor = Cursor::new(raw);
        let (_, decoded) =
            decode_into_buffer(&mut cursor, &format(4, 2), SampleWidth::Four).unwrap();
        assert_eq!(decoded, 2);
        assert_eq!(cursor.position(), 16);
    }

    #[test]
    fn test_absurd_declared_count_is_allocation_error() {
        let err = SampleBuffer::with_declared(u64::MAX).unwrap_err();
        assert_eq!(err, DecodeError::Allocation { samples: u64::MAX });
    }

    #[test]
    fn test_read_into_pads_with_silence() {
        let mut buffer = SampleBuffer::from_samples(vec![StereoSample::from_mono(7); 3]);
        let mut out = [StereoSample::from_mono(-1); 5];

        assert_eq!(buffer.read_into(&mut out), 3);
        assert_eq!(&out[..3], &[StereoSample::from_mono(7); 3]);
        assert!(out[3..].iter().all(StereoSample::is_silent));
        assert!(buffer.is_exhausted());

        assert_eq!(buffer.read_into(&mut out), 0);
        assert!(out.iter().all(StereoSample::is_silent));
        assert_eq!(buffer.read_cursor(), 3);
    }
}
