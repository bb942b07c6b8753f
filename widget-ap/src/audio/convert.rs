//! Sample width conversion
//!
//! Converts one interleaved little-endian stereo frame from the file's
//! width (2, 3 or 4 bytes per channel) to the sink's sub-slot width.
//! Values are left-justified: the source occupies the most significant
//! bits of the target and the low bits are zero-filled.
//!
//! | source | 3-byte target | 4-byte target |
//! |--------|---------------|---------------|
//! | 16-bit | `v << 8`      | `v << 16`     |
//! | 24-bit | `v`           | `v << 8`      |
//! | 32-bit | `v >> 8`      | `v`           |
//!
//! 32-bit to 24-bit truncates the low byte. There is no rounding and no
//! dither.

use crate::audio::types::{read_i16, read_i24, read_i32, SampleWidth, StereoSample};
use crate::error::ConvertError;

/// Source sample widths accepted by the converter
pub const SUPPORTED_SOURCE_BYTES: [usize; 3] = [2, 3, 4];

/// Convert a single mono sample; `raw` holds exactly `source_bytes` bytes
#[inline]
fn convert_channel(source_bytes: usize, target: SampleWidth, raw: &[u8]) -> i32 {
    match (source_bytes, target) {
        (2, SampleWidth::Three) => read_i16(raw) << 8,
        (2, SampleWidth::Four) => read_i16(raw) << 16,
        (3, SampleWidth::Three) => read_i24(raw),
        (3, SampleWidth::Four) => read_i24(raw) << 8,
        (4, SampleWidth::Three) => read_i32(raw) >> 8,
        (4, SampleWidth::Four) => read_i32(raw),
        _ => unreachable!("source width checked by convert_frame"),
    }
}

/// Convert one raw stereo frame (`2 * source_bytes` bytes, L then R)
pub fn convert_frame(
    source_bytes: usize,
    target: SampleWidth,
    raw: &[u8],
) -> Result<StereoSample, ConvertError> {
    if !SUPPORTED_SOURCE_BYTES.contains(&source_bytes) {
        return Err(ConvertError::UnsupportedWidth {
            bytes: source_bytes,
        });
    }

    let expected = source_bytes * 2;
    if raw.len() < expected {
        return Err(ConvertError::ShortFrame {
            expected,
            actual: raw.len(),
        });
    }

    Ok(StereoSample {
        left: convert_channel(source_bytes, target, &raw[..source_bytes]),
        right: convert_channel(source_bytes, target, &raw[source_bytes..expected]),
    })
}

/// A converter bound to one source/target pair, validated once up front
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleConverter {
    source_bytes: usize,
    target: SampleWidth,
}

impl SampleConverter {
    pub fn new(source_bytes: usize, target: SampleWidth) -> Result<Self, ConvertError> {
        if !SUPPORTED_SOURCE_BYTES.contains(&source_bytes) {
            return Err(ConvertError::UnsupportedWidth {
                bytes: source_bytes,
            });
        }
        Ok(Self {
            source_bytes,
            target,
        })
    }

    /// Raw bytes consumed per stereo frame
    pub fn frame_bytes(&self) -> usize {
        self.source_bytes * 2
    }

    pub fn target(&self) -> SampleWidth {
        self.target
    }

    /// Convert one frame; `raw` must hold at least `frame_bytes()` bytes
    #[inline]
    pub fn convert(&self, raw: &[u8]) -> StereoSample {
        let n = self.source_bytes;
        StereoSample {
            left: convert_channel(n, self.target, &raw[..n]),
            right: convert_channel(n, self.target, &raw[n..2 * n]),
        }
    }
}
