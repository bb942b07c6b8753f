//! Core audio data types
//!
//! Defines the stereo sample value, the sink's sub-slot width (and the
//! byte codec that goes with it), and the packet counter.
//!
//! **Sample scale:** a `StereoSample` always holds values at the scale of
//! the target width. For a 3-byte sub-slot the value is a sign-extended
//! 24-bit integer; for a 4-byte sub-slot it is the same value shifted left
//! 8 bits (left-justified in 32 bits).

use crate::error::ConvertError;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// StereoSample represents a single stereo frame at the target width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StereoSample {
    /// Left channel sample
    pub left: i32,

    /// Right channel sample
    pub right: i32,
}

impl StereoSample {
    /// Silent frame (0, 0)
    pub const SILENCE: StereoSample = StereoSample { left: 0, right: 0 };

    /// Create a frame from left and right samples
    pub const fn new(left: i32, right: i32) -> Self {
        Self { left, right }
    }

    /// Create a frame with the same value on both channels
    pub const fn from_mono(sample: i32) -> Self {
        Self {
            left: sample,
            right: sample,
        }
    }

    /// True for the all-zero frame
    pub fn is_silent(&self) -> bool {
        *self == Self::SILENCE
    }
}

/// Bytes per channel-sample required by the audio sink.
///
/// Only 3-byte (packed 24-bit) and 4-byte (left-justified 32-bit)
/// sub-slots exist on the target hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleWidth {
    /// 24-bit samples packed into 3 bytes
    Three,
    /// 32-bit samples, 24-bit content left-justified
    Four,
}

impl SampleWidth {
    /// Validate a sub-slot size reported by a device
    pub fn from_bytes(bytes: usize) -> Result<Self, ConvertError> {
        match bytes {
            3 => Ok(SampleWidth::Three),
            4 => Ok(SampleWidth::Four),
            _ => Err(ConvertError::UnsupportedWidth { bytes }),
        }
    }

    /// Bytes per channel-sample
    pub const fn bytes(self) -> usize {
        match self {
            SampleWidth::Three => 3,
            SampleWidth::Four => 4,
        }
    }

    /// Bytes per stereo frame
    pub const fn frame_bytes(self) -> usize {
        self.bytes() * 2
    }

    /// Write one frame as little-endian bytes; `out` must hold `frame_bytes()`
    #[inline]
    pub fn pack(self, sample: StereoSample, out: &mut [u8]) {
        let n = self.bytes();
        // 3-byte packing keeps the low 24 bits (two's complement preserved)
        out[..n].copy_from_slice(&sample.left.to_le_bytes()[..n]);
        out[n..2 * n].copy_from_slice(&sample.right.to_le_bytes()[..n]);
    }

    /// Read one frame written by `pack`, sign-extending 3-byte values
    #[inline]
    pub fn unpack(self, bytes: &[u8]) -> StereoSample {
        match self {
            SampleWidth::Three => StereoSample {
                left: read_i24(&bytes[0..3]),
                right: read_i24(&bytes[3..6]),
            },
            SampleWidth::Four => StereoSample {
                left: read_i32(&bytes[0..4]),
                right: read_i32(&bytes[4..8]),
            },
        }
    }
}

impl fmt::Display for SampleWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-byte", self.bytes())
    }
}

/// Read a little-endian signed 16-bit value
#[inline]
pub(crate) fn read_i16(bytes: &[u8]) -> i32 {
    i16::from_le_bytes([bytes[0], bytes[1]]) as i32
}

/// Read a little-endian signed 24-bit value, sign-extended to i32
#[inline]
pub(crate) fn read_i24(bytes: &[u8]) -> i32 {
    // Place the 3 bytes in the top of an i32, then arithmetic-shift back down
    i32::from_le_bytes([0, bytes[0], bytes[1], bytes[2]]) >> 8
}

/// Read a little-endian signed 32-bit value
#[inline]
pub(crate) fn read_i32(bytes: &[u8]) -> i32 {
    i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// 8-bit packet counter, incremented once per pull and wrapping at 256.
///
/// Diagnostics only; nothing depends on its value for correctness.
/// Atomic so the audio thread can count while the control thread reads.
#[derive(Debug, Default)]
pub struct PacketCounter(AtomicU8);

impl PacketCounter {
    pub fn new() -> Self {
        Self(AtomicU8::new(0))
    }

    /// Count one pull (wraps 255 -> 0)
    #[inline]
    pub fn increment(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn value(&self) -> u8 {
        self.0.load(Ordering::Relaxed)
    }
}
