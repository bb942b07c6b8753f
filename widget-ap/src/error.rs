//! Error types for widget-ap
//!
//! Defines module-specific error types using thiserror for clear error propagation.
//! Per-file problems (missing file, bad header) are recoverable; everything
//! else ends the run.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for widget-ap
#[derive(Error, Debug)]
pub enum Error {
    /// WAV header rejected
    #[error("WAV header error: {0}")]
    Wav(#[from] WavError),

    /// Sample width conversion errors
    #[error("Sample conversion error: {0}")]
    Convert(#[from] ConvertError),

    /// Audio decode errors
    #[error("Audio decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Input file could not be opened
    #[error("Cannot open {}: {source}", .path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Audio output device errors
    #[error("Audio output error: {0}")]
    AudioOutput(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] widget_common::Error),

    /// File I/O error
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True when the player may skip the current file and continue
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::FileOpen { .. } | Error::Wav(_))
    }
}

/// Convenience Result type using widget-ap Error
pub type Result<T> = std::result::Result<T, Error>;

/// WAV container validation failures
#[derive(Error, Debug)]
pub enum WavError {
    /// Fewer than 44 header bytes available
    #[error("Could not read 44 byte wav file header (got {read} bytes)")]
    TruncatedHeader { read: usize },

    /// A fixed header byte did not match the canonical layout
    #[error("wav file header error at position {offset}")]
    MalformedHeader { offset: usize },

    /// One or more header fields are unsupported or inconsistent
    #[error("{}", ViolationList(.0))]
    Invalid(Vec<HeaderViolation>),

    /// Underlying stream failed while reading the header
    #[error("I/O error reading header: {0}")]
    Io(#[from] std::io::Error),
}

impl WavError {
    /// Violations reported by a failed cross-check (empty for other kinds)
    pub fn violations(&self) -> &[HeaderViolation] {
        match self {
            WavError::Invalid(violations) => violations,
            _ => &[],
        }
    }
}

/// Header fields taking part in arithmetic cross-checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderField {
    ChunkSize,
    ByteRate,
    BlockAlign,
}

impl fmt::Display for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderField::ChunkSize => write!(f, "ChunkSize"),
            HeaderField::ByteRate => write!(f, "ByteRate"),
            HeaderField::BlockAlign => write!(f, "BlockAlign"),
        }
    }
}

/// A single failed header cross-check
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeaderViolation {
    #[error("Only 2-channel wav is accepted, not the detected {0}-channel")]
    UnsupportedChannelCount(u16),

    #[error("Only 44.1/48/88.2/96/176.4/192ksps accepted, not the detected {0}")]
    UnsupportedSampleRate(u32),

    #[error("Only 2/3/4 bytes per mono sample accepted, not the detected {0}")]
    UnsupportedBytesPerSample(u16),

    #[error("{field} mismatch: expected {expected}, found {found}")]
    HeaderArithmeticMismatch {
        field: HeaderField,
        expected: u64,
        found: u64,
    },
}

struct ViolationList<'a>(&'a [HeaderViolation]);

impl fmt::Display for ViolationList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", violation)?;
        }
        Ok(())
    }
}

/// Sample width conversion errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    /// Width other than 2/3/4 source bytes or 3/4 target bytes
    #[error("Unsupported sample width: {bytes} bytes")]
    UnsupportedWidth { bytes: usize },

    /// Raw frame shorter than two channel-samples
    #[error("Frame too short: expected {expected} bytes, got {actual}")]
    ShortFrame { expected: usize, actual: usize },
}

/// Decode step failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Fewer samples decoded than the header declared
    #[error("Wav file not read into memory: decoded {actual} of {expected} samples")]
    ShortRead { expected: u64, actual: u64 },

    /// Declared sample count cannot be held in memory
    #[error("Cannot allocate buffer for {samples} samples")]
    Allocation { samples: u64 },
}
