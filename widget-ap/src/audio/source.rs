//! Pull sources
//!
//! `AudioSource` is what the sink callback reads from. All three variants
//! share one contract: fill exactly the requested number of frames, never
//! block, never allocate, never fail.

use crate::audio::buffer::SampleBuffer;
use crate::audio::generator::SignalGenerator;
use crate::audio::types::{SampleWidth, StereoSample};
use std::fmt;

/// The active source behind the sink callback
#[derive(Debug, Clone, Default)]
pub enum AudioSource {
    /// Endless sine from the generator table
    Signal(SignalGenerator),
    /// Decoded file; silence after the last valid sample
    Buffered(SampleBuffer),
    /// Mute
    #[default]
    Silence,
}

impl AudioSource {
    /// Fill `out` with exactly `out.len()` samples
    #[inline]
    pub fn fill(&mut self, out: &mut [StereoSample]) {
        match self {
            AudioSource::Signal(generator) => generator.read_into(out),
            AudioSource::Buffered(buffer) => {
                buffer.read_into(out);
            }
            AudioSource::Silence => out.fill(StereoSample::SILENCE),
        }
    }

    /// Fill a packed byte buffer at `width`
    ///
    /// Writes `out.len() / width.frame_bytes()` frames; bytes of a trailing
    /// partial frame are zeroed.
    #[inline]
    pub fn fill_bytes(&mut self, width: SampleWidth, out: &mut [u8]) {
        let frame_bytes = width.frame_bytes();
        let mut frames = out.chunks_exact_mut(frame_bytes);

        match self {
            AudioSource::Signal(generator) => {
                for frame in &mut frames {
                    width.pack(generator.next_sample(), frame);
                }
            }
            AudioSource::Buffered(buffer) => {
                for frame in &mut frames {
                    width.pack(buffer.next_sample(), frame);
                }
            }
            AudioSource::Silence => {
                for frame in &mut frames {
                    frame.fill(0);
                }
            }
        }

        frames.into_remainder().fill(0);
    }

    /// `(read_cursor, valid_count)` for buffered sources
    pub fn progress(&self) -> Option<(usize, usize)> {
        match self {
            AudioSource::Buffered(buffer) => Some((buffer.read_cursor(), buffer.valid_count())),
            _ => None,
        }
    }

    /// True when this source can no longer produce anything but silence
    pub fn is_drained(&self) -> bool {
        match self {
            AudioSource::Signal(_) => false,
            AudioSource::Buffered(buffer) => buffer.is_exhausted(),
            AudioSource::Silence => true,
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            AudioSource::Signal(_) => SourceKind::Signal,
            AudioSource::Buffered(_) => SourceKind::Buffered,
            AudioSource::Silence => SourceKind::Silence,
        }
    }
}

/// Variant tag without the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Signal,
    Buffered,
    Silence,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Signal => write!(f, "signal"),
            SourceKind::Buffered => write!(f, "buffered"),
            SourceKind::Silence => write!(f, "silence"),
        }
    }
}
