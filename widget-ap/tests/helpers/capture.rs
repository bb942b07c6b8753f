//! Captured sink output analysis

use widget_ap::audio::{SampleWidth, StereoSample};

/// Unpack captured bytes into frames
pub fn frames(bytes: &[u8], width: SampleWidth) -> Vec<StereoSample> {
    bytes
        .chunks_exact(width.frame_bytes())
        .map(|frame| width.unpack(frame))
        .collect()
}

/// Index of the first frame that is not silence
pub fn first_non_silent(frames: &[StereoSample]) -> Option<usize> {
    frames.iter().position(|frame| !frame.is_silent())
}
