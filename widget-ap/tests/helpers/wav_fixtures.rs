//! WAV test file generation
//!
//! Two kinds of fixture:
//! - canonical headers built byte by byte, for poking at single fields
//! - files written by hound, as an independent encoder

use hound::{SampleFormat, WavSpec, WavWriter};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary directory that lives as long as the test
pub struct FixtureDir {
    dir: TempDir,
}

impl FixtureDir {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create fixture dir"),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

/// 44-byte canonical header for a consistent stereo PCM file
///
/// # Arguments
/// * `rate` - sample rate field
/// * `bits` - bits per sample field
/// * `samples` - stereo samples in the data chunk
pub fn canonical_header(rate: u32, bits: u16, samples: u32) -> [u8; 44] {
    let bytes_per_sample = u32::from(bits / 8);
    let data_size = samples * 2 * bytes_per_sample;

    let mut h = [0u8; 44];
    h[0..4].copy_from_slice(b"RIFF");
    h[4..8].copy_from_slice(&(data_size + 36).to_le_bytes());
    h[8..12].copy_from_slice(b"WAVE");
    h[12..16].copy_from_slice(b"fmt ");
    h[16..20].copy_from_slice(&16u32.to_le_bytes());
    h[20..22].copy_from_slice(&1u16.to_le_bytes());
    h[22..24].copy_from_slice(&2u16.to_le_bytes());
    h[24..28].copy_from_slice(&rate.to_le_bytes());
    h[28..32].copy_from_slice(&(rate * 2 * bytes_per_sample).to_le_bytes());
    h[32..34].copy_from_slice(&((2 * bytes_per_sample) as u16).to_le_bytes());
    h[34..36].copy_from_slice(&bits.to_le_bytes());
    h[36..40].copy_from_slice(b"data");
    h[40..44].copy_from_slice(&data_size.to_le_bytes());
    h
}

/// Write `header` followed by `data` verbatim
pub fn write_raw_wav(path: &Path, header: &[u8], data: &[u8]) {
    let mut bytes = Vec::with_capacity(header.len() + data.len());
    bytes.extend_from_slice(header);
    bytes.extend_from_slice(data);
    fs::write(path, bytes).expect("write raw wav");
}

/// `n` distinct, non-zero 16-bit stereo frames
pub fn ramp_16(n: usize) -> Vec<(i16, i16)> {
    (1..=n as i32)
        .map(|i| ((i * 100) as i16, (-i * 100) as i16))
        .collect()
}

/// 16-bit stereo file written by hound (canonical 44-byte header)
pub fn write_hound_wav_16(path: &Path, rate: u32, frames: &[(i16, i16)]) {
    let spec = WavSpec {
        channels: 2,
        sample_rate: rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec).expect("create wav");
    for &(left, right) in frames {
        writer.write_sample(left).expect("write left");
        writer.write_sample(right).expect("write right");
    }
    writer.finalize().expect("finalize wav");
}

/// 24-bit stereo file written by hound
///
/// hound uses WAVE_FORMAT_EXTENSIBLE above 16 bits, so the `fmt ` chunk is
/// 40 bytes instead of 16 and the file is not canonical.
pub fn write_hound_wav_24(path: &Path, rate: u32, frames: &[(i32, i32)]) {
    let spec = WavSpec {
        channels: 2,
        sample_rate: rate,
        bits_per_sample: 24,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec).expect("create wav");
    for &(left, right) in frames {
        writer.write_sample(left).expect("write left");
        writer.write_sample(right).expect("write right");
    }
    writer.finalize().expect("finalize wav");
}
