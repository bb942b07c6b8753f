//! Sine signal generator
//!
//! One full sine cycle is tabulated in 48 entries and played back in an
//! endless loop. At 48 kHz this is an exact 1 kHz tone; at other rates the
//! tone is `rate / 48` Hz.

use crate::audio::types::{SampleWidth, StereoSample};
use std::f64::consts::PI;

/// Entries in one period of the sine table
pub const SINE_TABLE_LEN: usize = 48;

/// Peak amplitude in 24-bit units (about -12 dBFS)
pub const SINE_AMPLITUDE: f64 = 0x1F_FFFF as f64;

/// Periodic sine source with a wrapping cursor
#[derive(Debug, Clone)]
pub struct SignalGenerator {
    table: [StereoSample; SINE_TABLE_LEN],
    cursor: usize,
}

impl SignalGenerator {
    /// Build the table at the sink's width
    pub fn new(width: SampleWidth) -> Self {
        let shift = match width {
            SampleWidth::Three => 0,
            SampleWidth::Four => 8,
        };

        let mut table = [StereoSample::SILENCE; SINE_TABLE_LEN];
        for (i, entry) in table.iter_mut().enumerate() {
            let phase = 2.0 * PI * i as f64 / SINE_TABLE_LEN as f64;
            // `as` truncates toward zero
            let value = (SINE_AMPLITUDE * phase.sin()) as i32;
            *entry = StereoSample::from_mono(value << shift);
        }

        Self { table, cursor: 0 }
    }

    /// One full period, starting at phase zero
    pub fn table(&self) -> &[StereoSample; SINE_TABLE_LEN] {
        &self.table
    }

    /// Position of the next sample in `[0, 48)`
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Fill `out` from the table, wrapping without skipping or repeating
    #[inline]
    pub fn read_into(&mut self, out: &mut [StereoSample]) {
        let mut written = 0;
        while written < out.len() {
            let run = (SINE_TABLE_LEN - self.cursor).min(out.len() - written);
            out[written..written + run]
                .copy_from_slice(&self.table[self.cursor..self.cursor + run]);
            written += run;
            self.cursor = (self.cursor + run) % SINE_TABLE_LEN;
        }
    }

    /// Next sample, advancing the cursor
    #[inline]
    pub fn next_sample(&mut self) -> StereoSample {
        let sample = self.table[self.cursor];
        self.cursor = (self.cursor + 1) % SINE_TABLE_LEN;
        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_shape() {
        let gen = SignalGenerator::new(SampleWidth::Three);
        let table = gen.table();

        assert_eq!(table[0], StereoSample::SILENCE);
        // Quarter period is the positive peak
        assert_eq!(table[12].left, 0x1F_FFFF);
        assert_eq!(table[36].left, -0x1F_FFFF);
        // Both channels carry the same signal
        assert!(table.iter().all(|s| s.left == s.right));
    }

    #[test]
    fn test_four_byte_table_is_shifted() {
        let three = SignalGenerator::new(SampleWidth::Three);
        let four = SignalGenerator::new(SampleWidth::Four);
        for (a, b) in three.table().iter().zip(four.table()) {
            assert_eq!(a.left << 8, b.left);
        }
    }

    #[test]
    fn test_odd_chunks_wrap_exactly() {
        let mut gen = SignalGenerator::new(SampleWidth::Four);
        let expected: Vec<StereoSample> = gen.table().iter().cycle().take(150).copied().collect();

        let mut got = Vec::new();
        for chunk in [7usize, 41, 1, 60, 41] {
            let mut out = vec![StereoSample::SILENCE; chunk];
            gen.read_into(&mut out);
            got.extend(out);
        }

        assert_eq!(got, expected);
        assert_eq!(gen.cursor(), 150 % SINE_TABLE_LEN);
    }

    #[test]
    fn test_next_sample_matches_read_into() {
        let mut a = SignalGenerator::new(SampleWidth::Three);
        let mut b = a.clone();
        let mut out = [StereoSample::SILENCE; 100];
        a.read_into(&mut out);
        for expected in out {
            assert_eq!(b.next_sample(), expected);
        }
        assert_eq!(a.cursor(), b.cursor());
    }
}
