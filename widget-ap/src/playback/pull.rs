//! Shared pull path
//!
//! The only state the sink callback touches. The callback takes the source
//! lock with `try_lock` and never waits: if the control thread holds the
//! lock (a source swap in progress) the chunk is written as silence and the
//! contention is counted. Progress is published through atomics so the
//! control thread can poll without touching the lock at all.

use crate::audio::sink::PullFn;
use crate::audio::source::AudioSource;
use crate::audio::types::{PacketCounter, SampleWidth};
use std::mem;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Point-in-time copy of the pull counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PullProgress {
    /// Samples consumed from the current buffered source
    pub read_cursor: u64,
    /// Valid samples in the current buffered source
    pub valid_count: u64,
    /// Packet counter (wraps at 256)
    pub packets: u8,
    /// Pulls answered with silence because the source was locked
    pub contended: u64,
}

/// Engine-owned slot holding the active source
#[derive(Debug)]
pub struct SharedPull {
    width: SampleWidth,
    source: Mutex<AudioSource>,
    packets: PacketCounter,
    read_cursor: AtomicU64,
    valid_count: AtomicU64,
    drained: AtomicBool,
    contended: AtomicU64,
}

impl SharedPull {
    /// Empty slot (silence) producing frames at `width`
    pub fn new(width: SampleWidth) -> Self {
        Self {
            width,
            source: Mutex::new(AudioSource::Silence),
            packets: PacketCounter::new(),
            read_cursor: AtomicU64::new(0),
            valid_count: AtomicU64::new(0),
            drained: AtomicBool::new(true),
            contended: AtomicU64::new(0),
        }
    }

    pub fn width(&self) -> SampleWidth {
        self.width
    }

    /// Sink callback body: fill `out` with packed frames
    ///
    /// Never blocks and never allocates.
    #[inline]
    pub fn pull_bytes(&self, out: &mut [u8]) {
        self.packets.increment();

        // A poisoned lock is treated like a busy one: silence
        match self.source.try_lock() {
            Ok(mut source) => {
                source.fill_bytes(self.width, out);
                self.publish(&source);
            }
            Err(_) => {
                out.fill(0);
                self.contended.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Closure handed to `AudioSink::install_pull_source`
    pub fn pull_fn(this: &Arc<Self>) -> PullFn {
        let pull = Arc::clone(this);
        Arc::new(move |out: &mut [u8]| pull.pull_bytes(out))
    }

    /// Install `next` and return the previous source
    ///
    /// Called on the control thread only; the returned source is dropped
    /// by the caller, never on the audio thread.
    pub fn swap(&self, next: AudioSource) -> AudioSource {
        let mut source = self.source.lock().unwrap_or_else(PoisonError::into_inner);
        self.publish(&next);
        mem::replace(&mut *source, next)
    }

    /// True when the active source can only produce silence
    pub fn is_drained(&self) -> bool {
        self.drained.load(Ordering::Acquire)
    }

    pub fn progress(&self) -> PullProgress {
        PullProgress {
            read_cursor: self.read_cursor.load(Ordering::Relaxed),
            valid_count: self.valid_count.load(Ordering::Relaxed),
            packets: self.packets.value(),
            contended: self.contended.load(Ordering::Relaxed),
        }
    }

    fn publish(&self, source: &AudioSource) {
        let (cursor, valid) = source.progress().unwrap_or((0, 0));
        self.read_cursor.store(cursor as u64, Ordering::Relaxed);
        self.valid_count.store(valid as u64, Ordering::Relaxed);
        self.drained.store(source.is_drained(), Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::buffer::SampleBuffer;
    use crate::audio::generator::SignalGenerator;
    use crate::audio::types::StereoSample;
    use std::thread;

    #[test]
    fn test_packet_counter_wraps() {
        let pull = SharedPull::new(SampleWidth::Three);
        let mut out = [0u8; 6];

        for _ in 0..255 {
            pull.pull_bytes(&mut out);
        }
        assert_eq!(pull.progress().packets, 255);

        pull.pull_bytes(&mut out);
        assert_eq!(pull.progress().packets, 0);
    }

    #[test]
    fn test_swap_returns_previous_and_publishes_progress() {
        let pull = SharedPull::new(SampleWidth::Four);
        assert!(pull.is_drained());

        let samples = vec![StereoSample::from_mono(1 << 8); 4];
        let old = pull.swap(AudioSource::Buffered(SampleBuffer::from_samples(samples)));
        assert!(matches!(old, AudioSource::Silence));
        assert!(!pull.is_drained());
        assert_eq!(pull.progress().valid_count, 4);

        let mut out = [0u8; 3 * 8];
        pull.pull_bytes(&mut out);
        assert_eq!(pull.progress().read_cursor, 3);
        assert!(!pull.is_drained());

        pull.pull_bytes(&mut out);
        assert_eq!(pull.progress().read_cursor, 4);
        assert!(pull.is_drained());
        // Second pull: one real frame then silence
        assert_eq!(&out[..8], &[0, 1, 0, 0, 0, 1, 0, 0]);
        assert!(out[8..].iter().all(|&b| b == 0));

        let old = pull.swap(AudioSource::Silence);
        assert!(matches!(old, AudioSource::Buffered(_)));
        assert_eq!(pull.progress().valid_count, 0);
    }

    #[test]
    fn test_locked_source_yields_silence() {
        let pull = SharedPull::new(SampleWidth::Three);
        pull.swap(AudioSource::Signal(SignalGenerator::new(SampleWidth::Three)));

        let guard = pull.source.lock().unwrap();
        let mut out = [0xAAu8; 60];
        pull.pull_bytes(&mut out);
        drop(guard);

        assert!(out.iter().all(|&b| b == 0));
        assert_eq!(pull.progress().contended, 1);
    }

    #[test]
    fn test_pull_fn_from_another_thread() {
        let pull = Arc::new(SharedPull::new(SampleWidth::Three));
        pull.swap(AudioSource::Signal(SignalGenerator::new(SampleWidth::Three)));
        let callback = SharedPull::pull_fn(&pull);

        let handle = thread::spawn(move || {
            let mut out = vec![0u8; 48 * 6];
            callback(&mut out);
            out
        });
        let out = handle.join().unwrap();

        let table = SignalGenerator::new(SampleWidth::Three);
        for (i, frame) in out.chunks_exact(6).enumerate() {
            assert_eq!(SampleWidth::Three.unpack(frame), table.table()[i]);
        }
        assert_eq!(pull.progress().packets, 1);
    }
}
