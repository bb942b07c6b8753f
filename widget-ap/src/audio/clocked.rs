//! Software-clocked sink
//!
//! Stands in for hardware: a worker thread invokes the pull function every
//! `period_frames / sample_rate` seconds, so the engine sees the same
//! pull cadence a device would give it. Optionally keeps every byte it
//! pulled, and records the transport calls it received. It can also be
//! told to fail after a number of pulls, the way a device that is
//! unplugged mid-stream goes quiet without being stopped.

use crate::audio::sink::{AudioSink, PullFn};
use crate::audio::types::SampleWidth;
use crate::error::{Error, Result};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Frames per pull unless configured otherwise (10 ms at 48 kHz)
pub const DEFAULT_PERIOD_FRAMES: usize = 480;

/// Transport operation seen by the sink, in call order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkCall {
    SetSampleRate(u32),
    Start,
    Stop,
}

struct Worker {
    running: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

/// Sink driven by a software timer
pub struct ClockedSink {
    width: SampleWidth,
    period_frames: usize,
    sample_rate: u32,
    pull: Option<PullFn>,
    worker: Option<Worker>,
    capture: Option<Arc<Mutex<Vec<u8>>>>,
    pulls: Arc<AtomicU64>,
    calls: Vec<SinkCall>,
    fail_after: Option<u64>,
    failed: Arc<AtomicBool>,
}

impl ClockedSink {
    pub fn new(width: SampleWidth) -> Self {
        Self {
            width,
            period_frames: DEFAULT_PERIOD_FRAMES,
            sample_rate: 48_000,
            pull: None,
            worker: None,
            capture: None,
            pulls: Arc::new(AtomicU64::new(0)),
            calls: Vec::new(),
            fail_after: None,
            failed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Frames requested per pull
    pub fn with_period_frames(mut self, frames: usize) -> Self {
        self.period_frames = frames.max(1);
        self
    }

    /// Keep a copy of every pulled byte
    pub fn with_capture(mut self) -> Self {
        self.capture = Some(Arc::new(Mutex::new(Vec::new())));
        self
    }

    /// Stop pulling and report a fault once `pulls` callbacks have run
    pub fn with_failure_after(mut self, pulls: u64) -> Self {
        self.fail_after = Some(pulls);
        self
    }

    /// Bytes pulled so far (empty unless built `with_capture`)
    pub fn captured(&self) -> Vec<u8> {
        match &self.capture {
            Some(capture) => capture.lock().map(|c| c.clone()).unwrap_or_default(),
            None => Vec::new(),
        }
    }

    /// Transport calls received so far
    pub fn calls(&self) -> &[SinkCall] {
        &self.calls
    }

    /// Pull callbacks issued so far
    pub fn pull_count(&self) -> u64 {
        self.pulls.load(Ordering::Relaxed)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn period(&self) -> Duration {
        Duration::from_secs_f64(self.period_frames as f64 / f64::from(self.sample_rate))
    }
}

impl AudioSink for ClockedSink {
    fn subslot_width(&self) -> SampleWidth {
        self.width
    }

    fn set_sample_rate(&mut self, rate: u32) -> Result<()> {
        self.calls.push(SinkCall::SetSampleRate(rate));
        if self.worker.is_some() {
            return Err(Error::AudioOutput(
                "Cannot change sample rate while the transport is running".to_string(),
            ));
        }
        if rate == 0 {
            return Err(Error::AudioOutput("Sample rate must be non-zero".to_string()));
        }
        self.sample_rate = rate;
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        self.calls.push(SinkCall::Start);
        if self.worker.is_some() {
            return Ok(());
        }

        let pull = self
            .pull
            .clone()
            .ok_or_else(|| Error::AudioOutput("No pull source installed".to_string()))?;

        let running = Arc::new(AtomicBool::new(true));
        let period = self.period();
        let chunk_bytes = self.period_frames * self.width.frame_bytes();
        let capture = self.capture.clone();
        let pulls = Arc::clone(&self.pulls);
        let fail_after = self.fail_after;
        let failed = Arc::clone(&self.failed);
        failed.store(false, Ordering::Release);

        debug!(
            "Clocked transport starting: {} Hz, {} frames per {:?}",
            self.sample_rate, self.period_frames, period
        );

        let handle = {
            let running = Arc::clone(&running);
            thread::Builder::new()
                .name("clocked-sink".to_string())
                .spawn(move || {
                    let mut chunk = vec![0u8; chunk_bytes];
                    let mut deadline = Instant::now();
                    while running.load(Ordering::Acquire) {
                        let pulled = pulls.load(Ordering::Relaxed);
                        if fail_after.is_some_and(|limit| pulled >= limit) {
                            warn!("Clocked transport fault after {} pulls", pulled);
                            failed.store(true, Ordering::Release);
                            break;
                        }
                        pull(&mut chunk);
                        pulls.fetch_add(1, Ordering::Relaxed);
                        if let Some(capture) = &capture {
                            if let Ok(mut captured) = capture.lock() {
                                captured.extend_from_slice(&chunk);
                            }
                        }

                        deadline += period;
                        let now = Instant::now();
                        if deadline > now {
                            thread::sleep(deadline - now);
                        } else {
                            // Fell behind; resynchronise rather than burst
                            deadline = now;
                        }
                    }
                })?
        };

        self.worker = Some(Worker { running, handle });
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.calls.push(SinkCall::Stop);
        if let Some(worker) = self.worker.take() {
            worker.running.store(false, Ordering::Release);
            if worker.handle.join().is_err() {
                warn!("Clocked transport thread panicked");
            }
            debug!("Clocked transport stopped");
        }
        Ok(())
    }

    fn install_pull_source(&mut self, pull: PullFn) {
        self.pull = Some(pull);
    }

    fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    fn has_failed(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }
}

impl Drop for ClockedSink {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.running.store(false, Ordering::Release);
            let _ = worker.handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting_pull(value: u8) -> PullFn {
        Arc::new(move |out: &mut [u8]| out.fill(value))
    }

    #[test]
    fn test_start_without_pull_source_fails() {
        let mut sink = ClockedSink::new(SampleWidth::Three);
        assert!(sink.start().is_err());
        assert!(!sink.is_running());
    }

    #[test]
    fn test_pulls_at_configured_width() {
        let mut sink = ClockedSink::new(SampleWidth::Three)
            .with_period_frames(4)
            .with_capture();
        sink.install_pull_source(counting_pull(0x5A));
        sink.start().unwrap();

        let deadline = Instant::now() + Duration::from_secs(2);
        while sink.pull_count() < 3 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        sink.stop().unwrap();

        let pulls = sink.pull_count();
        assert!(pulls >= 3);
        let captured = sink.captured();
        // 4 frames x 6 bytes per pull
        assert_eq!(captured.len() as u64, pulls * 24);
        assert!(captured.iter().all(|&b| b == 0x5A));
    }

    #[test]
    fn test_failure_stops_pulls_and_is_reported() {
        let mut sink = ClockedSink::new(SampleWidth::Four)
            .with_period_frames(4)
            .with_failure_after(2);
        sink.install_pull_source(counting_pull(1));
        sink.start().unwrap();

        let deadline = Instant::now() + Duration::from_secs(2);
        while !sink.has_failed() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }

        assert!(sink.has_failed());
        assert!(sink.is_running());
        assert_eq!(sink.pull_count(), 2);
        sink.stop().unwrap();
    }

    #[test]
    fn test_rate_change_rejected_while_running() {
        let mut sink = ClockedSink::new(SampleWidth::Four);
        sink.install_pull_source(counting_pull(0));
        sink.set_sample_rate(96_000).unwrap();
        sink.start().unwrap();
        assert!(sink.set_sample_rate(44_100).is_err());
        sink.stop().unwrap();
        sink.stop().unwrap();

        assert_eq!(sink.sample_rate(), 96_000);
        assert_eq!(
            sink.calls(),
            &[
                SinkCall::SetSampleRate(96_000),
                SinkCall::Start,
                SinkCall::SetSampleRate(44_100),
                SinkCall::Stop,
                SinkCall::Stop,
            ]
        );
    }
}
