//! Core playback engine - state machine and transport handling
//!
//! **Responsibilities:**
//! - PlaybackEngine struct definition and construction
//! - State transitions (Idle, Muted, Playing, Draining)
//! - Transport rate handling: restart only on a rate change
//! - Cooperative wait loop and generator mode

use crate::audio::generator::SignalGenerator;
use crate::audio::sink::AudioSink;
use crate::audio::source::AudioSource;
use crate::audio::types::SampleWidth;
use crate::error::{Error, Result};
use crate::playback::control::PlaybackControl;
use crate::playback::pull::SharedPull;
use crate::playback::state::EngineState;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default control poll interval
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Engine tuning
#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    /// Log header diagnostics at info instead of debug
    pub verbose: bool,
    /// How often the wait loop checks progress and control flags
    pub poll_interval: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Why a wait loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum WaitOutcome {
    /// Source ran out of samples
    Finished,
    /// Skip requested
    Skipped,
    /// Quit requested
    Quit,
}

/// Playback engine
///
/// Owns the sink and the shared pull slot. The sink's pull function is
/// installed once, here, and stays the same for the life of the engine;
/// everything else happens by swapping the source inside the slot.
pub struct PlaybackEngine<S: AudioSink> {
    pub(super) sink: S,
    pub(super) pull: Arc<SharedPull>,
    pub(super) control: PlaybackControl,
    pub(super) options: EngineOptions,
    pub(super) state: EngineState,
    /// Rate the transport was last configured for
    pub(super) current_rate: Option<u32>,
}

impl<S: AudioSink> PlaybackEngine<S> {
    /// Wire a sink to a fresh pull slot
    ///
    /// # Arguments
    /// - `sink`: transport; its sub-slot width fixes the output width
    /// - `control`: skip/quit flags polled while playing
    /// - `options`: verbosity and poll interval
    pub fn new(mut sink: S, control: PlaybackControl, options: EngineOptions) -> Self {
        let pull = Arc::new(SharedPull::new(sink.subslot_width()));
        sink.install_pull_source(SharedPull::pull_fn(&pull));

        debug!(
            "Playback engine ready: {} sub-slot, poll every {:?}",
            pull.width(),
            options.poll_interval
        );

        Self {
            sink,
            pull,
            control,
            options,
            state: EngineState::Idle,
            current_rate: None,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Output width, as reported by the sink at construction
    pub fn width(&self) -> SampleWidth {
        self.pull.width()
    }

    pub fn pull(&self) -> &SharedPull {
        &self.pull
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub(super) fn set_state(&mut self, next: EngineState) {
        if self.state == next {
            return;
        }
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal engine transition {} -> {}",
            self.state,
            next
        );
        debug!("Engine state: {} -> {}", self.state, next);
        self.state = next;
    }

    /// Install silence and drop whatever was playing
    pub(super) fn mute(&mut self) {
        self.set_state(EngineState::Muted);
        drop(self.pull.swap(AudioSource::Silence));
    }

    /// Get the transport running at `rate`
    ///
    /// Same rate while running: nothing to do. Different rate: stop,
    /// re-rate, restart. Not running: re-rate if needed, then start.
    pub(super) fn prepare_transport(&mut self, rate: u32) -> Result<()> {
        let running = self.sink.is_running();
        if running && self.current_rate == Some(rate) {
            debug!("Sample rate unchanged at {} Hz", rate);
            return Ok(());
        }

        if running {
            info!(
                "Sample rate change {} -> {} Hz, restarting transport",
                self.current_rate.unwrap_or_default(),
                rate
            );
            self.sink.stop()?;
        }

        if self.current_rate != Some(rate) {
            self.sink.set_sample_rate(rate)?;
            self.current_rate = Some(rate);
        }

        self.sink.start()
    }

    /// Poll until the source drains or a control flag is raised
    ///
    /// # Errors
    /// `Error::AudioOutput` when the sink reports a fault; a faulted sink
    /// stops pulling, so the source would never drain.
    pub(super) fn wait(&self) -> Result<WaitOutcome> {
        loop {
            if self.control.quit_requested() {
                return Ok(WaitOutcome::Quit);
            }
            if self.control.take_skip() {
                return Ok(WaitOutcome::Skipped);
            }
            if self.sink.has_failed() {
                return Err(Error::AudioOutput(
                    "Audio transport failed during playback".to_string(),
                ));
            }
            if self.pull.is_drained() {
                return Ok(WaitOutcome::Finished);
            }
            thread::sleep(self.options.poll_interval);
        }
    }

    /// Mute, stop the transport, and return to idle
    pub fn shutdown(&mut self) -> Result<()> {
        if self.state != EngineState::Idle {
            self.mute();
        }
        self.sink.stop()?;
        self.set_state(EngineState::Idle);
        Ok(())
    }

    /// Play the sine generator at `rate` until skip or quit
    pub fn run_generator(&mut self, rate: u32) -> Result<()> {
        self.mute();
        self.prepare_transport(rate)?;

        let generator = SignalGenerator::new(self.width());
        drop(self.pull.swap(AudioSource::Signal(generator)));
        self.set_state(EngineState::Playing);
        info!(
            "Generating {:.1} Hz sine at {} Hz ({})",
            f64::from(rate) / 48.0,
            rate,
            self.width()
        );

        let waited = self.wait();
        self.set_state(EngineState::Draining);
        match waited {
            Ok(outcome) => debug!("Generator ended: {:?}", outcome),
            Err(e) => {
                if let Err(stop_err) = self.shutdown() {
                    warn!("Failed to stop transport after error: {}", stop_err);
                }
                return Err(e);
            }
        }

        self.shutdown()
    }
}
