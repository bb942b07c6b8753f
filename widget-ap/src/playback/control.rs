//! Cooperative playback control
//!
//! Skip and quit requests are plain flags. The engine polls them once per
//! poll interval; whoever owns the console or the signal handler sets them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable handle to the skip/quit flags
#[derive(Debug, Clone, Default)]
pub struct PlaybackControl {
    skip: Arc<AtomicBool>,
    quit: Arc<AtomicBool>,
}

impl PlaybackControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the engine to end the current file (or the generator)
    pub fn request_skip(&self) {
        self.skip.store(true, Ordering::SeqCst);
    }

    /// Ask the engine to stop playback entirely
    pub fn request_quit(&self) {
        self.quit.store(true, Ordering::SeqCst);
    }

    /// Consume a pending skip request
    pub fn take_skip(&self) -> bool {
        self.skip.swap(false, Ordering::SeqCst)
    }

    pub fn quit_requested(&self) -> bool {
        self.quit.load(Ordering::SeqCst)
    }
}
