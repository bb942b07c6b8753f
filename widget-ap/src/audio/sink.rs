//! Audio sink interface
//!
//! A sink is the transport at the far end of the pull path. It owns the
//! clock: once started it invokes the installed pull function on its own
//! thread, at its own cadence, with a byte buffer to fill. The engine never
//! pushes audio.

use crate::audio::types::SampleWidth;
use crate::error::Result;
use std::sync::Arc;

/// Pull callback handed to the sink
///
/// Fills the whole slice with packed little-endian stereo frames at the
/// sink's sub-slot width. Runs on the transport thread; must not block.
pub type PullFn = Arc<dyn Fn(&mut [u8]) + Send + Sync>;

/// Downstream transport driven by its own clock
pub trait AudioSink {
    /// Bytes per channel-sample the transport expects
    fn subslot_width(&self) -> SampleWidth;

    /// Select the rate used by the next `start()`
    ///
    /// Only called while the sink is stopped.
    fn set_sample_rate(&mut self, rate: u32) -> Result<()>;

    /// Begin invoking the pull function
    fn start(&mut self) -> Result<()>;

    /// Stop invoking the pull function; idempotent
    fn stop(&mut self) -> Result<()>;

    /// Install the pull function used by every subsequent `start()`
    fn install_pull_source(&mut self, pull: PullFn);

    fn is_running(&self) -> bool;

    /// The transport reported a fault since the last `start()`
    ///
    /// A failed transport may stop pulling without being stopped, so the
    /// engine polls this alongside drain progress.
    fn has_failed(&self) -> bool {
        false
    }
}

impl<S: AudioSink + ?Sized> AudioSink for Box<S> {
    fn subslot_width(&self) -> SampleWidth {
        (**self).subslot_width()
    }

    fn set_sample_rate(&mut self, rate: u32) -> Result<()> {
        (**self).set_sample_rate(rate)
    }

    fn start(&mut self) -> Result<()> {
        (**self).start()
    }

    fn stop(&mut self) -> Result<()> {
        (**self).stop()
    }

    fn install_pull_source(&mut self, pull: PullFn) {
        (**self).install_pull_source(pull)
    }

    fn is_running(&self) -> bool {
        (**self).is_running()
    }

    fn has_failed(&self) -> bool {
        (**self).has_failed()
    }
}
