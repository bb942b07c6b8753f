//! Playback engine
//!
//! **Module Structure:**
//! - `core.rs`: engine struct, state machine, transport handling, generator mode
//! - `playback.rs`: file playlist (open, validate, decode, play, release)
//! - `diagnostics.rs`: end-of-file reporting and the playlist summary

mod core;
mod diagnostics;
mod playback;

pub use self::core::{EngineOptions, PlaybackEngine};
pub use self::diagnostics::{PlaybackSummary, SkippedFile};
