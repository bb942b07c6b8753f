//! Playback orchestration
//!
//! The engine, the shared pull path it hands to the sink, and the control
//! flags it polls.

pub mod control;
pub mod engine;
pub mod pull;
pub mod state;

pub use control::PlaybackControl;
pub use engine::{EngineOptions, PlaybackEngine, PlaybackSummary, SkippedFile};
pub use pull::{PullProgress, SharedPull};
pub use state::EngineState;
