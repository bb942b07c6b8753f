//! Playback state

use std::fmt;

/// Engine state machine
///
/// `Idle -> Muted -> Playing -> Draining -> Idle`. A new source only moves
/// the engine from `Muted` to `Playing` once it is fully decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineState {
    /// Transport stopped, nothing installed
    #[default]
    Idle,
    /// Silence installed while the next source is prepared
    Muted,
    /// Source installed and being pulled
    Playing,
    /// Source exhausted or cancelled; waiting to release it
    Draining,
}

impl EngineState {
    /// True if `self -> next` is a legal transition
    pub fn can_transition_to(self, next: EngineState) -> bool {
        use EngineState::*;
        matches!(
            (self, next),
            (Idle, Muted)
                | (Muted, Playing)
                | (Muted, Idle)
                | (Playing, Draining)
                | (Draining, Muted)
                | (Draining, Idle)
        )
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineState::Idle => write!(f, "idle"),
            EngineState::Muted => write!(f, "muted"),
            EngineState::Playing => write!(f, "playing"),
            EngineState::Draining => write!(f, "draining"),
        }
    }
}
