use serde::Serialize;

use crate::session::domain::gesture::{GestureKind, GestureStatus};
use crate::session::domain::session_state::SessionState;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GestureProgress {
    pub kind: GestureKind,
    pub status: GestureStatus,
    pub instruction: &'static str,
    /// Latest detector confidence for this gesture.
    pub confidence: f64,
}

/// Read-only view of a session for rendering.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionProgress {
    pub state: SessionState,
    pub current_gesture: Option<GestureKind>,
    pub completed: Vec<GestureKind>,
    /// `completed / required`, in `[0, 1]`.
    pub fraction: f64,
    pub gestures: Vec<GestureProgress>,
    /// Remaining warm-up before the current gesture is evaluated.
    pub warmup_remaining_ms: i64,
}

impl SessionProgress {
    pub fn current_instruction(&self) -> Option<&'static str> {
        self.gestures
            .iter()
            .find(|g| g.status == GestureStatus::Current)
            .map(|g| g.instruction)
    }
}
