use serde::Serialize;

use crate::session::domain::gesture::{GestureKind, GestureOutcome};
use crate::session::domain::liveness_result::LivenessResult;
use crate::session::domain::session_progress::SessionProgress;

/// Emitted once per accepted gesture.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GestureCompleted {
    pub gesture: GestureKind,
    pub next_gesture: Option<GestureKind>,
    pub outcome: GestureOutcome,
}

/// Owned form of every observer callback, for transports such as channels.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    Progress(SessionProgress),
    GestureCompleted(GestureCompleted),
    SessionComplete(LivenessResult),
}

/// Receives session signals for the presentation layer.
///
/// Callbacks run synchronously inside the session's tick, so
/// implementations should return quickly.
pub trait SessionObserver: Send {
    fn gesture_completed(&mut self, event: &GestureCompleted);

    fn session_complete(&mut self, result: &LivenessResult);

    /// Called after every processed frame. Default: no-op.
    fn progress(&mut self, _progress: &SessionProgress) {}
}

/// Discards all signals. Used when the caller polls the session instead.
pub struct NullSessionObserver;

impl SessionObserver for NullSessionObserver {
    fn gesture_completed(&mut self, _event: &GestureCompleted) {}
    fn session_complete(&mut self, _result: &LivenessResult) {}
}
