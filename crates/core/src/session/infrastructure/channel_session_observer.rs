use crossbeam_channel::Sender;

use crate::session::domain::liveness_result::LivenessResult;
use crate::session::domain::session_observer::{GestureCompleted, SessionEvent, SessionObserver};
use crate::session::domain::session_progress::SessionProgress;

/// Forwards session signals to another thread (typically a UI) over a
/// crossbeam channel.
///
/// A disconnected receiver is not an error for the session: events are
/// dropped and the session keeps running.
pub struct ChannelSessionObserver {
    tx: Sender<SessionEvent>,
    forward_progress: bool,
}

impl ChannelSessionObserver {
    pub fn new(tx: Sender<SessionEvent>) -> Self {
        Self {
            tx,
            forward_progress: true,
        }
    }

    /// Only forward gesture-completed and session-complete events.
    pub fn without_progress(mut self) -> Self {
        self.forward_progress = false;
        self
    }

    fn send(&self, event: SessionEvent) {
        if self.tx.send(event).is_err() {
            log::debug!("Session event receiver disconnected, dropping event");
        }
    }
}

impl SessionObserver for ChannelSessionObserver {
    fn gesture_completed(&mut self, event: &GestureCompleted) {
        self.send(SessionEvent::GestureCompleted(event.clone()));
    }

    fn session_complete(&mut self, result: &LivenessResult) {
        self.send(SessionEvent::SessionComplete(result.clone()));
    }

    fn progress(&mut self, progress: &SessionProgress) {
        if self.forward_progress {
            self.send(SessionEvent::Progress(progress.clone()));
        }
    }
}
