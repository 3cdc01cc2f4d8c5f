use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::capture::domain::landmark_source::LandmarkSource;
use crate::session::domain::liveness_config::LivenessConfig;
use crate::session::domain::liveness_result::LivenessResult;
use crate::session::domain::session_observer::SessionObserver;
use crate::session::domain::session_state::SessionState;
use crate::session::gesture_session::GestureSession;
use crate::shared::clock::{Clock, ManualClock};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckOutcome {
    /// Every gesture completed and the score met the threshold.
    Passed,
    /// Every gesture completed but the score fell short.
    Failed,
    TimedOut,
    /// The source ran dry or the check was cancelled first.
    Incomplete,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LivenessVerdict {
    pub outcome: CheckOutcome,
    pub result: LivenessResult,
    pub frames_processed: usize,
    /// Frames without a face.
    pub frames_dropped: usize,
}

impl LivenessVerdict {
    pub fn is_live(&self) -> bool {
        self.outcome == CheckOutcome::Passed && self.result.is_live
    }
}

/// Runs one liveness check over a landmark source.
///
/// Session time follows the frame timestamps rather than the wall clock, so
/// recorded traces replay with their original timing. The session timeout
/// is enforced here, before each frame. Single-use: `execute` consumes the
/// source and observer.
pub struct RunLivenessCheckUseCase {
    source: Option<Box<dyn LandmarkSource>>,
    observer: Option<Box<dyn SessionObserver>>,
    cancelled: Arc<AtomicBool>,
}

impl RunLivenessCheckUseCase {
    pub fn new(
        source: Box<dyn LandmarkSource>,
        observer: Box<dyn SessionObserver>,
        cancelled: Option<Arc<AtomicBool>>,
    ) -> Self {
        Self {
            source: Some(source),
            observer: Some(observer),
            cancelled: cancelled.unwrap_or_else(|| Arc::new(AtomicBool::new(false))),
        }
    }

    pub fn execute(
        &mut self,
        config: LivenessConfig,
    ) -> Result<LivenessVerdict, Box<dyn std::error::Error>> {
        let mut source = self.source.take().ok_or("Liveness check already executed")?;
        let observer = self.observer.take().ok_or("Liveness check already executed")?;

        let first = source.next_frame().ok_or("Landmark source produced no frames")??;

        let clock = ManualClock::new(first.timestamp_ms);
        let mut session = GestureSession::new(Box::new(clock.clone()), observer);
        session.start_session(config)?;

        let mut frames_processed = 0;
        let mut frames_dropped = 0;
        let mut next = Some(first);

        let outcome = loop {
            let Some(frame) = next.take() else {
                break CheckOutcome::Incomplete;
            };
            if self.cancelled.load(Ordering::Relaxed) {
                log::info!("Liveness check cancelled");
                break CheckOutcome::Incomplete;
            }

            clock.set(frame.timestamp_ms);
            if session.is_timed_out() {
                log::info!(
                    "Liveness check timed out after {}ms",
                    session.elapsed_ms()
                );
                break CheckOutcome::TimedOut;
            }

            if frame.landmarks.is_empty() {
                frames_dropped += 1;
            }
            session.process_frame(&frame.landmarks)?;
            frames_processed += 1;

            if session.state() == SessionState::Complete {
                break match session.result() {
                    Some(result) if result.is_live => CheckOutcome::Passed,
                    _ => CheckOutcome::Failed,
                };
            }

            next = source.next_frame().transpose()?;
        };

        let result = match outcome {
            CheckOutcome::Passed | CheckOutcome::Failed => session.result(),
            CheckOutcome::TimedOut | CheckOutcome::Incomplete => None,
        }
        .unwrap_or_else(|| {
            LivenessResult::failed(
                session.completed_gestures(),
                session.config().required_gestures.len(),
                session.elapsed_ms(),
                clock.now_ms(),
            )
        });
        session.stop_session();

        log::info!(
            "Liveness check finished: {outcome:?} after {frames_processed} frames ({frames_dropped} without a face)"
        );
        Ok(LivenessVerdict {
            outcome,
            result,
            frames_processed,
            frames_dropped,
        })
    }
}
