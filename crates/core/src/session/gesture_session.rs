//! Gesture session state machine.
//!
//! Drives the blink, smile and head-rotation detectors against an ordered
//! list of required gestures. Exactly one gesture is current at any time and
//! only its detector sees the frame, so a subject cannot satisfy a later
//! gesture before being asked for it.
//!
//! After each completed gesture the next one is in warm-up for
//! `gesture_pause_ms`; frames during warm-up are ignored so residual motion
//! from the previous gesture cannot count toward the next.
//!
//! The session never expires on its own. Callers compare [`elapsed_ms`] (or
//! [`is_timed_out`]) against the configured timeout and call
//! [`stop_session`] themselves.
//!
//! [`elapsed_ms`]: GestureSession::elapsed_ms
//! [`is_timed_out`]: GestureSession::is_timed_out
//! [`stop_session`]: GestureSession::stop_session

use std::collections::HashMap;

use crate::expression::domain::smile_detector::SmileDetector;
use crate::eye::domain::blink_detector::BlinkDetector;
use crate::pose::domain::head_rotation_detector::HeadRotationDetector;
use crate::session::domain::gesture::{GestureKind, GestureOutcome, GestureState, GestureStatus};
use crate::session::domain::liveness_config::LivenessConfig;
use crate::session::domain::liveness_result::LivenessResult;
use crate::session::domain::session_observer::{GestureCompleted, SessionObserver};
use crate::session::domain::session_progress::{GestureProgress, SessionProgress};
use crate::session::domain::session_state::SessionState;
use crate::shared::clock::Clock;
use crate::shared::error::LivenessError;
use crate::shared::landmark_frame::LandmarkFrame;

pub struct GestureSession {
    clock: Box<dyn Clock>,
    observer: Box<dyn SessionObserver>,
    config: LivenessConfig,
    state: SessionState,
    start_time_ms: Option<i64>,
    current_index: usize,
    completed: Vec<GestureOutcome>,
    gesture_states: HashMap<GestureKind, GestureState>,
    /// Frames before this instant belong to the inter-gesture warm-up.
    gesture_active_at_ms: i64,
    blink: BlinkDetector,
    smile: SmileDetector,
    head_rotation: HeadRotationDetector,
}

impl GestureSession {
    pub fn new(clock: Box<dyn Clock>, observer: Box<dyn SessionObserver>) -> Self {
        let config = LivenessConfig::default();
        Self {
            clock,
            observer,
            state: SessionState::Idle,
            start_time_ms: None,
            current_index: 0,
            completed: Vec::new(),
            gesture_states: HashMap::new(),
            gesture_active_at_ms: 0,
            blink: BlinkDetector::new(config.thresholds.blink.clone()),
            smile: SmileDetector::new(config.thresholds.smile.clone()),
            head_rotation: HeadRotationDetector::new(config.thresholds.head_rotation.clone()),
            config,
        }
    }

    /// Begins a new attempt with fresh detector state.
    ///
    /// Fails if a session is already active or the configuration is invalid;
    /// in both cases the current session is left untouched.
    pub fn start_session(&mut self, config: LivenessConfig) -> Result<(), LivenessError> {
        if self.state == SessionState::Active {
            log::warn!("start_session called while a session is active");
            return Err(LivenessError::InvalidState {
                expected: SessionState::Idle,
                actual: self.state,
            });
        }
        config.validate()?;

        let now = self.clock.now_ms();
        self.blink = BlinkDetector::new(config.thresholds.blink.clone());
        self.smile = SmileDetector::new(config.thresholds.smile.clone());
        self.head_rotation = HeadRotationDetector::new(config.thresholds.head_rotation.clone());
        self.gesture_states = fresh_states(&config.required_gestures);
        self.completed.clear();
        self.current_index = 0;
        self.start_time_ms = Some(now);
        self.gesture_active_at_ms = now;
        self.state = SessionState::Active;

        log::info!(
            "Liveness session started: {}",
            config
                .required_gestures
                .iter()
                .map(|g| g.as_str())
                .collect::<Vec<_>>()
                .join(" -> ")
        );
        self.config = config;
        Ok(())
    }

    /// Runs one tick against the current gesture.
    ///
    /// Returns `Ok(None)` for frames without a face and for frames inside
    /// the inter-gesture warm-up; neither changes session state.
    pub fn process_frame(
        &mut self,
        frame: &LandmarkFrame,
    ) -> Result<Option<GestureOutcome>, LivenessError> {
        if self.state != SessionState::Active {
            log::warn!("process_frame called while session is {}", self.state);
            return Err(LivenessError::InvalidState {
                expected: SessionState::Active,
                actual: self.state,
            });
        }
        if frame.is_empty() {
            log::debug!("Dropping frame without landmarks");
            return Ok(None);
        }

        let now = self.clock.now_ms();
        if now < self.gesture_active_at_ms {
            log::debug!(
                "Warm-up: ignoring frame, {}ms remaining",
                self.gesture_active_at_ms.saturating_sub(now)
            );
            self.emit_progress();
            return Ok(None);
        }

        let Some(&kind) = self.config.required_gestures.get(self.current_index) else {
            return Ok(None);
        };

        let outcome = self.evaluate(kind, frame, now);
        if let Some(state) = self.gesture_states.get_mut(&kind) {
            state.record(&outcome);
        }
        if outcome.detected {
            self.record_completion(&outcome, now);
        }

        self.emit_progress();
        Ok(Some(outcome))
    }

    /// Forces the session back to `Idle`. Safe to call in any state.
    pub fn stop_session(&mut self) {
        if self.state != SessionState::Idle {
            log::info!(
                "Liveness session stopped after {} of {} gestures",
                self.completed.len(),
                self.config.required_gestures.len()
            );
        }
        self.state = SessionState::Idle;
        self.start_time_ms = None;
        self.current_index = 0;
        self.completed.clear();
        self.gesture_states = fresh_states(&self.config.required_gestures);
        self.gesture_active_at_ms = 0;
        self.blink.reset();
        self.smile.reset();
    }

    pub fn progress(&self) -> SessionProgress {
        let required = &self.config.required_gestures;
        let gestures = required
            .iter()
            .enumerate()
            .map(|(i, &kind)| GestureProgress {
                kind,
                status: self.status_of(i, kind),
                instruction: kind.instruction(),
                confidence: self
                    .gesture_states
                    .get(&kind)
                    .map_or(0.0, |s| s.confidence),
            })
            .collect();

        SessionProgress {
            state: self.state,
            current_gesture: self.current_gesture(),
            completed: self.completed.iter().map(|o| o.kind).collect(),
            fraction: if required.is_empty() {
                0.0
            } else {
                self.completed.len() as f64 / required.len() as f64
            },
            gestures,
            warmup_remaining_ms: self.time_until_gesture_active_ms(),
        }
    }

    /// Scores the gestures completed so far; `None` until the first one.
    pub fn result(&self) -> Option<LivenessResult> {
        LivenessResult::evaluate(
            &self.completed,
            self.config.required_gestures.len(),
            self.config.min_liveness_score,
            self.elapsed_ms(),
            self.clock.now_ms(),
        )
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &LivenessConfig {
        &self.config
    }

    pub fn start_time_ms(&self) -> Option<i64> {
        self.start_time_ms
    }

    /// Time since `start_session`, or 0 when idle.
    pub fn elapsed_ms(&self) -> i64 {
        self.start_time_ms
            .map_or(0, |start| self.clock.now_ms().saturating_sub(start))
    }

    /// Whether an active session has outlived its configured timeout.
    /// Purely a query: the session stays active until stopped.
    pub fn is_timed_out(&self) -> bool {
        self.state == SessionState::Active && self.elapsed_ms() > self.config.timeout_ms
    }

    /// Remaining inter-gesture warm-up; 0 when the current gesture is live.
    pub fn time_until_gesture_active_ms(&self) -> i64 {
        if self.state != SessionState::Active {
            return 0;
        }
        self.gesture_active_at_ms
            .saturating_sub(self.clock.now_ms())
            .max(0)
    }

    pub fn current_gesture(&self) -> Option<GestureKind> {
        if self.state != SessionState::Active {
            return None;
        }
        self.config.required_gestures.get(self.current_index).copied()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn completed_gestures(&self) -> &[GestureOutcome] {
        &self.completed
    }

    pub fn gesture_state(&self, kind: GestureKind) -> Option<&GestureState> {
        self.gesture_states.get(&kind)
    }

    /// Dispatches to the single detector for `kind`.
    fn evaluate(&mut self, kind: GestureKind, frame: &LandmarkFrame, now: i64) -> GestureOutcome {
        let (detected, confidence, naturalness) = match kind {
            GestureKind::Blink => {
                let o = self.blink.update(frame, now);
                (o.detected, o.confidence, o.naturalness)
            }
            GestureKind::Smile => {
                let o = self.smile.detect(frame, now);
                (o.detected, o.confidence, o.naturalness)
            }
            GestureKind::HeadRotation => {
                let o = self.head_rotation.detect(frame);
                (o.detected, o.confidence, o.naturalness)
            }
        };
        GestureOutcome {
            kind,
            detected,
            confidence,
            naturalness,
            timestamp_ms: now,
        }
    }

    /// Appends a detected outcome and advances the session.
    ///
    /// Ignores outcomes for gestures that are already completed or are not
    /// the current one. Returns whether the outcome was recorded.
    fn record_completion(&mut self, outcome: &GestureOutcome, now: i64) -> bool {
        if self.completed.iter().any(|c| c.kind == outcome.kind) {
            log::debug!("Ignoring repeat completion of '{}'", outcome.kind);
            return false;
        }
        if self.current_gesture() != Some(outcome.kind) {
            log::debug!("Ignoring out-of-order completion of '{}'", outcome.kind);
            return false;
        }

        self.completed.push(outcome.clone());
        if let Some(state) = self.gesture_states.get_mut(&outcome.kind) {
            state.is_detected = true;
            state.last_detection_ms = Some(now);
        }

        let required = self.config.required_gestures.len();
        let next_gesture = self
            .config
            .required_gestures
            .get(self.current_index + 1)
            .copied();

        log::info!(
            "Gesture '{}' completed ({}/{required}) confidence={:.2} naturalness={:.2}",
            outcome.kind,
            self.completed.len(),
            outcome.confidence,
            outcome.naturalness
        );
        self.observer.gesture_completed(&GestureCompleted {
            gesture: outcome.kind,
            next_gesture,
            outcome: outcome.clone(),
        });

        if self.completed.len() == required {
            self.current_index = required;
            self.state = SessionState::Complete;
            if let Some(result) = self.result() {
                log::info!(
                    "Liveness session complete: live={} score={:.2}",
                    result.is_live,
                    result.overall_score
                );
                self.observer.session_complete(&result);
            }
        } else {
            self.current_index += 1;
            self.gesture_active_at_ms = now.saturating_add(self.config.gesture_pause_ms);
        }
        true
    }

    fn status_of(&self, index: usize, kind: GestureKind) -> GestureStatus {
        if self.completed.iter().any(|c| c.kind == kind) {
            GestureStatus::Completed
        } else if self.state == SessionState::Active && index == self.current_index {
            GestureStatus::Current
        } else {
            GestureStatus::Pending
        }
    }

    fn emit_progress(&mut self) {
        let progress = self.progress();
        self.observer.progress(&progress);
    }
}

fn fresh_states(gestures: &[GestureKind]) -> HashMap<GestureKind, GestureState> {
    gestures
        .iter()
        .map(|&kind| (kind, GestureState::default()))
        .collect()
}
