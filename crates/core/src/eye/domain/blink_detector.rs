use serde::{Deserialize, Serialize};

use crate::eye::domain::eye_aspect_ratio::{combined_ear, EarClassifier, EyeStateSample};
use crate::shared::constants::BLINK_MIN_LANDMARKS;
use crate::shared::landmark_frame::LandmarkFrame;
use crate::shared::rolling_window::RollingWindow;

pub const ACCEPTED_BLINK_CONFIDENCE: f64 = 0.9;

/// Ceiling for the "eye is closing" confidence reported between blinks.
const MAX_PARTIAL_CONFIDENCE: f64 = 0.5;

/// Spontaneous blinks cluster around this duration.
const TYPICAL_BLINK_MS: f64 = 200.0;
const MIN_DURATION_NATURALNESS: f64 = 0.6;
const RAPID_BLINK_PENALTY: f64 = 0.5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlinkThresholds {
    /// EAR below which the eye is closed.
    pub closed: f64,
    /// EAR separating the open and closed segments of a blink cycle.
    pub blink: f64,
    /// EAR at or above which the eye is fully open.
    pub open: f64,
    /// Closures shorter than this are tracker noise.
    pub min_closed_duration_ms: i64,
    pub min_blink_duration_ms: i64,
    pub max_blink_duration_ms: i64,
    pub min_blink_frames: usize,
    pub history_capacity: usize,
    /// Moving-average length applied to raw EAR values.
    pub smoothing_window: usize,
    /// Accepted blinks closer together than this lose half their naturalness.
    pub rapid_blink_window_ms: i64,
    /// Ticks this soon after an accepted blink are not scanned at all.
    pub cooldown_ms: i64,
}

impl Default for BlinkThresholds {
    fn default() -> Self {
        Self {
            closed: 0.15,
            blink: 0.20,
            open: 0.25,
            min_closed_duration_ms: 80,
            min_blink_duration_ms: 120,
            max_blink_duration_ms: 400,
            min_blink_frames: 3,
            history_capacity: 30,
            smoothing_window: 3,
            rapid_blink_window_ms: 500,
            cooldown_ms: 300,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BlinkOutcome {
    pub detected: bool,
    pub confidence: f64,
    pub naturalness: f64,
    /// Closed-segment duration of the most recently evaluated cycle.
    pub blink_duration_ms: i64,
    pub closed_frame_count: usize,
    /// Smoothed sample recorded this tick.
    pub sample: EyeStateSample,
}

impl BlinkOutcome {
    fn idle(sample: EyeStateSample, confidence: f64) -> Self {
        Self {
            detected: false,
            confidence,
            naturalness: 0.0,
            blink_duration_ms: 0,
            closed_frame_count: 0,
            sample,
        }
    }
}

/// Closed run bounded by open samples on both sides.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ClosedSegment {
    start_ms: i64,
    reopen_ms: i64,
    closed_frames: usize,
}

impl ClosedSegment {
    fn duration_ms(&self) -> i64 {
        self.reopen_ms.saturating_sub(self.start_ms)
    }
}

pub struct BlinkDetector {
    thresholds: BlinkThresholds,
    classifier: EarClassifier,
    raw_ear: RollingWindow<f64>,
    history: RollingWindow<EyeStateSample>,
    last_blink_ms: Option<i64>,
    cooldown_from_ms: Option<i64>,
    /// Reopen timestamp of the last cycle evaluated, accepted or not.
    last_evaluated_reopen_ms: Option<i64>,
}

impl BlinkDetector {
    pub fn new(thresholds: BlinkThresholds) -> Self {
        Self {
            classifier: EarClassifier::new(thresholds.closed, thresholds.blink, thresholds.open),
            raw_ear: RollingWindow::new(thresholds.smoothing_window),
            history: RollingWindow::new(thresholds.history_capacity),
            last_blink_ms: None,
            cooldown_from_ms: None,
            last_evaluated_reopen_ms: None,
            thresholds,
        }
    }

    pub fn thresholds(&self) -> &BlinkThresholds {
        &self.thresholds
    }

    pub fn history(&self) -> &RollingWindow<EyeStateSample> {
        &self.history
    }

    pub fn reset(&mut self) {
        self.raw_ear.clear();
        self.history.clear();
        self.last_blink_ms = None;
        self.cooldown_from_ms = None;
        self.last_evaluated_reopen_ms = None;
    }

    /// Processes one landmark frame.
    ///
    /// Sparse meshes are treated as dropped frames: the result is an open,
    /// non-blinking eye and the history is left untouched.
    pub fn update(&mut self, frame: &LandmarkFrame, timestamp_ms: i64) -> BlinkOutcome {
        if frame.len() < BLINK_MIN_LANDMARKS {
            return BlinkOutcome::idle(EyeStateSample::neutral(timestamp_ms), 0.0);
        }
        match combined_ear(frame) {
            Some(ear) => self.update_ear(ear, timestamp_ms),
            None => BlinkOutcome::idle(EyeStateSample::neutral(timestamp_ms), 0.0),
        }
    }

    /// Processes one raw combined EAR value.
    ///
    /// A blink is accepted only when a complete open -> closed -> open cycle
    /// is visible in the history and the closed segment lasts as long as a
    /// natural blink does. Each cycle is counted at most once. Non-finite
    /// values are dropped without touching the history.
    pub fn update_ear(&mut self, raw_ear: f64, timestamp_ms: i64) -> BlinkOutcome {
        if !raw_ear.is_finite() {
            log::debug!("Dropping non-finite EAR sample");
            return BlinkOutcome::idle(EyeStateSample::neutral(timestamp_ms), 0.0);
        }
        self.raw_ear.push(raw_ear);
        let smoothed = self.raw_ear.mean().unwrap_or(raw_ear);
        let sample = self.classifier.sample(smoothed, timestamp_ms);
        self.history.push(sample);

        let partial = self.partial_confidence(smoothed);

        if let Some(from) = self.cooldown_from_ms {
            if timestamp_ms.saturating_sub(from) < self.thresholds.cooldown_ms {
                return BlinkOutcome::idle(sample, partial);
            }
        }

        let Some(segment) = self.latest_closed_segment() else {
            return BlinkOutcome::idle(sample, partial);
        };
        if self
            .last_evaluated_reopen_ms
            .is_some_and(|seen| segment.reopen_ms <= seen)
        {
            return BlinkOutcome::idle(sample, partial);
        }
        self.last_evaluated_reopen_ms = Some(segment.reopen_ms);

        let duration = segment.duration_ms();
        let mut outcome = BlinkOutcome::idle(sample, partial);
        outcome.blink_duration_ms = duration;
        outcome.closed_frame_count = segment.closed_frames;

        if duration < self.thresholds.min_closed_duration_ms {
            log::debug!("Ignoring micro-closure of {duration}ms");
            return outcome;
        }
        let within_duration = (self.thresholds.min_blink_duration_ms
            ..=self.thresholds.max_blink_duration_ms)
            .contains(&duration);
        if !within_duration || segment.closed_frames < self.thresholds.min_blink_frames {
            log::debug!(
                "Rejecting eye closure: {duration}ms over {} frames",
                segment.closed_frames
            );
            return outcome;
        }

        let mut naturalness = duration_naturalness(duration);
        if let Some(previous) = self.last_blink_ms {
            let gap = timestamp_ms.saturating_sub(previous);
            if gap < self.thresholds.rapid_blink_window_ms {
                log::debug!("Rapid repeat blink {gap}ms after previous");
                naturalness *= RAPID_BLINK_PENALTY;
            }
        }
        self.last_blink_ms = Some(timestamp_ms);
        self.cooldown_from_ms = Some(timestamp_ms);

        outcome.detected = true;
        outcome.confidence = ACCEPTED_BLINK_CONFIDENCE;
        outcome.naturalness = naturalness;
        outcome
    }

    /// Walks the history from newest to oldest and returns the most recent
    /// closed run that has an open sample both before and after it.
    fn latest_closed_segment(&self) -> Option<ClosedSegment> {
        let history = &self.history;
        let open = |i: usize| history.get(i).is_some_and(|s| s.ear >= self.thresholds.blink);

        let reopen = (1..history.len()).rev().find(|&i| open(i) && !open(i - 1))?;

        let end = reopen - 1;
        let mut start = end;
        while start > 0 && !open(start - 1) {
            start -= 1;
        }
        if start == 0 {
            // Closed run reaches the oldest sample; the preceding open period is gone.
            return None;
        }

        Some(ClosedSegment {
            start_ms: history.get(start)?.timestamp_ms,
            reopen_ms: history.get(reopen)?.timestamp_ms,
            closed_frames: end - start + 1,
        })
    }

    fn partial_confidence(&self, smoothed_ear: f64) -> f64 {
        let open = self.thresholds.open;
        if open <= 0.0 {
            return 0.0;
        }
        ((open - smoothed_ear) / open).clamp(0.0, 1.0) * MAX_PARTIAL_CONFIDENCE
    }
}

fn duration_naturalness(duration_ms: i64) -> f64 {
    let deviation = (duration_ms as f64 - TYPICAL_BLINK_MS).abs();
    (1.0 - deviation / (2.0 * TYPICAL_BLINK_MS)).clamp(MIN_DURATION_NATURALNESS, 1.0)
}
