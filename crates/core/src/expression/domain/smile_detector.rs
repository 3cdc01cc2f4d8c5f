use serde::{Deserialize, Serialize};

use crate::shared::constants::{
    LOWER_LIP_CENTER, MOUTH_LEFT_CORNER, MOUTH_OUTER, MOUTH_RIGHT_CORNER, UPPER_LIP_CENTER,
};
use crate::shared::landmark_frame::{LandmarkFrame, LandmarkPoint};

/// Curvature that earns full confidence.
const FULL_CONFIDENCE_CURVATURE: f64 = 0.1;
const MIN_DETECTED_CONFIDENCE: f64 = 0.7;
/// Ceiling for confidence reported while not smiling.
const MAX_PARTIAL_CONFIDENCE: f64 = 0.5;
const MIN_NATURALNESS: f64 = 0.6;
const ASYMMETRY_PENALTY: f64 = 10.0;

const FALLBACK_CONFIDENCE: f64 = 0.6;
const FALLBACK_NATURALNESS: f64 = 0.7;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmileThresholds {
    /// Minimum curvature, in normalized image units.
    pub curvature: f64,
    /// Mean mouth-point displacement that counts as a smile on sparse meshes.
    pub fallback_displacement: f64,
    /// Observation time required before, and between, fallback detections.
    pub fallback_cooldown_ms: i64,
}

impl Default for SmileThresholds {
    fn default() -> Self {
        Self {
            curvature: 0.07,
            fallback_displacement: 0.015,
            fallback_cooldown_ms: 1_000,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SmileOutcome {
    pub detected: bool,
    pub confidence: f64,
    pub naturalness: f64,
    pub curvature: f64,
    pub asymmetry: f64,
    /// True when the sparse-mesh motion heuristic produced this outcome.
    pub from_motion: bool,
}

impl SmileOutcome {
    fn none(from_motion: bool) -> Self {
        Self {
            detected: false,
            confidence: 0.0,
            naturalness: 0.0,
            curvature: 0.0,
            asymmetry: 0.0,
            from_motion,
        }
    }
}

/// Detects a smile from outer-lip curvature, `center_y - mean(corner_y)` with
/// Y growing downward, so raised corners make it positive.
///
/// Meshes too sparse to contain the whole lip contour fall back to a coarse
/// motion heuristic over whichever mouth points are present.
pub struct SmileDetector {
    thresholds: SmileThresholds,
    /// Mouth points seen on the previous tick, by mesh index.
    previous_mouth: Vec<(usize, LandmarkPoint)>,
    /// Start of the current fallback cooldown window.
    fallback_anchor_ms: Option<i64>,
}

impl SmileDetector {
    pub fn new(thresholds: SmileThresholds) -> Self {
        Self {
            thresholds,
            previous_mouth: Vec::new(),
            fallback_anchor_ms: None,
        }
    }

    pub fn reset(&mut self) {
        self.previous_mouth.clear();
        self.fallback_anchor_ms = None;
    }

    pub fn detect(&mut self, frame: &LandmarkFrame, timestamp_ms: i64) -> SmileOutcome {
        let current_mouth = mouth_points(frame);
        let outcome = if frame.gather(&MOUTH_OUTER).is_some() {
            self.measure_geometry(frame)
        } else {
            self.detect_from_motion(&current_mouth, timestamp_ms)
        };
        self.previous_mouth = current_mouth;
        outcome
    }

    fn measure_geometry(&self, frame: &LandmarkFrame) -> SmileOutcome {
        let Some([left, right, upper, lower]) = frame.gather(&[
            MOUTH_LEFT_CORNER,
            MOUTH_RIGHT_CORNER,
            UPPER_LIP_CENTER,
            LOWER_LIP_CENTER,
        ]) else {
            return SmileOutcome::none(false);
        };

        let center_y = (upper.y + lower.y) / 2.0;
        let corners_y = (left.y + right.y) / 2.0;
        let curvature = center_y - corners_y;
        let asymmetry = (left.y - right.y).abs();
        if !(curvature.is_finite() && asymmetry.is_finite()) {
            return SmileOutcome::none(false);
        }

        let detected = curvature > self.thresholds.curvature;
        let confidence = if detected {
            (curvature.abs() / FULL_CONFIDENCE_CURVATURE).clamp(MIN_DETECTED_CONFIDENCE, 1.0)
        } else {
            (curvature.abs() / FULL_CONFIDENCE_CURVATURE * MAX_PARTIAL_CONFIDENCE)
                .min(MAX_PARTIAL_CONFIDENCE)
        };
        let naturalness = (1.0 - asymmetry * ASYMMETRY_PENALTY).max(MIN_NATURALNESS);

        SmileOutcome {
            detected,
            confidence,
            naturalness,
            curvature,
            asymmetry,
            from_motion: false,
        }
    }

    fn detect_from_motion(
        &mut self,
        current: &[(usize, LandmarkPoint)],
        timestamp_ms: i64,
    ) -> SmileOutcome {
        let anchor = *self.fallback_anchor_ms.get_or_insert(timestamp_ms);

        let Some(displacement) = mean_displacement(&self.previous_mouth, current) else {
            return SmileOutcome::none(true);
        };
        let cooled_down =
            timestamp_ms.saturating_sub(anchor) >= self.thresholds.fallback_cooldown_ms;
        let moved = displacement > self.thresholds.fallback_displacement;
        if !moved || !cooled_down {
            return SmileOutcome::none(true);
        }

        log::debug!("Mouth motion {displacement:.4} accepted as smile on sparse mesh");
        self.fallback_anchor_ms = Some(timestamp_ms);
        SmileOutcome {
            detected: true,
            confidence: FALLBACK_CONFIDENCE,
            naturalness: FALLBACK_NATURALNESS,
            curvature: 0.0,
            asymmetry: 0.0,
            from_motion: true,
        }
    }
}

fn mouth_points(frame: &LandmarkFrame) -> Vec<(usize, LandmarkPoint)> {
    MOUTH_OUTER
        .iter()
        .filter_map(|&i| frame.get(i).map(|p| (i, *p)))
        .collect()
}

/// Mean displacement over mouth indices present in both snapshots.
fn mean_displacement(
    previous: &[(usize, LandmarkPoint)],
    current: &[(usize, LandmarkPoint)],
) -> Option<f64> {
    let mut total = 0.0;
    let mut count = 0usize;
    for (index, point) in current {
        if let Some((_, before)) = previous.iter().find(|(i, _)| i == index) {
            total += point.distance_2d(before);
            count += 1;
        }
    }
    (count > 0).then(|| total / count as f64)
}
