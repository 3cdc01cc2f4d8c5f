use serde::{Deserialize, Serialize};

use crate::shared::constants::{LEFT_EYE_OUTER, NOSE_TIP, RIGHT_EYE_OUTER};
use crate::shared::landmark_frame::LandmarkFrame;

/// Yaw that earns full confidence.
const FULL_CONFIDENCE_YAW: f64 = 0.3;
const MIN_DETECTED_CONFIDENCE: f64 = 0.7;
const MIN_NATURALNESS: f64 = 0.6;
const EXTREME_ROTATION_PENALTY: f64 = 2.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadRotationThresholds {
    /// Minimum absolute yaw proxy.
    pub yaw: f64,
}

impl Default for HeadRotationThresholds {
    fn default() -> Self {
        Self { yaw: 0.4 }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HeadRotationOutcome {
    pub detected: bool,
    pub confidence: f64,
    pub naturalness: f64,
    pub yaw: f64,
}

impl HeadRotationOutcome {
    fn none() -> Self {
        Self {
            detected: false,
            confidence: 0.0,
            naturalness: 0.0,
            yaw: 0.0,
        }
    }
}

pub struct HeadRotationDetector {
    thresholds: HeadRotationThresholds,
}

impl HeadRotationDetector {
    pub fn new(thresholds: HeadRotationThresholds) -> Self {
        Self { thresholds }
    }

    /// Requires a dense mesh; anything sparser reports no rotation.
    ///
    /// Unlike the other detectors there is no partial credit: a head that
    /// has not turned far enough reports zero confidence.
    pub fn detect(&self, frame: &LandmarkFrame) -> HeadRotationOutcome {
        if !frame.is_dense() {
            return HeadRotationOutcome::none();
        }
        let Some(yaw) = yaw_proxy(frame) else {
            return HeadRotationOutcome::none();
        };

        let naturalness = (1.0 - yaw.abs() * EXTREME_ROTATION_PENALTY).max(MIN_NATURALNESS);
        let turned = yaw.abs() > self.thresholds.yaw;
        if !turned {
            return HeadRotationOutcome {
                detected: false,
                confidence: 0.0,
                naturalness,
                yaw,
            };
        }

        HeadRotationOutcome {
            detected: true,
            confidence: (yaw.abs() / FULL_CONFIDENCE_YAW).clamp(MIN_DETECTED_CONFIDENCE, 1.0),
            naturalness,
            yaw,
        }
    }
}

/// `(d(nose, right_eye) - d(nose, left_eye)) / max(both)`; 0 when the
/// points coincide, `None` when a coordinate is not finite.
///
/// Scale invariant and signed: positive when the nose tip has moved toward
/// the subject's left eye. Not a calibrated angle.
pub fn yaw_proxy(frame: &LandmarkFrame) -> Option<f64> {
    let [nose, right_eye, left_eye] = frame.gather(&[NOSE_TIP, RIGHT_EYE_OUTER, LEFT_EYE_OUTER])?;
    let to_right = nose.distance_2d(&right_eye);
    let to_left = nose.distance_2d(&left_eye);
    let span = to_right.max(to_left);
    if span <= 0.0 {
        return Some(0.0);
    }
    let yaw = (to_right - to_left) / span;
    yaw.is_finite().then_some(yaw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::landmark_frame::LandmarkPoint;
    use crate::shared::synthetic_face::SyntheticFace;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn detector() -> HeadRotationDetector {
        HeadRotationDetector::new(HeadRotationThresholds::default())
    }

    #[test]
    fn test_frontal_face_has_zero_yaw() {
        let frame = SyntheticFace::neutral().frame();
        assert_relative_eq!(yaw_proxy(&frame).unwrap(), 0.0, epsilon = 1e-12);
        let outcome = detector().detect(&frame);
        assert!(!outcome.detected);
        assert_relative_eq!(outcome.confidence, 0.0);
    }

    #[rstest]
    #[case::toward_left_eye(0.12, 1.0)]
    #[case::toward_right_eye(-0.12, -1.0)]
    fn test_turn_sign(#[case] shift: f64, #[case] sign: f64) {
        let frame = SyntheticFace::neutral().with_nose_shift(shift).frame();
        let outcome = detector().detect(&frame);
        assert!(outcome.detected);
        assert_eq!(outcome.yaw.signum(), sign);
        assert_relative_eq!(outcome.confidence, 1.0);
        assert_relative_eq!(outcome.naturalness, 0.6);
    }

    #[test]
    fn test_slight_turn_gets_no_partial_credit() {
        let frame = SyntheticFace::neutral().with_nose_shift(0.05).frame();
        let outcome = detector().detect(&frame);
        assert!(outcome.yaw > 0.0 && outcome.yaw < 0.4);
        assert!(!outcome.detected);
        assert_relative_eq!(outcome.confidence, 0.0);
    }

    #[test]
    fn test_threshold_is_configurable() {
        let lenient = HeadRotationDetector::new(HeadRotationThresholds { yaw: 0.1 });
        let frame = SyntheticFace::neutral().with_nose_shift(0.05).frame();
        let outcome = lenient.detect(&frame);
        assert!(outcome.detected);
        assert!(outcome.confidence >= MIN_DETECTED_CONFIDENCE);
    }

    #[test]
    fn test_known_geometry() {
        // nose (0.5, 0.5); right eye 0.3 away, left eye 0.1 away -> yaw = 0.2 / 0.3
        let mut points = vec![LandmarkPoint::new(0.5, 0.5, 0.0); 468];
        points[NOSE_TIP] = LandmarkPoint::new(0.5, 0.5, 0.0);
        points[RIGHT_EYE_OUTER] = LandmarkPoint::new(0.2, 0.5, 0.0);
        points[LEFT_EYE_OUTER] = LandmarkPoint::new(0.6, 0.5, 0.0);
        let outcome = HeadRotationDetector::new(HeadRotationThresholds { yaw: 0.5 })
            .detect(&LandmarkFrame::new(points));

        assert_relative_eq!(outcome.yaw, 2.0 / 3.0, epsilon = 1e-9);
        assert!(outcome.detected);
        // max(0.6, 1 - 4/3)
        assert_relative_eq!(outcome.naturalness, 0.6);
    }

    #[test]
    fn test_coincident_points_yield_zero_yaw() {
        let frame = LandmarkFrame::new(vec![LandmarkPoint::new(0.5, 0.5, 0.0); 468]);
        assert_eq!(yaw_proxy(&frame), Some(0.0));
    }

    #[test]
    fn test_sparse_mesh_reports_nothing() {
        let frame = SyntheticFace::neutral().with_nose_shift(0.12).frame_truncated(467);
        assert_eq!(detector().detect(&frame), HeadRotationOutcome::none());
    }

    #[test]
    fn test_non_finite_nose_is_not_a_rotation() {
        let frame = SyntheticFace::neutral()
            .with_nose_shift(0.12)
            .frame_with_point(NOSE_TIP, LandmarkPoint::new(f64::NAN, 0.55, 0.0));
        assert!(yaw_proxy(&frame).is_none());

        let outcome = detector().detect(&frame);
        assert!(!outcome.detected);
        assert_relative_eq!(outcome.confidence, 0.0);
    }
}
