use crate::shared::constants::{LEFT_EYE_EAR, RIGHT_EYE_EAR};
use crate::shared::landmark_frame::LandmarkFrame;

/// Horizontal spans below this are treated as degenerate.
const MIN_EYE_WIDTH: f64 = 1e-9;

/// EAR reported when the mesh is too short to locate the eyes.
pub const NEUTRAL_EAR: f64 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EyeSide {
    Left,
    Right,
}

impl EyeSide {
    fn indices(self) -> &'static [usize; 6] {
        match self {
            EyeSide::Left => &LEFT_EYE_EAR,
            EyeSide::Right => &RIGHT_EYE_EAR,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EyePhase {
    Open,
    Opening,
    Closing,
    Closed,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EyeStateSample {
    pub ear: f64,
    pub timestamp_ms: i64,
    pub phase: EyePhase,
}

impl EyeStateSample {
    /// Stand-in for frames without usable eye landmarks.
    pub fn neutral(timestamp_ms: i64) -> Self {
        Self {
            ear: NEUTRAL_EAR,
            timestamp_ms,
            phase: EyePhase::Open,
        }
    }
}

/// Eye Aspect Ratio, `(|p2 - p6| + |p3 - p5|) / (2 * |p1 - p4|)` in the
/// image plane. An open eye sits around 0.25-0.35; a closed eye approaches 0.
///
/// `None` if the frame lacks any of the six points or a coordinate is not
/// finite. A collapsed horizontal span yields 0 rather than dividing by zero.
pub fn calculate_ear(frame: &LandmarkFrame, eye: EyeSide) -> Option<f64> {
    let [p1, p2, p3, p4, p5, p6] = frame.gather(eye.indices())?;

    let horizontal = p1.distance_2d(&p4);
    let vertical = p2.distance_2d(&p6) + p3.distance_2d(&p5);
    if !(horizontal.is_finite() && vertical.is_finite()) {
        return None;
    }
    if horizontal < MIN_EYE_WIDTH {
        return Some(0.0);
    }
    Some(vertical / (2.0 * horizontal))
}

/// Mean EAR of both eyes, or `None` if either eye is missing.
pub fn combined_ear(frame: &LandmarkFrame) -> Option<f64> {
    let left = calculate_ear(frame, EyeSide::Left)?;
    let right = calculate_ear(frame, EyeSide::Right)?;
    Some((left + right) / 2.0)
}

/// Classifies EAR values against three ordered thresholds
/// (`closed < blink < open`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EarClassifier {
    closed: f64,
    blink: f64,
    open: f64,
}

impl EarClassifier {
    pub fn new(closed: f64, blink: f64, open: f64) -> Self {
        Self {
            closed,
            blink,
            open,
        }
    }

    pub fn classify(&self, ear: f64) -> EyePhase {
        if ear < self.closed {
            EyePhase::Closed
        } else if ear < self.blink {
            EyePhase::Closing
        } else if ear < self.open {
            EyePhase::Opening
        } else {
            EyePhase::Open
        }
    }

    pub fn sample(&self, ear: f64, timestamp_ms: i64) -> EyeStateSample {
        EyeStateSample {
            ear,
            timestamp_ms,
            phase: self.classify(ear),
        }
    }

    /// Combined-eye sample for a frame, degrading to
    /// [`EyeStateSample::neutral`] when the eyes cannot be located.
    pub fn sample_frame(&self, frame: &LandmarkFrame, timestamp_ms: i64) -> EyeStateSample {
        match combined_ear(frame) {
            Some(ear) => self.sample(ear, timestamp_ms),
            None => EyeStateSample::neutral(timestamp_ms),
        }
    }
}
