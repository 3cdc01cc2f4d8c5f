use crate::shared::constants::{
    LEFT_EYE_EAR, LOWER_LIP_CENTER, MOUTH_LEFT_CORNER, MOUTH_OUTER, MOUTH_RIGHT_CORNER, NOSE_TIP,
    RIGHT_EYE_EAR, UPPER_LIP_CENTER,
};
use crate::shared::landmark_frame::{LandmarkFrame, LandmarkPoint};

pub(crate) const MESH_SIZE: usize = 478;

const EYE_WIDTH: f64 = 0.10;
const EYE_Y: f64 = 0.40;
const RIGHT_EYE_X: f64 = 0.30;
const LEFT_EYE_X: f64 = 0.60;
const NOSE: (f64, f64) = (0.50, 0.55);
const MOUTH_Y: f64 = 0.71;

/// Dense face mesh with controllable eye openness, mouth shape and head turn.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SyntheticFace {
    ear: f64,
    smile: f64,
    smile_tilt: f64,
    nose_shift: f64,
    mouth_offset: f64,
}

impl SyntheticFace {
    /// Frontal face, eyes open (EAR 0.3), neutral mouth.
    pub(crate) fn neutral() -> Self {
        Self {
            ear: 0.3,
            smile: 0.0,
            smile_tilt: 0.0,
            nose_shift: 0.0,
            mouth_offset: 0.0,
        }
    }

    /// Both eyes get exactly this aspect ratio.
    pub(crate) fn with_ear(mut self, ear: f64) -> Self {
        self.ear = ear;
        self
    }

    /// Raises both mouth corners so the curvature equals `curvature`.
    pub(crate) fn with_smile(mut self, curvature: f64) -> Self {
        self.smile = curvature;
        self
    }

    /// Vertical difference between the two mouth corners.
    pub(crate) fn with_smile_tilt(mut self, tilt: f64) -> Self {
        self.smile_tilt = tilt;
        self
    }

    /// Moves the nose tip horizontally; positive moves toward the subject's left eye.
    pub(crate) fn with_nose_shift(mut self, dx: f64) -> Self {
        self.nose_shift = dx;
        self
    }

    /// Translates every mouth landmark vertically.
    pub(crate) fn with_mouth_offset(mut self, dy: f64) -> Self {
        self.mouth_offset = dy;
        self
    }

    pub(crate) fn frame(&self) -> LandmarkFrame {
        self.frame_truncated(MESH_SIZE)
    }

    /// Same face with one landmark replaced.
    pub(crate) fn frame_with_point(&self, index: usize, point: LandmarkPoint) -> LandmarkFrame {
        let mut points = self.frame().points().to_vec();
        points[index] = point;
        LandmarkFrame::new(points)
    }

    /// Same face, but only the first `len` mesh points are emitted.
    pub(crate) fn frame_truncated(&self, len: usize) -> LandmarkFrame {
        let mut points = vec![LandmarkPoint::new(0.5, 0.5, 0.0); MESH_SIZE];

        place_eye(&mut points, &RIGHT_EYE_EAR, RIGHT_EYE_X, self.ear);
        place_eye(&mut points, &LEFT_EYE_EAR, LEFT_EYE_X, self.ear);

        points[NOSE_TIP] = LandmarkPoint::new(NOSE.0 + self.nose_shift, NOSE.1, 0.0);

        let mouth_y = MOUTH_Y + self.mouth_offset;
        for &i in &MOUTH_OUTER {
            points[i] = LandmarkPoint::new(0.5, mouth_y, 0.0);
        }
        let corner_y = mouth_y - self.smile;
        points[MOUTH_LEFT_CORNER] =
            LandmarkPoint::new(0.42, corner_y - self.smile_tilt / 2.0, 0.0);
        points[MOUTH_RIGHT_CORNER] =
            LandmarkPoint::new(0.58, corner_y + self.smile_tilt / 2.0, 0.0);
        points[UPPER_LIP_CENTER] = LandmarkPoint::new(0.5, mouth_y - 0.03, 0.0);
        points[LOWER_LIP_CENTER] = LandmarkPoint::new(0.5, mouth_y + 0.03, 0.0);

        points.truncate(len);
        LandmarkFrame::new(points)
    }
}

/// Lays out six eye points so that EAR equals `ear` exactly.
fn place_eye(points: &mut [LandmarkPoint], indices: &[usize; 6], x_start: f64, ear: f64) {
    let half_h = ear * EYE_WIDTH / 2.0;
    let [p1, p2, p3, p4, p5, p6] = *indices;
    points[p1] = LandmarkPoint::new(x_start, EYE_Y, 0.0);
    points[p4] = LandmarkPoint::new(x_start + EYE_WIDTH, EYE_Y, 0.0);
    points[p2] = LandmarkPoint::new(x_start + EYE_WIDTH / 3.0, EYE_Y - half_h, 0.0);
    points[p3] = LandmarkPoint::new(x_start + 2.0 * EYE_WIDTH / 3.0, EYE_Y - half_h, 0.0);
    points[p5] = LandmarkPoint::new(x_start + 2.0 * EYE_WIDTH / 3.0, EYE_Y + half_h, 0.0);
    points[p6] = LandmarkPoint::new(x_start + EYE_WIDTH / 3.0, EYE_Y + half_h, 0.0);
}
