/// Landmark count of a dense face mesh (without iris refinement points).
pub const DENSE_MESH_LANDMARKS: usize = 468;

/// Normalized image-space point: `x`, `y` in `[0, 1]` with Y increasing
/// downward; `z` is provider-defined relative depth.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LandmarkPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl LandmarkPoint {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance in the image plane. Depth is ignored.
    pub fn distance_2d(&self, other: &LandmarkPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Face mesh for one video frame. Detectors address points by mesh index and
/// must cope with frames shorter than the index they need.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LandmarkFrame {
    points: Vec<LandmarkPoint>,
}

impl LandmarkFrame {
    pub fn new(points: Vec<LandmarkPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[LandmarkPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the provider found no face in the frame.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_dense(&self) -> bool {
        self.points.len() >= DENSE_MESH_LANDMARKS
    }

    pub fn get(&self, index: usize) -> Option<&LandmarkPoint> {
        self.points.get(index)
    }

    /// Looks up a fixed set of indices at once.
    ///
    /// Returns `None` if any index is beyond the end of the mesh.
    pub fn gather<const N: usize>(&self, indices: &[usize; N]) -> Option<[LandmarkPoint; N]> {
        let mut out = [LandmarkPoint::default(); N];
        for (slot, &index) in out.iter_mut().zip(indices.iter()) {
            *slot = *self.points.get(index)?;
        }
        Some(out)
    }
}

impl From<Vec<LandmarkPoint>> for LandmarkFrame {
    fn from(points: Vec<LandmarkPoint>) -> Self {
        Self::new(points)
    }
}
