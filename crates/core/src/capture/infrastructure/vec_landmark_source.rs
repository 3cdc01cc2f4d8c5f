use std::collections::VecDeque;

use crate::capture::domain::landmark_source::{CapturedFrame, LandmarkSource};
use crate::shared::error::TraceError;

/// Serves frames already held in memory.
#[derive(Debug, Default)]
pub struct VecLandmarkSource {
    frames: VecDeque<CapturedFrame>,
}

impl VecLandmarkSource {
    pub fn new(frames: Vec<CapturedFrame>) -> Self {
        Self {
            frames: frames.into(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl LandmarkSource for VecLandmarkSource {
    fn next_frame(&mut self) -> Option<Result<CapturedFrame, TraceError>> {
        self.frames.pop_front().map(Ok)
    }
}
