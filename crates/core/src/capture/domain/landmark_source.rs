use crate::shared::error::TraceError;
use crate::shared::landmark_frame::LandmarkFrame;

/// One landmark frame stamped with its capture time.
#[derive(Clone, Debug, PartialEq)]
pub struct CapturedFrame {
    pub timestamp_ms: i64,
    /// Empty when the tracker found no face.
    pub landmarks: LandmarkFrame,
}

/// Yields landmark frames in capture order.
///
/// Implementations hide where frames come from (a live tracker, a recorded
/// trace, a test fixture); the liveness check only sees `CapturedFrame`s.
pub trait LandmarkSource: Send {
    /// Returns the next frame, or `None` once the source is exhausted.
    fn next_frame(&mut self) -> Option<Result<CapturedFrame, TraceError>>;
}
