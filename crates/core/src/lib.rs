//! Gesture-based liveness detection over facial landmark streams.
//!
//! A [`GestureSession`](session::gesture_session::GestureSession) asks the
//! subject for a fixed sequence of gestures (blink, smile, head rotation),
//! evaluates each incoming landmark frame against the current gesture only,
//! and scores the completed sequence into a
//! [`LivenessResult`](session::domain::liveness_result::LivenessResult).

pub mod capture;
pub mod expression;
pub mod eye;
pub mod pipeline;
pub mod pose;
pub mod session;
pub mod shared;
