pub mod clock;
pub mod constants;
pub mod error;
pub mod landmark_frame;
pub mod rolling_window;

#[cfg(test)]
pub(crate) mod synthetic_face;
