pub mod blink_detector;
pub mod eye_aspect_ratio;
