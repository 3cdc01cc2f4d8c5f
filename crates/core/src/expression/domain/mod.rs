pub mod smile_detector;
