pub mod head_rotation_detector;
