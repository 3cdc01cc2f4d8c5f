pub mod json_trace_reader;
pub mod vec_landmark_source;
