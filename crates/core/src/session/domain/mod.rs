pub mod gesture;
pub mod liveness_config;
pub mod liveness_result;
pub mod session_observer;
pub mod session_progress;
pub mod session_state;
