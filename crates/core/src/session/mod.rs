pub mod domain;
pub mod gesture_session;
pub mod infrastructure;
