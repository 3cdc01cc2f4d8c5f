pub mod channel_session_observer;
pub mod logging_session_observer;
