use std::path::PathBuf;

use thiserror::Error;

use crate::session::domain::gesture::GestureKind;
use crate::session::domain::session_state::SessionState;

/// Session-level failures. These indicate integration bugs or bad
/// deployment settings and are surfaced immediately; per-frame sensor
/// problems never produce one.
#[derive(Error, Debug)]
pub enum LivenessError {
    #[error("invalid session state: expected {expected}, found {actual}")]
    InvalidState {
        expected: SessionState,
        actual: SessionState,
    },
    #[error("gesture '{0}' is required more than once")]
    DuplicateGesture(GestureKind),
    #[error("unknown gesture '{0}' (expected blink, smile or head_rotation)")]
    UnknownGesture(String),
    #[error("at least one gesture is required")]
    NoGestures,
    #[error("invalid setting {name}: {reason}")]
    InvalidThreshold { name: &'static str, reason: String },
    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures while reading recorded landmark traces.
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("failed to read trace {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse trace: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("frame {index}: {reason}")]
    MalformedFrame { index: usize, reason: String },
}
