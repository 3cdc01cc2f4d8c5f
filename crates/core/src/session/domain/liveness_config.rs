use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::expression::domain::smile_detector::SmileThresholds;
use crate::eye::domain::blink_detector::BlinkThresholds;
use crate::pose::domain::head_rotation_detector::HeadRotationThresholds;
use crate::session::domain::gesture::GestureKind;
use crate::shared::error::LivenessError;

pub const DEFAULT_TIMEOUT_MS: i64 = 30_000;
pub const DEFAULT_MIN_LIVENESS_SCORE: f64 = 0.6;
pub const DEFAULT_GESTURE_PAUSE_MS: i64 = 2_000;

/// Detector thresholds. These depend on camera framing and resolution and
/// are expected to be tuned per deployment.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureThresholds {
    pub blink: BlinkThresholds,
    pub smile: SmileThresholds,
    pub head_rotation: HeadRotationThresholds,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LivenessConfig {
    /// Gestures to perform, in order. Each kind may appear once.
    pub required_gestures: Vec<GestureKind>,
    /// Wall-clock budget for a whole session, enforced by the caller.
    pub timeout_ms: i64,
    pub min_liveness_score: f64,
    /// Warm-up after each completed gesture during which frames are ignored.
    pub gesture_pause_ms: i64,
    pub thresholds: GestureThresholds,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            required_gestures: GestureKind::ALL.to_vec(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            min_liveness_score: DEFAULT_MIN_LIVENESS_SCORE,
            gesture_pause_ms: DEFAULT_GESTURE_PAUSE_MS,
            thresholds: GestureThresholds::default(),
        }
    }
}

impl LivenessConfig {
    pub fn with_gestures(mut self, gestures: Vec<GestureKind>) -> Self {
        self.required_gestures = gestures;
        self
    }

    /// Loads a JSON config file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, LivenessError> {
        let text = fs::read_to_string(path).map_err(|source| LivenessError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| LivenessError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), LivenessError> {
        if self.required_gestures.is_empty() {
            return Err(LivenessError::NoGestures);
        }
        let mut seen = HashSet::new();
        for kind in &self.required_gestures {
            if !seen.insert(*kind) {
                return Err(LivenessError::DuplicateGesture(*kind));
            }
        }

        if self.timeout_ms <= 0 {
            return Err(invalid("timeout_ms", "must be positive"));
        }
        if !(0.0..=1.0).contains(&self.min_liveness_score) {
            return Err(invalid("min_liveness_score", "must be between 0.0 and 1.0"));
        }
        if self.gesture_pause_ms < 0 {
            return Err(invalid("gesture_pause_ms", "must not be negative"));
        }

        self.validate_blink()?;

        let smile = &self.thresholds.smile;
        if smile.curvature <= 0.0 {
            return Err(invalid("smile.curvature", "must be positive"));
        }
        if smile.fallback_displacement <= 0.0 {
            return Err(invalid("smile.fallback_displacement", "must be positive"));
        }
        if smile.fallback_cooldown_ms < 0 {
            return Err(invalid("smile.fallback_cooldown_ms", "must not be negative"));
        }

        let yaw = self.thresholds.head_rotation.yaw;
        if !(yaw > 0.0 && yaw < 1.0) {
            return Err(invalid("head_rotation.yaw", "must be between 0.0 and 1.0"));
        }
        Ok(())
    }

    fn validate_blink(&self) -> Result<(), LivenessError> {
        let blink = &self.thresholds.blink;
        if !(blink.closed > 0.0 && blink.closed < blink.blink && blink.blink < blink.open) {
            return Err(invalid(
                "blink",
                format!(
                    "EAR thresholds must satisfy 0 < closed < blink < open, got {} / {} / {}",
                    blink.closed, blink.blink, blink.open
                ),
            ));
        }
        if !(0 <= blink.min_closed_duration_ms
            && blink.min_closed_duration_ms <= blink.min_blink_duration_ms
            && blink.min_blink_duration_ms <= blink.max_blink_duration_ms)
        {
            return Err(invalid(
                "blink",
                "durations must satisfy 0 <= min_closed <= min_blink <= max_blink",
            ));
        }
        if blink.min_blink_frames == 0 {
            return Err(invalid("blink.min_blink_frames", "must be at least 1"));
        }
        if blink.history_capacity < blink.min_blink_frames + 2 {
            return Err(invalid(
                "blink.history_capacity",
                "must hold a full open-closed-open cycle",
            ));
        }
        if blink.smoothing_window == 0 {
            return Err(invalid("blink.smoothing_window", "must be at least 1"));
        }
        if blink.cooldown_ms < 0 || blink.rapid_blink_window_ms < 0 {
            return Err(invalid("blink", "cooldown windows must not be negative"));
        }
        Ok(())
    }
}

fn invalid(name: &'static str, reason: impl Into<String>) -> LivenessError {
    let err = LivenessError::InvalidThreshold {
        name,
        reason: reason.into(),
    };
    log::warn!("Rejected liveness config: {err}");
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = LivenessConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.required_gestures, GestureKind::ALL.to_vec());
        assert_eq!(config.timeout_ms, 30_000);
        assert_eq!(config.gesture_pause_ms, 2_000);
        assert_eq!(config.thresholds.blink.closed, 0.15);
        assert_eq!(config.thresholds.smile.curvature, 0.07);
        assert_eq!(config.thresholds.head_rotation.yaw, 0.4);
    }

    #[test]
    fn test_duplicate_gesture_rejected() {
        let config = LivenessConfig::default().with_gestures(vec![
            GestureKind::Blink,
            GestureKind::Smile,
            GestureKind::Blink,
        ]);
        assert!(matches!(
            config.validate(),
            Err(LivenessError::DuplicateGesture(GestureKind::Blink))
        ));
    }

    #[test]
    fn test_empty_gestures_rejected() {
        let config = LivenessConfig::default().with_gestures(Vec::new());
        assert!(matches!(config.validate(), Err(LivenessError::NoGestures)));
    }

    #[test]
    fn test_unordered_ear_thresholds_rejected() {
        let mut config = LivenessConfig::default();
        config.thresholds.blink.blink = 0.3;
        assert!(matches!(
            config.validate(),
            Err(LivenessError::InvalidThreshold { name: "blink", .. })
        ));
    }

    #[test]
    fn test_inverted_blink_durations_rejected() {
        let mut config = LivenessConfig::default();
        config.thresholds.blink.max_blink_duration_ms = 100;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_out_of_range_score_rejected() {
        let config = LivenessConfig {
            min_liveness_score: 1.5,
            ..LivenessConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(LivenessError::InvalidThreshold {
                name: "min_liveness_score",
                ..
            })
        ));
    }

    #[test]
    fn test_non_positive_yaw_rejected() {
        let mut config = LivenessConfig::default();
        config.thresholds.head_rotation.yaw = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_partial_json_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "required_gestures": ["smile", "head_rotation"],
                "min_liveness_score": 0.7,
                "thresholds": {{ "smile": {{ "curvature": 0.05 }} }}
            }}"#
        )
        .unwrap();

        let config = LivenessConfig::from_json_file(file.path()).unwrap();
        assert_eq!(
            config.required_gestures,
            vec![GestureKind::Smile, GestureKind::HeadRotation]
        );
        assert_eq!(config.min_liveness_score, 0.7);
        assert_eq!(config.thresholds.smile.curvature, 0.05);
        assert_eq!(config.thresholds.smile.fallback_cooldown_ms, 1_000);
        assert_eq!(config.thresholds.blink, BlinkThresholds::default());
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn test_load_unknown_gesture_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "required_gestures": ["blink", "wink"] }}"#).unwrap();
        let err = LivenessConfig::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, LivenessError::ConfigParse { .. }));
        assert!(err.to_string().contains("wink"));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = LivenessConfig::from_json_file(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, LivenessError::ConfigIo { .. }));
    }
}
