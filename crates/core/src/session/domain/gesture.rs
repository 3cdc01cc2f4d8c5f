use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::shared::error::LivenessError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum GestureKind {
    Blink,
    Smile,
    HeadRotation,
}

impl GestureKind {
    pub const ALL: &[GestureKind] = &[
        GestureKind::Blink,
        GestureKind::Smile,
        GestureKind::HeadRotation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GestureKind::Blink => "blink",
            GestureKind::Smile => "smile",
            GestureKind::HeadRotation => "head_rotation",
        }
    }

    /// User-facing prompt for the presentation layer.
    pub fn instruction(self) -> &'static str {
        match self {
            GestureKind::Blink => "Blink your eyes naturally",
            GestureKind::Smile => "Smile at the camera",
            GestureKind::HeadRotation => "Slowly turn your head to one side",
        }
    }
}

impl std::fmt::Display for GestureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GestureKind {
    type Err = LivenessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        GestureKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| LivenessError::UnknownGesture(s.to_string()))
    }
}

impl TryFrom<String> for GestureKind {
    type Error = LivenessError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One detector evaluation for one tick.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GestureOutcome {
    pub kind: GestureKind,
    pub detected: bool,
    pub confidence: f64,
    pub naturalness: f64,
    pub timestamp_ms: i64,
}

impl GestureOutcome {
    pub fn score(&self) -> f64 {
        self.confidence * self.naturalness
    }
}

/// Running snapshot of one required gesture across a session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GestureState {
    pub confidence: f64,
    pub naturalness: f64,
    pub last_detection_ms: Option<i64>,
    pub is_detected: bool,
}

impl GestureState {
    pub fn record(&mut self, outcome: &GestureOutcome) {
        self.confidence = outcome.confidence;
        self.naturalness = outcome.naturalness;
        if outcome.detected {
            self.last_detection_ms = Some(outcome.timestamp_ms);
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureStatus {
    Pending,
    Current,
    Completed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case("blink", GestureKind::Blink)]
    #[case("Smile", GestureKind::Smile)]
    #[case("head_rotation", GestureKind::HeadRotation)]
    #[case("head-rotation", GestureKind::HeadRotation)]
    #[case(" blink ", GestureKind::Blink)]
    fn test_parse(#[case] input: &str, #[case] expected: GestureKind) {
        assert_eq!(input.parse::<GestureKind>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "nod".parse::<GestureKind>().unwrap_err();
        assert!(matches!(err, LivenessError::UnknownGesture(ref name) if name == "nod"));
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for kind in GestureKind::ALL {
            assert_eq!(kind.to_string().parse::<GestureKind>().unwrap(), *kind);
        }
    }

    #[test]
    fn test_serde_uses_snake_case_names() {
        let json = serde_json::to_string(&GestureKind::HeadRotation).unwrap();
        assert_eq!(json, "\"head_rotation\"");
        let kind: GestureKind = serde_json::from_str("\"smile\"").unwrap();
        assert_eq!(kind, GestureKind::Smile);
        assert!(serde_json::from_str::<GestureKind>("\"wink\"").is_err());
    }

    #[test]
    fn test_every_gesture_has_an_instruction() {
        for kind in GestureKind::ALL {
            assert!(!kind.instruction().is_empty());
        }
    }

    #[test]
    fn test_state_record_keeps_last_detection() {
        let mut state = GestureState::default();
        let mut outcome = GestureOutcome {
            kind: GestureKind::Smile,
            detected: true,
            confidence: 0.9,
            naturalness: 0.8,
            timestamp_ms: 100,
        };
        state.record(&outcome);
        outcome.detected = false;
        outcome.confidence = 0.1;
        outcome.timestamp_ms = 200;
        state.record(&outcome);

        assert_relative_eq!(state.confidence, 0.1);
        assert_eq!(state.last_detection_ms, Some(100));
        assert!(!state.is_detected);
    }

    #[test]
    fn test_outcome_score() {
        let outcome = GestureOutcome {
            kind: GestureKind::Blink,
            detected: true,
            confidence: 0.9,
            naturalness: 0.5,
            timestamp_ms: 0,
        };
        assert_relative_eq!(outcome.score(), 0.45);
    }
}
