use serde::Serialize;

use crate::session::domain::gesture::GestureOutcome;

/// Weight of the bonus for finishing with fewer gestures than required.
pub const TIME_BONUS_WEIGHT: f64 = 0.2;

/// Final verdict handed to registration, validation and signing flows.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LivenessResult {
    pub is_live: bool,
    pub overall_score: f64,
    pub completed_gestures: Vec<GestureOutcome>,
    pub total_time_ms: i64,
    /// Mean detector confidence over completed gestures.
    pub confidence: f64,
    pub timestamp_ms: i64,
}

impl LivenessResult {
    /// Scores a set of completed gestures.
    ///
    /// `overall_score = mean(confidence * naturalness) + bonus`, capped at 1,
    /// where `bonus = max(0, 1 - completed / required) * 0.2`.
    /// Returns `None` when nothing has been completed yet.
    pub fn evaluate(
        completed: &[GestureOutcome],
        required_count: usize,
        min_liveness_score: f64,
        total_time_ms: i64,
        timestamp_ms: i64,
    ) -> Option<Self> {
        if completed.is_empty() {
            return None;
        }
        let n = completed.len() as f64;
        let mean_score = completed.iter().map(GestureOutcome::score).sum::<f64>() / n;
        let confidence = completed.iter().map(|o| o.confidence).sum::<f64>() / n;

        let bonus = if required_count > 0 {
            (1.0 - n / required_count as f64).max(0.0) * TIME_BONUS_WEIGHT
        } else {
            0.0
        };
        let overall_score = (mean_score + bonus).min(1.0);

        Some(Self {
            is_live: overall_score >= min_liveness_score,
            overall_score,
            completed_gestures: completed.to_vec(),
            total_time_ms,
            confidence,
            timestamp_ms,
        })
    }

    /// Verdict for an abandoned session (timeout, cancellation, lost stream).
    /// Partial progress is scored for diagnostics but never counts as live.
    pub fn failed(
        completed: &[GestureOutcome],
        required_count: usize,
        total_time_ms: i64,
        timestamp_ms: i64,
    ) -> Self {
        let mut result = Self::evaluate(completed, required_count, 1.0, total_time_ms, timestamp_ms)
            .unwrap_or(Self {
                is_live: false,
                overall_score: 0.0,
                completed_gestures: Vec::new(),
                total_time_ms,
                confidence: 0.0,
                timestamp_ms,
            });
        result.is_live = false;
        result
    }
}
