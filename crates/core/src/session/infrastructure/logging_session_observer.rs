use std::collections::BTreeMap;

use crate::session::domain::gesture::GestureKind;
use crate::session::domain::liveness_result::LivenessResult;
use crate::session::domain::session_observer::{GestureCompleted, SessionObserver};
use crate::session::domain::session_progress::SessionProgress;

/// CLI-oriented observer that logs session signals through the `log`
/// facade and keeps enough history for an end-of-session summary.
///
/// Progress is throttled to every `throttle_ticks` ticks, plus any tick
/// where the current gesture changes.
pub struct LoggingSessionObserver {
    throttle_ticks: usize,
    ticks: usize,
    last_gesture: Option<GestureKind>,
    /// gesture -> (confidence, naturalness) at completion
    completions: BTreeMap<GestureKind, (f64, f64)>,
    order: Vec<GestureKind>,
    result: Option<LivenessResult>,
}

impl LoggingSessionObserver {
    pub fn new(throttle_ticks: usize) -> Self {
        Self {
            throttle_ticks: throttle_ticks.max(1),
            ticks: 0,
            last_gesture: None,
            completions: BTreeMap::new(),
            order: Vec::new(),
            result: None,
        }
    }

    /// Formatted summary, or `None` before any gesture completes.
    pub fn summary_string(&self) -> Option<String> {
        if self.order.is_empty() {
            return None;
        }

        let mut lines = Vec::new();
        lines.push(format!("Liveness session ({} ticks):", self.ticks));
        for kind in &self.order {
            let (confidence, naturalness) = self.completions[kind];
            lines.push(format!(
                "  {:14}: confidence {confidence:.2}  naturalness {naturalness:.2}",
                kind.as_str()
            ));
        }
        match &self.result {
            Some(result) => lines.push(format!(
                "  Verdict: {} (score {:.2}, {}ms)",
                if result.is_live { "live" } else { "not live" },
                result.overall_score,
                result.total_time_ms
            )),
            None => lines.push("  Verdict: session did not complete".to_string()),
        }
        Some(lines.join("\n"))
    }

    pub fn completed_gestures(&self) -> &[GestureKind] {
        &self.order
    }

    /// Logs the summary at info level, if there is one.
    pub fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

impl Default for LoggingSessionObserver {
    fn default() -> Self {
        Self::new(10)
    }
}

impl SessionObserver for LoggingSessionObserver {
    fn gesture_completed(&mut self, event: &GestureCompleted) {
        self.completions.insert(
            event.gesture,
            (event.outcome.confidence, event.outcome.naturalness),
        );
        self.order.push(event.gesture);
        match event.next_gesture {
            Some(next) => log::info!("Gesture '{}' completed, next: '{next}'", event.gesture),
            None => log::info!("Gesture '{}' completed, no gestures remaining", event.gesture),
        }
    }

    fn session_complete(&mut self, result: &LivenessResult) {
        log::info!(
            "Session complete: live={} score={:.2} in {}ms",
            result.is_live,
            result.overall_score,
            result.total_time_ms
        );
        self.result = Some(result.clone());
        self.summary();
    }

    fn progress(&mut self, progress: &SessionProgress) {
        self.ticks += 1;
        let changed = progress.current_gesture != self.last_gesture;
        self.last_gesture = progress.current_gesture;
        if changed || self.ticks % self.throttle_ticks == 0 {
            log::debug!(
                "Progress {:.0}%: {} (warm-up {}ms)",
                progress.fraction * 100.0,
                progress.current_instruction().unwrap_or("-"),
                progress.warmup_remaining_ms
            );
        }
    }
}
