//! Blink detection
//!
//! Edge-triggered state machine over the EAR stream. The eye is either open or
//! closed relative to a single threshold; a closed -> open transition counts as
//! a blink only when the closure lasted between the configured bounds. Shorter
//! closures are sensor jitter, longer ones are eyes held shut.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default EAR at or below which the eye is considered closed
pub const DEFAULT_BLINK_THRESHOLD: f64 = 0.2;

/// Default shortest closure counted as a blink (ms)
pub const DEFAULT_MIN_BLINK_DURATION_MS: f64 = 100.0;

/// Default longest closure counted as a blink (ms)
pub const DEFAULT_MAX_BLINK_DURATION_MS: f64 = 400.0;

/// Default trailing window for blink rate (ms)
pub const DEFAULT_BLINK_RATE_WINDOW_MS: f64 = 60_000.0;

/// EAR history retention (ms)
pub const EAR_HISTORY_MS: f64 = 2_000.0;

/// Blink log retention (ms)
pub const BLINK_LOG_MS: f64 = 60_000.0;

/// Session time required before a blink rate is reported (ms)
pub const MIN_RATE_ELAPSED_MS: f64 = 1_000.0;

/// A completed blink
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlinkEvent {
    /// Time the eye reopened (ms)
    pub timestamp_ms: f64,
    /// Closure duration (ms)
    pub duration_ms: f64,
}

/// Streaming blink detector with a rolling blink log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlinkDetector {
    blink_threshold: f64,
    min_blink_duration_ms: f64,
    max_blink_duration_ms: f64,
    in_blink: bool,
    blink_start_ms: Option<f64>,
    ear_history: VecDeque<(f64, f64)>,
    blink_timestamps: VecDeque<f64>,
    session_start_ms: f64,
}

impl Default for BlinkDetector {
    fn default() -> Self {
        Self::new(
            DEFAULT_BLINK_THRESHOLD,
            DEFAULT_MIN_BLINK_DURATION_MS,
            DEFAULT_MAX_BLINK_DURATION_MS,
        )
    }
}

impl BlinkDetector {
    pub fn new(blink_threshold: f64, min_blink_duration_ms: f64, max_blink_duration_ms: f64) -> Self {
        Self {
            blink_threshold,
            min_blink_duration_ms,
            max_blink_duration_ms,
            in_blink: false,
            blink_start_ms: None,
            ear_history: VecDeque::new(),
            blink_timestamps: VecDeque::new(),
            session_start_ms: 0.0,
        }
    }

    /// Feed one EAR sample. Returns the blink completed by this sample, if any.
    pub fn update(&mut self, ear: f64, timestamp_ms: f64) -> Option<BlinkEvent> {
        self.prune(timestamp_ms);
        self.ear_history.push_back((ear, timestamp_ms));

        if !self.in_blink {
            if ear <= self.blink_threshold {
                self.in_blink = true;
                self.blink_start_ms = Some(timestamp_ms);
            }
            return None;
        }

        if ear <= self.blink_threshold {
            return None;
        }

        self.in_blink = false;
        let start = self.blink_start_ms.take()?;
        let duration_ms = timestamp_ms - start;

        // Skewed clocks give non-positive durations, which fail the lower bound.
        if duration_ms >= self.min_blink_duration_ms && duration_ms <= self.max_blink_duration_ms {
            self.blink_timestamps.push_back(timestamp_ms);
            tracing::debug!(timestamp_ms, duration_ms, "blink detected");
            Some(BlinkEvent {
                timestamp_ms,
                duration_ms,
            })
        } else {
            None
        }
    }

    fn prune(&mut self, now_ms: f64) {
        let history_cutoff = now_ms - EAR_HISTORY_MS;
        while matches!(self.ear_history.front(), Some(&(_, t)) if t < history_cutoff) {
            self.ear_history.pop_front();
        }

        let log_cutoff = now_ms - BLINK_LOG_MS;
        while matches!(self.blink_timestamps.front(), Some(&t) if t < log_cutoff) {
            self.blink_timestamps.pop_front();
        }
    }

    /// Blinks per minute over the trailing `window_ms`.
    ///
    /// The rate is extrapolated over `min(window_ms, now - session start)`; it is
    /// 0 until at least one second of session time has elapsed.
    pub fn blink_rate(&self, now_ms: f64, window_ms: f64) -> f64 {
        let elapsed = window_ms.min(now_ms - self.session_start_ms);
        if elapsed.is_nan() || elapsed < MIN_RATE_ELAPSED_MS {
            return 0.0;
        }

        let cutoff = now_ms - window_ms;
        let count = self
            .blink_timestamps
            .iter()
            .filter(|&&t| t >= cutoff)
            .count();

        count as f64 / (elapsed / 60_000.0)
    }

    /// Clear all state and start a new session at `now_ms`.
    ///
    /// A blink still open at this point is discarded, not counted.
    pub fn reset(&mut self, now_ms: f64) {
        self.in_blink = false;
        self.blink_start_ms = None;
        self.ear_history.clear();
        self.blink_timestamps.clear();
        self.session_start_ms = now_ms;
    }

    pub fn is_in_blink(&self) -> bool {
        self.in_blink
    }

    /// Blinks in the rolling log
    pub fn blink_count(&self) -> usize {
        self.blink_timestamps.len()
    }

    pub fn history_len(&self) -> usize {
        self.ear_history.len()
    }

    pub fn session_start_ms(&self) -> f64 {
        self.session_start_ms
    }
}
