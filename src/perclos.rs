//! PERCLOS sliding window
//!
//! Keeps the most recent EAR samples (FIFO, fixed capacity) and reports the
//! percentage of them below the closure threshold. The window is rescanned on
//! every append; it is small and bounded.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default window size in samples
pub const DEFAULT_PERCLOS_WINDOW: usize = 30;

/// Default EAR below which a sample counts as closed
pub const DEFAULT_CLOSURE_THRESHOLD: f64 = 0.2;

/// Fixed-capacity window over recent EAR samples
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerclosWindow {
    samples: VecDeque<f64>,
    window_size: usize,
    closure_threshold: f64,
}

impl Default for PerclosWindow {
    fn default() -> Self {
        Self::new(DEFAULT_PERCLOS_WINDOW, DEFAULT_CLOSURE_THRESHOLD)
    }
}

impl PerclosWindow {
    /// Create a window holding at most `window_size` samples (minimum 1)
    pub fn new(window_size: usize, closure_threshold: f64) -> Self {
        let window_size = window_size.max(1);
        Self {
            samples: VecDeque::with_capacity(window_size),
            window_size,
            closure_threshold,
        }
    }

    /// Append a sample, evicting the oldest once full, and return the current PERCLOS (0-100)
    pub fn add_sample(&mut self, ear: f64) -> f64 {
        self.samples.push_back(ear);
        while self.samples.len() > self.window_size {
            self.samples.pop_front();
        }
        self.perclos()
    }

    /// Percentage of samples strictly below the closure threshold; 0 when empty
    pub fn perclos(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let closed = self
            .samples
            .iter()
            .filter(|&&ear| ear < self.closure_threshold)
            .count();
        closed as f64 / self.samples.len() as f64 * 100.0
    }

    /// Drop all samples; size and threshold are kept
    pub fn reset(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn closure_threshold(&self) -> f64 {
        self.closure_threshold
    }

    /// Samples oldest first
    pub fn samples(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().copied()
    }
}
