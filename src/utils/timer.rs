//! Timer utilities
//!
//! Monotonic wall-clock measurement for requests and runs.

use std::time::{Duration, Instant};

/// Simple timer for measuring elapsed time
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Create and start a new timer
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed time
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Get elapsed time in fractional milliseconds
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1000.0
    }

    /// Stop timer and return elapsed time
    pub fn stop(self, label: &str) -> Duration {
        let elapsed = self.elapsed();
        tracing::debug!("{}: {}ms", label, elapsed.as_millis());
        elapsed
    }
}
