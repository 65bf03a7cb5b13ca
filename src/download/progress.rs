//! Monotonic progress fraction

use super::transfer::TransferProgress;

/// Turns raw byte counts into a displayable fraction that never goes backwards
///
/// Safe to feed at any frequency. Ticks with an unknown total (`bytes_expected
/// == 0`) update the byte counters but leave the fraction alone.
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    fraction: f64,
    bytes_written: u64,
    bytes_expected: u64,
}

impl ProgressTracker {
    /// Tracker at 0%
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a tick and return the fraction to display.
    pub fn observe(&mut self, tick: TransferProgress) -> f64 {
        self.bytes_written = self.bytes_written.max(tick.bytes_written);
        if tick.bytes_expected > 0 {
            self.bytes_expected = tick.bytes_expected;
            let raw = tick.bytes_written as f64 / tick.bytes_expected as f64;
            if raw.is_finite() {
                self.fraction = self.fraction.max(raw.clamp(0.0, 1.0));
            }
        }
        self.fraction
    }

    /// Mark the transfer finished (100%)
    pub fn complete(&mut self) -> f64 {
        self.fraction = 1.0;
        self.fraction
    }

    /// Highest byte count seen
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Most recent known total (0 = unknown)
    pub fn bytes_expected(&self) -> u64 {
        self.bytes_expected
    }
}
