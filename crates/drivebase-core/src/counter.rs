//! Baselines for the 16-bit counters reported by the base firmware.
//!
//! Encoder ticks and the millisecond timestamp are free-running `u16`
//! counters. Deltas between two samples are read as signed 16-bit values, so
//! a single wrap between samples is handled transparently.

use tracing::warn;

/// Signed difference `curr - prev` of two 16-bit counter samples.
///
/// Equivalent to `((curr - prev + 32768) mod 65536) - 32768`.
#[inline]
pub fn wrapping_delta(prev: u16, curr: u16) -> i16 {
    curr.wrapping_sub(prev) as i16
}

/// Baseline for one wheel's encoder counter.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickTracker {
    last: Option<u16>,
}

impl TickTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a raw tick value and return the signed delta since the last one.
    ///
    /// The first value only seeds the baseline and yields zero.
    pub fn update(&mut self, tick: u16) -> i16 {
        let delta = match self.last {
            Some(prev) => wrapping_delta(prev, tick),
            None => 0,
        };
        self.last = Some(tick);
        delta
    }

    /// Last tick value seen, if any.
    pub fn baseline(&self) -> Option<u16> {
        self.last
    }
}

/// Baseline for the firmware's millisecond timestamp.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeBase {
    last: Option<u16>,
    // Zero until the clock has advanced at least once.
    last_elapsed: f64,
}

impl TimeBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a timestamp (ms). Returns the elapsed time in seconds when the
    /// firmware clock moved since the previous sample, `None` otherwise.
    ///
    /// The first timestamp seeds the baseline. A repeated timestamp leaves the
    /// baseline and the last elapsed time untouched.
    pub fn update(&mut self, timestamp: u16) -> Option<f64> {
        let Some(prev) = self.last else {
            self.last = Some(timestamp);
            return None;
        };
        if prev == timestamp {
            return None;
        }

        let delta_ms = wrapping_delta(prev, timestamp);
        if delta_ms < 0 {
            warn!(prev, timestamp, delta_ms, "firmware timestamp moved backwards");
        }
        self.last = Some(timestamp);
        self.last_elapsed = f64::from(delta_ms) / 1000.0;
        Some(self.last_elapsed)
    }

    /// Most recent non-zero elapsed time (s), or zero before the clock first advanced.
    pub fn last_elapsed(&self) -> f64 {
        self.last_elapsed
    }

    /// Last timestamp seen, if any.
    pub fn baseline(&self) -> Option<u16> {
        self.last
    }
}
