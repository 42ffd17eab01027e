//! Fixed-interval timer driven by frame deltas.

/// Slack for float accumulation so a period of N frames fires on frame N.
const EPSILON: f64 = 1e-6;

/// Fires once every `interval` seconds of accumulated frame time.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalTimer {
    interval: f64,
    elapsed: f64,
}

impl IntervalTimer {
    pub fn new(interval: f64) -> Self {
        Self {
            interval,
            elapsed: 0.0,
        }
    }

    /// Adds `dt` seconds. Returns `true` when a period completed.
    ///
    /// At most one firing per call; the remainder carries into the next
    /// period so the cadence does not drift.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.elapsed += f64::from(dt.max(0.0));
        if self.elapsed + EPSILON >= self.interval {
            self.elapsed = (self.elapsed - self.interval).max(0.0);
            if self.elapsed + EPSILON >= self.interval {
                // A single huge frame; don't fire a burst afterwards.
                self.elapsed = 0.0;
            }
            true
        } else {
            false
        }
    }

    /// Restarts the current period.
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }
}
