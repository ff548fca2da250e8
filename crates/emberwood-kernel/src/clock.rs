//! Frame clock: one logical "now" per frame.
//!
//! The simulation is single-threaded and cooperative; every read of the
//! current time within a frame sees the same value. The clock advances by
//! the host's per-frame delta, clamped to avoid the spiral of death after a
//! stall.

/// Maximum per-frame delta in seconds.
const MAX_DT: f32 = 0.25;

/// Monotonic millisecond clock advanced once per frame.
#[derive(Debug, Default)]
pub struct FrameClock {
    now_ms: u64,
    carry: f32,
}

impl FrameClock {
    /// Creates a clock at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances by `dt` seconds (clamped) and returns the clamped delta.
    ///
    /// Sub-millisecond remainders carry over to the next frame so the clock
    /// does not drift at high frame rates.
    pub fn advance(&mut self, dt: f32) -> f32 {
        let dt = dt.clamp(0.0, MAX_DT);
        let total_ms = dt * 1000.0 + self.carry;
        let whole = total_ms.floor();
        self.carry = total_ms - whole;
        self.now_ms += whole as u64;
        dt
    }

    /// Returns the current frame timestamp in milliseconds.
    #[must_use]
    pub const fn now_ms(&self) -> u64 {
        self.now_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_accumulates_milliseconds() {
        let mut clock = FrameClock::new();
        clock.advance(0.2);
        assert_eq!(clock.now_ms(), 200);
        clock.advance(0.25);
        assert_eq!(clock.now_ms(), 450);
    }

    #[test]
    fn test_delta_is_clamped() {
        let mut clock = FrameClock::new();
        let dt = clock.advance(5.0);
        assert!((dt - 0.25).abs() < f32::EPSILON);
        assert_eq!(clock.now_ms(), 250);
    }

    #[test]
    fn test_sub_millisecond_carry() {
        let mut clock = FrameClock::new();
        // 1/60s frames: 16.66..ms each. After 60 frames the clock should be
        // within rounding of one second, not 60 * 16 = 960ms.
        for _ in 0..60 {
            clock.advance(1.0 / 60.0);
        }
        assert!((999..=1001).contains(&clock.now_ms()));
    }

    #[test]
    fn test_negative_delta_ignored() {
        let mut clock = FrameClock::new();
        clock.advance(-1.0);
        assert_eq!(clock.now_ms(), 0);
    }
}
