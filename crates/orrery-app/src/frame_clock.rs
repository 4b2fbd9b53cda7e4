//! Wall-clock frame timing.
//!
//! The orbital clock advances by real elapsed time rather than a fixed step.
//! Long stalls (window dragged, laptop lid closed) are clamped so bodies do
//! not jump across their orbits when the frame loop resumes.

use std::time::Instant;
use tracing::warn;

/// Longest frame the simulation will account for, in seconds.
pub const MAX_FRAME_TIME: f32 = 0.25;

pub struct FrameClock {
    previous_time: Instant,
    frame_count: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self {
            previous_time: start,
            frame_count: 0,
        }
    }

    /// Seconds since the previous tick, clamped to [`MAX_FRAME_TIME`].
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// [`tick`](Self::tick) with an explicit timestamp. A timestamp earlier
    /// than the previous one counts as zero elapsed time.
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let frame_time = now
            .saturating_duration_since(self.previous_time)
            .as_secs_f32();
        self.previous_time = now.max(self.previous_time);
        self.frame_count += 1;

        if frame_time > MAX_FRAME_TIME {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                frame_time * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
            MAX_FRAME_TIME
        } else {
            frame_time
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_tick_measures_elapsed_time() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        let dt = clock.tick_at(start + Duration::from_millis(16));
        assert!((dt - 0.016).abs() < 1e-6);
        let dt = clock.tick_at(start + Duration::from_millis(50));
        assert!((dt - 0.034).abs() < 1e-6);
    }

    #[test]
    fn test_long_frame_is_clamped() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        let dt = clock.tick_at(start + Duration::from_secs(3));
        assert_eq!(dt, MAX_FRAME_TIME);
    }

    #[test]
    fn test_same_instant_is_zero() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        assert_eq!(clock.tick_at(start), 0.0);
    }

    #[test]
    fn test_backwards_timestamp_is_zero() {
        let start = Instant::now() + Duration::from_secs(1);
        let mut clock = FrameClock::starting_at(start);
        assert_eq!(clock.tick_at(start - Duration::from_millis(10)), 0.0);
        // The later timestamp is kept as the reference.
        let dt = clock.tick_at(start + Duration::from_millis(20));
        assert!((dt - 0.020).abs() < 1e-6);
    }

    #[test]
    fn test_frame_count_increments() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        for i in 1..=10 {
            clock.tick_at(start + Duration::from_millis(i * 16));
        }
        assert_eq!(clock.frame_count(), 10);
    }
}
