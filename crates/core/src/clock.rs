//! Frame timing.

use std::time::Instant;

/// Delta assumed for the very first frame.
pub const FIRST_FRAME_DELTA: f32 = 1.0 / 60.0;

/// Timing sampled once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTiming {
    /// Seconds since the clock started.
    pub elapsed: f32,
    /// Seconds since the previous frame.
    pub delta: f32,
}

/// Wall clock tracking elapsed time and per-frame delta.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last_frame: Option<Instant>,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self {
            start,
            last_frame: None,
        }
    }

    /// Seconds since the clock started, without advancing the frame.
    pub fn elapsed(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }

    /// Sample the clock for a new frame.
    pub fn tick(&mut self) -> FrameTiming {
        self.tick_at(Instant::now())
    }

    /// Sample the clock as if the frame began at `now`.
    pub fn tick_at(&mut self, now: Instant) -> FrameTiming {
        let delta = match self.last_frame {
            Some(last) => now.saturating_duration_since(last).as_secs_f32(),
            None => FIRST_FRAME_DELTA,
        };
        self.last_frame = Some(now);

        FrameTiming {
            elapsed: now.saturating_duration_since(self.start).as_secs_f32(),
            delta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn first_tick_uses_nominal_delta() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        let timing = clock.tick_at(start + Duration::from_millis(500));
        assert_eq!(timing.delta, FIRST_FRAME_DELTA);
        assert!((timing.elapsed - 0.5).abs() < 1e-6);
    }

    #[test]
    fn delta_is_time_between_ticks() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        clock.tick_at(start + Duration::from_millis(100));
        let timing = clock.tick_at(start + Duration::from_millis(125));
        assert!((timing.delta - 0.025).abs() < 1e-6);
        assert!((timing.elapsed - 0.125).abs() < 1e-6);
    }

    #[test]
    fn time_never_runs_backwards() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start + Duration::from_secs(1));
        let timing = clock.tick_at(start);
        assert_eq!(timing.elapsed, 0.0);

        let mut clock = FrameClock::starting_at(start);
        clock.tick_at(start + Duration::from_secs(2));
        let timing = clock.tick_at(start + Duration::from_secs(1));
        assert_eq!(timing.delta, 0.0);
    }
}
