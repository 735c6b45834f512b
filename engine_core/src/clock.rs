use std::time::{Duration, Instant};

use tracing::warn;

/// Elapsed time since start and seconds since the previous frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTime {
    pub elapsed: Duration,
    pub delta: f32,
}

impl FrameTime {
    pub fn new(elapsed: Duration, delta: f32) -> Self {
        Self { elapsed, delta }
    }

    /// Host-supplied seconds. Negative or non-finite elapsed reads as zero.
    pub fn from_secs(elapsed: f64, delta: f32) -> Self {
        let elapsed = Duration::try_from_secs_f64(elapsed).unwrap_or(Duration::ZERO);
        Self { elapsed, delta }
    }

    /// Replaces a negative or non-finite delta with zero.
    pub fn sanitized(self) -> Self {
        if self.delta.is_finite() && self.delta >= 0.0 {
            return self;
        }
        warn!(delta = self.delta, "invalid frame delta, using 0");
        Self {
            elapsed: self.elapsed,
            delta: 0.0,
        }
    }
}

pub struct FrameClock {
    start: Instant,
    last: Instant,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::start()
    }
}

impl FrameClock {
    pub fn start() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
        }
    }

    /// Time since the clock started, for stamping input events.
    pub fn now(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let delta = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        FrameTime {
            elapsed: now.duration_since(self.start),
            delta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_deltas_become_zero() {
        for delta in [-0.5, f32::NAN, f32::INFINITY] {
            let time = FrameTime::new(Duration::from_millis(40), delta).sanitized();
            assert_eq!(time.delta, 0.0);
            assert_eq!(time.elapsed, Duration::from_millis(40));
        }
        let valid = FrameTime::new(Duration::ZERO, 0.016).sanitized();
        assert_eq!(valid.delta, 0.016);
    }

    #[test]
    fn from_secs_rejects_negative_elapsed() {
        assert_eq!(FrameTime::from_secs(-1.0, 0.0).elapsed, Duration::ZERO);
        assert_eq!(
            FrameTime::from_secs(2.5, 0.1).elapsed,
            Duration::from_millis(2500)
        );
    }

    #[test]
    fn ticks_are_monotonic() {
        let mut clock = FrameClock::start();
        let first = clock.tick();
        let second = clock.tick();
        assert!(first.delta >= 0.0);
        assert!(second.delta >= 0.0);
        assert!(second.elapsed >= first.elapsed);
        assert!(clock.now() >= second.elapsed);
    }
}
