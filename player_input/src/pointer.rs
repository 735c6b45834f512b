use std::time::Duration;

use tracing::trace;

pub const DEFAULT_IDLE_WINDOW: Duration = Duration::from_millis(10);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerPhase {
    /// A movement sample is live until the idle deadline passes.
    Active,
    /// No motion within the idle window; the delta reads as zero.
    Idle,
}

/// Pointer delta that drops back to zero when motion stops.
///
/// Every movement event replaces the delta and re-arms the idle deadline.
/// The deadline is checked against the caller's clock in [`poll`], so a
/// sample reads unchanged for any number of frames inside the window and
/// reads zero from the first poll at or after it. Timestamps are durations
/// since the host clock started.
///
/// [`poll`]: PointerDrift::poll
#[derive(Clone, Debug)]
pub struct PointerDrift {
    delta: [f32; 2],
    idle_window: Duration,
    idle_at: Option<Duration>,
}

impl Default for PointerDrift {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_WINDOW)
    }
}

impl PointerDrift {
    pub fn new(idle_window: Duration) -> Self {
        Self {
            delta: [0.0, 0.0],
            idle_window,
            idle_at: None,
        }
    }

    /// Phase as of the last [`poll`]; a deadline that has passed since then
    /// still reads `Active` until the next poll.
    ///
    /// [`poll`]: PointerDrift::poll
    pub fn phase(&self) -> PointerPhase {
        if self.idle_at.is_some() {
            PointerPhase::Active
        } else {
            PointerPhase::Idle
        }
    }

    pub fn on_motion(&mut self, delta: [f32; 2], now: Duration) {
        self.delta = delta;
        self.idle_at = Some(now.checked_add(self.idle_window).unwrap_or(Duration::MAX));
    }

    /// Fires the idle transition if it is due and returns the current delta.
    pub fn poll(&mut self, now: Duration) -> [f32; 2] {
        if let Some(idle_at) = self.idle_at {
            if now >= idle_at {
                trace!(?now, "pointer idle, clearing delta");
                self.idle_at = None;
                self.delta = [0.0, 0.0];
            }
        }
        self.delta
    }

    /// Drops any pending idle transition and zeroes the delta.
    pub fn cancel(&mut self) {
        self.idle_at = None;
        self.delta = [0.0, 0.0];
    }
}
