//! Animation Clock
//!
//! The clock is the single source of animation time. The viewer samples it
//! once per frame and hands the value to the traversal through
//! [`FrameContext`](crate::scene::FrameContext), so every node drawn in a
//! frame sees the same time.
//!
//! Lifecycle: create at startup, [`Clock::reset`] on user request, read with
//! [`Clock::now`] once per frame. Tests use [`ManualClock`] to drive time
//! deterministically.

use std::cell::Cell;
use std::rc::Rc;

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

/// Source of elapsed animation time in seconds.
pub trait Clock {
    /// Seconds since the clock epoch.
    fn now(&self) -> f32;

    /// Moves the epoch to the present, so `now()` restarts from zero.
    fn reset(&mut self);
}

/// Wall-clock time since creation or the last reset.
#[derive(Debug, Clone)]
pub struct SystemClock {
    epoch: Instant,
    last_tick: Instant,
    /// Time between the two most recent ticks
    pub delta: Duration,
    /// Number of ticks since creation
    pub frame_count: u64,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    #[must_use]
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            epoch: now,
            last_tick: now,
            delta: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Records a frame boundary and updates `delta`.
    pub fn tick(&mut self) {
        let now = Instant::now();
        self.delta = now - self.last_tick;
        self.last_tick = now;
        self.frame_count += 1;
    }

    #[must_use]
    pub fn dt_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f32 {
        self.epoch.elapsed().as_secs_f32()
    }

    fn reset(&mut self) {
        self.epoch = Instant::now();
        log::debug!("Animation clock reset");
    }
}

/// A clock that only moves when told to.
///
/// Clones share one time value, so a test can keep a handle while a
/// [`Viewer`](crate::viewer::Viewer) owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    time: Rc<Cell<f32>>,
}

impl ManualClock {
    #[must_use]
    pub fn new(time: f32) -> Self {
        Self {
            time: Rc::new(Cell::new(time)),
        }
    }

    pub fn set(&self, time: f32) {
        self.time.set(time);
    }

    pub fn advance(&self, seconds: f32) {
        self.time.set(self.time.get() + seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f32 {
        self.time.get()
    }

    fn reset(&mut self) {
        self.time.set(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_reset_returns_to_zero() {
        let mut clock = ManualClock::new(3.5);
        clock.advance(1.0);
        assert!((clock.now() - 4.5).abs() < 1e-6);
        clock.reset();
        assert_eq!(clock.now(), 0.0);
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new(0.0);
        let handle = clock.clone();
        handle.advance(2.0);
        assert!((clock.now() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn system_clock_reset_restarts_epoch() {
        let mut clock = SystemClock::new();
        std::thread::sleep(Duration::from_millis(5));
        assert!(clock.now() > 0.0);
        clock.reset();
        assert!(clock.now() < 1.0);
    }
}
