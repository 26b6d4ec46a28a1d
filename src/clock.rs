//! Injectable time source.
//!
//! Event intervals are computed from a clock handed to the engine at
//! construction, so the stats store stays deterministic under test.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Monotonic game time in seconds since some fixed origin.
pub trait GameClock {
    fn now(&self) -> f64;
}

impl<C: GameClock> GameClock for Rc<C> {
    fn now(&self) -> f64 {
        (**self).now()
    }
}

/// Wall clock anchored at construction.
pub struct SystemClock {
    started: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl GameClock for SystemClock {
    fn now(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }
}

/// Clock advanced by hand, for deterministic tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jump to an absolute time.
    pub fn set(&self, secs: f64) {
        self.now.set(secs);
    }

    /// Move forward by `secs`.
    pub fn advance(&self, secs: f64) {
        self.now.set(self.now.get() + secs);
    }
}

impl GameClock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}
