//! Simulation clock

use std::time::Instant;

use parking_lot::RwLock;

/// Authoritative source of simulation time, in seconds since server start.
///
/// Runs off the wall clock until the first `pin()`; from then on time only
/// moves when pinned again. Pins may jump forward by hours or backward;
/// downstream catch-up treats a non-positive delta as a no-op.
#[derive(Debug)]
pub struct GameClock {
    started: Instant,
    pinned: RwLock<Option<f64>>,
}

impl GameClock {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            pinned: RwLock::new(None),
        }
    }

    /// Current simulation time in seconds.
    pub fn now(&self) -> f64 {
        match *self.pinned.read() {
            Some(t) => t,
            None => self.started.elapsed().as_secs_f64(),
        }
    }

    /// Pin the clock to an absolute timestamp. The clock stays manual forever after.
    pub fn pin(&self, seconds: f64) {
        *self.pinned.write() = Some(seconds);
    }
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new()
    }
}
