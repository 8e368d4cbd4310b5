use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;
use web_time::Instant;

/// Time source used by the engine.
///
/// Production code uses [`SystemClock`]; tests inject [`ManualClock`] so
/// elapsed-time behavior stays deterministic.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`web_time::Instant`], usable on native and wasm
/// targets alike.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
///
/// Handles are cheap clones sharing the same time, so a test can keep one
/// handle while the engine owns another.
#[derive(Clone, Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.offset.get()
    }
}
