use std::cell::Cell;
use std::thread::sleep;
use std::time::{Duration, Instant};

/// Clock is the time source of the playback. Times are measured from the creation of the clock.
pub trait Clock {
    fn now(&self) -> Duration;

    /// wait_until returns once `now() >= deadline`.
    fn wait_until(&self, deadline: Duration);
}

/// WallClock follows real time and sleeps while waiting.
#[derive(Debug, Clone, Copy)]
pub struct WallClock {
    origin: Instant,
}

impl WallClock {
    pub fn new() -> WallClock {
        WallClock {
            origin: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        WallClock::new()
    }
}

impl Clock for WallClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn wait_until(&self, deadline: Duration) {
        let now = self.now();
        if deadline > now {
            sleep(deadline - now);
        }
    }
}

/// VirtualClock only moves when told to. Waiting jumps straight to the deadline.
#[derive(Debug, Default)]
pub struct VirtualClock {
    now: Cell<Duration>,
}

impl VirtualClock {
    pub fn new() -> VirtualClock {
        VirtualClock::default()
    }

    pub fn advance_by(&self, delta: Duration) {
        self.now.set(self.now.get() + delta);
    }

    /// set moves the clock to `t`. The clock never runs backwards, earlier times are ignored.
    pub fn set(&self, t: Duration) {
        if t > self.now.get() {
            self.now.set(t);
        }
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn wait_until(&self, deadline: Duration) {
        self.set(deadline);
    }
}
