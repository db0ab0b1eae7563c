use std::time::Duration;

/// TimerId is the handle of a scheduled timer. Ids increase in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Timer<T> {
    id: TimerId,
    interval: Duration,
    due: Duration,
    task: T,
}

/// Fired describes one timer expiry returned by `TimerQueue::pop_due`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired<T> {
    pub id: TimerId,
    pub due: Duration,
    pub task: T,
}

/// TimerQueue holds repeating timers for a single cooperative thread. Expiries are handed out one
/// at a time, ordered by due time and then by registration order, so that a handler can cancel
/// other timers before they are looked at.
#[derive(Debug)]
pub struct TimerQueue<T> {
    timers: Vec<Timer<T>>,
    next_id: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        TimerQueue {
            timers: Vec::new(),
            next_id: 0,
        }
    }
}

impl<T: Copy> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// schedule_repeating registers a timer that first expires at `now + interval` and then
    /// every `interval` until cancelled.
    pub fn schedule_repeating(&mut self, now: Duration, interval: Duration, task: T) -> TimerId {
        // a zero interval would expire forever at the same instant
        let interval = interval.max(Duration::from_nanos(1));
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            interval,
            due: now + interval,
            task,
        });
        id
    }

    /// cancel removes the timer. Cancelling an unknown or already cancelled timer does nothing.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let len_before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != len_before
    }

    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.timers.iter().map(|t| t.due).min()
    }

    /// pop_due returns the earliest expiry at or before `now` and re-arms that timer for its
    /// next interval.
    pub fn pop_due(&mut self, now: Duration) -> Option<Fired<T>> {
        let timer = self
            .timers
            .iter_mut()
            .filter(|t| t.due <= now)
            .min_by_key(|t| (t.due, t.id))?;

        let fired = Fired {
            id: timer.id,
            due: timer.due,
            task: timer.task,
        };
        timer.due += timer.interval;
        Some(fired)
    }
}
