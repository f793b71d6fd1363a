//! Game-Time Timers
//!
//! Delay-based rescheduling driven by the host's game clock. Nothing here
//! blocks: the owner polls [`Timers::take_due`] with the current game time and
//! runs whatever came due, then control goes back to the host loop.

use crate::core::ids::GameTime;

/// Shortest repeat period a timer will accept.
pub const MIN_INTERVAL: GameTime = 1e-3;

/// Cancellation handle for a scheduled timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerHandle(u64);

#[derive(Clone, Debug)]
struct Scheduled<T> {
    handle: TimerHandle,
    due: GameTime,
    every: Option<GameTime>,
    task: T,
}

/// A set of one-shot and repeating timers carrying task values of type `T`.
#[derive(Clone, Debug)]
pub struct Timers<T> {
    next_handle: u64,
    scheduled: Vec<Scheduled<T>>,
}

impl<T> Default for Timers<T> {
    fn default() -> Self {
        Self {
            next_handle: 0,
            scheduled: Vec::new(),
        }
    }
}

impl<T: Clone> Timers<T> {
    /// Create an empty timer set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` once, `delay` seconds after `now`.
    pub fn after(&mut self, now: GameTime, delay: GameTime, task: T) -> TimerHandle {
        self.schedule(now + delay.max(0.0), None, task)
    }

    /// Run `task` every `interval` seconds, first at `now + interval`.
    ///
    /// Intervals below [`MIN_INTERVAL`] (or not finite) are raised to it.
    pub fn every(&mut self, now: GameTime, interval: GameTime, task: T) -> TimerHandle {
        let interval = if interval.is_finite() { interval.max(MIN_INTERVAL) } else { MIN_INTERVAL };
        self.schedule(now + interval, Some(interval), task)
    }

    fn schedule(&mut self, due: GameTime, every: Option<GameTime>, task: T) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.scheduled.push(Scheduled { handle, due, every, task });
        handle
    }

    /// Cancel a timer. Returns false if it already fired (one-shot) or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.scheduled.len();
        self.scheduled.retain(|s| s.handle != handle);
        self.scheduled.len() != before
    }

    /// Whether the timer is still pending.
    pub fn is_active(&self, handle: TimerHandle) -> bool {
        self.scheduled.iter().any(|s| s.handle == handle)
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.scheduled.len()
    }

    /// True if no timers are pending.
    pub fn is_empty(&self) -> bool {
        self.scheduled.is_empty()
    }

    /// Drop every pending timer.
    pub fn clear(&mut self) {
        self.scheduled.clear();
    }

    /// Collect tasks due at `now`, ordered by due time then schedule order.
    ///
    /// Repeating timers fire at most once per call and re-arm on their
    /// interval grid past `now`; missed periods are skipped.
    pub fn take_due(&mut self, now: GameTime) -> Vec<T> {
        let mut due: Vec<(GameTime, TimerHandle, T)> = Vec::new();

        let mut i = 0;
        while i < self.scheduled.len() {
            if self.scheduled[i].due > now {
                i += 1;
                continue;
            }

            let entry = &self.scheduled[i];
            let every = entry.every;
            due.push((entry.due, entry.handle, entry.task.clone()));

            match every {
                Some(interval) => {
                    let entry = &mut self.scheduled[i];
                    let missed = ((now - entry.due) / interval).floor() + 1.0;
                    entry.due += missed * interval;
                    if entry.due <= now {
                        entry.due = now + interval;
                    }
                    i += 1;
                }
                None => {
                    self.scheduled.swap_remove(i);
                }
            }
        }

        due.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        due.into_iter().map(|(_, _, task)| task).collect()
    }
}
