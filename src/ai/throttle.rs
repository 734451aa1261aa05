//! Client-side sliding-window request throttle.
//!
//! The external scorer allows a bounded number of calls per rolling
//! minute. This is a cooperative, single-process throttle: timestamps
//! older than the window are pruned before each call, and when the log is
//! at capacity the caller blocks until the oldest entry ages out.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Source of the current time and of blocking sleeps.
///
/// Injected so throttling policy can be tested without real wall-clock
/// delays.
pub trait TimeSource {
    /// Current instant.
    fn now(&self) -> Instant;
    /// Blocks for the given duration.
    fn sleep(&self, duration: Duration);
}

/// Wall-clock time source used outside tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Sliding-window throttle: at most `max_per_window` acquisitions per
/// rolling window.
#[derive(Debug)]
pub struct SlidingWindowThrottle<T: TimeSource = SystemTimeSource> {
    max_per_window: usize,
    window: Duration,
    timestamps: VecDeque<Instant>,
    time: T,
}

impl SlidingWindowThrottle<SystemTimeSource> {
    /// Creates a wall-clock throttle with a 60-second window.
    #[must_use]
    pub fn per_minute(max_per_window: usize) -> Self {
        Self::new(max_per_window, Duration::from_secs(60), SystemTimeSource)
    }
}

impl<T: TimeSource> SlidingWindowThrottle<T> {
    /// Creates a throttle over an explicit window and time source.
    #[must_use]
    pub fn new(max_per_window: usize, window: Duration, time: T) -> Self {
        Self {
            max_per_window: max_per_window.max(1),
            window,
            timestamps: VecDeque::new(),
            time,
        }
    }

    /// Blocks until a call slot is available, then records the call.
    pub fn acquire(&mut self) {
        let now = self.time.now();
        while self
            .timestamps
            .front()
            .is_some_and(|oldest| now.duration_since(*oldest) >= self.window)
        {
            self.timestamps.pop_front();
        }

        if self.timestamps.len() >= self.max_per_window {
            if let Some(oldest) = self.timestamps.front() {
                let elapsed = now.duration_since(*oldest);
                if elapsed < self.window {
                    self.time.sleep(self.window - elapsed);
                }
                self.timestamps.pop_front();
            }
        }

        self.timestamps.push_back(self.time.now());
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::time::{Duration, Instant};

    use super::{SlidingWindowThrottle, TimeSource};

    /// Deterministic time source: sleeping advances the clock.
    struct FakeTime {
        now: Cell<Instant>,
        slept: RefCell<Vec<Duration>>,
    }

    impl FakeTime {
        fn new() -> Self {
            Self {
                now: Cell::new(Instant::now()),
                slept: RefCell::new(Vec::new()),
            }
        }

        fn advance(&self, duration: Duration) {
            self.now.set(self.now.get() + duration);
        }
    }

    impl TimeSource for &FakeTime {
        fn now(&self) -> Instant {
            self.now.get()
        }

        fn sleep(&self, duration: Duration) {
            self.slept.borrow_mut().push(duration);
            self.advance(duration);
        }
    }

    #[test]
    fn acquire_does_not_block_below_capacity() {
        let time = FakeTime::new();
        let mut throttle = SlidingWindowThrottle::new(3, Duration::from_secs(60), &time);
        for _ in 0..3 {
            throttle.acquire();
            time.advance(Duration::from_secs(1));
        }
        assert!(time.slept.borrow().is_empty());
    }

    #[test]
    fn acquire_blocks_until_oldest_entry_ages_out() {
        let time = FakeTime::new();
        let mut throttle = SlidingWindowThrottle::new(2, Duration::from_secs(60), &time);

        throttle.acquire();
        time.advance(Duration::from_secs(10));
        throttle.acquire();
        time.advance(Duration::from_secs(10));

        // Window is full; the oldest entry is 20s old, so 40s remain.
        throttle.acquire();
        assert_eq!(time.slept.borrow().as_slice(), &[Duration::from_secs(40)]);
    }

    #[test]
    fn expired_entries_free_slots_without_sleeping() {
        let time = FakeTime::new();
        let mut throttle = SlidingWindowThrottle::new(1, Duration::from_secs(60), &time);

        throttle.acquire();
        time.advance(Duration::from_secs(61));
        throttle.acquire();
        assert!(time.slept.borrow().is_empty());
    }
}
