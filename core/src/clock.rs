use alloc::rc::Rc;
use core::cell::Cell;
use core::time::Duration;
use web_time::Instant;

/// Monotonic time source, measured from an arbitrary origin.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall clock backed by [`web_time::Instant`].
#[derive(Copy, Clone, Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_millis(&self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }

    pub fn set(&self, at: Duration) {
        self.now.set(at);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Accumulates time across start/stop intervals.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Stopwatch {
    accumulated: Duration,
    running_since: Option<Duration>,
}

impl Stopwatch {
    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    pub fn start(&mut self, now: Duration) {
        if self.running_since.is_none() {
            self.running_since = Some(now);
        }
    }

    /// Stops and folds the running interval into the total, returns the total.
    pub fn stop(&mut self, now: Duration) -> Duration {
        if let Some(since) = self.running_since.take() {
            self.accumulated += now.saturating_sub(since);
        }
        self.accumulated
    }

    pub fn elapsed(&self, now: Duration) -> Duration {
        match self.running_since {
            Some(since) => self.accumulated + now.saturating_sub(since),
            None => self.accumulated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let other = clock.clone();

        clock.advance_millis(250);

        assert_eq!(other.now(), Duration::from_millis(250));
    }

    #[test]
    fn stopwatch_only_counts_running_intervals() {
        let ms = Duration::from_millis;
        let mut watch = Stopwatch::default();

        watch.start(ms(100));
        assert_eq!(watch.elapsed(ms(150)), ms(50));
        assert_eq!(watch.stop(ms(300)), ms(200));
        assert!(!watch.is_running());

        // paused time is not counted
        watch.start(ms(1000));
        assert_eq!(watch.stop(ms(1100)), ms(300));
        assert_eq!(watch.elapsed(ms(5000)), ms(300));
    }

    #[test]
    fn double_start_keeps_first_timestamp() {
        let ms = Duration::from_millis;
        let mut watch = Stopwatch::default();

        watch.start(ms(10));
        watch.start(ms(40));

        assert_eq!(watch.stop(ms(50)), ms(40));
    }
}
