use alloc::collections::BinaryHeap;
use core::cmp::{Ordering, Reverse};
use core::time::Duration;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(u64);

/// Transitions that happen some time after the input that caused them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Deferred {
    /// Correct answer shown long enough, uncover the image.
    Reveal(TileId),
    /// Incorrect answer shown long enough, clear it for another try.
    Retry(TileId),
    /// Flip the caret of the answer being typed.
    CaretBlink(TileId),
}

/// A deferred transition that came due.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Fired {
    pub id: TimerId,
    pub due: Duration,
    pub generation: u32,
    pub action: Deferred,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Entry(Fired);

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.0.due, self.0.id).cmp(&(other.0.due, other.0.id))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Cooperative timer: entries are only fired when [`TimerQueue::pop_due`] is called, in due
/// order and, for equal due times, in scheduling order.
///
/// Every entry carries the generation it was scheduled in. [`TimerQueue::reset`] drops all
/// entries and moves to a new generation, so a [`Fired`] from before the reset can be told apart.
#[derive(Clone, Debug, Default)]
pub struct TimerQueue {
    entries: BinaryHeap<Reverse<Entry>>,
    next_id: u64,
    generation: u32,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn schedule(&mut self, due: Duration, action: Deferred) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Reverse(Entry(Fired {
            id,
            due,
            generation: self.generation,
            action,
        })));
        log::trace!("scheduled {:?} at {:?} ({:?})", action, due, id);
        id
    }

    /// Returns whether a pending entry was removed.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|Reverse(Entry(fired))| fired.id != id);
        before != self.entries.len()
    }

    /// Drops every pending entry and starts a new generation.
    pub fn reset(&mut self) {
        if !self.entries.is_empty() {
            log::debug!("cancelling {} pending timers", self.entries.len());
        }
        self.entries.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.entries.peek().map(|Reverse(Entry(fired))| fired.due)
    }

    pub fn pop_due(&mut self, now: Duration) -> Option<Fired> {
        match self.next_due() {
            Some(due) if due <= now => self.entries.pop().map(|Reverse(Entry(fired))| fired),
            _ => None,
        }
    }

    pub fn is_current(&self, fired: &Fired) -> bool {
        fired.generation == self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TILE: TileId = (0, 0);

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn fires_in_due_order() {
        let mut timers = TimerQueue::new();
        timers.schedule(ms(1500), Deferred::Reveal(TILE));
        timers.schedule(ms(500), Deferred::CaretBlink(TILE));

        assert_eq!(timers.pop_due(ms(400)), None);
        assert_eq!(
            timers.pop_due(ms(2000)).map(|f| f.action),
            Some(Deferred::CaretBlink(TILE))
        );
        assert_eq!(
            timers.pop_due(ms(2000)).map(|f| f.action),
            Some(Deferred::Reveal(TILE))
        );
        assert!(timers.is_empty());
    }

    #[test]
    fn equal_due_times_keep_schedule_order() {
        let mut timers = TimerQueue::new();
        timers.schedule(ms(100), Deferred::Retry((1, 0)));
        timers.schedule(ms(100), Deferred::Retry((0, 1)));

        assert_eq!(
            timers.pop_due(ms(100)).map(|f| f.action),
            Some(Deferred::Retry((1, 0)))
        );
        assert_eq!(
            timers.pop_due(ms(100)).map(|f| f.action),
            Some(Deferred::Retry((0, 1)))
        );
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut timers = TimerQueue::new();
        let id = timers.schedule(ms(500), Deferred::CaretBlink(TILE));

        assert!(timers.cancel(id));
        assert!(!timers.cancel(id));
        assert_eq!(timers.pop_due(ms(1000)), None);
    }

    #[test]
    fn reset_invalidates_previous_generation() {
        let mut timers = TimerQueue::new();
        timers.schedule(ms(0), Deferred::Reveal(TILE));
        let stale = timers.pop_due(ms(0)).unwrap();
        timers.schedule(ms(10), Deferred::Retry(TILE));

        timers.reset();

        assert!(!timers.is_current(&stale));
        assert_eq!(timers.next_due(), None);
        let id = timers.schedule(ms(5), Deferred::Reveal(TILE));
        let fresh = timers.pop_due(ms(5)).unwrap();
        assert_eq!(fresh.id, id);
        assert!(timers.is_current(&fresh));
    }
}
