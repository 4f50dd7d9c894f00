use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::time::Instant;

/// A dispatcher event, ordered by timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Event {
    pub time: Instant,
    /// Tiebreaker for events at the same time (lower = earlier).
    seq: u64,
    pub kind: EventKind,
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.time
            .cmp(&other.time)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum EventKind {
    /// The next job of the task (by index) is released.
    Release { task: usize },
    /// Projected completion of the job dispatched under `token`.
    /// Stale once that job has been preempted.
    Completion { token: u64 },
}

/// Min-queue of pending events.
#[derive(Debug, Default)]
pub(super) struct EventQueue {
    events: BinaryHeap<Reverse<Event>>,
    seq: u64,
}

impl EventQueue {
    pub fn push(&mut self, time: Instant, kind: EventKind) {
        self.events.push(Reverse(Event {
            time,
            seq: self.seq,
            kind,
        }));
        self.seq += 1;
    }

    /// Time of the earliest pending event.
    pub fn next_time(&self) -> Option<Instant> {
        self.events.peek().map(|Reverse(e)| e.time)
    }

    /// Pop the earliest event if it happens at `now`.
    pub fn pop_at(&mut self, now: Instant) -> Option<Event> {
        if self.next_time() == Some(now) {
            self.events.pop().map(|Reverse(e)| e)
        } else {
            None
        }
    }
}
