//! Deferred task queue driven by the logical tick clock.
//!
//! The host's "run this after N ticks" primitive is modelled as the
//! [`DeferredTasks`] trait. [`ActionQueue`] is the in-process
//! implementation: a min-heap keyed by `(fire_tick, sequence)` so tasks
//! fire in deadline order and, within one tick, in the order they were
//! submitted.
//!
//! Each task is popped exactly once. A task never becomes due before its
//! own delay has elapsed.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::clock::{ClockError, TickClock};

/// Host facility that runs a task once after a number of ticks.
pub trait DeferredTasks<T> {
    /// The tick the host is currently on.
    fn current_tick(&self) -> u64;

    /// Submit `task` to run once `delay_ticks` ticks have elapsed.
    ///
    /// Delays below 1 are raised to 1.
    fn run_after(&mut self, delay_ticks: u64, task: T);
}

// ---------------------------------------------------------------------------
// Pending
// ---------------------------------------------------------------------------

/// A task waiting in the queue.
#[derive(Debug, Clone)]
pub struct Pending<T> {
    /// The tick at which the task becomes due.
    pub fire_tick: u64,
    /// Submission order, used to break ties within a tick.
    pub sequence: u64,
    /// The task payload.
    pub task: T,
}

// Min-heap: lowest (fire_tick, sequence) pops first, so the ordering is
// reversed for std's max-heap.
impl<T> PartialEq for Pending<T> {
    fn eq(&self, other: &Self) -> bool {
        self.fire_tick == other.fire_tick && self.sequence == other.sequence
    }
}

impl<T> Eq for Pending<T> {}

impl<T> PartialOrd for Pending<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Pending<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .fire_tick
            .cmp(&self.fire_tick)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

// ---------------------------------------------------------------------------
// ActionQueue
// ---------------------------------------------------------------------------

/// Tick clock plus a priority queue of deferred tasks.
#[derive(Debug, Clone)]
pub struct ActionQueue<T> {
    clock: TickClock,
    heap: BinaryHeap<Pending<T>>,
    /// Monotonic counter for deterministic ordering within a tick.
    next_sequence: u64,
}

impl<T> Default for ActionQueue<T> {
    fn default() -> Self {
        Self::with_clock(TickClock::new())
    }
}

impl<T> ActionQueue<T> {
    /// Create an empty queue at tick 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty queue starting from `clock`.
    pub const fn with_clock(clock: TickClock) -> Self {
        Self {
            clock,
            heap: BinaryHeap::new(),
            next_sequence: 0,
        }
    }

    /// Advance the clock by one tick and return the new tick.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the clock cannot advance.
    pub const fn advance(&mut self) -> Result<u64, ClockError> {
        self.clock.advance()
    }

    /// Remove and return the next task whose deadline has passed.
    pub fn pop_due(&mut self) -> Option<Pending<T>> {
        let now = self.clock.tick();
        if self.heap.peek().is_some_and(|p| p.fire_tick <= now) {
            self.heap.pop()
        } else {
            None
        }
    }

    /// Deadline of the earliest pending task.
    pub fn peek_tick(&self) -> Option<u64> {
        self.heap.peek().map(|p| p.fire_tick)
    }

    /// Number of pending tasks.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl<T> DeferredTasks<T> for ActionQueue<T> {
    fn current_tick(&self) -> u64 {
        self.clock.tick()
    }

    fn run_after(&mut self, delay_ticks: u64, task: T) {
        let fire_tick = self.clock.deadline(delay_ticks.max(1)).unwrap_or(u64::MAX);
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.saturating_add(1);
        self.heap.push(Pending {
            fire_tick,
            sequence,
            task,
        });
    }
}
