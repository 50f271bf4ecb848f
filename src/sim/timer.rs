//! One-shot timers on the simulation clock
//!
//! Times are whole microseconds of simulation clock. Timers fire on the
//! first tick whose clock reaches their due time, in due-time order with
//! ties broken by scheduling order.

use serde::{Deserialize, Serialize};

/// Handle returned by [`TimerQueue::schedule`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId(u64);

/// Everything the cursor ever waits for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerEvent {
    /// Spawn interval elapsed (re-armed on every fire)
    SpawnObstacle,
    /// Damaged phase ends
    DamageOver,
    /// Invulnerable phase ends
    InvulnerabilityOver,
    /// Shrink animation finished, drop the object from the arena
    RemoveObstacle(u32),
    /// Absolute laser lifetime reached
    LaserTimeout(u32),
}

#[derive(Debug, Clone)]
struct Pending<E> {
    id: TimerId,
    due_us: u64,
    event: E,
}

/// Pending one-shot timers
#[derive(Debug, Clone)]
pub struct TimerQueue<E> {
    pending: Vec<Pending<E>>,
    next_id: u64,
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> TimerQueue<E> {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            next_id: 0,
        }
    }

    /// Arm a timer that fires `delay_us` after `now_us`
    pub fn schedule(&mut self, now_us: u64, delay_us: u64, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending {
            id,
            due_us: now_us.saturating_add(delay_us),
            event,
        });
        id
    }

    /// Disarm a timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        self.pending.len() != before
    }

    /// Remove and return every timer due at `now_us`
    pub fn pop_due(&mut self, now_us: u64) -> Vec<E> {
        let mut due = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].due_us <= now_us {
                due.push(self.pending.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by_key(|p| (p.due_us, p.id.0));
        due.into_iter().map(|p| p.event).collect()
    }

    /// Earliest pending due time
    pub fn next_due(&self) -> Option<u64> {
        self.pending.iter().map(|p| p.due_us).min()
    }

    /// Drop every pending timer (teardown)
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
