//! Run-after-current-turn queue.
//!
//! Work deferred during a synchronous turn is held until the host reports the
//! next scheduler tick via `drain`. Ordering is the only contract: nothing here
//! measures elapsed time. Tasks deferred while a drained batch is being
//! processed belong to the following tick, because `drain` hands out the batch
//! by value before the caller runs it.

use std::collections::VecDeque;

#[derive(Debug)]
pub struct TurnQueue<T> {
    pending: VecDeque<T>,
    ticks: u64,
}

impl<T> Default for TurnQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TurnQueue<T> {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            ticks: 0,
        }
    }

    /// Queue `task` to run after the current turn completes.
    pub fn defer(&mut self, task: T) {
        self.pending.push_back(task);
        tracing::trace!(target: "events.turn", pending = self.pending.len(), "deferred");
    }

    /// Take every task queued before this tick, in FIFO order.
    pub fn drain(&mut self) -> Vec<T> {
        self.ticks += 1;
        let batch: Vec<T> = self.pending.drain(..).collect();
        if !batch.is_empty() {
            tracing::trace!(target: "events.turn", tick = self.ticks, tasks = batch.len(), "drain");
        }
        batch
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Number of ticks observed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
