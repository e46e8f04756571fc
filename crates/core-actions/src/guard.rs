//! Reentrancy guard.
//!
//! The guard is owned by one `Engine`; two engines never share suppression
//! state. Arming it queues its own release on the engine's turn queue so the
//! echo of a replacement, observed in the same turn, is still suppressed.

use core_events::TurnQueue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GuardState {
    #[default]
    Idle,
    Replacing,
}

/// Work the engine defers to the next scheduler tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredTask {
    ReleaseGuard,
}

#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    state: GuardState,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    pub fn is_replacing(&self) -> bool {
        self.state == GuardState::Replacing
    }

    /// Idle → Replacing, deferring the release. Returns `false` (and queues
    /// nothing) when already replacing.
    pub fn arm(&mut self, turn: &mut TurnQueue<DeferredTask>) -> bool {
        if self.is_replacing() {
            return false;
        }
        self.state = GuardState::Replacing;
        turn.defer(DeferredTask::ReleaseGuard);
        tracing::trace!(target: "engine.guard", "armed");
        true
    }

    pub fn release(&mut self) {
        if self.is_replacing() {
            tracing::trace!(target: "engine.guard", "released");
        }
        self.state = GuardState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arm_defers_exactly_one_release() {
        let mut guard = ReentrancyGuard::new();
        let mut turn = TurnQueue::new();
        assert!(guard.arm(&mut turn));
        assert!(!guard.arm(&mut turn), "second arm in the same turn is refused");
        assert_eq!(turn.len(), 1);
        assert!(guard.is_replacing());

        for task in turn.drain() {
            match task {
                DeferredTask::ReleaseGuard => guard.release(),
            }
        }
        assert_eq!(guard.state(), GuardState::Idle);
        assert!(guard.arm(&mut turn), "re-armed after the tick");
    }
}
