//! Engine counters.
//!
//! Relaxed atomics: counters are diagnostic only and never used to order
//! other memory operations. Hosts read them through `snapshot`.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct EngineMetrics {
    /// Every signal passed to `Engine::handle`.
    pub signals: AtomicU64,
    pub expansions: AtomicU64,
    /// Signals dropped because a replacement was in flight.
    pub suppressed: AtomicU64,
    pub unsupported: AtomicU64,
    pub no_match: AtomicU64,
    /// Replacements that started but hit a surface error.
    pub aborted: AtomicU64,
    pub cache_rebuilds: AtomicU64,
    pub chars_deleted: AtomicU64,
    pub chars_inserted: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineMetricsSnapshot {
    pub signals: u64,
    pub expansions: u64,
    pub suppressed: u64,
    pub unsupported: u64,
    pub no_match: u64,
    pub aborted: u64,
    pub cache_rebuilds: u64,
    pub chars_deleted: u64,
    pub chars_inserted: u64,
}

impl EngineMetrics {
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_replacement(&self, deleted: usize, inserted: usize) {
        self.expansions.fetch_add(1, Ordering::Relaxed);
        self.chars_deleted
            .fetch_add(deleted as u64, Ordering::Relaxed);
        self.chars_inserted
            .fetch_add(inserted as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> EngineMetricsSnapshot {
        EngineMetricsSnapshot {
            signals: self.signals.load(Ordering::Relaxed),
            expansions: self.expansions.load(Ordering::Relaxed),
            suppressed: self.suppressed.load(Ordering::Relaxed),
            unsupported: self.unsupported.load(Ordering::Relaxed),
            no_match: self.no_match.load(Ordering::Relaxed),
            aborted: self.aborted.load(Ordering::Relaxed),
            cache_rebuilds: self.cache_rebuilds.load(Ordering::Relaxed),
            chars_deleted: self.chars_deleted.load(Ordering::Relaxed),
            chars_inserted: self.chars_inserted.load(Ordering::Relaxed),
        }
    }
}
