use std::collections::HashMap;
use std::sync::Arc;

use crate::{ExpansionRecord, normalize_records};

/// Immutable trigger → record table for one cache generation.
#[derive(Debug, Default)]
pub struct TriggerTable {
    entries: HashMap<String, ExpansionRecord>,
}

impl TriggerTable {
    /// Exact lookup that only yields enabled records.
    pub fn lookup(&self, trigger: &str) -> Option<&ExpansionRecord> {
        self.entries.get(trigger).filter(|r| r.enabled)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn enabled_count(&self) -> usize {
        self.entries.values().filter(|r| r.enabled).count()
    }
}

/// Read-only cached copy of the store's records.
///
/// `rebuild` swaps in a freshly built table with a single assignment; readers
/// holding a `snapshot` keep observing the generation they grabbed.
#[derive(Debug)]
pub struct RegistryCache {
    prefix: char,
    table: Arc<TriggerTable>,
    generation: u64,
}

impl RegistryCache {
    pub fn new(prefix: char) -> Self {
        Self {
            prefix,
            table: Arc::new(TriggerTable::default()),
            generation: 0,
        }
    }

    /// Replace the whole table. Duplicate triggers resolve last-write-wins.
    pub fn rebuild(&mut self, records: &[ExpansionRecord]) {
        let mut entries = HashMap::with_capacity(records.len());
        for record in normalize_records(records.to_vec(), self.prefix) {
            entries.insert(record.trigger.clone(), record);
        }
        let table = TriggerTable { entries };
        self.generation += 1;
        tracing::debug!(
            target: "registry",
            generation = self.generation,
            records = table.len(),
            enabled = table.enabled_count(),
            "cache_rebuilt"
        );
        self.table = Arc::new(table);
    }

    pub fn lookup(&self, trigger: &str) -> Option<&ExpansionRecord> {
        self.table.lookup(trigger)
    }

    pub fn snapshot(&self) -> Arc<TriggerTable> {
        Arc::clone(&self.table)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn prefix(&self) -> char {
        self.prefix
    }
}
