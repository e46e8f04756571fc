//! Record store collaborator boundary and two concrete stores.
//!
//! Subscriptions ride on a `tokio::sync::watch` channel. Only the synchronous
//! half of the API is used (`send_replace`, `has_changed`,
//! `borrow_and_update`), so polling a subscription never blocks and no runtime
//! is required.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::watch;

use crate::{ExpansionRecord, RegistryError, export_records, normalize_records, normalize_values};

/// External store owning the authoritative record set.
pub trait RegistryStore {
    /// Current record set, normalized.
    fn get_all(&self) -> Result<Vec<ExpansionRecord>, RegistryError>;
    /// Replace the whole record set. The engine never calls this.
    fn set_all(&self, records: Vec<ExpansionRecord>) -> Result<(), RegistryError>;
    /// Subscribe to full-set change notifications.
    fn subscribe(&self) -> RecordSubscription;
}

/// Receives the full record set each time the store changes.
#[derive(Debug, Clone)]
pub struct RecordSubscription {
    rx: watch::Receiver<Arc<Vec<ExpansionRecord>>>,
}

impl RecordSubscription {
    fn new(rx: watch::Receiver<Arc<Vec<ExpansionRecord>>>) -> Self {
        Self { rx }
    }

    /// Returns the new record set if the store changed since the last poll.
    /// A closed store reads as "no change".
    pub fn poll(&mut self) -> Option<Arc<Vec<ExpansionRecord>>> {
        match self.rx.has_changed() {
            Ok(true) => Some(self.rx.borrow_and_update().clone()),
            Ok(false) | Err(_) => None,
        }
    }
}

/// In-process store; handy for hosts that sync records themselves.
#[derive(Debug)]
pub struct MemoryStore {
    prefix: char,
    tx: watch::Sender<Arc<Vec<ExpansionRecord>>>,
}

impl MemoryStore {
    pub fn new(prefix: char) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(Vec::new()));
        Self { prefix, tx }
    }

    pub fn with_records(prefix: char, records: Vec<ExpansionRecord>) -> Self {
        let store = Self::new(prefix);
        store
            .tx
            .send_replace(Arc::new(normalize_records(records, prefix)));
        store
    }
}

impl RegistryStore for MemoryStore {
    fn get_all(&self) -> Result<Vec<ExpansionRecord>, RegistryError> {
        Ok(self.tx.borrow().as_ref().clone())
    }

    fn set_all(&self, records: Vec<ExpansionRecord>) -> Result<(), RegistryError> {
        let normalized = normalize_records(records, self.prefix);
        tracing::debug!(target: "registry", records = normalized.len(), "memory_store_set_all");
        self.tx.send_replace(Arc::new(normalized));
        Ok(())
    }

    fn subscribe(&self) -> RecordSubscription {
        RecordSubscription::new(self.tx.subscribe())
    }
}

/// Store persisting records as a JSON array on disk.
///
/// Writes go through a temp file + rename so a concurrent reader sees either
/// the old or the new file, never a partial one. Changes made by other
/// processes are picked up by `reload`, which hosts call from their own file
/// watching.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    prefix: char,
    tx: watch::Sender<Arc<Vec<ExpansionRecord>>>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>, prefix: char) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(Vec::new()));
        let store = Self {
            path: path.into(),
            prefix,
            tx,
        };
        match store.read_file() {
            Ok(records) => {
                store.tx.send_replace(Arc::new(records));
            }
            Err(e) => {
                tracing::warn!(target: "registry", path = %store.path.display(), error = %e, "json_store_initial_read_failed");
            }
        }
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&self) -> Result<Vec<ExpansionRecord>, RegistryError> {
        if !self.path.exists() {
            tracing::debug!(target: "registry", path = %self.path.display(), "json_store_missing_file_empty_set");
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        let parsed: Value = serde_json::from_str(&content)?;
        let Value::Array(items) = parsed else {
            tracing::debug!(target: "registry", path = %self.path.display(), "json_store_not_an_array_empty_set");
            return Ok(Vec::new());
        };
        Ok(normalize_values(&items, self.prefix))
    }

    fn write_file(&self, records: &[ExpansionRecord]) -> Result<(), RegistryError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let content = export_records(records)?;
        let temp_path = self.path.with_extension("tmp");
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }
        if let Err(e) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }
        Ok(())
    }

    /// Re-read the file and notify subscribers when the record set differs.
    /// Returns whether a notification was published.
    pub fn reload(&self) -> Result<bool, RegistryError> {
        let records = self.read_file()?;
        let changed = self.tx.send_if_modified(|current| {
            if current.as_ref() == &records {
                false
            } else {
                *current = Arc::new(records);
                true
            }
        });
        tracing::debug!(target: "registry", changed, "json_store_reload");
        Ok(changed)
    }
}

impl RegistryStore for JsonFileStore {
    fn get_all(&self) -> Result<Vec<ExpansionRecord>, RegistryError> {
        self.read_file()
    }

    fn set_all(&self, records: Vec<ExpansionRecord>) -> Result<(), RegistryError> {
        let normalized = normalize_records(records, self.prefix);
        self.write_file(&normalized)?;
        tracing::info!(target: "registry", records = normalized.len(), "json_store_persisted");
        self.tx.send_replace(Arc::new(normalized));
        Ok(())
    }

    fn subscribe(&self) -> RecordSubscription {
        RecordSubscription::new(self.tx.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Vec<ExpansionRecord> {
        vec![
            ExpansionRecord::new("/sig", "Best regards,\nJane"),
            ExpansionRecord::new("addr", "123 Main St"),
        ]
    }

    #[test]
    fn memory_store_normalizes_and_notifies() {
        let store = MemoryStore::new('/');
        let mut sub = store.subscribe();
        assert!(sub.poll().is_none(), "fresh subscription starts up to date");

        store.set_all(sample()).unwrap();
        let seen = sub.poll().expect("set_all must notify");
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].trigger, "/addr");
        assert!(sub.poll().is_none(), "notification is consumed once");
        assert_eq!(store.get_all().unwrap(), *seen);
    }

    #[test]
    fn subscription_after_drop_reads_as_unchanged() {
        let store = MemoryStore::new('/');
        let mut sub = store.subscribe();
        drop(store);
        assert!(sub.poll().is_none());
    }

    #[test]
    fn json_store_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("snippets.json"), '/');
        assert!(store.get_all().unwrap().is_empty());
    }

    #[test]
    fn json_store_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("snippets.json");
        let store = JsonFileStore::new(&path, '/');
        store.set_all(sample()).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists(), "temp file renamed away");

        let reopened = JsonFileStore::new(&path, '/');
        let records = reopened.get_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].content, "Best regards,\nJane");
    }

    #[test]
    fn json_store_reload_picks_up_external_writes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snippets.json");
        let store = JsonFileStore::new(&path, '/');
        let mut sub = store.subscribe();

        fs::write(&path, r#"[{"shortcut": "brb", "content": "be right back"}]"#).unwrap();
        assert!(store.reload().unwrap());
        let seen = sub.poll().expect("reload publishes changes");
        assert_eq!(seen[0].trigger, "/brb");

        assert!(!store.reload().unwrap(), "unchanged file does not notify");
        assert!(sub.poll().is_none());
    }

    #[test]
    fn json_store_round_trip_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snippets.json");
        let store = JsonFileStore::new(&path, '/');
        store.set_all(sample()).unwrap();
        let first = fs::read_to_string(&path).unwrap();

        let again = store.get_all().unwrap();
        store.set_all(again).unwrap();
        let second = fs::read_to_string(&path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn json_store_non_array_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snippets.json");
        fs::write(&path, r#"{"snippets": []}"#).unwrap();
        let store = JsonFileStore::new(&path, '/');
        assert!(store.get_all().unwrap().is_empty());
    }
}
