//! Trigger → expansion registry.
//!
//! The authoritative record set lives in an external store (`RegistryStore`).
//! The engine keeps a read-only `RegistryCache` that is rebuilt wholesale on
//! every change notification; it is never patched incrementally.
//!
//! Record normalization is shared by every path that ingests records (store
//! reads, imports, cache rebuilds) and is idempotent, so running it twice is
//! always safe.

mod cache;
mod error;
mod record;
mod store;

pub use cache::{RegistryCache, TriggerTable};
pub use error::RegistryError;
pub use record::{
    ExpansionRecord, canonical_trigger, export_records, import_records, normalize_records,
    normalize_value, normalize_values,
};
pub use store::{JsonFileStore, MemoryStore, RecordSubscription, RegistryStore};
