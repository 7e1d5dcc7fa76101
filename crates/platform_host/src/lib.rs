//! Typed host-domain contracts shared by the catalog crates and the browser adapters.
//!
//! This crate is the API-first boundary for origin-scoped storage. It exposes the key-value store
//! contract, storage-change events, the error taxonomy for storage failures, and in-memory/no-op
//! adapters used by native builds and tests. Concrete browser adapters live in
//! `platform_host_web`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod storage;

pub use storage::events::{
    NoopStorageEvents, StorageChange, StorageEvents, StorageListener, StorageSubscription,
};
pub use storage::key_value::{
    read_json_with, read_value_with, write_json_with, KeyValueStore, NoopKeyValueStore,
    StorageError,
};
pub use storage::memory::{MemoryKeyValueStore, MemoryOrigin, TabId};
