//! Browser (`wasm32`) implementations of [`platform_host`] storage contracts.
//!
//! This crate wires the Web Storage areas and the window `storage` event into the host-agnostic
//! key-value and storage-event contracts, and selects between browser and in-memory backends at
//! compile time (`memory-host` feature).

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

/// Compile-time host-strategy selection and concrete adapter factories for runtime wiring.
pub mod adapters;
pub mod storage;

pub use adapters::{
    host_strategy_name, local_store, selected_host_strategy, session_store, storage_events,
    HostStorage, HostStrategy, KeyValueStoreAdapter, StorageEventsAdapter,
};
pub use storage::storage_events::WebStorageEvents;
pub use storage::web_storage::{StorageArea, WebKeyValueStore};
