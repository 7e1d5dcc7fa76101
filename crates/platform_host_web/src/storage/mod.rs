//! Browser storage adapters.

pub mod storage_events;
pub mod web_storage;
