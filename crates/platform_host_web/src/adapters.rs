use platform_host::{
    KeyValueStore, MemoryKeyValueStore, MemoryOrigin, StorageError, StorageEvents,
    StorageListener, StorageSubscription,
};

use crate::{WebKeyValueStore, WebStorageEvents};

#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Compile-time selected host strategy for `platform_host_web` adapters.
pub enum HostStrategy {
    /// Browser Web Storage and the native `storage` event.
    Browser,
    /// Process-local [`MemoryOrigin`] used for native runs and headless tests.
    Memory,
}

/// Returns the compile-time selected host strategy for the active build.
pub const fn selected_host_strategy() -> HostStrategy {
    #[cfg(feature = "memory-host")]
    {
        HostStrategy::Memory
    }

    #[cfg(not(feature = "memory-host"))]
    {
        HostStrategy::Browser
    }
}

/// Returns the selected host strategy as a stable string token.
pub fn host_strategy_name() -> &'static str {
    match selected_host_strategy() {
        HostStrategy::Browser => "browser",
        HostStrategy::Memory => "memory",
    }
}

thread_local! {
    // One simulated tab per thread so the memory host never reports a tab's own writes back to it.
    static MEMORY_LOCAL: MemoryKeyValueStore = MemoryOrigin::default().open_tab();
    static MEMORY_SESSION: MemoryKeyValueStore = MemoryOrigin::default().open_tab();
}

/// Adapter enum that erases the concrete backend behind [`KeyValueStore`].
#[derive(Debug, Clone)]
pub enum KeyValueStoreAdapter {
    /// Browser Web Storage area.
    Browser(WebKeyValueStore),
    /// In-memory origin tab.
    Memory(MemoryKeyValueStore),
}

impl KeyValueStore for KeyValueStoreAdapter {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self {
            Self::Browser(store) => store.read(key),
            Self::Memory(store) => store.read(key),
        }
    }

    fn write(&self, key: &str, raw_json: &str) -> Result<(), StorageError> {
        match self {
            Self::Browser(store) => store.write(key, raw_json),
            Self::Memory(store) => store.write(key, raw_json),
        }
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match self {
            Self::Browser(store) => store.remove(key),
            Self::Memory(store) => store.remove(key),
        }
    }
}

/// Adapter enum that erases the concrete backend behind [`StorageEvents`].
#[derive(Debug, Clone)]
pub enum StorageEventsAdapter {
    /// Native window `storage` event.
    Browser(WebStorageEvents),
    /// Cross-tab delivery from the in-memory origin.
    Memory(MemoryKeyValueStore),
}

impl StorageEvents for StorageEventsAdapter {
    fn subscribe_changes(&self, listener: StorageListener) -> StorageSubscription {
        match self {
            Self::Browser(events) => events.subscribe_changes(listener),
            Self::Memory(events) => events.subscribe_changes(listener),
        }
    }
}

/// Builds the durable (origin-wide) store for the compile-time selected host strategy.
pub fn local_store() -> KeyValueStoreAdapter {
    match selected_host_strategy() {
        HostStrategy::Browser => KeyValueStoreAdapter::Browser(WebKeyValueStore::local()),
        HostStrategy::Memory => KeyValueStoreAdapter::Memory(MEMORY_LOCAL.with(Clone::clone)),
    }
}

/// Builds the session-scoped store for the compile-time selected host strategy.
pub fn session_store() -> KeyValueStoreAdapter {
    match selected_host_strategy() {
        HostStrategy::Browser => KeyValueStoreAdapter::Browser(WebKeyValueStore::session()),
        HostStrategy::Memory => KeyValueStoreAdapter::Memory(MEMORY_SESSION.with(Clone::clone)),
    }
}

/// Builds the cross-tab storage event source for the compile-time selected host strategy.
pub fn storage_events() -> StorageEventsAdapter {
    match selected_host_strategy() {
        HostStrategy::Browser => StorageEventsAdapter::Browser(WebStorageEvents),
        HostStrategy::Memory => StorageEventsAdapter::Memory(MEMORY_LOCAL.with(Clone::clone)),
    }
}

#[derive(Debug, Clone)]
/// Storage services assembled for one tab.
pub struct HostStorage {
    /// Durable origin-wide store.
    pub local: KeyValueStoreAdapter,
    /// Session-scoped store.
    pub session: KeyValueStoreAdapter,
    /// Cross-tab change notifications for `local`.
    pub events: StorageEventsAdapter,
}

impl HostStorage {
    /// Assembles the storage services for the compile-time selected host strategy.
    pub fn select() -> Self {
        Self {
            local: local_store(),
            session: session_store(),
            events: storage_events(),
        }
    }

    /// Assembles storage services over an explicit in-memory origin tab.
    ///
    /// Session scope gets a fresh private origin, matching per-tab `sessionStorage`.
    pub fn memory(local: MemoryKeyValueStore) -> Self {
        Self {
            local: KeyValueStoreAdapter::Memory(local.clone()),
            session: KeyValueStoreAdapter::Memory(MemoryOrigin::default().open_tab()),
            events: StorageEventsAdapter::Memory(local),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use platform_host::StorageChange;

    use super::*;

    #[test]
    fn strategy_name_matches_selected_strategy() {
        let expected = if cfg!(feature = "memory-host") {
            "memory"
        } else {
            "browser"
        };
        assert_eq!(host_strategy_name(), expected);
    }

    #[test]
    fn memory_bundles_over_one_origin_see_each_others_writes() {
        let origin = MemoryOrigin::default();
        let first = HostStorage::memory(origin.open_tab());
        let second = HostStorage::memory(origin.open_tab());
        let fired = Rc::new(Cell::new(0));
        let counter = fired.clone();
        let _sub = second
            .events
            .subscribe_changes(Rc::new(move |_change: &StorageChange| {
                counter.set(counter.get() + 1)
            }));

        first.local.write("wishlist", "[]").expect("write");
        first.session.write("current_user", "{}").expect("session write");

        assert_eq!(second.local.read("wishlist").expect("read"), Some("[]".into()));
        assert_eq!(second.session.read("current_user").expect("read"), None);
        assert_eq!(fired.get(), 1);
    }
}
