//! In-memory origin shared by simulated tabs.
//!
//! [`MemoryOrigin`] plays the role of the browser's per-origin storage area: every
//! [`MemoryKeyValueStore`] opened from it sees the same data, and each mutation that actually
//! changes a value is reported once to the storage-change listeners of every other tab.

use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap},
    rc::Rc,
};

use super::{
    events::{StorageChange, StorageEvents, StorageListener, StorageSubscription},
    key_value::{KeyValueStore, StorageError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Identifier of a simulated tab within a [`MemoryOrigin`].
pub struct TabId(
    /// Sequence number assigned by [`MemoryOrigin::open_tab`].
    pub u32,
);

#[derive(Default)]
struct OriginState {
    entries: HashMap<String, String>,
    listeners: BTreeMap<u64, (TabId, StorageListener)>,
    next_tab: u32,
    next_listener: u64,
    quota_bytes: Option<usize>,
}

impl OriginState {
    fn used_bytes_with(&self, key: &str, raw: &str) -> usize {
        self.entries
            .iter()
            .filter(|(existing, _)| existing.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum::<usize>()
            + key.len()
            + raw.len()
    }

    fn listeners_except(&self, tab: TabId) -> Vec<StorageListener> {
        self.listeners
            .values()
            .filter(|(owner, _)| *owner != tab)
            .map(|(_, listener)| listener.clone())
            .collect()
    }
}

#[derive(Clone, Default)]
/// Shared in-memory storage area for one origin.
pub struct MemoryOrigin {
    inner: Rc<RefCell<OriginState>>,
}

impl std::fmt::Debug for MemoryOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.borrow();
        f.debug_struct("MemoryOrigin")
            .field("keys", &state.entries.len())
            .field("listeners", &state.listeners.len())
            .field("quota_bytes", &state.quota_bytes)
            .finish()
    }
}

impl MemoryOrigin {
    /// Creates an origin whose total stored bytes (keys plus values) may not exceed `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        let origin = Self::default();
        origin.inner.borrow_mut().quota_bytes = Some(quota_bytes);
        origin
    }

    /// Opens a new tab handle onto this origin.
    pub fn open_tab(&self) -> MemoryKeyValueStore {
        let mut state = self.inner.borrow_mut();
        let tab = TabId(state.next_tab);
        state.next_tab += 1;
        MemoryKeyValueStore {
            origin: self.clone(),
            tab,
        }
    }

    /// Removes every key, notifying other tabs with a whole-area clear.
    pub fn clear_from(&self, tab: TabId) {
        let listeners = {
            let mut state = self.inner.borrow_mut();
            if state.entries.is_empty() {
                return;
            }
            state.entries.clear();
            state.listeners_except(tab)
        };
        let change = StorageChange {
            key: None,
            old_value: None,
            new_value: None,
        };
        for listener in listeners {
            listener(&change);
        }
    }

    fn apply(&self, tab: TabId, key: &str, next: Option<&str>) -> Result<(), StorageError> {
        let (change, listeners) = {
            let mut state = self.inner.borrow_mut();
            let previous = state.entries.get(key).cloned();
            if previous.as_deref() == next {
                return Ok(());
            }
            match next {
                Some(raw) => {
                    if let Some(quota) = state.quota_bytes {
                        let needed = state.used_bytes_with(key, raw);
                        if needed > quota {
                            return Err(StorageError::QuotaExceeded(format!(
                                "{needed} bytes requested, {quota} available"
                            )));
                        }
                    }
                    state.entries.insert(key.to_string(), raw.to_string());
                }
                None => {
                    state.entries.remove(key);
                }
            }
            let change = StorageChange {
                key: Some(key.to_string()),
                old_value: previous,
                new_value: next.map(str::to_string),
            };
            (change, state.listeners_except(tab))
        };

        // Listeners run with the origin unlocked so they may re-read storage.
        for listener in listeners {
            listener(&change);
        }
        Ok(())
    }

    fn subscribe(&self, tab: TabId, listener: StorageListener) -> StorageSubscription {
        let id = {
            let mut state = self.inner.borrow_mut();
            let id = state.next_listener;
            state.next_listener += 1;
            state.listeners.insert(id, (tab, listener));
            id
        };
        let origin = Rc::downgrade(&self.inner);
        StorageSubscription::new(move || {
            if let Some(origin) = origin.upgrade() {
                origin.borrow_mut().listeners.remove(&id);
            }
        })
    }
}

#[derive(Debug, Clone)]
/// One tab's view of a [`MemoryOrigin`]; also its source of cross-tab storage events.
pub struct MemoryKeyValueStore {
    origin: MemoryOrigin,
    tab: TabId,
}

impl Default for MemoryKeyValueStore {
    fn default() -> Self {
        MemoryOrigin::default().open_tab()
    }
}

impl MemoryKeyValueStore {
    /// Returns this handle's tab id.
    pub fn tab(&self) -> TabId {
        self.tab
    }

    /// Returns the shared origin, e.g. to open sibling tabs in tests.
    pub fn origin(&self) -> &MemoryOrigin {
        &self.origin
    }

    /// Removes every key in the origin, as the user clearing site data would.
    pub fn clear(&self) {
        self.origin.clear_from(self.tab);
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.origin.inner.borrow().entries.get(key).cloned())
    }

    fn write(&self, key: &str, raw_json: &str) -> Result<(), StorageError> {
        self.origin.apply(self.tab, key, Some(raw_json))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.origin.apply(self.tab, key, None)
    }
}

impl StorageEvents for MemoryKeyValueStore {
    fn subscribe_changes(&self, listener: StorageListener) -> StorageSubscription {
        self.origin.subscribe(self.tab, listener)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use pretty_assertions::assert_eq;

    use super::*;

    fn recorder(
        store: &MemoryKeyValueStore,
    ) -> (Rc<RefCell<Vec<StorageChange>>>, StorageSubscription) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let subscription = store.subscribe_changes(Rc::new(move |change: &StorageChange| {
            sink.borrow_mut().push(change.clone());
        }));
        (seen, subscription)
    }

    #[test]
    fn tabs_share_one_origin() {
        let origin = MemoryOrigin::default();
        let first = origin.open_tab();
        let second = origin.open_tab();
        assert_ne!(first.tab(), second.tab());

        first.write("api_key", "\"abc\"").expect("write");
        assert_eq!(
            second.read("api_key").expect("read"),
            Some("\"abc\"".to_string())
        );
        second.remove("api_key").expect("remove");
        assert_eq!(first.read("api_key").expect("read"), None);
    }

    #[test]
    fn changes_reach_other_tabs_only() {
        let origin = MemoryOrigin::default();
        let writer = origin.open_tab();
        let reader = origin.open_tab();
        let (writer_seen, _writer_sub) = recorder(&writer);
        let (reader_seen, _reader_sub) = recorder(&reader);

        writer.write("wishlist", "[]").expect("write");

        assert!(writer_seen.borrow().is_empty());
        assert_eq!(
            *reader_seen.borrow(),
            vec![StorageChange {
                key: Some("wishlist".to_string()),
                old_value: None,
                new_value: Some("[]".to_string()),
            }]
        );
    }

    #[test]
    fn unchanged_writes_do_not_notify() {
        let origin = MemoryOrigin::default();
        let writer = origin.open_tab();
        let reader = origin.open_tab();
        let (seen, _sub) = recorder(&reader);

        writer.write("k", "1").expect("write");
        writer.write("k", "1").expect("same write");
        writer.remove("missing").expect("remove missing");
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn dropped_subscription_stops_delivery() {
        let origin = MemoryOrigin::default();
        let writer = origin.open_tab();
        let reader = origin.open_tab();
        let (seen, sub) = recorder(&reader);
        drop(sub);
        writer.write("k", "1").expect("write");
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn quota_rejects_oversized_write_and_keeps_previous_value() {
        let origin = MemoryOrigin::with_quota(16);
        let tab = origin.open_tab();
        tab.write("k", "[1,2]").expect("fits");
        let err = tab
            .write("k", "[1,2,3,4,5,6,7,8,9]")
            .expect_err("over quota");
        assert!(matches!(err, StorageError::QuotaExceeded(_)));
        assert_eq!(tab.read("k").expect("read"), Some("[1,2]".to_string()));
    }

    #[test]
    fn clear_notifies_with_whole_area_change() {
        let origin = MemoryOrigin::default();
        let writer = origin.open_tab();
        let reader = origin.open_tab();
        writer.write("wishlist", "[]").expect("write");
        let (seen, _sub) = recorder(&reader);

        writer.clear();

        assert_eq!(reader.read("wishlist").expect("read"), None);
        assert_eq!(seen.borrow().len(), 1);
        assert!(seen.borrow()[0].affects("wishlist"));
    }

    #[test]
    fn listener_may_read_storage_during_delivery() {
        let origin = MemoryOrigin::default();
        let writer = origin.open_tab();
        let reader = origin.open_tab();
        let observed = Rc::new(RefCell::new(None));
        let sink = observed.clone();
        let reader_for_listener = reader.clone();
        let _sub = reader.subscribe_changes(Rc::new(move |_change: &StorageChange| {
            *sink.borrow_mut() = reader_for_listener.read("k").expect("read in listener");
        }));

        writer.write("k", "42").expect("write");
        assert_eq!(*observed.borrow(), Some("42".to_string()));
    }
}
