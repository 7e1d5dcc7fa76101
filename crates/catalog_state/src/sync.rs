//! Change notification between views.
//!
//! Two delivery paths feed a view: the in-tab [`SyncBus`] (published by the store after every
//! mutating call) and the host's storage-change events (fired only in tabs other than the writer).
//! [`WishlistWatch`] listens on both. [`DriftPoller`] is a periodic fallback for changes neither
//! path reported.

use std::{
    cell::RefCell,
    collections::BTreeMap,
    fmt,
    rc::{Rc, Weak},
};

use platform_host::{KeyValueStore, StorageChange, StorageEvents, StorageSubscription};

use crate::wishlist::WISHLIST_KEY;

/// Bus topic published after wishlist mutations.
pub const WISHLIST_TOPIC: &str = "wishlist";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Where a notice came from.
pub enum SyncOrigin {
    /// A mutation in this tab.
    Local,
    /// A storage-change event from another tab.
    CrossTab,
    /// The drift poller found the stored value changed.
    Poll,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// "Re-read `topic`" hint. Carries no data; receivers re-read the store.
pub struct SyncNotice {
    /// Topic that changed.
    pub topic: String,
    /// Delivery path.
    pub origin: SyncOrigin,
}

impl SyncNotice {
    /// Notice for `topic` from `origin`.
    pub fn new(topic: &str, origin: SyncOrigin) -> Self {
        Self {
            topic: topic.to_string(),
            origin,
        }
    }
}

type SyncListener = Rc<dyn Fn(&SyncNotice)>;

#[derive(Default)]
struct BusState {
    next_id: u64,
    subscribers: BTreeMap<u64, (String, SyncListener)>,
}

#[derive(Clone, Default)]
/// Tab-scoped publish/subscribe keyed by topic.
pub struct SyncBus {
    inner: Rc<RefCell<BusState>>,
}

impl fmt::Debug for SyncBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.borrow();
        f.debug_struct("SyncBus")
            .field("subscribers", &state.subscribers.len())
            .finish()
    }
}

impl SyncBus {
    /// Registers `listener` for `topic` until the returned subscription is dropped.
    pub fn subscribe(
        &self,
        topic: &str,
        listener: impl Fn(&SyncNotice) + 'static,
    ) -> SyncSubscription {
        let mut state = self.inner.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        let listener: SyncListener = Rc::new(listener);
        state.subscribers.insert(id, (topic.to_string(), listener));
        SyncSubscription {
            bus: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// Delivers a notice to every current subscriber of `topic`, once each, before returning.
    ///
    /// Returns the number of listeners called. Listeners may subscribe, unsubscribe, or publish
    /// while being called.
    pub fn publish(&self, topic: &str, origin: SyncOrigin) -> usize {
        let listeners: Vec<SyncListener> = self
            .inner
            .borrow()
            .subscribers
            .values()
            .filter(|(subscribed, _)| subscribed == topic)
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        let notice = SyncNotice::new(topic, origin);
        for listener in &listeners {
            listener(&notice);
        }
        listeners.len()
    }

    /// Number of live subscriptions to `topic`.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.inner
            .borrow()
            .subscribers
            .values()
            .filter(|(subscribed, _)| subscribed == topic)
            .count()
    }
}

thread_local! {
    static SYNC_BUS: SyncBus = SyncBus::default();
}

/// The bus shared by every view in this tab.
pub fn sync_bus() -> SyncBus {
    SYNC_BUS.with(SyncBus::clone)
}

#[must_use = "dropping the subscription unsubscribes immediately"]
/// Live bus registration; dropping it unsubscribes.
pub struct SyncSubscription {
    bus: Weak<RefCell<BusState>>,
    id: u64,
}

impl fmt::Debug for SyncSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncSubscription")
            .field("id", &self.id)
            .finish()
    }
}

impl Drop for SyncSubscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.borrow_mut().subscribers.remove(&self.id);
        }
    }
}

#[must_use = "dropping the watch stops both notification paths"]
#[derive(Debug)]
/// Wishlist change listener over both the in-tab bus and cross-tab storage events.
pub struct WishlistWatch {
    _local: SyncSubscription,
    _cross_tab: StorageSubscription,
}

impl WishlistWatch {
    /// Calls `on_change` once per wishlist mutation in this tab and once per storage-change
    /// event touching the wishlist key (including whole-area clears) from other tabs.
    pub fn install<E: StorageEvents + ?Sized>(
        bus: &SyncBus,
        events: &E,
        on_change: impl Fn(&SyncNotice) + 'static,
    ) -> Self {
        let on_change: SyncListener = Rc::new(on_change);
        let local = bus.subscribe(WISHLIST_TOPIC, {
            let on_change = Rc::clone(&on_change);
            move |notice| on_change(notice)
        });
        let cross_tab = events.subscribe_changes(Rc::new(move |change: &StorageChange| {
            if change.affects(WISHLIST_KEY) {
                on_change(&SyncNotice::new(WISHLIST_TOPIC, SyncOrigin::CrossTab));
            }
        }));
        Self {
            _local: local,
            _cross_tab: cross_tab,
        }
    }
}

/// Periodic re-check of the wishlist key for changes no push path delivered.
///
/// Each [`check`](Self::check) compares the stored text with the last text seen and publishes
/// [`WISHLIST_TOPIC`] with [`SyncOrigin::Poll`] when they differ.
pub struct DriftPoller<S> {
    store: S,
    bus: SyncBus,
    last_seen: RefCell<Option<String>>,
}

impl<S: KeyValueStore> DriftPoller<S> {
    /// Poller seeded with the currently stored value.
    pub fn new(store: S, bus: SyncBus) -> Self {
        let last_seen = store.read(WISHLIST_KEY).ok().flatten();
        Self {
            store,
            bus,
            last_seen: RefCell::new(last_seen),
        }
    }

    /// Re-reads the key; returns `true` (after publishing) when it changed since the last look.
    ///
    /// A failed read is skipped and retried on the next check.
    pub fn check(&self) -> bool {
        let Ok(current) = self.store.read(WISHLIST_KEY) else {
            return false;
        };
        if *self.last_seen.borrow() == current {
            return false;
        }
        *self.last_seen.borrow_mut() = current;
        self.bus.publish(WISHLIST_TOPIC, SyncOrigin::Poll);
        true
    }

    /// Records the stored value as seen without publishing, after a view has already refreshed.
    pub fn acknowledge(&self) {
        if let Ok(current) = self.store.read(WISHLIST_KEY) {
            *self.last_seen.borrow_mut() = current;
        }
    }
}
