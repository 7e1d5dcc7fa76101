//! Storage-change notifications delivered when another tab of the same origin mutates storage.

use std::{fmt, rc::Rc};

#[derive(Debug, Clone, PartialEq, Eq)]
/// One storage mutation observed from another tab.
pub struct StorageChange {
    /// Changed key, or `None` when the whole storage area was cleared.
    pub key: Option<String>,
    /// Raw value before the change.
    pub old_value: Option<String>,
    /// Raw value after the change (`None` when removed).
    pub new_value: Option<String>,
}

impl StorageChange {
    /// Returns `true` when this change may have touched `key`.
    ///
    /// Whole-area clears match every key.
    pub fn affects(&self, key: &str) -> bool {
        self.key.as_deref().map_or(true, |changed| changed == key)
    }
}

/// Callback invoked for each storage change.
pub type StorageListener = Rc<dyn Fn(&StorageChange)>;

/// Subscription handle returned by [`StorageEvents::subscribe_changes`].
///
/// Dropping the handle unsubscribes the listener.
pub struct StorageSubscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl StorageSubscription {
    /// Creates a handle that runs `cancel` when dropped.
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Creates a handle with nothing to release.
    pub fn inert() -> Self {
        Self { cancel: None }
    }
}

impl fmt::Debug for StorageSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageSubscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

impl Drop for StorageSubscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

/// Host service for observing storage mutations made by other tabs of the same origin.
///
/// Mutations made through the subscribing tab's own store are never reported back to it.
pub trait StorageEvents {
    /// Registers `listener` for cross-tab storage changes.
    fn subscribe_changes(&self, listener: StorageListener) -> StorageSubscription;
}

#[derive(Debug, Clone, Copy, Default)]
/// Event source that never fires, for targets without cross-tab storage.
pub struct NoopStorageEvents;

impl StorageEvents for NoopStorageEvents {
    fn subscribe_changes(&self, _listener: StorageListener) -> StorageSubscription {
        StorageSubscription::inert()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn clear_events_affect_every_key() {
        let clear = StorageChange {
            key: None,
            old_value: None,
            new_value: None,
        };
        assert!(clear.affects("wishlist"));

        let other = StorageChange {
            key: Some("api_key".to_string()),
            old_value: None,
            new_value: Some("\"k\"".to_string()),
        };
        assert!(!other.affects("wishlist"));
        assert!(other.affects("api_key"));
    }

    #[test]
    fn subscription_runs_cancel_once_on_drop() {
        let cancelled = Rc::new(Cell::new(0));
        let counter = cancelled.clone();
        let subscription = StorageSubscription::new(move || counter.set(counter.get() + 1));
        drop(subscription);
        assert_eq!(cancelled.get(), 1);
        drop(StorageSubscription::inert());
        assert_eq!(cancelled.get(), 1);
    }
}
