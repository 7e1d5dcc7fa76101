//! Persisted wishlist: an insertion-ordered set of movie snapshots stored as one JSON array.

use catalog_api::{paginate, MovieDetail, MovieSummary};
use platform_host::{read_json_with, write_json_with, KeyValueStore, StorageError};
use serde::{Deserialize, Serialize};

use crate::sync::{SyncBus, SyncOrigin, WISHLIST_TOPIC};

/// Storage key holding the wishlist array.
pub const WISHLIST_KEY: &str = "wishlist";

/// Rows per page in the wishlist table view.
pub const WISHLIST_PAGE_SIZE: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Movie snapshot captured when it was wishlisted.
///
/// Identity is `id`; the other fields are display data frozen at insertion time.
pub struct WishlistEntry {
    /// Catalog identifier.
    pub id: u64,
    /// Title at insertion time.
    #[serde(default)]
    pub title: String,
    /// Poster image path.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Average rating.
    #[serde(default)]
    pub vote_average: Option<f64>,
    /// Release date.
    #[serde(default)]
    pub release_date: Option<String>,
    /// Genre identifiers.
    #[serde(default)]
    pub genre_ids: Vec<u32>,
}

impl From<&MovieSummary> for WishlistEntry {
    fn from(movie: &MovieSummary) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            poster_path: movie.poster_path.clone(),
            vote_average: movie.vote_average,
            release_date: movie.release_date.clone(),
            genre_ids: movie.genre_ids.clone(),
        }
    }
}

impl From<&MovieDetail> for WishlistEntry {
    fn from(detail: &MovieDetail) -> Self {
        Self::from(&detail.summary())
    }
}

/// Typed wishlist view over a key-value store.
///
/// Holds no cached copy: every call re-reads the stored array, so all views sharing a store agree
/// on membership at all times. Every successful mutating call, including one that changed nothing,
/// publishes [`WISHLIST_TOPIC`] on the bus exactly once.
#[derive(Debug, Clone)]
pub struct WishlistStore<S> {
    store: S,
    bus: SyncBus,
}

impl<S: KeyValueStore> WishlistStore<S> {
    /// Wishlist over `store`, publishing changes on `bus`.
    pub fn new(store: S, bus: SyncBus) -> Self {
        Self { store, bus }
    }

    /// Bus this store publishes on.
    pub fn bus(&self) -> &SyncBus {
        &self.bus
    }

    /// Underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reads the wishlist, surfacing undecodable data as [`StorageError::Decode`].
    ///
    /// Repeated ids are collapsed to their first occurrence.
    pub fn load(&self) -> Result<Vec<WishlistEntry>, StorageError> {
        let entries: Vec<WishlistEntry> =
            read_json_with(&self.store, WISHLIST_KEY)?.unwrap_or_default();
        let mut unique: Vec<WishlistEntry> = Vec::with_capacity(entries.len());
        for entry in entries {
            if !unique.iter().any(|kept| kept.id == entry.id) {
                unique.push(entry);
            }
        }
        Ok(unique)
    }

    /// Insertion-ordered snapshot; empty when nothing is stored or the data cannot be read.
    pub fn list(&self) -> Vec<WishlistEntry> {
        self.load().unwrap_or_default()
    }

    /// Returns `true` when `id` is wishlisted.
    pub fn contains(&self, id: u64) -> bool {
        self.list().iter().any(|entry| entry.id == id)
    }

    /// Number of wishlisted movies.
    pub fn len(&self) -> usize {
        self.list().len()
    }

    /// Returns `true` when nothing is wishlisted.
    pub fn is_empty(&self) -> bool {
        self.list().is_empty()
    }

    /// Entries on 1-based `page` of `per_page` rows.
    pub fn paginate(&self, page: usize, per_page: usize) -> Vec<WishlistEntry> {
        paginate(&self.list(), page, per_page).to_vec()
    }

    /// Appends `entry` unless its id is already present. Returns `true` when it was inserted.
    ///
    /// # Errors
    ///
    /// Returns the store error when the write fails; nothing is stored or published then.
    pub fn add(&self, entry: WishlistEntry) -> Result<bool, StorageError> {
        self.mutate(|entries| {
            if entries.iter().any(|kept| kept.id == entry.id) {
                return false;
            }
            entries.push(entry);
            true
        })
    }

    /// Removes `id` if present. Returns `true` when it was removed.
    ///
    /// # Errors
    ///
    /// Returns the store error when the write fails; nothing is stored or published then.
    pub fn remove(&self, id: u64) -> Result<bool, StorageError> {
        self.mutate(|entries| {
            let before = entries.len();
            entries.retain(|kept| kept.id != id);
            entries.len() != before
        })
    }

    /// Removes `entry` when present, adds it otherwise. Returns the resulting membership.
    ///
    /// # Errors
    ///
    /// Returns the store error when the write fails; membership is unchanged then.
    pub fn toggle(&self, entry: WishlistEntry) -> Result<bool, StorageError> {
        let mut now_member = false;
        self.mutate(|entries| {
            let before = entries.len();
            entries.retain(|kept| kept.id != entry.id);
            if entries.len() == before {
                entries.push(entry);
                now_member = true;
            }
            true
        })?;
        Ok(now_member)
    }

    /// Removes the whole wishlist.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(WISHLIST_KEY)?;
        self.bus.publish(WISHLIST_TOPIC, SyncOrigin::Local);
        Ok(())
    }

    /// Read-modify-write of the whole array. Undecodable stored data is treated as empty and gets
    /// overwritten. Writes when `apply` reports a change or the stored data was undecodable;
    /// publishes on every success.
    fn mutate(
        &self,
        apply: impl FnOnce(&mut Vec<WishlistEntry>) -> bool,
    ) -> Result<bool, StorageError> {
        let (mut entries, corrupt) = match self.load() {
            Ok(entries) => (entries, false),
            Err(err) if err.is_decode() => (Vec::new(), true),
            Err(err) => return Err(err),
        };
        let changed = apply(&mut entries);
        if changed || corrupt {
            write_json_with(&self.store, WISHLIST_KEY, &entries)?;
        }
        self.bus.publish(WISHLIST_TOPIC, SyncOrigin::Local);
        Ok(changed)
    }
}
