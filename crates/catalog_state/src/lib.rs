//! Client-side state for the movie catalog.
//!
//! Everything here is synchronous and single-threaded: stores are thin typed views over a
//! [`platform_host::KeyValueStore`], and views learn about changes through a [`SyncBus`] (same tab)
//! and storage-change events (other tabs) rather than through shared in-memory state. Each view
//! derives what it shows by re-reading the store when notified.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod searches;
pub mod session;
pub mod sync;
pub mod wishlist;

pub use searches::{RecentSearches, MAX_RECENT_SEARCHES, RECENT_SEARCHES_KEY};
pub use session::{
    is_valid_email, AuthError, AuthService, Registration, SessionContext, API_KEY_KEY,
    CURRENT_USER_KEY, KEEP_LOGIN_KEY, MIN_PASSWORD_LEN, USERS_KEY,
};
pub use sync::{
    sync_bus, DriftPoller, SyncBus, SyncNotice, SyncOrigin, SyncSubscription, WishlistWatch,
    WISHLIST_TOPIC,
};
pub use wishlist::{WishlistEntry, WishlistStore, WISHLIST_KEY, WISHLIST_PAGE_SIZE};
