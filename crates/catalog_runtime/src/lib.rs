//! Leptos bindings for the movie catalog.
//!
//! [`CatalogProvider`] assembles the tab's storage services, sync bus, metadata transport, and
//! session signal into a [`CatalogContext`]. Hooks derive view state from it:
//! [`use_wishlist`] re-reads the wishlist whenever any delivery path reports a change,
//! [`use_catalog_search`] debounces input and discards stale responses, and
//! [`use_catalog_section`]/[`use_home_sections`] load listing rows whose failures stay local.
//!
//! This crate renders no markup; views own presentation.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

mod context;
mod notice;
mod search;
mod sections;
mod session;
mod wishlist;

pub use context::{
    use_catalog, CatalogContext, CatalogProvider, CatalogProviderProps, SharedTransport,
};
pub use notice::{storage_notice, Notice, NoticeKind, NOTICE_DURATION};
pub use search::{use_catalog_search, CatalogSearch, SEARCH_DEBOUNCE};
pub use sections::{use_catalog_section, use_home_sections, SectionState};
pub use wishlist::{use_wishlist, WishlistHandle, WISHLIST_POLL_INTERVAL};
