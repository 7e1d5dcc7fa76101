use std::{rc::Rc, time::Duration};

use catalog_state::{DriftPoller, SyncNotice, WishlistEntry, WishlistStore, WishlistWatch};
use leptos::*;
use platform_host::KeyValueStore;

use crate::{
    notice::{storage_notice, NoticeKind},
    use_catalog,
};

/// How often the drift poller re-reads the stored wishlist.
pub const WISHLIST_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Clone, Copy)]
/// Wishlist state for one view.
pub struct WishlistHandle {
    /// Wishlisted movies in insertion order.
    pub entries: Signal<Vec<WishlistEntry>>,
    /// Adds or removes a movie. Failures raise a notice and change nothing.
    pub toggle: Callback<WishlistEntry>,
}

impl WishlistHandle {
    /// Reactive membership of `id`.
    pub fn contains(&self, id: u64) -> Signal<bool> {
        let entries = self.entries;
        Signal::derive(move || entries.with(|entries| entries.iter().any(|entry| entry.id == id)))
    }
}

fn read_entries<S: KeyValueStore>(wishlist: &WishlistStore<S>) -> Vec<WishlistEntry> {
    match wishlist.load() {
        Ok(entries) => entries,
        Err(err) => {
            logging::warn!("wishlist load failed: {err}");
            Vec::new()
        }
    }
}

/// Binds a view to the persisted wishlist.
///
/// The view re-reads storage when this tab mutates the wishlist, when another tab does, and when
/// the once-per-second drift check finds the stored value changed. All listeners are released when
/// the view is cleaned up.
pub fn use_wishlist() -> WishlistHandle {
    let catalog = use_catalog();
    let wishlist = Rc::new(catalog.wishlist());
    let entries = create_rw_signal(read_entries(&*wishlist));
    let poller = Rc::new(DriftPoller::new(
        catalog.local_store(),
        catalog.bus.get_value(),
    ));

    let watch = WishlistWatch::install(&catalog.bus.get_value(), &catalog.storage_events(), {
        let wishlist = Rc::clone(&wishlist);
        let poller = Rc::clone(&poller);
        move |_: &SyncNotice| {
            poller.acknowledge();
            entries.set(read_entries(&*wishlist));
        }
    });
    on_cleanup(move || drop(watch));

    // Native builds have no timer host; only the push paths refresh there.
    #[cfg(target_arch = "wasm32")]
    {
        match set_interval_with_handle(
            move || {
                poller.check();
            },
            WISHLIST_POLL_INTERVAL,
        ) {
            Ok(interval) => on_cleanup(move || interval.clear()),
            Err(err) => logging::warn!("wishlist drift poll timer failed: {err:?}"),
        }
    }

    let toggle = Callback::new(move |entry: WishlistEntry| {
        if let Err(err) = wishlist.toggle(entry) {
            logging::warn!("wishlist toggle failed: {err}");
            catalog.notify(NoticeKind::Error, storage_notice(&err));
        }
    });

    WishlistHandle {
        entries: entries.into(),
        toggle,
    }
}

#[cfg(test)]
mod tests {
    use catalog_api::{CatalogConfig, MemoryTransport};
    use platform_host::{MemoryKeyValueStore, MemoryOrigin};
    use platform_host_web::HostStorage;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::CatalogContext;

    fn entry(id: u64) -> WishlistEntry {
        WishlistEntry {
            id,
            title: format!("movie {id}"),
            poster_path: None,
            vote_average: None,
            release_date: None,
            genre_ids: Vec::new(),
        }
    }

    fn context(tab: MemoryKeyValueStore) -> CatalogContext {
        CatalogContext::new(
            HostStorage::memory(tab),
            CatalogConfig::default(),
            Rc::new(MemoryTransport::default()),
        )
    }

    fn mount(context: CatalogContext) -> WishlistHandle {
        provide_context(context);
        use_wishlist()
    }

    fn ids(handle: &WishlistHandle) -> Vec<u64> {
        handle
            .entries
            .get_untracked()
            .iter()
            .map(|entry| entry.id)
            .collect()
    }

    #[test]
    fn views_in_one_tab_follow_each_others_toggles() {
        let runtime = create_runtime();
        let shared = context(MemoryOrigin::default().open_tab());
        let card = mount(shared);
        let page = mount(shared);

        card.toggle.call(entry(27205));
        assert_eq!(ids(&page), vec![27205]);
        assert!(page.contains(27205).get_untracked());

        page.toggle.call(entry(27205));
        assert_eq!(ids(&card), Vec::<u64>::new());
        runtime.dispose();
    }

    #[test]
    fn view_in_another_tab_refreshes_after_toggle() {
        let runtime = create_runtime();
        let origin = MemoryOrigin::default();
        let first = mount(context(origin.open_tab()));
        let second = mount(context(origin.open_tab()));

        first.toggle.call(entry(1));
        first.toggle.call(entry(3));
        first.toggle.call(entry(2));

        assert_eq!(ids(&second), vec![1, 3, 2]);
        runtime.dispose();
    }

    #[test]
    fn failed_toggle_raises_a_notice_and_changes_nothing() {
        let runtime = create_runtime();
        let shared = context(MemoryOrigin::with_quota(256).open_tab());
        let view = mount(shared);
        view.toggle.call(entry(1));

        let mut big = entry(2);
        big.title = "x".repeat(500);
        view.toggle.call(big);

        assert_eq!(ids(&view), vec![1]);
        let notice = shared.notice.get_untracked().expect("notice");
        assert_eq!(notice.kind, NoticeKind::Error);
        assert!(notice.message.contains("full"));
        runtime.dispose();
    }
}
