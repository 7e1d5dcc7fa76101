//! Provider and context wiring for catalog views.
#![allow(clippy::clone_on_copy)]

use std::rc::Rc;

use catalog_api::{CatalogClient, CatalogConfig, CatalogTransport, ReqwestTransport};
use catalog_state::{
    sync_bus, AuthService, RecentSearches, SessionContext, SyncBus, WishlistStore,
};
use leptos::*;
use platform_host_web::{HostStorage, KeyValueStoreAdapter, StorageEventsAdapter};

use crate::notice::Notice;

/// Metadata transport shared by every view of the tab.
pub type SharedTransport = Rc<dyn CatalogTransport>;

#[derive(Clone, Copy)]
/// Leptos context giving catalog views their stores, bus, client settings, and session.
pub struct CatalogContext {
    /// Storage services for this tab.
    pub storage: StoredValue<HostStorage>,
    /// In-tab change bus.
    pub bus: StoredValue<SyncBus>,
    /// Metadata API settings.
    pub config: StoredValue<CatalogConfig>,
    /// Metadata API transport.
    pub transport: StoredValue<SharedTransport>,
    /// Signed-in session, `None` when signed out.
    pub session: RwSignal<Option<SessionContext>>,
    /// Transient notice shown above the views.
    pub notice: RwSignal<Option<Notice>>,
    /// Recent search terms, newest first.
    pub recent_searches: RwSignal<Vec<String>>,
}

impl CatalogContext {
    /// Builds the context values without providing them.
    pub fn new(storage: HostStorage, config: CatalogConfig, transport: SharedTransport) -> Self {
        let auth = AuthService::new(storage.local.clone(), storage.session.clone());
        let recent = RecentSearches::new(storage.local.clone()).list();
        Self {
            session: create_rw_signal(auth.current_session()),
            recent_searches: create_rw_signal(recent),
            notice: create_rw_signal(None),
            storage: store_value(storage),
            bus: store_value(sync_bus()),
            config: store_value(config),
            transport: store_value(transport),
        }
    }

    /// Durable store.
    pub fn local_store(&self) -> KeyValueStoreAdapter {
        self.storage.with_value(|storage| storage.local.clone())
    }

    /// Cross-tab change events for the durable store.
    pub fn storage_events(&self) -> StorageEventsAdapter {
        self.storage.with_value(|storage| storage.events.clone())
    }

    /// Wishlist over the durable store, publishing on this tab's bus.
    pub fn wishlist(&self) -> WishlistStore<KeyValueStoreAdapter> {
        WishlistStore::new(self.local_store(), self.bus.get_value())
    }

    /// Recent searches over the durable store.
    pub fn searches(&self) -> RecentSearches<KeyValueStoreAdapter> {
        RecentSearches::new(self.local_store())
    }

    /// Local sign-in service.
    pub fn auth(&self) -> AuthService<KeyValueStoreAdapter, KeyValueStoreAdapter> {
        self.storage.with_value(|storage| {
            AuthService::new(storage.local.clone(), storage.session.clone())
        })
    }

    /// Metadata client for the signed-in session; `None` when signed out.
    pub fn client(&self) -> Option<CatalogClient<SharedTransport>> {
        let api_key = self
            .session
            .with_untracked(|session| session.as_ref().map(|session| session.api_key.clone()))?;
        Some(CatalogClient::new(
            self.transport.get_value(),
            self.config.get_value(),
            api_key,
        ))
    }
}

#[component]
/// Provides [`CatalogContext`] to descendant views.
pub fn CatalogProvider(
    /// Storage services; defaults to the compile-time selected host strategy.
    #[prop(optional)]
    storage: Option<HostStorage>,
    /// Metadata API settings; defaults to the public API.
    #[prop(optional)]
    config: Option<CatalogConfig>,
    /// Metadata transport; defaults to `reqwest`.
    #[prop(optional)]
    transport: Option<SharedTransport>,
    children: Children,
) -> impl IntoView {
    let context = CatalogContext::new(
        storage.unwrap_or_else(HostStorage::select),
        config.unwrap_or_default(),
        transport.unwrap_or_else(|| Rc::new(ReqwestTransport::default())),
    );
    provide_context(context);
    children()
}

/// Reads the [`CatalogContext`] provided by an enclosing [`CatalogProvider`].
pub fn use_catalog() -> CatalogContext {
    expect_context::<CatalogContext>()
}
