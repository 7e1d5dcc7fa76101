use std::time::Duration;

use catalog_api::{
    CatalogError, CatalogQuery, DiscoverFilters, MovieSummary, PageAccumulator, RequestGate,
    RequestTicket,
};
#[cfg(target_arch = "wasm32")]
use leptos::leptos_dom::helpers::TimeoutHandle;
use leptos::*;

use crate::use_catalog;

/// Quiet period after the last input change before a search request is sent.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Clone, Copy)]
/// State and actions of a search view.
pub struct CatalogSearch {
    /// Accumulated results of the current query.
    pub results: Signal<Vec<MovieSummary>>,
    /// Whether a request for the current query is in flight.
    pub loading: Signal<bool>,
    /// Inline error for the current query.
    pub error: Signal<Option<String>>,
    /// Whether more pages can be loaded.
    pub has_more: Signal<bool>,
    /// Loads the next page (infinite scroll).
    pub load_more: Callback<()>,
    /// Records a submitted search term.
    pub submit: Callback<String>,
    /// Forgets a recent search term.
    pub forget: Callback<String>,
    /// Recent search terms, newest first.
    pub recent: Signal<Vec<String>>,
}

/// Starts a new request generation for changed input.
///
/// Responses to earlier input are dropped from here on, even while the debounce for the new input
/// is still pending.
fn supersede(gate: StoredValue<RequestGate>, loading: RwSignal<bool>) -> RequestTicket {
    loading.set(false);
    gate.with_value(RequestGate::begin)
}

/// Binds a view to search text and discover filters.
///
/// Input changes restart a [`SEARCH_DEBOUNCE`] timer; when it fires the listing is chosen with
/// [`CatalogQuery::select`] and its first page requested. Only the response to the most recent
/// request is applied; a response to input that has since changed is dropped even before the new
/// request is sent. Leaving the view cancels the timer and discards responses still in flight.
pub fn use_catalog_search(
    text: Signal<String>,
    filters: Signal<DiscoverFilters>,
) -> CatalogSearch {
    let catalog = use_catalog();
    let gate = store_value(RequestGate::default());
    let pages = create_rw_signal(PageAccumulator::default());
    let loading = create_rw_signal(false);
    let error = create_rw_signal(None::<String>);
    let active = store_value(CatalogQuery::Popular);
    #[cfg(target_arch = "wasm32")]
    let pending = store_value(None::<TimeoutHandle>);

    let fetch_page = move |ticket: RequestTicket, query: CatalogQuery, page: u32| {
        let Some(client) = catalog.client() else {
            loading.set(false);
            error.set(Some(CatalogError::MissingApiKey.user_message()));
            return;
        };
        loading.set(true);
        spawn_local(async move {
            let Some(outcome) = ticket.settle(client.fetch(&query, page)).await else {
                return;
            };
            loading.set(false);
            match outcome {
                Ok(page) => {
                    error.set(None);
                    pages.update(|pages| {
                        pages.apply(page);
                    });
                }
                Err(err) => {
                    logging::warn!("catalog search failed: {err}");
                    error.set(Some(err.user_message()));
                }
            }
        });
    };

    create_effect(move |_| {
        let query = text.with(|text| CatalogQuery::select(text, &filters.get()));
        let ticket = supersede(gate, loading);
        let fire = move || {
            active.set_value(query.clone());
            pages.set(PageAccumulator::default());
            fetch_page(ticket, query, 1);
        };

        #[cfg(target_arch = "wasm32")]
        {
            if let Some(handle) = pending.get_value() {
                handle.clear();
            }
            let fire = move || {
                pending.set_value(None);
                fire();
            };
            match set_timeout_with_handle(fire, SEARCH_DEBOUNCE) {
                Ok(handle) => pending.set_value(Some(handle)),
                Err(err) => logging::warn!("search debounce timer failed: {err:?}"),
            }
        }
        // Native builds have no timer host; input is searched right away.
        #[cfg(not(target_arch = "wasm32"))]
        fire();
    });

    on_cleanup(move || {
        #[cfg(target_arch = "wasm32")]
        {
            if let Some(handle) = pending.get_value() {
                handle.clear();
            }
        }
        gate.with_value(RequestGate::invalidate);
    });

    let load_more = Callback::new(move |()| {
        if loading.get_untracked() || !pages.with_untracked(PageAccumulator::has_more) {
            return;
        }
        fetch_page(
            gate.with_value(RequestGate::begin),
            active.get_value(),
            pages.with_untracked(PageAccumulator::next_page),
        );
    });

    let recent = catalog.recent_searches;
    let submit = Callback::new(move |term: String| {
        match catalog.searches().record(&term) {
            Ok(terms) => recent.set(terms),
            Err(err) => logging::warn!("recent search save failed: {err}"),
        }
    });
    let forget = Callback::new(move |term: String| {
        match catalog.searches().remove(&term) {
            Ok(terms) => recent.set(terms),
            Err(err) => logging::warn!("recent search removal failed: {err}"),
        }
    });

    CatalogSearch {
        results: Signal::derive(move || pages.with(|pages| pages.items().to_vec())),
        loading: loading.into(),
        error: error.into(),
        has_more: Signal::derive(move || pages.with(PageAccumulator::has_more)),
        load_more,
        submit,
        forget,
        recent: recent.into(),
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use catalog_api::{CatalogConfig, MemoryTransport, TransportResponse};
    use catalog_state::Registration;
    use platform_host::MemoryOrigin;
    use platform_host_web::HostStorage;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::CatalogContext;

    fn page_of(titles: &[(u64, &str)], total_pages: u32) -> TransportResponse {
        let results: Vec<String> = titles
            .iter()
            .map(|(id, title)| format!(r#"{{"id":{id},"title":"{title}"}}"#))
            .collect();
        TransportResponse::ok(format!(
            r#"{{"page":1,"results":[{}],"total_pages":{total_pages},"total_results":{}}}"#,
            results.join(","),
            titles.len()
        ))
    }

    fn signed_in_context(transport: &MemoryTransport) -> CatalogContext {
        let context = CatalogContext::new(
            HostStorage::memory(MemoryOrigin::default().open_tab()),
            CatalogConfig::default(),
            Rc::new(transport.clone()),
        );
        context
            .register(&Registration {
                email: "a@b.io".into(),
                password: "key-123".into(),
                confirm_password: "key-123".into(),
                terms_accepted: true,
            })
            .expect("register");
        context.sign_in("a@b.io", "key-123", true).expect("sign in");
        provide_context(context);
        context
    }

    fn titles(search: &CatalogSearch) -> Vec<String> {
        search
            .results
            .get_untracked()
            .into_iter()
            .map(|movie| movie.title)
            .collect()
    }

    #[test]
    fn changed_input_drops_responses_for_earlier_input() {
        let runtime = create_runtime();
        let gate = store_value(RequestGate::default());
        let loading = create_rw_signal(true);

        let bat = gate.with_value(RequestGate::begin);
        let cat = supersede(gate, loading);

        assert!(!bat.is_current());
        assert!(cat.is_current());
        assert!(!loading.get_untracked());
        runtime.dispose();
    }

    #[test]
    fn blank_input_shows_popular_then_text_searches_latest_term() {
        let runtime = create_runtime();
        let transport = MemoryTransport::default();
        transport.respond("/movie/popular", page_of(&[(1, "Popular")], 1));
        transport.respond("/search/movie", page_of(&[(2, "Batman")], 1));
        transport.respond("/search/movie", page_of(&[(3, "Cats")], 1));
        signed_in_context(&transport);

        let text = create_rw_signal(String::new());
        let filters = create_rw_signal(DiscoverFilters::default());
        let search = use_catalog_search(text.into(), filters.into());
        assert_eq!(titles(&search), vec!["Popular"]);

        text.set("bat".into());
        text.set("cat".into());

        assert_eq!(titles(&search), vec!["Cats"]);
        assert!(!search.loading.get_untracked());
        assert_eq!(search.error.get_untracked(), None);
        let queries: Vec<String> = transport
            .requests()
            .iter()
            .filter_map(|request| request.param("query").map(str::to_string))
            .collect();
        assert_eq!(queries, vec!["bat", "cat"]);
        runtime.dispose();
    }

    #[test]
    fn load_more_appends_the_next_page() {
        let runtime = create_runtime();
        let transport = MemoryTransport::default();
        transport.respond("/movie/popular", page_of(&[(1, "First")], 2));
        transport.respond(
            "/movie/popular",
            TransportResponse::ok(
                r#"{"page":2,"results":[{"id":2,"title":"Second"}],"total_pages":2,"total_results":2}"#,
            ),
        );
        signed_in_context(&transport);

        let text = create_rw_signal(String::new());
        let filters = create_rw_signal(DiscoverFilters::default());
        let search = use_catalog_search(text.into(), filters.into());
        assert!(search.has_more.get_untracked());

        search.load_more.call(());

        assert_eq!(titles(&search), vec!["First", "Second"]);
        assert!(!search.has_more.get_untracked());
        runtime.dispose();
    }

    #[test]
    fn signed_out_search_reports_missing_key() {
        let runtime = create_runtime();
        provide_context(CatalogContext::new(
            HostStorage::memory(MemoryOrigin::default().open_tab()),
            CatalogConfig::default(),
            Rc::new(MemoryTransport::default()),
        ));

        let text = create_rw_signal(String::from("bat"));
        let filters = create_rw_signal(DiscoverFilters::default());
        let search = use_catalog_search(text.into(), filters.into());

        assert_eq!(
            search.error.get_untracked(),
            Some(CatalogError::MissingApiKey.user_message())
        );
        assert!(search.results.get_untracked().is_empty());
        runtime.dispose();
    }
}
