use catalog_api::{
    home_sections, load_sections, CatalogError, CatalogQuery, MovieSummary, RequestGate,
    SectionResult,
};
use leptos::*;

use crate::use_catalog;

#[derive(Clone, Copy)]
/// Loading state of one listing row.
pub struct SectionState {
    /// First page of the row.
    pub movies: Signal<Vec<MovieSummary>>,
    /// Whether the row is loading.
    pub loading: Signal<bool>,
    /// Inline error for this row only.
    pub error: Signal<Option<String>>,
}

/// Loads the first page of `query`, reloading when the session changes.
///
/// A failure only affects this row; other rows keep loading and showing their data.
pub fn use_catalog_section(query: CatalogQuery) -> SectionState {
    let catalog = use_catalog();
    let gate = store_value(RequestGate::default());
    let movies = create_rw_signal(Vec::<MovieSummary>::new());
    let loading = create_rw_signal(false);
    let error = create_rw_signal(None::<String>);

    create_effect(move |_| {
        // Reload on sign-in and sign-out.
        let _ = catalog.session.with(Option::is_some);
        let ticket = gate.with_value(RequestGate::begin);
        let Some(client) = catalog.client() else {
            movies.set(Vec::new());
            error.set(Some(CatalogError::MissingApiKey.user_message()));
            return;
        };
        let query = query.clone();
        loading.set(true);
        spawn_local(async move {
            let Some(outcome) = ticket.settle(client.fetch(&query, 1)).await else {
                return;
            };
            loading.set(false);
            match outcome {
                Ok(page) => {
                    error.set(None);
                    movies.set(page.results);
                }
                Err(err) => {
                    logging::warn!("catalog section load failed: {err}");
                    error.set(Some(err.user_message()));
                }
            }
        });
    });
    on_cleanup(move || gate.with_value(RequestGate::invalidate));

    SectionState {
        movies: movies.into(),
        loading: loading.into(),
        error: error.into(),
    }
}

/// Loads every default home row concurrently.
///
/// Resolves to `None` until all rows settle; each row then carries its own data or error.
pub fn use_home_sections() -> Signal<Option<Vec<SectionResult>>> {
    let catalog = use_catalog();
    let gate = store_value(RequestGate::default());
    let rows = create_rw_signal(None::<Vec<SectionResult>>);

    create_effect(move |_| {
        // Reload on sign-in and sign-out.
        let _ = catalog.session.with(Option::is_some);
        let ticket = gate.with_value(RequestGate::begin);
        rows.set(None);
        let Some(client) = catalog.client() else {
            return;
        };
        spawn_local(async move {
            let sections = home_sections();
            if let Some(results) = ticket.settle(load_sections(&client, &sections)).await {
                for failed in results.iter().filter_map(|row| row.outcome.as_ref().err()) {
                    logging::warn!("home section load failed: {failed}");
                }
                rows.set(Some(results));
            }
        });
    });
    on_cleanup(move || gate.with_value(RequestGate::invalidate));

    rows.into()
}
