//! Stale-response discarding for views that re-query as their inputs change.
//!
//! A view calls [`RequestGate::begin`] before each request and routes the response through the
//! returned [`RequestTicket`]. Only the most recently issued ticket may deliver, so a slow answer
//! for an older query can never overwrite the results of a newer one, whatever order responses
//! arrive in.

use std::{cell::Cell, future::Future, rc::Rc};

#[derive(Debug, Clone, Default)]
/// Generation counter shared by one view's requests.
pub struct RequestGate {
    generation: Rc<Cell<u64>>,
}

impl RequestGate {
    /// Issues a ticket for a new request, superseding every earlier ticket.
    pub fn begin(&self) -> RequestTicket {
        let generation = self.generation.get().wrapping_add(1);
        self.generation.set(generation);
        RequestTicket {
            gate: self.clone(),
            generation,
        }
    }

    /// Supersedes every outstanding ticket without issuing a new one, e.g. when the view closes.
    pub fn invalidate(&self) {
        self.generation.set(self.generation.get().wrapping_add(1));
    }
}

#[derive(Debug, Clone)]
/// Right to deliver one response, valid until a newer ticket is issued.
pub struct RequestTicket {
    gate: RequestGate,
    generation: u64,
}

impl RequestTicket {
    /// Returns `true` when no newer request has started.
    pub fn is_current(&self) -> bool {
        self.gate.generation.get() == self.generation
    }

    /// Awaits `request` and yields its output only if this ticket is still current.
    pub async fn settle<F: Future>(self, request: F) -> Option<F::Output> {
        let output = request.await;
        self.is_current().then_some(output)
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, collections::HashMap, time::Duration};

    use futures::{
        channel::oneshot,
        executor::LocalPool,
        task::LocalSpawnExt,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::{
        CatalogClient, CatalogConfig, CatalogError, CatalogQuery, CatalogTransport,
        DiscoverFilters, TransportFuture, TransportResponse,
    };

    /// Holds each search open until the test releases it.
    #[derive(Default)]
    struct GatedTransport {
        pending: RefCell<HashMap<String, oneshot::Receiver<TransportResponse>>>,
    }

    impl GatedTransport {
        fn hold(&self, text: &str) -> oneshot::Sender<TransportResponse> {
            let (sender, receiver) = oneshot::channel();
            self.pending.borrow_mut().insert(text.to_string(), receiver);
            sender
        }
    }

    impl CatalogTransport for GatedTransport {
        fn get<'a>(
            &'a self,
            _url: &'a str,
            query: &'a [(String, String)],
            _timeout: Duration,
        ) -> TransportFuture<'a, Result<TransportResponse, CatalogError>> {
            let text = query
                .iter()
                .find(|(key, _)| key == "query")
                .map(|(_, value)| value.clone())
                .unwrap_or_default();
            let receiver = self.pending.borrow_mut().remove(&text);
            Box::pin(async move {
                match receiver {
                    Some(receiver) => receiver
                        .await
                        .map_err(|_| CatalogError::Network("dropped".into())),
                    None => Err(CatalogError::NotFound),
                }
            })
        }
    }

    fn titles_response(title: &str) -> TransportResponse {
        let body = json!({
            "page": 1,
            "results": [{"id": 1, "title": title}],
            "total_pages": 1,
        });
        TransportResponse::ok(body.to_string())
    }

    fn run_typing_scenario(cat_answers_first: bool) -> Vec<String> {
        let transport = Rc::new(GatedTransport::default());
        let client = Rc::new(CatalogClient::new(
            Rc::clone(&transport),
            CatalogConfig::default(),
            "key",
        ));
        let gate = RequestGate::default();
        let shown = Rc::new(RefCell::new(Vec::new()));
        let mut pool = LocalPool::new();
        let spawner = pool.spawner();

        let bat = transport.hold("bat");
        let cat = transport.hold("cat");
        for text in ["bat", "cat"] {
            let ticket = gate.begin();
            let client = Rc::clone(&client);
            let shown = Rc::clone(&shown);
            let query = CatalogQuery::select(text, &DiscoverFilters::default());
            spawner
                .spawn_local(async move {
                    if let Some(Ok(page)) = ticket.settle(client.fetch(&query, 1)).await {
                        shown
                            .borrow_mut()
                            .extend(page.results.into_iter().map(|movie| movie.title));
                    }
                })
                .expect("spawn");
            pool.run_until_stalled();
        }

        if cat_answers_first {
            let _ = cat.send(titles_response("Cat People"));
            pool.run_until_stalled();
            let _ = bat.send(titles_response("Batman"));
        } else {
            let _ = bat.send(titles_response("Batman"));
            pool.run_until_stalled();
            let _ = cat.send(titles_response("Cat People"));
        }
        pool.run_until_stalled();

        let shown = shown.borrow().clone();
        shown
    }

    #[test]
    fn latest_query_wins_whatever_the_arrival_order() {
        assert_eq!(run_typing_scenario(true), vec!["Cat People".to_string()]);
        assert_eq!(run_typing_scenario(false), vec!["Cat People".to_string()]);
    }

    #[test]
    fn invalidate_supersedes_outstanding_tickets() {
        let gate = RequestGate::default();
        let ticket = gate.begin();
        assert!(ticket.is_current());
        gate.invalidate();
        assert!(!ticket.is_current());
        assert_eq!(futures::executor::block_on(ticket.settle(async { 5 })), None);

        let fresh = gate.begin();
        assert_eq!(futures::executor::block_on(fresh.settle(async { 6 })), Some(6));
    }
}
