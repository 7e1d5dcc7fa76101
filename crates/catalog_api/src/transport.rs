//! HTTP transport seam for the catalog client.

use std::{
    cell::RefCell,
    collections::{HashMap, VecDeque},
    future::Future,
    pin::Pin,
    rc::Rc,
    time::Duration,
};

use crate::CatalogError;

/// Object-safe boxed future used by [`CatalogTransport`].
///
/// Not `Send`: browser fetch futures are tied to the page's event loop.
pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Raw HTTP response handed back to the client for status mapping and decoding.
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body text.
    pub body: String,
}

impl TransportResponse {
    /// `200 OK` with `body`.
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }
}

/// Sends GET requests for the catalog client.
pub trait CatalogTransport {
    /// Issues `GET url?query`. Non-success statuses are returned as responses, not errors; only
    /// failures to obtain a response are errors.
    fn get<'a>(
        &'a self,
        url: &'a str,
        query: &'a [(String, String)],
        timeout: Duration,
    ) -> TransportFuture<'a, Result<TransportResponse, CatalogError>>;
}

impl<T: CatalogTransport + ?Sized> CatalogTransport for Rc<T> {
    fn get<'a>(
        &'a self,
        url: &'a str,
        query: &'a [(String, String)],
        timeout: Duration,
    ) -> TransportFuture<'a, Result<TransportResponse, CatalogError>> {
        (**self).get(url, query, timeout)
    }
}

#[derive(Debug, Clone, Default)]
/// `reqwest`-backed transport (browser fetch on wasm32, hyper on native targets).
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Transport over an existing `reqwest` client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn map_reqwest_error(err: reqwest::Error) -> CatalogError {
    if err.is_timeout() {
        CatalogError::Timeout
    } else {
        CatalogError::Network(err.to_string())
    }
}

impl CatalogTransport for ReqwestTransport {
    fn get<'a>(
        &'a self,
        url: &'a str,
        query: &'a [(String, String)],
        timeout: Duration,
    ) -> TransportFuture<'a, Result<TransportResponse, CatalogError>> {
        Box::pin(async move {
            let request = self.client.get(url).query(query);
            // The fetch backend has no per-request timeout; the browser's own limits apply there.
            #[cfg(not(target_arch = "wasm32"))]
            let request = request.timeout(timeout);
            #[cfg(target_arch = "wasm32")]
            let _ = timeout;

            let response = request.send().await.map_err(map_reqwest_error)?;
            let status = response.status().as_u16();
            let body = response.text().await.map_err(map_reqwest_error)?;
            Ok(TransportResponse { status, body })
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request observed by [`MemoryTransport`].
pub struct RecordedRequest {
    /// Absolute URL without the query string.
    pub url: String,
    /// Query parameters in send order.
    pub query: Vec<(String, String)>,
}

impl RecordedRequest {
    /// Value of the first query parameter named `key`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Default)]
struct MemoryTransportState {
    routes: HashMap<String, VecDeque<Result<TransportResponse, CatalogError>>>,
    requests: Vec<RecordedRequest>,
}

#[derive(Debug, Clone, Default)]
/// Scripted transport for tests and offline runs.
///
/// Responses are keyed by endpoint path (e.g. `/movie/popular`). Several responses queued for one
/// path are served in order, and the last one keeps being served. Unscripted paths answer `404`.
pub struct MemoryTransport {
    inner: Rc<RefCell<MemoryTransportState>>,
}

impl MemoryTransport {
    /// Queues a response for `path`.
    pub fn respond(&self, path: &str, response: TransportResponse) {
        self.push(path, Ok(response));
    }

    /// Queues a `200` JSON response for `path`.
    pub fn respond_json(&self, path: &str, body: &serde_json::Value) {
        self.respond(path, TransportResponse::ok(body.to_string()));
    }

    /// Queues a transport failure for `path`.
    pub fn fail(&self, path: &str, error: CatalogError) {
        self.push(path, Err(error));
    }

    /// Requests sent so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.inner.borrow().requests.clone()
    }

    fn push(&self, path: &str, outcome: Result<TransportResponse, CatalogError>) {
        self.inner
            .borrow_mut()
            .routes
            .entry(path.to_string())
            .or_default()
            .push_back(outcome);
    }

    fn next_outcome(&self, url: &str) -> Result<TransportResponse, CatalogError> {
        let mut state = self.inner.borrow_mut();
        let Some((_, queue)) = state
            .routes
            .iter_mut()
            .filter(|(path, _)| url.ends_with(path.as_str()))
            .max_by_key(|(path, _)| path.len())
        else {
            return Ok(TransportResponse {
                status: 404,
                body: r#"{"status_code":34,"status_message":"The resource you requested could not be found."}"#
                    .to_string(),
            });
        };
        if queue.len() > 1 {
            queue.pop_front().unwrap_or_else(|| Err(CatalogError::NotFound))
        } else {
            queue.front().cloned().unwrap_or_else(|| Err(CatalogError::NotFound))
        }
    }
}

impl CatalogTransport for MemoryTransport {
    fn get<'a>(
        &'a self,
        url: &'a str,
        query: &'a [(String, String)],
        _timeout: Duration,
    ) -> TransportFuture<'a, Result<TransportResponse, CatalogError>> {
        Box::pin(async move {
            self.inner.borrow_mut().requests.push(RecordedRequest {
                url: url.to_string(),
                query: query.to_vec(),
            });
            self.next_outcome(url)
        })
    }
}
