//! Traced HTTP client for cross-service calls.
//!
//! Wraps `reqwest::Client`, opening an `outgoing_http` span per call that
//! records method, URL, status, and elapsed time, and carrying the inbound
//! request id onto the outgoing headers when one is in scope.

use std::time::Instant;
use tracing::{field::Empty, Instrument};

use crate::request_id;

#[derive(Clone)]
pub struct TracedClient {
    inner: reqwest::Client,
}

impl TracedClient {
    /// Create a new TracedClient wrapping the provided reqwest::Client
    pub fn new(inner: reqwest::Client) -> Self {
        Self { inner }
    }

    /// Execute a built reqwest::Request inside an `outgoing_http` span.
    pub async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        let url = req.url().clone();
        let method = req.method().clone();

        let span = tracing::info_span!(
            "outgoing_http",
            http.method = %method,
            http.url = %url,
            http.status_code = Empty,
            elapsed_ms = Empty,
            error = Empty,
        );

        // Forward the inbound request id so the callee's logs line up with ours.
        let req = {
            let mut req = req.try_clone().unwrap_or(req);
            if let Some(rid) = request_id::current_request_id() {
                if let Ok(value) = rid.parse() {
                    req.headers_mut().insert(request_id::header(), value);
                }
            }
            req
        };

        let started = Instant::now();
        let result = self.inner.execute(req).instrument(span.clone()).await;

        span.record("elapsed_ms", started.elapsed().as_millis() as u64);
        match &result {
            Ok(response) => {
                span.record("http.status_code", response.status().as_u16());
                if response.status().is_client_error() || response.status().is_server_error() {
                    span.record("error", true);
                }
            }
            Err(_) => {
                span.record("error", true);
            }
        }

        result
    }

    /// Convenience method for GET requests
    pub async fn get(&self, url: &str) -> reqwest::Result<reqwest::Response> {
        let req = self.inner.get(url).build()?;
        self.execute(req).await
    }

    /// Convenience method for POST requests
    pub async fn post(&self, url: &str) -> reqwest::Result<reqwest::Response> {
        let req = self.inner.post(url).build()?;
        self.execute(req).await
    }

    /// Convenience method for DELETE requests
    pub async fn delete(&self, url: &str) -> reqwest::Result<reqwest::Response> {
        let req = self.inner.delete(url).build()?;
        self.execute(req).await
    }

    /// Get a reference to the underlying reqwest::Client for advanced usage
    pub fn inner(&self) -> &reqwest::Client {
        &self.inner
    }

    /// Create a request builder for the given method and URL
    pub fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.inner.request(method, url)
    }
}

impl From<reqwest::Client> for TracedClient {
    fn from(c: reqwest::Client) -> Self {
        Self::new(c)
    }
}

impl Default for TracedClient {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}
