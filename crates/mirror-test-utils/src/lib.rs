//! Shared test helpers for tree-mirror crates
//!
//! The centerpiece is [`MockTransport`]: an exact-match URL router that
//! stands in for the network, counts round trips, and can simulate
//! network failure for specific URLs.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use mirror_api::{Error, HttpResponse, Result, Transport};

/// A canned transport: URL -> response, with a shared round-trip counter.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<String, HttpResponse>>,
    failing: Mutex<Vec<String>>,
    calls: Arc<AtomicUsize>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a response for an exact URL (builder style).
    pub fn route(self, url: &str, response: HttpResponse) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), response);
        self
    }

    /// Make requests to an exact URL fail at the network level.
    pub fn fail(self, url: &str) -> Self {
        self.failing.lock().unwrap().push(url.to_string());
        self
    }

    /// Replace or add a route after construction.
    pub fn set_route(&self, url: &str, response: HttpResponse) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), response);
    }

    /// Number of round trips the transport has served (including failures).
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Counter handle that stays readable after the transport is boxed.
    pub fn calls_handle(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl Transport for MockTransport {
    fn get(&self, url: &str, _headers: &[(String, String)]) -> Result<HttpResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.failing.lock().unwrap().iter().any(|u| u == url) {
            return Err(Error::transport(url, "simulated network failure"));
        }
        match self.routes.lock().unwrap().get(url) {
            Some(response) => Ok(response.clone()),
            None => Err(Error::transport(url, "no route configured")),
        }
    }
}

/// A 200 response whose body is the given JSON value.
pub fn json_response(value: serde_json::Value) -> HttpResponse {
    HttpResponse::new(200, value.to_string().into_bytes())
}

/// A response with an arbitrary status and JSON body.
pub fn json_response_with_status(status: u16, value: serde_json::Value) -> HttpResponse {
    HttpResponse::new(status, value.to_string().into_bytes())
}
