//! Cache-or-network fetch orchestration
//!
//! Every outbound request funnels through [`ApiClient`]: it consults the
//! disk cache for requests the caller marks cacheable, and refreshes the
//! session's rate-limit counters and pagination hints on every real
//! network round trip (never on a cache hit).

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::debug;

use crate::cache::ResponseCache;
use crate::error::Result;
use crate::pagination::{PageLinks, parse_link_header};
use crate::rate_limit::RateLimitState;
use crate::transport::{HttpResponse, Transport};

/// A fetched payload: status plus raw body. Cache hits replay a previously
/// successful body, report status 200, and are flagged so callers know the
/// session's rate-limit/pagination accounting was not refreshed by them.
#[derive(Debug, Clone)]
pub struct Payload {
    pub status: u16,
    pub body: Vec<u8>,
    pub from_cache: bool,
}

impl Payload {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport plus cache plus per-round-trip header accounting.
pub struct ApiClient {
    transport: Box<dyn Transport>,
    cache: Option<ResponseCache>,
    rate: Mutex<Option<RateLimitState>>,
    pages: Mutex<PageLinks>,
    // serializes the read-check-write sequence per URL so two callers
    // cannot race to populate the same cache entry
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ApiClient {
    /// Create a client. `cache_dir = None` disables caching entirely;
    /// every fetch then goes to the transport.
    pub fn new(transport: Box<dyn Transport>, cache_dir: Option<PathBuf>) -> Self {
        Self {
            transport,
            cache: cache_dir.map(ResponseCache::new),
            rate: Mutex::new(None),
            pages: Mutex::new(PageLinks::default()),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache.is_some()
    }

    /// Fetch `url`, serving from the cache when a stored entry is younger
    /// than `ttl`. On a real round trip, a successful body overwrites the
    /// cache entry; a transport failure propagates and never touches it.
    pub fn fetch_cached(&self, url: &str, ttl: Duration) -> Result<Payload> {
        let Some(cache) = &self.cache else {
            let response = self.round_trip(url)?;
            return Ok(Payload {
                status: response.status(),
                body: response.into_body(),
                from_cache: false,
            });
        };

        let lock = self.url_lock(url);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(body) = cache.lookup(url, ttl) {
            return Ok(Payload {
                status: 200,
                body,
                from_cache: true,
            });
        }

        debug!(url, "cache miss, fetching");
        let response = self.round_trip(url)?;
        if response.is_success() {
            cache.store(url, response.body())?;
        }
        Ok(Payload {
            status: response.status(),
            body: response.into_body(),
            from_cache: false,
        })
    }

    /// Fetch `url` without consulting or updating the cache. Header
    /// accounting still happens: this is a real round trip.
    pub fn fetch_fresh(&self, url: &str) -> Result<Payload> {
        let response = self.round_trip(url)?;
        Ok(Payload {
            status: response.status(),
            body: response.into_body(),
            from_cache: false,
        })
    }

    /// Drop the cached entry for one URL, forcing the next `fetch_cached`
    /// back to the network. A no-op when caching is disabled.
    pub fn invalidate(&self, url: &str) -> Result<()> {
        match &self.cache {
            Some(cache) => cache.invalidate(url),
            None => Ok(()),
        }
    }

    /// Rate-limit counters from the most recent real round trip.
    pub fn rate_limit(&self) -> Option<RateLimitState> {
        *self.rate.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pagination hints from the most recent real round trip.
    pub fn page_links(&self) -> PageLinks {
        *self.pages.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn round_trip(&self, url: &str) -> Result<HttpResponse> {
        let response = self.transport.get(url, &[])?;

        if let Some(state) = RateLimitState::from_response(&response) {
            *self.rate.lock().unwrap_or_else(PoisonError::into_inner) = Some(state);
        }
        // pagination hints are cleared when the response carries no Link
        // header, so stale hints never outlive the request they came from
        let links = response
            .header("link")
            .map(parse_link_header)
            .unwrap_or_default();
        *self.pages.lock().unwrap_or_else(PoisonError::into_inner) = links;

        Ok(response)
    }

    fn url_lock(&self, url: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(url.to_string()).or_default())
    }
}
