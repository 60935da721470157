//! HTTP-facing leaf layer for tree-mirror
//!
//! Provides the pieces the core reconciliation walker consumes without
//! caring how they are implemented:
//!
//! - **Transport**: a GET-with-headers primitive behind a trait, so tests
//!   substitute a canned transport for the real reqwest client
//! - **Response cache**: one file per URL on disk, keyed by a hash of the
//!   URL, with mtime-based TTL freshness
//! - **Rate-limit accounting**: the `X-RateLimit-*` counter triple from the
//!   most recent network round trip
//! - **Pagination**: `Link`-header parsing for cursor-style page listings

pub mod cache;
pub mod client;
pub mod error;
pub mod pagination;
pub mod rate_limit;
pub mod transport;

pub use cache::ResponseCache;
pub use client::{ApiClient, Payload};
pub use error::{Error, Result};
pub use pagination::{PageLinks, PaginationState, parse_link_header};
pub use rate_limit::RateLimitState;
pub use transport::{HttpResponse, ReqwestTransport, Transport};
