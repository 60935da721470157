//! Rate-limit accounting from `X-RateLimit-*` response headers

use chrono::{DateTime, Utc};

use crate::transport::HttpResponse;

/// The counter triple carried by the most recent response that had one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitState {
    /// Maximum requests allowed per window.
    pub limit: u32,
    /// Requests remaining in the current window.
    pub remaining: u32,
    /// When the window resets.
    pub reset_at: DateTime<Utc>,
}

impl RateLimitState {
    /// Extract the triple from a response. All three headers must be
    /// present and parseable, otherwise the previous state stands.
    pub fn from_response(response: &HttpResponse) -> Option<Self> {
        let limit = response.header("x-ratelimit-limit")?.parse().ok()?;
        let remaining = response.header("x-ratelimit-remaining")?.parse().ok()?;
        let reset_epoch: i64 = response.header("x-ratelimit-reset")?.parse().ok()?;
        let reset_at = DateTime::from_timestamp(reset_epoch, 0)?;
        Some(Self {
            limit,
            remaining,
            reset_at,
        })
    }

    /// Seconds until the window resets, measured from `now`. A reset time
    /// already in the past reports zero.
    pub fn seconds_until_reset(&self, now: DateTime<Utc>) -> i64 {
        (self.reset_at - now).num_seconds().max(0)
    }
}
