//! The GET-with-headers primitive everything else is built on

use std::collections::HashMap;
use std::time::Duration;

use crate::error::{Error, Result};

/// A single HTTP response: status code, raw body, and response headers.
///
/// Header names are stored lowercase, so lookups are case-insensitive.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: u16,
    body: Vec<u8>,
    headers: HashMap<String, String>,
}

impl HttpResponse {
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self {
            status,
            body,
            headers: HashMap::new(),
        }
    }

    /// Attach a response header (builder style, mostly for tests).
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// Look up a response header by name, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking GET with request headers.
///
/// Non-2xx statuses are returned as data, not errors: the API reports its
/// failures as JSON `message` bodies, which must reach the validating
/// decode step downstream. Only a network-level failure is an `Err`.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str, headers: &[(String, String)]) -> Result<HttpResponse>;
}

/// Transport backed by a blocking reqwest client.
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
    user_agent: String,
    token: Option<String>,
}

impl ReqwestTransport {
    /// Create a transport with the given user agent, optional bearer token,
    /// and request timeout.
    pub fn new(user_agent: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::transport("<client setup>", e))?;
        Ok(Self {
            client,
            user_agent: user_agent.to_string(),
            token,
        })
    }
}

impl Transport for ReqwestTransport {
    fn get(&self, url: &str, headers: &[(String, String)]) -> Result<HttpResponse> {
        let mut request = self
            .client
            .get(url)
            .header("User-Agent", &self.user_agent)
            .header("Accept", "application/vnd.github+json");

        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }
        for (name, value) in headers {
            request = request.header(name, value);
        }

        let response = request.send().map_err(|e| Error::transport(url, e))?;

        let status = response.status().as_u16();
        let mut collected = HttpResponse::new(status, Vec::new());
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                collected = collected.with_header(name.as_str(), value);
            }
        }
        let body = response.bytes().map_err(|e| Error::transport(url, e))?;
        collected.body = body.to_vec();

        Ok(collected)
    }
}
