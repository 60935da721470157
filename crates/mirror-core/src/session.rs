//! The mirror session: one value per logical sync operation
//!
//! Caches, rate-limit counters, metadata tables, and defaults are fields
//! of this value rather than ambient globals, so independent sessions run
//! concurrently without interference.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use mirror_api::{ApiClient, ReqwestTransport, Transport};

use crate::error::Result;
use crate::fetch::{RepoInfo, RepoSummary};
use crate::reporef::{self, Defaults, RepoRef};

/// Public API host for the mirrored source.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";
/// Raw-content host, preferred for file downloads (the API host has a far
/// tighter rate limit for anonymous use).
pub const DEFAULT_RAW_BASE: &str = "https://raw.githubusercontent.com";

const USER_AGENT: &str = concat!("tree-mirror/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Session construction parameters.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Default `"user/repo"` reference for operations that omit one.
    pub reference: Option<String>,
    /// Default branch; when unset the remote's default branch is resolved.
    pub branch: Option<String>,
    /// Default local root for walks.
    pub local_root: Option<PathBuf>,
    /// Response cache directory; `None` disables caching.
    pub cache_dir: Option<PathBuf>,
    /// Time-to-live for cached responses.
    pub ttl: Duration,
    pub api_base: String,
    pub raw_base: String,
    /// Download blobs from the raw host (true) or via API blob URLs.
    pub raw_download: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reference: None,
            branch: None,
            local_root: None,
            cache_dir: None,
            ttl: Duration::from_secs(3600),
            api_base: DEFAULT_API_BASE.to_string(),
            raw_base: DEFAULT_RAW_BASE.to_string(),
            raw_download: true,
        }
    }
}

/// A mirror session. See the crate docs for the walk/fetch entry points
/// implemented in the sibling modules.
pub struct Mirror {
    api: ApiClient,
    ttl: Duration,
    api_base: String,
    raw_base: String,
    raw_download: bool,
    local_root: Option<PathBuf>,
    defaults: Defaults,
    repo_info: Mutex<HashMap<String, RepoInfo>>,
    user_repos: Mutex<HashMap<String, BTreeMap<String, RepoSummary>>>,
}

impl Mirror {
    /// Create a session over an explicit transport (tests pass a mock).
    pub fn new(config: SessionConfig, transport: Box<dyn Transport>) -> Self {
        let (user, repo) = config
            .reference
            .as_deref()
            .map(reporef::split_pair)
            .unwrap_or((None, None));
        let defaults = Defaults {
            user,
            repo,
            branch: config.branch,
        };

        Self {
            api: ApiClient::new(transport, config.cache_dir),
            ttl: config.ttl,
            api_base: config.api_base,
            raw_base: config.raw_base,
            raw_download: config.raw_download,
            local_root: config.local_root,
            defaults,
            repo_info: Mutex::new(HashMap::new()),
            user_repos: Mutex::new(HashMap::new()),
        }
    }

    /// Create a session over the real HTTP transport.
    pub fn connect(config: SessionConfig, token: Option<String>) -> Result<Self> {
        let transport = ReqwestTransport::new(USER_AGENT, token, DEFAULT_TIMEOUT)?;
        Ok(Self::new(config, Box::new(transport)))
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn raw_base(&self) -> &str {
        &self.raw_base
    }

    pub fn raw_download(&self) -> bool {
        self.raw_download
    }

    pub fn local_root(&self) -> Option<&PathBuf> {
        self.local_root.as_ref()
    }

    pub(crate) fn repo_info_table(&self) -> MutexGuard<'_, HashMap<String, RepoInfo>> {
        self.repo_info
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn user_repos_table(
        &self,
    ) -> MutexGuard<'_, HashMap<String, BTreeMap<String, RepoSummary>>> {
        self.user_repos
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Resolve a `"user/repo"` reference against session defaults.
    pub fn resolve_ref(&self, reference: Option<&str>) -> Result<RepoRef> {
        reporef::resolve_ref(reference, &self.defaults)
    }

    /// Resolve just the user field against session defaults.
    pub fn resolve_user(&self, reference: Option<&str>) -> Result<String> {
        reporef::resolve_user(reference, &self.defaults)
    }

    /// Canonical `"user/repo"` string from explicit or defaulted parts.
    pub fn bind(&self, user: Option<&str>, repo: Option<&str>) -> Result<String> {
        reporef::bind(user, repo, &self.defaults)
    }
}
