//! Metadata and tree fetchers
//!
//! Each operation wraps one cacheable request, validates the decoded
//! response shape at the boundary, and populates the session's in-memory
//! tables keyed by normalized user/repo.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use mirror_api::Payload;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::reporef::RepoRef;
use crate::session::Mirror;
use crate::tree::{self, TreeSnapshot};

/// Listing page size for paged endpoints.
pub const PER_PAGE: u32 = 100;

/// Repository metadata, the field subset this tool cares about.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoInfo {
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub watchers: u64,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pushed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub language: Option<String>,
    pub default_branch: String,
}

/// One row of a user's repository listing.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoSummary {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub language: Option<String>,
    pub default_branch: String,
}

/// One entry of the `git/refs/heads/` listing.
#[derive(Debug, Clone, Deserialize)]
pub struct BranchRef {
    /// Fully qualified ref, e.g. `refs/heads/main`.
    #[serde(rename = "ref")]
    pub name: String,
    pub object: BranchObject,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BranchObject {
    pub sha: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl BranchRef {
    /// The branch name without the `refs/heads/` prefix.
    pub fn short_name(&self) -> &str {
        self.name
            .strip_prefix("refs/heads/")
            .unwrap_or(&self.name)
    }
}

/// Decode a payload to JSON, treating a `message` field as an API-level
/// error carrying the server's wording.
pub(crate) fn decode_checked(payload: &Payload) -> Result<serde_json::Value> {
    let value: serde_json::Value = serde_json::from_slice(&payload.body)
        .map_err(|e| mirror_api::Error::api(payload.status, format!("undecodable response: {e}")))?;
    if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
        return Err(mirror_api::Error::api(payload.status, message).into());
    }
    Ok(value)
}

impl Mirror {
    /// Fetch repository metadata, consulting the session table first.
    pub fn repository_info(&self, reference: Option<&str>) -> Result<RepoInfo> {
        let repo = self.resolve_ref(reference)?;
        if let Some(info) = self.repo_info_table().get(&repo.key()) {
            return Ok(info.clone());
        }

        let url = format!("{}/repos/{}", self.api_base(), repo.pair());
        let payload = self.api().fetch_cached(&url, self.ttl())?;
        let value = decode_checked(&payload)?;
        let info: RepoInfo = serde_json::from_value(value).map_err(|e| {
            mirror_api::Error::api(payload.status, format!("malformed repository info: {e}"))
        })?;

        self.repo_info_table().insert(repo.key(), info.clone());
        Ok(info)
    }

    /// Resolve the branch to operate on.
    ///
    /// Resolution order: a fetched user-repository listing (a repo absent
    /// from its user's fetched list is not-found), then the repository-info
    /// table, then the session default branch, then a repository-info
    /// fetch.
    pub fn default_branch(&self, reference: Option<&str>) -> Result<String> {
        let repo = self.resolve_ref(reference)?;

        if let Some(repos) = self.user_repos_table().get(&repo.user.to_lowercase()) {
            return match repos.get(&repo.repo.to_lowercase()) {
                Some(summary) => Ok(summary.default_branch.clone()),
                None => Err(Error::NotFound {
                    reference: repo.pair(),
                    branch: "default".to_string(),
                }),
            };
        }

        if let Some(info) = self.repo_info_table().get(&repo.key()) {
            return Ok(info.default_branch.clone());
        }

        if let Some(branch) = &self.defaults().branch {
            return Ok(branch.clone());
        }

        Ok(self.repository_info(Some(&repo.pair()))?.default_branch)
    }

    /// Fetch a user's repository listing.
    ///
    /// With `page = None`, pages through the whole listing: the total page
    /// count comes from the Link header when the response was a real round
    /// trip, with the short-page heuristic as fallback. A caller-given
    /// page fetches exactly that page. The full listing populates the
    /// session table.
    pub fn user_repositories(
        &self,
        user: Option<&str>,
        page: Option<u32>,
    ) -> Result<Vec<RepoSummary>> {
        let user = self.resolve_user(user)?;
        let user_low = user.to_lowercase();

        if page.is_none()
            && let Some(cached) = self.user_repos_table().get(&user_low)
        {
            return Ok(cached.values().cloned().collect());
        }

        let mut all = Vec::new();
        let mut current = page.unwrap_or(1);
        let mut total_pages: Option<u32> = None;

        loop {
            let url = format!(
                "{}/users/{}/repos?per_page={}&page={}",
                self.api_base(),
                user,
                PER_PAGE,
                current
            );
            let payload = self.api().fetch_cached(&url, self.ttl())?;
            let value = decode_checked(&payload)?;
            let repos: Vec<RepoSummary> = serde_json::from_value(value).map_err(|e| {
                mirror_api::Error::api(
                    payload.status,
                    format!("malformed repository listing: {e}"),
                )
            })?;
            let count = repos.len();
            all.extend(repos);

            if page.is_some() {
                break;
            }
            // pagination hints only describe this listing when the page
            // came over the network
            if total_pages.is_none() && !payload.from_cache {
                total_pages = self.api().page_links().total_pages();
            }
            match total_pages {
                Some(total) if current < total => current += 1,
                Some(_) => break,
                None if count < PER_PAGE as usize => break,
                None => current += 1,
            }
        }

        debug!(user = %user, repos = all.len(), "fetched repository listing");

        if page.is_none() {
            let table: BTreeMap<String, RepoSummary> = all
                .iter()
                .map(|r| (r.name.to_lowercase(), r.clone()))
                .collect();
            self.user_repos_table().insert(user_low, table);
        }
        Ok(all)
    }

    /// Fetch the recursive tree snapshot of a ref.
    pub fn tree_snapshot(
        &self,
        reference: Option<&str>,
        branch: Option<&str>,
    ) -> Result<TreeSnapshot> {
        let repo = self.resolve_ref(reference)?;
        let branch = match branch {
            Some(b) => b.to_string(),
            None => self.default_branch(Some(&repo.pair()))?,
        };

        let url = self.tree_url(&repo, &branch);
        let payload = self.api().fetch_cached(&url, self.ttl())?;
        tree::decode_snapshot(&payload.body, payload.status, &repo.pair(), &branch)
    }

    /// Fetch the branch heads of a repository.
    pub fn branches(&self, reference: Option<&str>) -> Result<Vec<BranchRef>> {
        let repo = self.resolve_ref(reference)?;
        let url = format!(
            "{}/repos/{}/git/refs/heads/",
            self.api_base(),
            repo.pair()
        );
        let payload = self.api().fetch_cached(&url, self.ttl())?;
        let value = decode_checked(&payload)?;
        serde_json::from_value(value).map_err(|e| {
            mirror_api::Error::api(payload.status, format!("malformed branch listing: {e}")).into()
        })
    }

    pub(crate) fn tree_url(&self, repo: &RepoRef, branch: &str) -> String {
        format!(
            "{}/repos/{}/git/trees/{}?recursive=1",
            self.api_base(),
            repo.pair(),
            branch
        )
    }
}
