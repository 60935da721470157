//! `"user/repo"` reference parsing and defaulting
//!
//! A reference string splits on the first occurrence of any delimiter in a
//! fixed set, missing fields fall back to session defaults, and a field
//! that is still missing after defaulting is a configuration error naming
//! that field.

use crate::error::{Error, Result};

/// Characters accepted as the user/repo divider.
pub const DELIMITERS: &[char] = &['/', '\\', ' ', ',', ':', ';', '|', '*', '#'];

/// Session-level fallback values for omitted reference fields.
#[derive(Debug, Clone, Default)]
pub struct Defaults {
    pub user: Option<String>,
    pub repo: Option<String>,
    pub branch: Option<String>,
}

/// A resolved repository reference. Original case is preserved for
/// outbound requests; [`RepoRef::key`] lowercases for table lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub user: String,
    pub repo: String,
}

impl RepoRef {
    /// Canonical `"user/repo"` string, original case.
    pub fn pair(&self) -> String {
        format!("{}/{}", self.user, self.repo)
    }

    /// Lowercased pair, the cache/table key.
    pub fn key(&self) -> String {
        self.pair().to_lowercase()
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.user, self.repo)
    }
}

/// Split a free-form reference on the first delimiter. Either side may
/// come back empty (`None`).
pub fn split_pair(input: &str) -> (Option<String>, Option<String>) {
    match input.find(DELIMITERS) {
        Some(i) => (non_empty(&input[..i]), non_empty(&input[i + 1..])),
        None => (non_empty(input), None),
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() { None } else { Some(s.to_string()) }
}

/// Resolve a reference that requires both fields.
pub fn resolve_ref(input: Option<&str>, defaults: &Defaults) -> Result<RepoRef> {
    let (user, repo) = input.map(split_pair).unwrap_or((None, None));
    let user = user
        .or_else(|| defaults.user.clone())
        .ok_or(Error::Configuration { field: "user" })?;
    let repo = repo
        .or_else(|| defaults.repo.clone())
        .ok_or(Error::Configuration { field: "repo" })?;
    Ok(RepoRef { user, repo })
}

/// Resolve a reference that only requires the user field.
pub fn resolve_user(input: Option<&str>, defaults: &Defaults) -> Result<String> {
    let (user, _) = input.map(split_pair).unwrap_or((None, None));
    user.or_else(|| defaults.user.clone())
        .ok_or(Error::Configuration { field: "user" })
}

/// The inverse of splitting: produce the canonical `"user/repo"` string
/// from explicit or defaulted parts, under the both-required check.
pub fn bind(user: Option<&str>, repo: Option<&str>, defaults: &Defaults) -> Result<String> {
    let user = user
        .map(str::to_string)
        .or_else(|| defaults.user.clone())
        .ok_or(Error::Configuration { field: "user" })?;
    let repo = repo
        .map(str::to_string)
        .or_else(|| defaults.repo.clone())
        .ok_or(Error::Configuration { field: "repo" })?;
    Ok(format!("{user}/{repo}"))
}
