//! Blob download, raw-host and API modes
//!
//! Raw mode fetches file bytes straight from the raw-content host and is
//! the default. API mode follows the entry's blob URL and decodes the
//! base64 `content` field; the API host's anonymous rate limit makes it a
//! poor choice for bulk downloads, so it is opt-in.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::error::Result;
use crate::fetch::decode_checked;
use crate::reporef::RepoRef;
use crate::session::Mirror;
use crate::tree::TreeEntry;

/// The blob download primitive bound into each walk's hook context.
pub trait BlobFetch {
    fn fetch_blob(&self, entry: &TreeEntry, repo: &RepoRef, branch: &str) -> Result<Vec<u8>>;
}

impl Mirror {
    /// Raw-content URL of one file at a branch.
    pub fn raw_file_url(&self, repo: &RepoRef, branch: &str, path: &str) -> String {
        format!("{}/{}/{}/{}", self.raw_base(), repo.pair(), branch, path)
    }

    /// Download file bytes from the raw-content host. Never cached.
    pub fn download_raw(&self, repo: &RepoRef, branch: &str, path: &str) -> Result<Vec<u8>> {
        let url = self.raw_file_url(repo, branch, path);
        let payload = self.api().fetch_fresh(&url)?;
        if !payload.is_success() {
            return Err(mirror_api::Error::api(
                payload.status,
                format!("download failed for {url}"),
            )
            .into());
        }
        Ok(payload.body)
    }

    /// Download file bytes via an API blob URL. Never cached.
    pub fn download_api(&self, blob_url: &str) -> Result<Vec<u8>> {
        let payload = self.api().fetch_fresh(blob_url)?;
        let value = decode_checked(&payload)?;
        let content = value
            .get("content")
            .and_then(|c| c.as_str())
            .ok_or_else(|| {
                mirror_api::Error::api(payload.status, "blob response missing content")
            })?;
        // the API wraps base64 bodies in newlines
        let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
        BASE64
            .decode(compact.as_bytes())
            .map_err(|e| {
                mirror_api::Error::api(payload.status, format!("invalid base64 content: {e}"))
                    .into()
            })
    }
}

impl BlobFetch for Mirror {
    fn fetch_blob(&self, entry: &TreeEntry, repo: &RepoRef, branch: &str) -> Result<Vec<u8>> {
        if self.raw_download() {
            return self.download_raw(repo, branch, &entry.path);
        }
        match &entry.url {
            Some(url) => self.download_api(url),
            None => self.download_raw(repo, branch, &entry.path),
        }
    }
}
