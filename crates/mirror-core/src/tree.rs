//! The remote tree snapshot: wire types and validating decode
//!
//! A snapshot is the recursive flat listing of one repository ref, fetched
//! in a single call. Entries are immutable once decoded; the walker never
//! mutates them.

use serde::Deserialize;

use crate::error::{Error, Result};

/// Git mode convention: `100644` regular file, `100755` executable,
/// `120000` symbolic link. Entries at or above this value are never
/// content-compared.
pub const MODE_SYMLINK: u32 = 120_000;

/// One node of the remote snapshot.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TreeEntry {
    /// Posix-separated path, relative to the repository root.
    pub path: String,
    /// `"blob"` for files, `"tree"` for directories. Anything else is a
    /// protocol violation the walker aborts on.
    #[serde(rename = "type")]
    pub kind: String,
    /// Git mode as the decimal string the wire carries.
    pub mode: String,
    /// Byte length; blobs only.
    #[serde(default)]
    pub size: Option<u64>,
    /// Content hash (40 hex chars); blobs only.
    #[serde(default)]
    pub sha: Option<String>,
    /// API blob URL, used by the API download mode.
    #[serde(default)]
    pub url: Option<String>,
}

impl TreeEntry {
    pub fn is_blob(&self) -> bool {
        self.kind == "blob"
    }

    pub fn is_tree(&self) -> bool {
        self.kind == "tree"
    }

    /// Decimal value of the mode string; an unparseable mode reads as 0.
    pub fn mode_value(&self) -> u32 {
        self.mode.trim().parse().unwrap_or(0)
    }

    pub fn is_symlink(&self) -> bool {
        self.mode_value() >= MODE_SYMLINK
    }
}

/// The decoded snapshot of one ref.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeSnapshot {
    /// Tree identity. Its absence on the wire means the ref was not found.
    pub sha: String,
    #[serde(default)]
    pub url: Option<String>,
    pub tree: Vec<TreeEntry>,
    #[serde(default)]
    pub truncated: bool,
}

/// Validating decode of a `git/trees` response body.
///
/// A `message` field is an API-level error carrying the server's own
/// wording; a missing `sha` means the ref/branch does not exist and is
/// reported as not-found, never as a parse failure.
pub fn decode_snapshot(
    body: &[u8],
    status: u16,
    reference: &str,
    branch: &str,
) -> Result<TreeSnapshot> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| mirror_api::Error::api(status, format!("undecodable response: {e}")))?;

    if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
        return Err(mirror_api::Error::api(status, message).into());
    }
    if value.get("sha").and_then(|s| s.as_str()).is_none() {
        return Err(Error::NotFound {
            reference: reference.to_string(),
            branch: branch.to_string(),
        });
    }

    serde_json::from_value(value)
        .map_err(|e| mirror_api::Error::api(status, format!("malformed tree listing: {e}")).into())
}
