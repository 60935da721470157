//! Git blob content identity
//!
//! A blob is identified by `sha1("blob " + decimal(len) + NUL + bytes)`,
//! the content-addressing function of the system being mirrored. Local
//! files are hashed with the same function so sameness is decided without
//! transferring content.

use std::fs;
use std::path::Path;

use sha1::{Digest, Sha1};

/// Content hash of a byte buffer, lowercase hex.
pub fn blob_sha1(bytes: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(b"blob ");
    hasher.update(bytes.len().to_string().as_bytes());
    hasher.update([0u8]);
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Compare a local file against a remote blob's (size, hash) identity.
/// The byte length gates the hash: a length mismatch is already a
/// mismatch. Unreadable files never match.
pub fn file_matches(path: &Path, size: u64, sha: &str) -> bool {
    let Ok(content) = fs::read(path) else {
        return false;
    };
    if content.len() as u64 != size {
        return false;
    }
    blob_sha1(&content).eq_ignore_ascii_case(sha)
}
