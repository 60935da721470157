//! Disk-backed response cache, one file per URL
//!
//! Entries are named by a SHA-1 hash of the URL so filenames stay bounded,
//! the file contents are the raw response body, and the file's mtime is the
//! freshness timestamp. There is no separate metadata file.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use fs2::FileExt;
use sha1::{Digest, Sha1};
use tracing::debug;

use crate::error::{Error, Result};

/// Stable cache filename for a URL: SHA-1 hex of the URL bytes.
pub fn cache_key(url: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(url.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Freshness rule: an entry written at `fetched_at` is stale once
/// `now - fetched_at >= ttl`.
pub fn is_fresh(fetched_at: SystemTime, now: SystemTime, ttl: Duration) -> bool {
    match now.duration_since(fetched_at) {
        Ok(age) => age < ttl,
        // mtime ahead of the clock counts as just-written
        Err(_) => true,
    }
}

/// Cache directory handle.
pub struct ResponseCache {
    dir: PathBuf,
}

impl ResponseCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the entry file for a URL, whether or not it exists.
    pub fn entry_path(&self, url: &str) -> PathBuf {
        self.dir.join(cache_key(url))
    }

    /// Return the stored body for `url` if the entry exists and is still
    /// fresh under `ttl`. An unreadable entry counts as a miss.
    pub fn lookup(&self, url: &str, ttl: Duration) -> Option<Vec<u8>> {
        let path = self.entry_path(url);
        let modified = fs::metadata(&path).and_then(|m| m.modified()).ok()?;
        if !is_fresh(modified, SystemTime::now(), ttl) {
            debug!(url, "cache entry stale");
            return None;
        }
        match fs::read(&path) {
            Ok(body) => {
                debug!(url, "cache hit");
                Some(body)
            }
            Err(e) => {
                debug!(url, error = %e, "cache entry unreadable, treating as miss");
                None
            }
        }
    }

    /// Overwrite the entry for `url` with `body`.
    ///
    /// Uses write-to-temp-then-rename under an advisory lock so readers
    /// never observe a partial body.
    pub fn store(&self, url: &str, body: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| Error::io(&self.dir, e))?;

        let path = self.entry_path(url);
        let temp_path = temp_sibling(&path);

        let mut temp_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| Error::io(&temp_path, e))?;

        temp_file
            .lock_exclusive()
            .map_err(|e| Error::io(&temp_path, e))?;
        temp_file
            .write_all(body)
            .map_err(|e| Error::io(&temp_path, e))?;
        temp_file
            .sync_all()
            .map_err(|e| Error::io(&temp_path, e))?;
        let _ = temp_file.unlock();

        fs::rename(&temp_path, &path).map_err(|e| Error::io(&path, e))?;
        Ok(())
    }

    /// Drop the entry for one URL. Missing entries are not an error.
    pub fn invalidate(&self, url: &str) -> Result<()> {
        let path = self.entry_path(url);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io(&path, e)),
        }
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    path.with_file_name(temp_name)
}
