//! The reconciliation walker
//!
//! One bounded pass over a tree snapshot. Each entry is classified
//! against local state, counted, and dispatched to the hook bound to its
//! outcome. There is no cross-entry state beyond the running statistics:
//! a per-entry hook failure is recorded and the walk continues, while an
//! unknown entry type or an escaping path aborts the whole walk.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::blob;
use crate::error::{Error, Result};
use crate::hooks::{EffectSet, HookContext, WalkHooks};
use crate::session::Mirror;
use crate::tree::{MODE_SYMLINK, TreeEntry};

/// Per-entry classification result. Produced exactly once per entry per
/// walk pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WalkOutcome {
    /// Local file matches the remote blob's size and content hash.
    Match,
    /// Local file exists but differs (including every symlink entry).
    Differs,
    /// Remote blob has no local file.
    MissingLocally,
    /// Remote directory exists locally.
    DirPresent,
    /// Remote directory is absent locally.
    DirMissing,
}

/// Counters reset at the start of each walk and mutated only by it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkStats {
    pub matched: u64,
    pub missing_or_new: u64,
    pub conflicts: u64,
}

/// A hook failure local to one entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryError {
    pub path: String,
    pub message: String,
}

/// Result of a completed (non-aborted) walk. An aborted walk returns
/// `Err` instead, so partial counters can never be mistaken for a
/// completed pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkReport {
    pub stats: WalkStats,
    /// Hook failures, one per affected entry.
    pub entry_errors: Vec<EntryError>,
    /// Seconds until the rate-limit window resets, when the last response
    /// carried the counters.
    pub rate_limit_reset_secs: Option<i64>,
}

/// Per-walk parameters; unset fields fall back to session defaults.
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    pub reference: Option<String>,
    pub branch: Option<String>,
    pub local_root: Option<PathBuf>,
}

/// Map a posix snapshot path under the local root. Empty, `.`, and `..`
/// segments are protocol violations.
pub(crate) fn local_path_for(root: &Path, posix_path: &str) -> Result<PathBuf> {
    let mut path = root.to_path_buf();
    for segment in posix_path.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            return Err(Error::PathEscape {
                path: posix_path.to_string(),
            });
        }
        path.push(segment);
    }
    Ok(path)
}

/// Classify one entry against the local filesystem.
pub fn classify(entry: &TreeEntry, local_path: &Path) -> Result<WalkOutcome> {
    if entry.is_blob() {
        if !local_path.is_file() {
            return Ok(WalkOutcome::MissingLocally);
        }
        // symlinks and above are never content-compared
        let comparable = entry.mode_value() < MODE_SYMLINK;
        let matches = comparable
            && entry
                .size
                .zip(entry.sha.as_deref())
                .map(|(size, sha)| blob::file_matches(local_path, size, sha))
                .unwrap_or(false);
        Ok(if matches {
            WalkOutcome::Match
        } else {
            WalkOutcome::Differs
        })
    } else if entry.is_tree() {
        Ok(if local_path.is_dir() {
            WalkOutcome::DirPresent
        } else {
            WalkOutcome::DirMissing
        })
    } else {
        Err(Error::UnknownEntryType {
            kind: entry.kind.clone(),
            path: entry.path.clone(),
        })
    }
}

impl Mirror {
    /// Walk the remote snapshot against local state, dispatching `hooks`
    /// with `effects` bound, in listing order.
    ///
    /// Fetch failures abort before any entry is visited; an unknown entry
    /// type or escaping path aborts mid-walk with no statistics salvage;
    /// hook failures are local to their entry and land in the report.
    pub fn walk(
        &self,
        hooks: &dyn WalkHooks,
        effects: &EffectSet,
        options: &WalkOptions,
    ) -> Result<WalkReport> {
        let repo = self.resolve_ref(options.reference.as_deref())?;
        let branch = match &options.branch {
            Some(branch) => branch.clone(),
            None => self.default_branch(Some(&repo.pair()))?,
        };
        let root = options
            .local_root
            .clone()
            .or_else(|| self.local_root().cloned())
            .ok_or(Error::Configuration {
                field: "local path",
            })?;

        let snapshot = self.tree_snapshot(Some(&repo.pair()), Some(&branch))?;
        debug!(repo = %repo, %branch, entries = snapshot.tree.len(), "walking snapshot");

        let mut stats = WalkStats::default();
        let mut entry_errors = Vec::new();

        for entry in &snapshot.tree {
            let local_path = local_path_for(&root, &entry.path)?;
            let outcome = classify(entry, &local_path)?;

            match outcome {
                WalkOutcome::Match | WalkOutcome::DirPresent => stats.matched += 1,
                WalkOutcome::MissingLocally | WalkOutcome::DirMissing => {
                    stats.missing_or_new += 1
                }
                WalkOutcome::Differs => stats.conflicts += 1,
            }

            let ctx = HookContext {
                outcome,
                local_path: &local_path,
                entry,
                repo: &repo,
                branch: &branch,
                effects,
                fetch: self,
            };
            let hook_result = match outcome {
                WalkOutcome::Match => hooks.on_match(&ctx),
                WalkOutcome::Differs => hooks.on_differs(&ctx),
                WalkOutcome::MissingLocally => hooks.on_missing(&ctx),
                WalkOutcome::DirPresent => hooks.on_dir_present(&ctx),
                WalkOutcome::DirMissing => hooks.on_dir_missing(&ctx),
            };
            if let Err(e) = hook_result {
                warn!(path = %entry.path, error = %e, "hook failed, continuing walk");
                entry_errors.push(EntryError {
                    path: entry.path.clone(),
                    message: e.to_string(),
                });
            }
        }

        let rate_limit_reset_secs = self
            .api()
            .rate_limit()
            .map(|state| state.seconds_until_reset(Utc::now()));

        Ok(WalkReport {
            stats,
            entry_errors,
            rate_limit_reset_secs,
        })
    }
}
