//! Hook dispatch: named extension points invoked per classified entry
//!
//! One slot per non-fatal outcome, each with a fixed signature; unbound
//! slots are no-ops. Three canned policies cover the common cases, and
//! custom hooks compose the same bound side-effect primitives the canned
//! ones use.

use std::fs;
use std::io;
use std::path::Path;

use crate::download::BlobFetch;
use crate::error::{Error, Result};
use crate::fsio;
use crate::reporef::RepoRef;
use crate::tree::TreeEntry;
use crate::walk::WalkOutcome;

/// Immutable context handed to a hook for one entry.
pub struct HookContext<'a> {
    pub outcome: WalkOutcome,
    /// The entry's full path under the walk's local root.
    pub local_path: &'a Path,
    pub entry: &'a TreeEntry,
    pub repo: &'a RepoRef,
    pub branch: &'a str,
    /// The side-effect primitives bound for this walk.
    pub effects: &'a EffectSet,
    /// The blob download primitive bound for this walk.
    pub fetch: &'a dyn BlobFetch,
}

/// The closed set of extension points. Default bodies are no-ops, so an
/// implementor overrides only the outcomes it cares about.
pub trait WalkHooks {
    fn on_match(&self, _ctx: &HookContext<'_>) -> Result<()> {
        Ok(())
    }

    fn on_differs(&self, _ctx: &HookContext<'_>) -> Result<()> {
        Ok(())
    }

    fn on_missing(&self, _ctx: &HookContext<'_>) -> Result<()> {
        Ok(())
    }

    fn on_dir_present(&self, _ctx: &HookContext<'_>) -> Result<()> {
        Ok(())
    }

    fn on_dir_missing(&self, _ctx: &HookContext<'_>) -> Result<()> {
        Ok(())
    }
}

/// The three side-effect primitives a walk binds: directory creation,
/// file writing, and conflict resolution.
pub struct EffectSet {
    /// Create a directory with parents; must tolerate "already exists".
    pub create_dir: Box<dyn Fn(&Path) -> io::Result<()> + Send + Sync>,
    /// Write a file's full content.
    pub write_file: Box<dyn Fn(&Path, &[u8]) -> io::Result<()> + Send + Sync>,
    /// Called on a conflicted file before any rewrite. Returns whether the
    /// caller should proceed to rewrite.
    pub resolve_conflict: Box<dyn Fn(&Path) -> io::Result<bool> + Send + Sync>,
}

impl Default for EffectSet {
    fn default() -> Self {
        Self {
            create_dir: Box::new(fsio::ensure_dir),
            write_file: Box::new(fsio::write_atomic),
            resolve_conflict: Box::new(|_| Ok(false)),
        }
    }
}

impl EffectSet {
    /// Conflict resolution that deletes the local file and reports
    /// proceed: overwrite is "delete, then treat as missing".
    pub fn overwriting() -> Self {
        Self {
            resolve_conflict: Box::new(|path| {
                fs::remove_file(path)?;
                Ok(true)
            }),
            ..Self::default()
        }
    }
}

/// Canned walk policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Classify and count only; no local side effects.
    ReadOnly,
    /// Materialize missing files and directories; conflicts are reported,
    /// not resolved.
    Write,
    /// As `Write`, plus conflicted files are deleted and re-downloaded.
    WriteOverwrite,
}

impl Policy {
    pub fn hooks(self) -> StandardHooks {
        StandardHooks { policy: self }
    }

    /// The effect set matching this policy.
    pub fn effects(self) -> EffectSet {
        match self {
            Policy::WriteOverwrite => EffectSet::overwriting(),
            _ => EffectSet::default(),
        }
    }
}

/// Hook implementation for the canned policies.
pub struct StandardHooks {
    policy: Policy,
}

impl WalkHooks for StandardHooks {
    fn on_missing(&self, ctx: &HookContext<'_>) -> Result<()> {
        if self.policy == Policy::ReadOnly {
            return Ok(());
        }
        write_from_remote(ctx)
    }

    fn on_dir_missing(&self, ctx: &HookContext<'_>) -> Result<()> {
        if self.policy == Policy::ReadOnly {
            return Ok(());
        }
        (ctx.effects.create_dir)(ctx.local_path)
            .map_err(|e| Error::local_io(ctx.local_path, e))
    }

    fn on_differs(&self, ctx: &HookContext<'_>) -> Result<()> {
        if self.policy != Policy::WriteOverwrite {
            return Ok(());
        }
        let proceed = (ctx.effects.resolve_conflict)(ctx.local_path)
            .map_err(|e| Error::local_io(ctx.local_path, e))?;
        if proceed {
            write_from_remote(ctx)
        } else {
            Ok(())
        }
    }
}

/// Download the entry's blob and write it at the context path, creating
/// parent directories first. Listing order never guarantees that a `tree`
/// entry for an ancestor was visited before its files.
pub fn write_from_remote(ctx: &HookContext<'_>) -> Result<()> {
    if let Some(parent) = ctx.local_path.parent() {
        (ctx.effects.create_dir)(parent).map_err(|e| Error::local_io(parent, e))?;
    }
    let bytes = ctx.fetch.fetch_blob(ctx.entry, ctx.repo, ctx.branch)?;
    (ctx.effects.write_file)(ctx.local_path, &bytes)
        .map_err(|e| Error::local_io(ctx.local_path, e))
}
