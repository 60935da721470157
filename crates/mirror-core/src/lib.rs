//! Core reconciliation layer for tree-mirror
//!
//! Reconciles a local file tree against a remote repository's tree
//! snapshot, classifying every remote entry against local state and
//! dispatching pluggable side effects through named hooks:
//!
//! - **RepoRef resolver**: `"user/repo"` parsing with session defaults
//! - **Fetchers**: repository info, default branch, user listings (paged),
//!   branch heads, and the recursive tree snapshot
//! - **Walker**: the per-entry classification state machine and statistics
//! - **Hooks**: one extension point per outcome, three canned policies
//!
//! # Architecture
//!
//! ```text
//!        mirror-cli
//!            |
//!       mirror-core      resolver -> fetchers -> walker -> hooks
//!            |
//!        mirror-api      transport + cache + rate-limit/pagination
//! ```
//!
//! # Example
//!
//! ```ignore
//! use mirror_core::{Mirror, Policy, SessionConfig, WalkOptions};
//!
//! let session = Mirror::connect(SessionConfig::default(), None)?;
//! let report = session.walk(
//!     &Policy::ReadOnly.hooks(),
//!     &Policy::ReadOnly.effects(),
//!     &WalkOptions {
//!         reference: Some("octocat/hello-world".into()),
//!         local_root: Some("/tmp/hello-world".into()),
//!         ..WalkOptions::default()
//!     },
//! )?;
//! println!("{} in sync", report.stats.matched);
//! ```

pub mod blob;
pub mod download;
pub mod error;
pub mod fetch;
pub mod fsio;
pub mod hooks;
pub mod reporef;
pub mod session;
pub mod tree;
pub mod walk;

pub use download::BlobFetch;
pub use error::{Error, Result};
pub use fetch::{BranchRef, RepoInfo, RepoSummary};
pub use hooks::{EffectSet, HookContext, Policy, StandardHooks, WalkHooks};
pub use reporef::{Defaults, RepoRef};
pub use session::{Mirror, SessionConfig};
pub use tree::{TreeEntry, TreeSnapshot};
pub use walk::{EntryError, WalkOptions, WalkOutcome, WalkReport, WalkStats};
