//! Error types for mirror-core

use std::path::PathBuf;

/// Result type for mirror-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in mirror-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required field has neither an explicit value nor a session default
    #[error("git {field} is undefined and no default is configured")]
    Configuration { field: &'static str },

    /// The ref/branch/repository does not exist on the remote
    #[error("not found: '{reference}' (branch '{branch}')")]
    NotFound { reference: String, branch: String },

    /// The snapshot carried an entry type this protocol does not define.
    /// Fatal: aborts the walk in progress.
    #[error("unknown tree entry type '{kind}' at '{path}'")]
    UnknownEntryType { kind: String, path: String },

    /// The snapshot carried a path that would resolve outside the local
    /// root. Fatal, same class as an unknown entry type.
    #[error("tree entry path '{path}' escapes the local root")]
    PathEscape { path: String },

    /// Directory or file write failure inside a hook; local to one entry
    #[error("local I/O failed at {path}: {source}")]
    LocalIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Transport, API, or cache failure from the HTTP layer
    #[error(transparent)]
    Api(#[from] mirror_api::Error),
}

impl Error {
    pub fn local_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::LocalIo {
            path: path.into(),
            source,
        }
    }
}
