//! Error types for mirror-api

use std::path::PathBuf;

/// Result type for mirror-api operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in mirror-api operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Network-level failure; the request never produced a response
    #[error("GET {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The API answered with an error payload instead of the expected shape
    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn transport(
        url: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Transport {
            url: url.into(),
            source: source.into(),
        }
    }

    pub fn api(code: u16, message: impl Into<String>) -> Self {
        Self::Api {
            code,
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
