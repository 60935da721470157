//! Error type for the CLI layer

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to the terminal
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] mirror_core::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
