/// Core error types for EasyPlay
use thiserror::Error;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for EasyPlay
#[derive(Error, Debug)]
pub enum CoreError {
    /// Playlist index does not exist
    #[error("Index out of bounds: {index} (playlist has {len} items)")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Imported document is not a playlist
    #[error("Invalid playlist format: {0}")]
    InvalidFormat(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
