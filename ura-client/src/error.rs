//! Client error types.

use crate::wire::DecodeError;

/// Result alias for client operations.
pub type Result<T> = std::result::Result<T, UraError>;

/// Errors from the URA client and stream reader.
#[derive(Debug, thiserror::Error)]
pub enum UraError {
    /// A line could not be decoded into a record.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Connection, timeout or body read failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// `open()` was called on a reader that is already open.
    #[error("reader already opened")]
    AlreadyOpen,

    /// Invalid base URL or path, or the HTTP client could not be built.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The background read task panicked.
    #[error("read task failed: {0}")]
    TaskFailed(String),
}

impl UraError {
    /// Returns true for errors caused by the transport rather than the data.
    pub fn is_transport(&self) -> bool {
        matches!(self, UraError::Transport(_) | UraError::Api { .. })
    }
}
