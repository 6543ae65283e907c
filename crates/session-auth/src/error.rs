//! Error types for session authentication operations

/// Errors from session authentication operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("auth endpoint returned {status}: {message}")]
    Api {
        status: u16,
        message: String,
        /// Whether `message` came from a structured `{"message"}` body or is
        /// the raw response text.
        structured: bool,
    },

    #[error("token parse error: {0}")]
    TokenParse(String),

    #[error("I/O error: {0}")]
    Io(String),
}

/// Result alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;
