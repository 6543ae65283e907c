//! Error taxonomy for API requests
//!
//! Every failed request settles into one of four categories:
//! - `Domain`: the server answered with a structured `{"message"}` body;
//!   surfaced to the caller with that message.
//! - `Transport`: no structured payload (network failure, timeout, opaque
//!   5xx); surfaced as-is.
//! - `ExpiredToken`: 401 with `token.expired`/`token.invalid`. Internal to
//!   the client — always absorbed by the refresh coordinator and converted
//!   into either a successful replay or a `Session` error.
//! - `Session`: unrecoverable (plain 401, refresh failure, missing refresh
//!   token). Always preceded by exactly one sign-out.
//!
//! Variants carry owned strings and derive `Clone` so a single refresh
//! failure can be delivered to every caller queued on that episode.

/// Classified error for an API request.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// Structured server error; the message is the server's own.
    #[error("{message}")]
    Domain { message: String },

    /// Request never produced a structured server response.
    #[error("transport error: {0}")]
    Transport(String),

    /// Access token expired or invalid; recoverable via refresh.
    /// Never returned by `ApiClient::execute`.
    #[error("access token expired: {0}")]
    ExpiredToken(String),

    /// Session is unrecoverable; the user has been signed out.
    #[error("session terminated: {0}")]
    Session(String),
}

/// Result alias for client operations.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_display_is_bare_server_message() {
        let err = ApiError::Domain {
            message: "Exercício já registrado.".into(),
        };
        assert_eq!(err.to_string(), "Exercício já registrado.");
    }

    #[test]
    fn errors_clone_for_queued_waiters() {
        let err = ApiError::Session("refresh failed".into());
        let clone = err.clone();
        assert_eq!(err.to_string(), clone.to_string());
    }
}
