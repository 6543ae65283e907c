//! Response classification
//!
//! Pure mapping from a (status, body) pair to the error taxonomy. The client
//! applies this to every non-success response; the side effects (refresh,
//! sign-out) live in the client, not here, so the table below is directly
//! unit-testable.
//!
//! Classification:
//! - 401 + `token.expired`/`token.invalid` message → `ExpiredToken` (recovery)
//! - 401 with any other message → `Session` (sign-out path)
//! - any other status with a structured `{"message"}` body → `Domain`
//! - any other status without one → `Transport`

use crate::error::ApiError;

/// Server messages that signal an expired or invalid access token.
///
/// These are the only 401s the refresh coordinator recovers from; any other
/// 401 terminates the session.
const EXPIRED_TOKEN_MESSAGES: &[&str] = &["token.expired", "token.invalid"];

/// Extract the `message` field from a structured error body, if present.
fn server_message(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
}

/// Classify a non-success HTTP response.
pub fn classify_response(status: u16, body: &str) -> ApiError {
    let message = server_message(body);

    if status == 401 {
        return match message {
            Some(m) if EXPIRED_TOKEN_MESSAGES.contains(&m.as_str()) => ApiError::ExpiredToken(m),
            Some(m) => ApiError::Session(m),
            None => ApiError::Session(format!("unauthorized: {body}")),
        };
    }

    match message {
        Some(m) => ApiError::Domain { message: m },
        None => ApiError::Transport(format!("HTTP {status}: {body}")),
    }
}
