//! Session endpoint calls
//!
//! Handles the two auth endpoint interactions:
//! 1. Sign-in (email/password exchange for an initial token pair)
//! 2. Token refresh (exchange a refresh token for a new pair)
//!
//! Both operations POST JSON to the session routes under the caller-supplied
//! base URL. Error bodies are the backend's `{"message": "..."}` shape; a 401
//! from either endpoint means the credentials were rejected.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::tokens::AuthTokens;

/// Path of the sign-in endpoint, relative to the base URL.
pub const SIGN_IN_PATH: &str = "/sessions";

/// Path of the token refresh endpoint, relative to the base URL.
pub const REFRESH_PATH: &str = "/sessions/refresh-token";

/// Response from the sign-in endpoint.
///
/// `user` is carried opaquely — the client never inspects it, the app layer
/// does.
#[derive(Debug, Deserialize, Serialize)]
pub struct SignInResponse {
    pub token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub user: serde_json::Value,
}

impl SignInResponse {
    /// The credential pair contained in this response.
    pub fn tokens(&self) -> AuthTokens {
        AuthTokens {
            token: self.token.clone(),
            refresh_token: self.refresh_token.clone(),
        }
    }
}

/// Exchange email/password for an initial token pair.
pub async fn sign_in(
    client: &reqwest::Client,
    base_url: &str,
    email: &str,
    password: &str,
) -> Result<SignInResponse> {
    let response = client
        .post(format!("{base_url}{SIGN_IN_PATH}"))
        .json(&serde_json::json!({ "email": email, "password": password }))
        .send()
        .await
        .map_err(|e| Error::Http(format!("sign-in request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(endpoint_error(status.as_u16(), read_body(response).await));
    }

    response
        .json::<SignInResponse>()
        .await
        .map_err(|e| Error::TokenParse(format!("invalid sign-in response: {e}")))
}

/// Refresh an access token using a refresh token.
///
/// Called by the client's refresh coordinator when a request fails with an
/// expired-token error. Exactly one of these calls is made per expiry
/// episode; the coordinator enforces that, not this function.
pub async fn refresh_session(
    client: &reqwest::Client,
    base_url: &str,
    refresh_token: &str,
) -> Result<AuthTokens> {
    let response = client
        .post(format!("{base_url}{REFRESH_PATH}"))
        .json(&serde_json::json!({ "refresh_token": refresh_token }))
        .send()
        .await
        .map_err(|e| Error::Http(format!("token refresh request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(endpoint_error(status.as_u16(), read_body(response).await));
    }

    response
        .json::<AuthTokens>()
        .await
        .map_err(|e| Error::TokenParse(format!("invalid refresh response: {e}")))
}

/// Read an error response body, tolerating read failures.
async fn read_body(response: reqwest::Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|_| String::from("<no body>"))
}

/// Map a non-success auth endpoint response to an error.
///
/// 401 means the submitted credentials (password or refresh token) were
/// rejected. The server message is extracted from the `{"message"}` body when
/// present, otherwise the raw body is carried.
fn endpoint_error(status: u16, body: String) -> Error {
    let structured = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from));

    if status == 401 {
        return Error::InvalidCredentials(structured.unwrap_or(body));
    }
    match structured {
        Some(message) => Error::Api {
            status,
            message,
            structured: true,
        },
        None => Error::Api {
            status,
            message: body,
            structured: false,
        },
    }
}
