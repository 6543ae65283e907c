//! The credential pair

use serde::{Deserialize, Serialize};

/// An access/refresh token pair.
///
/// Both tokens are always present together: a pair missing either half is
/// never constructed or stored, so "absent" is modeled as `Option<AuthTokens>`
/// at the store level rather than optional fields here.
///
/// Field names match the wire format of the session endpoints (`token`,
/// `refresh_token`), so the refresh response deserializes directly into this
/// type.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthTokens {
    /// Short-lived access token (Bearer token for API calls)
    pub token: String,
    /// Longer-lived token used solely to obtain a new access token
    pub refresh_token: String,
}

// Token values never appear in Debug output or logs.
impl std::fmt::Debug for AuthTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthTokens")
            .field("token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}
