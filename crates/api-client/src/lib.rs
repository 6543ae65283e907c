//! Authenticated HTTP API client with transparent token refresh
//!
//! Wraps `reqwest` with a base URL, a default `Authorization: Bearer` header,
//! and an interceptor that recovers from expired access tokens: the failing
//! request triggers a single refresh call, concurrent failures queue behind
//! it, and every queued request is replayed once the new token is installed.
//! Unrecoverable failures sign the user out through the application-supplied
//! `SessionController` hook.
//!
//! Request lifecycle:
//! 1. `ApiClient::execute` sends with the current Bearer token
//! 2. `intercept::classify_response` maps failures into the `ApiError`
//!    taxonomy
//! 3. expired-token errors enter `refresh::RefreshCoordinator` (single
//!    flight, queued waiters)
//! 4. on success the original request is replayed with the refreshed token;
//!    on failure every queued request rejects and sign-out runs once

pub mod client;
pub mod config;
pub mod error;
pub mod intercept;
pub mod request;

mod refresh;

pub use client::{ApiClient, SessionController};
pub use config::ClientConfig;
pub use error::{ApiError, Result};
pub use request::ApiRequest;

// Collaborator types, re-exported so apps only need this crate.
pub use session_auth::{AuthTokens, FileTokenStore, MemoryTokenStore, SignInResponse, TokenStore};
