//! Session authentication library
//!
//! Provides the credential pair type, persistent token storage, and the two
//! auth endpoint calls (sign-in and refresh) for the API client. This crate
//! is a standalone library with no dependency on the client crate — it can
//! be tested and used independently.
//!
//! Credential flow:
//! 1. App calls `session::sign_in()` with email/password
//! 2. Returned pair stored via `store::TokenStore::save()`
//! 3. Client attaches `Authorization: Bearer <token>` to every request
//! 4. On token expiry the client calls `session::refresh_session()`
//! 5. Updated pair saved via `store::TokenStore::save()`
//! 6. On unrecoverable failure the app calls `store::TokenStore::clear()`

pub mod error;
pub mod session;
pub mod store;
pub mod tokens;

pub use error::{Error, Result};
pub use session::{SignInResponse, refresh_session, sign_in};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use tokens::AuthTokens;
