//! Authenticated API client
//!
//! `ApiClient` owns the transport (a `reqwest::Client` plus a late-mutable
//! default Authorization header) and wires the response interceptor to the
//! refresh coordinator. The request path:
//!
//! 1. `execute` sends the request with the current Bearer token
//! 2. a non-success response is classified by `intercept::classify_response`
//! 3. an expired-token error enters recovery: the first observer refreshes,
//!    concurrent observers park on the coordinator
//! 4. after a successful refresh the captured request is replayed with the
//!    new header; every other outcome propagates to the caller
//!
//! Unrecoverable failures (plain 401, refresh failure, missing refresh
//! token) invoke the `SessionController` hook exactly once per episode and
//! surface as `ApiError::Session`.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderValue};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use session_auth::{SignInResponse, TokenStore};

use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::intercept::classify_response;
use crate::refresh::{RefreshCoordinator, RefreshOutcome, Ticket};
use crate::request::ApiRequest;

/// Session lifecycle hook, supplied by the application.
///
/// Invoked at most once per unrecoverable failure episode; the coordinator
/// guarantees concurrent failures within one episode collapse into a single
/// call. The implementation clears app session state and navigates the user
/// to an unauthenticated view.
pub trait SessionController: Send + Sync {
    fn sign_out(&self);
}

/// Authenticated HTTP client with transparent token refresh.
///
/// Each client owns its own refresh coordinator, so independent clients
/// (e.g. in tests) recover independently.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    auth_header: RwLock<Option<HeaderValue>>,
    store: Arc<dyn TokenStore>,
    controller: Arc<dyn SessionController>,
    refresh: RefreshCoordinator,
}

impl ApiClient {
    pub fn new(
        config: ClientConfig,
        store: Arc<dyn TokenStore>,
        controller: Arc<dyn SessionController>,
    ) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::Transport(format!("building HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url,
            auth_header: RwLock::new(None),
            store,
            controller,
            refresh: RefreshCoordinator::new(),
        })
    }

    /// Restore a persisted session: install the stored access token as the
    /// default header. Returns whether a session was found.
    pub async fn load_session(&self) -> Result<bool> {
        match self.store_get().await? {
            Some(tokens) => {
                self.install_access_token(&tokens.token).await?;
                debug!("restored persisted session");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Sign in with email/password, persist the returned pair, and install
    /// the access token for subsequent requests.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SignInResponse> {
        let response = session_auth::sign_in(&self.http, &self.base_url, email, password)
            .await
            .map_err(auth_call_error)?;

        let tokens = response.tokens();
        self.store
            .save(tokens.clone())
            .await
            .map_err(|e| ApiError::Transport(format!("persisting tokens: {e}")))?;
        self.install_access_token(&tokens.token).await?;
        info!("signed in");
        Ok(response)
    }

    /// Drop the default header and clear the persisted pair. Called by the
    /// application's own sign-out flow; does not invoke the controller hook.
    pub async fn clear_session(&self) -> Result<()> {
        *self.auth_header.write().await = None;
        self.store
            .clear()
            .await
            .map_err(|e| ApiError::Transport(format!("clearing tokens: {e}")))?;
        info!("session cleared");
        Ok(())
    }

    /// The access token currently attached to outgoing requests.
    pub async fn access_token(&self) -> Option<String> {
        self.auth_header
            .read()
            .await
            .as_ref()
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(String::from)
    }

    /// Send a request, transparently recovering from an expired access
    /// token.
    ///
    /// Expired-token errors are absorbed: the request either resolves after
    /// a replay with the refreshed token, or fails with `ApiError::Session`
    /// after sign-out. Each request is replayed at most once; if the replay
    /// fails with another expired-token error the new token is being
    /// rejected too, and the session is terminated instead of looping.
    pub async fn execute(&self, request: ApiRequest) -> Result<reqwest::Response> {
        let mut replayed = false;
        loop {
            let err = match self.send_once(&request).await {
                Ok(response) => return Ok(response),
                Err(err) => err,
            };

            match err {
                ApiError::ExpiredToken(_) if !replayed => {
                    debug!(path = %request.path, "expired token, entering recovery");
                    self.recover().await?;
                    replayed = true;
                }
                ApiError::ExpiredToken(message) => {
                    warn!(path = %request.path, "replay rejected with expired token");
                    return Err(self.sign_out_with(ApiError::Session(message)).await);
                }
                ApiError::Session(_) => {
                    return Err(self.sign_out_with(err).await);
                }
                other => return Err(other),
            }
        }
    }

    /// `execute` + JSON-decode the response body.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.fetch(ApiRequest::get(path)).await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T> {
        self.fetch(ApiRequest::post(path).json(body)).await
    }

    async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let response = self.execute(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Transport(format!("decoding response: {e}")))
    }

    /// One send attempt: current default header, fresh body serialization.
    async fn send_once(&self, request: &ApiRequest) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self
            .http
            .request(request.method.clone(), &url)
            .headers(request.headers.clone());

        if let Some(auth) = self.auth_header.read().await.clone() {
            builder = builder.header(AUTHORIZATION, auth);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(format!("{} {url}: {e}", request.method)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));
        Err(classify_response(status.as_u16(), &body))
    }

    /// Enter recovery for an expired token.
    ///
    /// The leader performs the refresh and settles the episode on every
    /// path; waiters just await the shared outcome. Sign-out for a failed
    /// episode happens exactly once, on the leader.
    async fn recover(&self) -> Result<()> {
        match self.refresh.begin() {
            Ticket::Waiter(rx) => match rx.await {
                Ok(Ok(_token)) => Ok(()),
                Ok(Err(err)) => Err(err),
                // Settling sends before dropping senders, so this arm only
                // fires if the coordinator itself went away
                Err(_) => Err(ApiError::Session("refresh episode abandoned".into())),
            },
            // The guard settles on every path, including an aborted leader
            Ticket::Leader(leader) => {
                let outcome = self.run_refresh().await;
                leader.settle(&outcome);
                match outcome {
                    Ok(_token) => Ok(()),
                    Err(err) => Err(self.sign_out_with(err).await),
                }
            }
        }
    }

    /// The refresh call itself: read the stored refresh token, hit the
    /// refresh endpoint, persist the new pair, install the new header.
    ///
    /// Any failure here is unrecoverable for the session. A missing stored
    /// pair short-circuits without a network call.
    async fn run_refresh(&self) -> RefreshOutcome {
        let Some(tokens) = self.store_get().await? else {
            info!("no refresh token stored, cannot recover session");
            return Err(ApiError::Session("no refresh token available".into()));
        };

        let pair =
            session_auth::refresh_session(&self.http, &self.base_url, &tokens.refresh_token)
                .await
                .map_err(|e| ApiError::Session(format!("token refresh failed: {e}")))?;

        self.store
            .save(pair.clone())
            .await
            .map_err(|e| ApiError::Session(format!("persisting refreshed tokens: {e}")))?;
        self.install_access_token(&pair.token).await?;
        info!("access token refreshed");
        Ok(pair.token)
    }

    async fn store_get(&self) -> Result<Option<session_auth::AuthTokens>> {
        self.store
            .get()
            .await
            .map_err(|e| ApiError::Session(format!("token store: {e}")))
    }

    async fn install_access_token(&self, token: &str) -> Result<()> {
        let value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| ApiError::Session(format!("access token not header-safe: {e}")))?;
        *self.auth_header.write().await = Some(value);
        Ok(())
    }

    /// Terminate the session: drop the default header, clear the persisted
    /// pair, invoke the sign-out hook once, and hand the error back for
    /// propagation.
    async fn sign_out_with(&self, err: ApiError) -> ApiError {
        *self.auth_header.write().await = None;
        if let Err(clear_err) = self.store.clear().await {
            warn!(error = %clear_err, "failed to clear stored tokens");
        }
        warn!(error = %err, "session unrecoverable, signing out");
        self.controller.sign_out();
        err
    }
}

/// Map auth endpoint errors for the sign-in path: server-rejected
/// credentials and structured server errors surface as domain errors with
/// the server's message; unstructured failures stay transport errors.
fn auth_call_error(err: session_auth::Error) -> ApiError {
    match err {
        session_auth::Error::InvalidCredentials(message) => ApiError::Domain { message },
        session_auth::Error::Api {
            message,
            structured: true,
            ..
        } => ApiError::Domain { message },
        session_auth::Error::Api {
            status, message, ..
        } => ApiError::Transport(format!("HTTP {status}: {message}")),
        other => ApiError::Transport(other.to_string()),
    }
}
