//! Token persistence
//!
//! The store holds at most one credential pair. All file writes use atomic
//! temp-file + rename to prevent corruption on crash, and a tokio Mutex
//! serializes concurrent writers (refresh coordinator vs. sign-in/sign-out).
//!
//! The store is the single source of truth for token data: the client reads
//! the refresh token from here at recovery time rather than caching it.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::tokens::AuthTokens;

/// Abstraction over credential pair persistence.
///
/// The pair is stored and removed atomically — there is never a state with
/// only one of the two tokens present.
///
/// Uses `Pin<Box<dyn Future>>` return types for dyn-compatibility
/// (`Arc<dyn TokenStore>`).
pub trait TokenStore: Send + Sync {
    /// The stored pair, or `None` if no session is persisted.
    fn get(&self) -> Pin<Box<dyn Future<Output = Result<Option<AuthTokens>>> + Send + '_>>;

    /// Store a pair, replacing any previous one.
    fn save(&self, tokens: AuthTokens) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Remove the stored pair, if any.
    fn clear(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// File-backed token store.
///
/// Persists the pair as JSON at the given path. A missing file means no
/// session. Writes are atomic and the file is created with 0600 permissions
/// since it contains live credentials.
pub struct FileTokenStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    async fn read(&self) -> Result<Option<AuthTokens>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::Io(format!("reading token file: {e}")))?;
        let tokens: AuthTokens = serde_json::from_str(&contents)
            .map_err(|e| Error::TokenParse(format!("parsing token file: {e}")))?;
        Ok(Some(tokens))
    }

    async fn write(&self, tokens: &AuthTokens) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        write_atomic(&self.path, tokens).await
    }

    async fn remove(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        if self.path.exists() {
            tokio::fs::remove_file(&self.path)
                .await
                .map_err(|e| Error::Io(format!("removing token file: {e}")))?;
            info!(path = %self.path.display(), "cleared stored tokens");
        }
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Pin<Box<dyn Future<Output = Result<Option<AuthTokens>>> + Send + '_>> {
        Box::pin(self.read())
    }

    fn save(&self, tokens: AuthTokens) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move { self.write(&tokens).await })
    }

    fn clear(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(self.remove())
    }
}

/// In-memory token store for tests and ephemeral sessions.
pub struct MemoryTokenStore {
    state: Mutex<Option<AuthTokens>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(None),
        }
    }

    /// Create a store pre-populated with a pair.
    pub fn with_tokens(tokens: AuthTokens) -> Self {
        Self {
            state: Mutex::new(Some(tokens)),
        }
    }
}

impl Default for MemoryTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Pin<Box<dyn Future<Output = Result<Option<AuthTokens>>> + Send + '_>> {
        Box::pin(async { Ok(self.state.lock().await.clone()) })
    }

    fn save(&self, tokens: AuthTokens) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            *self.state.lock().await = Some(tokens);
            Ok(())
        })
    }

    fn clear(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async {
            *self.state.lock().await = None;
            Ok(())
        })
    }
}

/// Write the pair to a file atomically.
///
/// Writes to a temporary file in the same directory, then renames it over
/// the target. This prevents corruption if the process crashes mid-write.
/// Sets file permissions to 0600 (owner read/write only).
async fn write_atomic(path: &Path, tokens: &AuthTokens) -> Result<()> {
    let json = serde_json::to_string_pretty(tokens)
        .map_err(|e| Error::TokenParse(format!("serializing tokens: {e}")))?;

    let dir = path
        .parent()
        .ok_or_else(|| Error::Io("token path has no parent directory".into()))?;

    let tmp_path = dir.join(format!(".tokens.tmp.{}", std::process::id()));

    tokio::fs::write(&tmp_path, json.as_bytes())
        .await
        .map_err(|e| Error::Io(format!("writing temp token file: {e}")))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        tokio::fs::set_permissions(&tmp_path, perms)
            .await
            .map_err(|e| Error::Io(format!("setting token file permissions: {e}")))?;
    }

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| Error::Io(format!("renaming temp token file: {e}")))?;

    debug!(path = %path.display(), "persisted tokens");
    Ok(())
}
