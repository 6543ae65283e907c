//! Client configuration
//!
//! Loadable from a TOML file or constructed programmatically. The token file
//! path is optional: when absent the app supplies its own `TokenStore`
//! (typically in-memory).

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ApiError;

/// API client settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the API, e.g. `https://api.example.com`
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Where `FileTokenStore` persists the credential pair
    #[serde(default)]
    pub token_file: Option<PathBuf>,
}

fn default_timeout() -> u64 {
    60
}

impl ClientConfig {
    /// Programmatic constructor with default timeout and no token file.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: default_timeout(),
            token_file: None,
        }
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ApiError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ApiError::Transport(format!("reading config {}: {e}", path.display())))?;
        let config: ClientConfig = toml::from_str(&contents)
            .map_err(|e| ApiError::Transport(format!("parsing config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate URL scheme and timeout.
    pub fn validate(&self) -> Result<(), ApiError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ApiError::Transport(format!(
                "base_url must start with http:// or https://, got: {}",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ApiError::Transport(
                "timeout_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}
