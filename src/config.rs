use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::http::DEFAULT_TIMEOUT_SECS;

// Default configuration values
const DEFAULT_ORIGIN: &str = "http://127.0.0.1:8050";
const DEFAULT_STORAGE_PATH: &str = "console.storage.json";

/// Configuration for the console shell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Origin of the backend; request paths are appended to it
    #[serde(default = "default_origin")]
    pub origin: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// File holding the persisted local keys
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,
    /// Initial system color-scheme preference
    #[serde(default = "default_prefers_dark")]
    pub prefers_dark: bool,
}

// Default functions
fn default_origin() -> String {
    std::env::var("CONSOLE_ORIGIN").unwrap_or_else(|_| DEFAULT_ORIGIN.to_string())
}

fn default_timeout() -> u64 {
    std::env::var("CONSOLE_TIMEOUT_SECONDS")
        .ok()
        .and_then(|val| val.parse().ok())
        .unwrap_or(DEFAULT_TIMEOUT_SECS)
}

fn default_storage_path() -> PathBuf {
    std::env::var("CONSOLE_STORAGE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_STORAGE_PATH))
}

fn default_prefers_dark() -> bool {
    std::env::var("CONSOLE_PREFERS_DARK")
        .ok()
        .and_then(|val| val.parse().ok())
        .unwrap_or(false)
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            timeout_seconds: default_timeout(),
            storage_path: default_storage_path(),
            prefers_dark: default_prefers_dark(),
        }
    }
}

impl ConsoleConfig {
    /// Load from a JSON file; missing fields fall back to the environment
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = serde_json::from_str::<Self>(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        info!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// Load from `path` if given, otherwise from the environment alone
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                debug!("No config file given, using environment and defaults");
                Self::default()
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Check values that would make the shell unusable
    pub fn validate(&self) -> Result<()> {
        if self.timeout_seconds == 0 {
            anyhow::bail!("timeout_seconds must be greater than zero");
        }
        if !self.origin.is_empty() && !self.origin.starts_with("http://") && !self.origin.starts_with("https://") {
            anyhow::bail!("origin must be an http(s) URL, got '{}'", self.origin);
        }
        Ok(())
    }

    /// Request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}
