//! # Client Configuration
//!
//! Configuration for the backend connection and this terminal.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     GESCOM_BACKEND_URL=http://192.168.1.20:8000                        │
//! │     GESCOM_TERMINAL_NAME="Caisse 2"                                    │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/gescom/client.toml (Linux)                               │
//! │     ~/Library/Application Support/com.gescom.gescom/client.toml (mac)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     http://localhost:8000, 30s timeout, devise FCFA                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # client.toml
//! [backend]
//! base_url = "http://localhost:8000"
//! timeout_secs = 30
//!
//! [terminal]
//! name = "Caisse 1"
//! devise = "FCFA"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ClientError, ClientResult};

// =============================================================================
// Backend Settings
// =============================================================================

/// Connection settings for the FastAPI backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Base URL of the backend, without trailing `/api`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for BackendSettings {
    fn default() -> Self {
        BackendSettings {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

// =============================================================================
// Terminal Settings
// =============================================================================

/// Settings for this point-of-sale terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalSettings {
    /// Human-readable terminal name (e.g. "Caisse 1", "Accueil").
    #[serde(default = "default_terminal_name")]
    pub name: String,

    /// Currency label printed on tickets.
    #[serde(default = "default_devise")]
    pub devise: String,
}

fn default_terminal_name() -> String {
    "Caisse".to_string()
}

fn default_devise() -> String {
    "FCFA".to_string()
}

impl Default for TerminalSettings {
    fn default() -> Self {
        TerminalSettings {
            name: default_terminal_name(),
            devise: default_devise(),
        }
    }
}

// =============================================================================
// Main Client Configuration
// =============================================================================

/// Complete client configuration.
///
/// ## Example Config File
/// ```toml
/// [backend]
/// base_url = "http://192.168.1.20:8000"
/// timeout_secs = 30
///
/// [terminal]
/// name = "Caisse 2"
/// devise = "FCFA"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend connection settings.
    #[serde(default)]
    pub backend: BackendSettings,

    /// Terminal settings.
    #[serde(default)]
    pub terminal: TerminalSettings,
}

impl ClientConfig {
    /// Creates a new config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (client.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        // Try to load from config file
        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading client config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        // Override with environment variables
        config.apply_env_overrides();

        // Validate the configuration
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load client config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ClientResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ClientError::ConfigSaveFailed("No config path available".into()))?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Client config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        // Base URL must parse and use a scheme reqwest can speak
        let parsed = Url::parse(&self.backend.base_url)?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ClientError::InvalidUrl(format!(
                "Backend URL must start with http:// or https://, got: {}",
                self.backend.base_url
            )));
        }

        if self.backend.timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        // Backend URL
        if let Ok(url) = std::env::var("GESCOM_BACKEND_URL") {
            debug!(url = %url, "Overriding backend URL from environment");
            self.backend.base_url = url;
        }

        // Request timeout
        if let Ok(timeout) = std::env::var("GESCOM_TIMEOUT_SECS") {
            if let Ok(t) = timeout.parse::<u64>() {
                self.backend.timeout_secs = t;
            }
        }

        // Terminal name
        if let Ok(name) = std::env::var("GESCOM_TERMINAL_NAME") {
            self.terminal.name = name;
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "gescom", "gescom").map(|dirs| {
            let config_dir = dirs.config_dir();
            config_dir.join("client.toml")
        })
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Returns the backend base URL.
    pub fn base_url(&self) -> &str {
        &self.backend.base_url
    }

    /// Returns the request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.backend.timeout_secs)
    }

    /// Returns the currency label for tickets.
    pub fn devise(&self) -> &str {
        &self.terminal.devise
    }

    /// Builds a full endpoint URL from an absolute API path.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.backend.base_url.trim_end_matches('/'), path)
    }
}
