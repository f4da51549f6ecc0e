//! # Client Error Types
//!
//! Error types for backend HTTP operations.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Backend             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Connection     │  │  Unauthorized (401)     │ │
//! │  │  InvalidUrl     │  │  Timeout        │  │  NotFound (404)         │ │
//! │  │  ConfigLoad/Save│  │  Http           │  │  Rejected (other 4xx)   │ │
//! │  └─────────────────┘  └─────────────────┘  │  ServerError (5xx)      │ │
//! │                                            └─────────────────────────┘ │
//! │  ┌─────────────────┐                                                   │
//! │  │    Payload      │   Backend variants carry the FastAPI `detail`    │
//! │  │                 │   string (French, shown to the operator as-is).  │
//! │  │  Serialization  │                                                   │
//! │  │  Deserialization│                                                   │
//! │  └─────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for backend client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Client error type covering configuration, transport and backend failures.
///
/// ## Design Principles
/// - Transport failures never mutate caller state; they are safe to retry
/// - Backend rejections keep the server's French `detail` message verbatim
/// - All errors are `Send + Sync` for async compatibility
#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid client configuration.
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    /// Invalid backend base URL.
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Could not reach the backend at all.
    #[error("Connection to backend failed: {0}")]
    ConnectionFailed(String),

    /// Request timed out.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Other HTTP transport failure.
    #[error("HTTP error: {0}")]
    Http(String),

    // =========================================================================
    // Backend Errors (non-2xx responses)
    // =========================================================================
    /// No session; the operation requires a prior `login()`.
    #[error("Not authenticated. Call login() first.")]
    NotAuthenticated,

    /// 401 from the backend (bad credentials, disabled account, stale token).
    #[error("Unauthorized: {detail}")]
    Unauthorized { detail: String },

    /// 404 from the backend.
    #[error("Not found: {detail}")]
    NotFound { detail: String },

    /// Any other 4xx: the backend refused the operation (business rule).
    #[error("Request rejected (HTTP {status}): {detail}")]
    Rejected { status: u16, detail: String },

    /// 5xx from the backend.
    #[error("Backend error (HTTP {status}): {detail}")]
    ServerError { status: u16, detail: String },

    // =========================================================================
    // Payload Errors
    // =========================================================================
    /// Failed to serialize a request body.
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Response body did not match the expected shape.
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout(err.to_string())
        } else if err.is_connect() {
            ClientError::ConnectionFailed(err.to_string())
        } else if err.is_decode() {
            ClientError::DeserializationFailed(err.to_string())
        } else {
            ClientError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::SerializationFailed(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization (for caller recovery)
// =============================================================================

impl ClientError {
    /// Returns true when the backend was never reached (or never answered).
    ///
    /// Callers treat these as "operation abandoned": local state stays
    /// unchanged and the operator retries manually.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            ClientError::ConnectionFailed(_) | ClientError::Timeout(_) | ClientError::Http(_)
        )
    }

    /// Returns true for a backend 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound { .. })
    }

    /// Returns true when the session is missing or refused by the backend.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            ClientError::NotAuthenticated | ClientError::Unauthorized { .. }
        )
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidConfig(_)
                | ClientError::InvalidUrl(_)
                | ClientError::ConfigLoadFailed(_)
                | ClientError::ConfigSaveFailed(_)
        )
    }

    /// The backend's `detail` message, when this error carries one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ClientError::Unauthorized { detail }
            | ClientError::NotFound { detail }
            | ClientError::Rejected { detail, .. }
            | ClientError::ServerError { detail, .. } => Some(detail),
            _ => None,
        }
    }
}
