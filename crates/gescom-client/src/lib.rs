//! # gescom-client: Backend HTTP Client for Gescom POS
//!
//! This crate owns every HTTP contract between the terminal and the FastAPI
//! backend: authentication, the counter-sale endpoints, invoice lookups and
//! the credit-note lifecycle.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Client Layer Architecture                        │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                    BackendClient (backend.rs)                    │  │
//! │  │                                                                  │  │
//! │  │  Typed reqwest calls, one per endpoint                           │  │
//! │  │  Bearer token attached once logged in                            │  │
//! │  │  FastAPI {"detail"} bodies mapped to ClientError                 │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │ ClientConfig   │  │  AuthSession   │  │  gescom-core types     │    │
//! │  │                │  │                │  │                        │    │
//! │  │ client.toml +  │  │ token + user + │  │ Article, VentePayload, │    │
//! │  │ GESCOM_* env   │  │ resolved       │  │ AvoirPayload, ...      │    │
//! │  │ overrides      │  │ permissions    │  │ (wire shapes)          │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gescom_client::{BackendClient, ClientConfig};
//!
//! let config = ClientConfig::load_or_default(None);
//! let client = BackendClient::new(config)?;
//!
//! let session = client.login("marie", "secret").await?;
//! println!("Connecté: {}", session.utilisateur().nom_utilisateur);
//!
//! let articles = client.search_articles("clavier", 20).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod auth;
pub mod backend;
pub mod config;
pub mod error;

// =============================================================================
// Re-exports
// =============================================================================

pub use auth::{AuthSession, LoginRequest, LoginResponse};
pub use backend::{AvoirValidation, AvoirValide, BackendClient, VenteSuppression};
pub use config::{BackendSettings, ClientConfig, TerminalSettings};
pub use error::{ClientError, ClientResult};
