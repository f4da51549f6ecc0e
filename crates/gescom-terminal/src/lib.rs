//! # gescom-terminal: Counter Flows for Gescom POS
//!
//! The stateful layer between a cashier's screen and the backend: the live
//! cart session (sale / return modes, payment entry, checkout) and the
//! credit-note editor. Pure rules live in `gescom-core`; HTTP lives in
//! `gescom-client`; this crate sequences both.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Terminal Layer Architecture                       │
//! │                                                                         │
//! │  ┌──────────────────────────┐      ┌──────────────────────────────┐    │
//! │  │ TerminalSession          │      │ AvoirWorkflow                │    │
//! │  │ (session.rs)             │      │ (avoir_flow.rs)              │    │
//! │  │                          │      │                              │    │
//! │  │ cart + payment entry     │      │ draft + invoice selection    │    │
//! │  │ mode switch rules        │      │ article picker + ceiling     │    │
//! │  │ checkout                 │      │ submit / valider / refuser   │    │
//! │  └────────────┬─────────────┘      └──────────────┬───────────────┘    │
//! │               │                                   │                    │
//! │               └───────────────┬───────────────────┘                    │
//! │                               ▼                                        │
//! │                 ┌──────────────────────────┐                           │
//! │                 │ Backend trait            │                           │
//! │                 │ (backend.rs)             │                           │
//! │                 │                          │                           │
//! │                 │ impl for BackendClient   │                           │
//! │                 │ scripted mock in tests   │                           │
//! │                 └──────────────────────────┘                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod avoir_flow;
pub mod backend;
pub mod error;
pub mod session;

// =============================================================================
// Re-exports
// =============================================================================

pub use avoir_flow::AvoirWorkflow;
pub use backend::Backend;
pub use error::{TerminalError, TerminalResult};
pub use session::{PaymentEntry, TerminalSession};
