//! # gescom-core: Pure Business Logic for Gescom POS
//!
//! This crate is the **heart** of Gescom POS. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Gescom POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     Frontend (React)                            │   │
//! │  │    Comptoir UI ──► Avoir form ──► Devis form ──► Ticket        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 gescom-terminal (flows)                         │   │
//! │  │    add_article, switch_mode, checkout, avoir workflow           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ gescom-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   cart    │  │    tax    │  │   avoir   │  │permissions│  │   │
//! │  │   │   Cart    │  │ precompte │  │AvoirDraft │  │ Droits →  │  │   │
//! │  │   │ CartLine  │  │ TVA ticket│  │  ceiling  │  │ typed set │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                gescom-client (HTTP layer)                       │   │
//! │  │         Typed reqwest calls to the FastAPI backend              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Article, FactureSummary, Avoir, etc.)
//! - [`money`] - Decimal/f64 boundary helpers and amount guards
//! - [`tax`] - Ticket TVA and precompte (withholding) conversions
//! - [`cart`] - The POS cart engine (lines, totals, monnaie)
//! - [`avoir`] - Credit-note draft state machine and ceiling rule
//! - [`permissions`] - Typed permission set resolved from the droits blob
//! - [`validation`] - Field-level validation rules
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Decimal Money**: Arithmetic runs on `rust_decimal::Decimal`; `f64`
//!    appears only at the JSON boundary (the backend serves plain floats)
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//! 5. **One module per rule**: every screen computes cart totals and
//!    precompte through the same functions, never its own copy
//!
//! ## Example Usage
//!
//! ```rust
//! use gescom_core::tax;
//!
//! // 9.5% withholding: TTC = HT - HT * 0.095
//! let ttc = tax::ht_to_ttc(1000.0, true);
//! assert_eq!(ttc, 905.0);
//!
//! // and back: HT = TTC / 0.905
//! let ht = tax::ttc_to_ht(ttc, true);
//! assert!((ht - 1000.0).abs() < 1e-6);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod avoir;
pub mod cart;
pub mod error;
pub mod money;
pub mod permissions;
pub mod tax;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use gescom_core::Cart` instead of
// `use gescom_core::cart::Cart`

pub use avoir::{AvoirDraft, AvoirPayload, SelectedFacture};
pub use cart::{Cart, CartLine, CartTotals};
pub use error::{CoreError, CoreResult, ValidationError};
pub use permissions::{Permission, PermissionSet};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single cart
///
/// ## Business Reason
/// Prevents runaway carts and ensures reasonable ticket sizes.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single line in a cart
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: u32 = 9_999;

/// Client name recorded on a counter sale when the operator leaves it blank.
pub const CLIENT_COMPTOIR: &str = "Client Comptoir";
