//! # Validation Module
//!
//! Input validation for counter and avoir workflows.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Terminal screens                                             │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - business rule validation                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Backend API                                                  │
//! │  ├── Schema validation on request bodies                               │
//! │  └── Database constraints (NOT NULL, foreign keys)                     │
//! │                                                                         │
//! │  A value refused in one layer never reaches the next                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,no_run
//! use gescom_core::validation::{validate_designation, validate_quantite};
//!
//! // Validate a designation before building a line
//! validate_designation("Clavier USB").unwrap();
//!
//! // Validate a quantity before a cart operation
//! validate_quantite(5).unwrap();
//! ```

use crate::error::{ValidationError, ValidationResult};
use crate::{CLIENT_COMPTOIR, MAX_LINE_QUANTITY};

// =============================================================================
// String Validators
// =============================================================================

/// Validates an article designation.
///
/// ## Rules
/// - Must not be empty
/// - Must be between 1 and 200 characters
///
/// ## Example
/// ```rust
/// use gescom_core::validation::validate_designation;
///
/// assert!(validate_designation("Clavier USB").is_ok());
/// assert!(validate_designation("").is_err());
/// ```
pub fn validate_designation(designation: &str) -> ValidationResult<()> {
    let designation = designation.trim();

    if designation.is_empty() {
        return Err(ValidationError::Required {
            field: "designation".to_string(),
        });
    }

    if designation.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "designation".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates an avoir motif (reason for the credit note).
///
/// ## Rules
/// - Must not be empty: every avoir carries an explicit reason
/// - Maximum 500 characters
pub fn validate_motif(motif: &str) -> ValidationResult<()> {
    let motif = motif.trim();

    if motif.is_empty() {
        return Err(ValidationError::Required {
            field: "motif".to_string(),
        });
    }

    if motif.len() > 500 {
        return Err(ValidationError::TooLong {
            field: "motif".to_string(),
            max: 500,
        });
    }

    Ok(())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (the search endpoint then returns nothing)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

/// Normalizes the customer name typed at the counter.
///
/// An empty name is not an error: the sale is booked on the walk-in
/// customer instead.
///
/// ## Example
/// ```rust
/// use gescom_core::validation::normalize_nom_client;
///
/// assert_eq!(normalize_nom_client("  Mme Diallo "), Ok("Mme Diallo".to_string()));
/// assert_eq!(normalize_nom_client(""), Ok("Client Comptoir".to_string()));
/// ```
pub fn normalize_nom_client(nom: &str) -> ValidationResult<String> {
    let nom = nom.trim();

    if nom.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "nom_client".to_string(),
            max: 100,
        });
    }

    if nom.is_empty() {
        return Ok(CLIENT_COMPTOIR.to_string());
    }

    Ok(nom.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed [`MAX_LINE_QUANTITY`]
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Panier: quantity edit                                                  │
/// │                                                                         │
/// │  User enters quantity: 5                                               │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantite(5) ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── qty == 0? → Error: "La quantité doit être positive"          │
/// │       │                                                                 │
/// │       ├── qty > 9999? → Error: out of range                            │
/// │       │                                                                 │
/// │       └── OK → proceed with the cart operation                         │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantite(quantite: u32) -> ValidationResult<()> {
    if quantite == 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantite".to_string(),
        });
    }

    if quantite > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantite".to_string(),
            min: 1.0,
            max: MAX_LINE_QUANTITY as f64,
        });
    }

    Ok(())
}

/// Validates a line discount percentage.
///
/// ## Rules
/// - Must be finite
/// - Must be between 0 and 100 inclusive
///
/// ## Example
/// ```rust
/// use gescom_core::validation::validate_remise;
///
/// assert!(validate_remise(0.0).is_ok());
/// assert!(validate_remise(15.0).is_ok());
/// assert!(validate_remise(100.0).is_ok());
/// assert!(validate_remise(101.0).is_err());
/// assert!(validate_remise(-5.0).is_err());
/// ```
pub fn validate_remise(remise_pct: f64) -> ValidationResult<()> {
    if !remise_pct.is_finite() {
        return Err(ValidationError::NotFinite {
            field: "remise".to_string(),
        });
    }

    if !(0.0..=100.0).contains(&remise_pct) {
        return Err(ValidationError::OutOfRange {
            field: "remise".to_string(),
            min: 0.0,
            max: 100.0,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
