//! # Error Types
//!
//! Domain-specific error types for gescom-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  gescom-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  gescom-client errors (separate crate)                                 │
//! │  └── ClientError      - HTTP / backend failures                        │
//! │                                                                         │
//! │  gescom-terminal errors (separate crate)                               │
//! │  └── TerminalError    - What the UI layer sees                         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → TerminalError → Frontend          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (designation, amounts, etc.)
//! 3. Errors are enum variants, never String
//! 4. Every variant is user-correctable: nothing here is fatal, the UI
//!    surfaces the message and the user fixes the input
//! 5. Messages are in French - they are shown verbatim to the operator

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. They are surfaced to the
/// operator as notifications and never crash the application.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Checkout attempted with no lines in the cart.
    #[error("Le panier est vide")]
    EmptyCart,

    /// Cash payment received is below the amount due.
    #[error("Montant reçu insuffisant: {recu} reçu pour {attendu} dû")]
    InsufficientPayment { attendu: f64, recu: f64 },

    /// A PRODUIT article with no stock cannot enter a sale-mode cart.
    ///
    /// ## When This Occurs
    /// - `stock_actuel <= 0` at add time (sale mode only)
    /// - quantity increment would exceed the stock captured at add time
    #[error("Stock insuffisant pour {designation} (stock: {stock})")]
    OutOfStock { designation: String, stock: i64 },

    /// The article is not present in the cart.
    #[error("Article {id_article} absent du panier")]
    LineNotFound { id_article: i64 },

    /// Cart has exceeded the maximum allowed number of lines.
    #[error("Le panier ne peut pas dépasser {max} lignes")]
    CartFull { max: usize },

    /// Switching to return mode requires at least one sale recorded today.
    #[error("Aucune vente enregistrée aujourd'hui, passage en mode retour impossible")]
    NoSalesToday,

    /// A credit note cannot refund more than what was actually paid.
    ///
    /// ## When This Occurs
    /// - Article selection totals exceed the invoice's montant_avance
    /// - Submit-time check on the final TTC amount
    ///
    /// ## User Workflow
    /// ```text
    /// Select 2 of 5 units of a 10 000 FCFA line
    ///      │
    ///      ▼
    /// ligne TTC = 10 000 × 2/5 = 4 000
    ///      │
    ///      ▼
    /// montant payé sur la facture = 3 000
    ///      │
    ///      ▼
    /// CeilingExceeded { montant_ttc: 4000.0, montant_paye: 3000.0 }
    /// ```
    #[error("Le montant de l'avoir ({montant_ttc}) dépasse le montant payé sur la facture ({montant_paye})")]
    CeilingExceeded { montant_ttc: f64, montant_paye: f64 },

    /// The referenced invoice has no recorded payment at all.
    ///
    /// Checked independently of the amount: even a zero-TTC draft is
    /// rejected when nothing was ever collected on the invoice.
    #[error("Cette facture n'a aucun paiement enregistré, impossible de créer un avoir")]
    FactureNeverPaid,

    /// Draft amounts are derived from selected lines and can no longer be
    /// edited by hand.
    #[error("Les montants sont verrouillés par la sélection d'articles")]
    AmountsLocked,

    /// An operation that needs a selected invoice ran before one was chosen.
    #[error("Aucune facture sélectionnée")]
    NoFactureSelected,

    /// The selected invoice has no returnable article lines.
    #[error("Aucun article disponible sur cette facture")]
    NoReturnableArticles,

    /// Selection confirmed or draft submitted with no article chosen.
    #[error("Veuillez sélectionner au moins un article à rembourser")]
    NoArticlesSelected,

    /// The avoir is not in a status that allows the requested operation.
    ///
    /// Only EN_ATTENTE avoirs may be modified, deleted, validated or
    /// refused.
    #[error("Impossible de {action} un avoir {statut}")]
    InvalidStatus { action: String, statut: String },

    /// Validation error (wraps ValidationError).
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} est requis")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} ne peut pas dépasser {max} caractères")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} doit être entre {min} et {max}")]
    OutOfRange { field: String, min: f64, max: f64 },

    /// Value must be strictly positive.
    #[error("{field} doit être positif")]
    MustBePositive { field: String },

    /// Value is NaN or infinite.
    #[error("{field} doit être un nombre fini")]
    NotFinite { field: String },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Convenience type alias for Results with ValidationError.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::CeilingExceeded {
            montant_ttc: 4000.0,
            montant_paye: 3000.0,
        };
        assert_eq!(
            err.to_string(),
            "Le montant de l'avoir (4000) dépasse le montant payé sur la facture (3000)"
        );

        let err = CoreError::OutOfStock {
            designation: "Clavier USB".to_string(),
            stock: 0,
        };
        assert_eq!(
            err.to_string(),
            "Stock insuffisant pour Clavier USB (stock: 0)"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "motif".to_string(),
        };
        assert_eq!(err.to_string(), "motif est requis");

        let err = ValidationError::OutOfRange {
            field: "remise".to_string(),
            min: 0.0,
            max: 100.0,
        };
        assert_eq!(err.to_string(), "remise doit être entre 0 et 100");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "numero_avoir".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
