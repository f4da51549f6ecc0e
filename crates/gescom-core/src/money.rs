//! # Money Helpers
//!
//! Decimal arithmetic at the JSON boundary.
//!
//! The backend serves monetary amounts as plain JSON floats (FCFA with two
//! decimal places), so `f64` is the wire type. All computation in this crate
//! runs on [`rust_decimal::Decimal`] and converts back to `f64` only when a
//! result leaves the engine.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   JSON (f64)  ──to_decimal──►  Decimal math  ──to_f64──►  JSON (f64)   │
//! │                                                                         │
//! │   Rounding happens ONCE, at the exit: 2 decimal places, midpoint       │
//! │   away from zero. The precompte conversions skip rounding entirely     │
//! │   so that ht → ttc → ht round-trips exactly.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::prelude::*;

use crate::error::{ValidationError, ValidationResult};

/// Monetary values round to 2 decimal places on exit.
pub const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01).
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Largest amount a single field may carry (1 000 000 000 FCFA).
pub const MAX_AMOUNT: f64 = 1_000_000_000.0;

/// Converts an f64 from the wire into a Decimal for calculation.
///
/// Non-finite input maps to zero; callers that care validate with
/// [`require_finite`] first.
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Converts a Decimal back to f64 for the wire, rounded to 2 decimal places.
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round_money(value).to_f64().unwrap_or_default()
}

/// Rounds a Decimal to 2 decimal places, midpoint away from zero.
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Rejects NaN and infinities before they reach the engines.
#[inline]
pub fn require_finite(value: f64, field: &str) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a monetary amount: finite, non-negative, bounded.
pub fn validate_montant(value: f64, field: &str) -> ValidationResult<()> {
    require_finite(value, field)?;
    if value < 0.0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    if value > MAX_AMOUNT {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0.0,
            max: MAX_AMOUNT,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_two_decimals() {
        assert_eq!(to_f64(to_decimal(12.345)), 12.35);
        assert_eq!(to_f64(to_decimal(12.344)), 12.34);
        // Midpoint rounds away from zero
        assert_eq!(to_f64(to_decimal(0.005)), 0.01);
        assert_eq!(to_f64(to_decimal(-0.005)), -0.01);
    }

    #[test]
    fn test_non_finite_maps_to_zero() {
        assert_eq!(to_decimal(f64::NAN), Decimal::ZERO);
        assert_eq!(to_decimal(f64::INFINITY), Decimal::ZERO);
    }

    #[test]
    fn test_tolerance_constant() {
        assert_eq!(MONEY_TOLERANCE.to_f64(), Some(0.01));
    }

    #[test]
    fn test_require_finite() {
        assert!(require_finite(10.5, "montant").is_ok());
        assert!(require_finite(f64::NAN, "montant").is_err());
        assert!(require_finite(f64::NEG_INFINITY, "montant").is_err());
    }

    #[test]
    fn test_validate_montant() {
        assert!(validate_montant(0.0, "montant").is_ok());
        assert!(validate_montant(5000.0, "montant").is_ok());
        assert!(validate_montant(-1.0, "montant").is_err());
        assert!(validate_montant(MAX_AMOUNT + 1.0, "montant").is_err());
        assert!(validate_montant(f64::NAN, "montant").is_err());
    }
}
