//! # Tax Engine
//!
//! The two 9.5% computations of the domain, kept as **separate code paths**.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Two different 9.5% treatments                      │
//! │                                                                         │
//! │  TICKET TVA (added)                 │  PRECOMPTE (withheld)             │
//! │  ───────────────────                │  ──────────────────────           │
//! │  • POS tickets only                 │  • Devis / Factures / Avoirs      │
//! │  • tva = ht × taux/100              │  • ttc = ht − ht × 0.095          │
//! │  • ttc = ht + tva                   │  • ht  = ttc ÷ 0.905              │
//! │  • rate comes from the session      │  • per-line: SERVICE lines only   │
//! │    (0 on the tax-inclusive screen)  │    (PRODUIT contributes nothing)  │
//! │                                                                         │
//! │  The numeric rate is the same by domain convention. The treatments     │
//! │  are structurally different and MUST NOT be unified.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The precompte conversions perform no internal rounding: `ht_to_ttc` and
//! `ttc_to_ht` are exact inverses on Decimal, which the avoir form relies on
//! when mirroring manual HT/TTC edits.

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{to_decimal, to_f64};
use crate::types::{ArticleKind, DevisLigne};

/// Ticket TVA rate of the taxed POS screen, in percent.
pub const TAUX_TVA: f64 = 9.5;

/// Precompte (withholding) rate, in percent.
pub const TAUX_PRECOMPTE: f64 = 9.5;

/// 0.095 as an exact Decimal.
const PRECOMPTE_FACTOR: Decimal = Decimal::from_parts(95, 0, 0, false, 3);

/// 0.905 as an exact Decimal (1 − 0.095).
const PRECOMPTE_COMPLEMENT: Decimal = Decimal::from_parts(905, 0, 0, false, 3);

const HUNDRED: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

// =============================================================================
// Ticket TVA
// =============================================================================

/// TVA added on top of a ticket's HT total, rounded to 2 decimal places.
///
/// `taux_percent` is the session's ticket rate: 0 on the tax-inclusive
/// screen, [`TAUX_TVA`] on the taxed one. Non-positive or non-finite rates
/// yield zero.
pub fn tva_on(total_ht: f64, taux_percent: f64) -> f64 {
    if !taux_percent.is_finite() || taux_percent <= 0.0 {
        return 0.0;
    }
    let tva = to_decimal(total_ht) * to_decimal(taux_percent) / HUNDRED;
    to_f64(tva)
}

// =============================================================================
// Precompte: single-amount conversions
// =============================================================================

/// Converts an HT amount to TTC under the precompte regime.
///
/// - `ht <= 0` → 0 (the forms never carry negative document amounts)
/// - precompte inactive → HT unchanged
/// - precompte active → `ht − ht × 0.095`, unrounded
pub fn ht_to_ttc(montant_ht: f64, precompte_active: bool) -> f64 {
    if montant_ht <= 0.0 {
        return 0.0;
    }
    if !precompte_active {
        return montant_ht;
    }
    let ht = to_decimal(montant_ht);
    let ttc = ht - ht * PRECOMPTE_FACTOR;
    ttc.to_f64().unwrap_or_default()
}

/// Converts a TTC amount back to HT under the precompte regime.
///
/// Exact inverse of [`ht_to_ttc`] when precompte is active:
/// `ttc_to_ht(ht_to_ttc(x)) == x` within 1e-6 for all `x > 0`.
pub fn ttc_to_ht(montant_ttc: f64, precompte_active: bool) -> f64 {
    if montant_ttc <= 0.0 {
        return 0.0;
    }
    if !precompte_active {
        return montant_ttc;
    }
    let ttc = to_decimal(montant_ttc);
    let ht = ttc / PRECOMPTE_COMPLEMENT;
    ht.to_f64().unwrap_or_default()
}

// =============================================================================
// Precompte: per-line path (devis / avoir line items)
// =============================================================================

/// Totals of a line-item document (devis, avoir line selection).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DocumentTotals {
    pub total_ht: f64,
    pub total_precompte: f64,
    pub total_ttc: f64,
}

/// Precompte withheld across a document's lines.
///
/// Only SERVICE lines contribute; PRODUIT lines never carry precompte,
/// whatever the document flag says. Returns 0 when the flag is off.
pub fn precompte_total(lignes: &[DevisLigne], precompte_applique: bool) -> f64 {
    if !precompte_applique {
        return 0.0;
    }
    let total = lignes
        .iter()
        .filter(|l| l.type_article == ArticleKind::Service)
        .map(|l| to_decimal(l.montant_ht) * PRECOMPTE_FACTOR)
        .sum::<Decimal>();
    to_f64(total)
}

/// HT / precompte / net-TTC totals of a line-item document.
///
/// `total_ttc = total_ht − precompte`. On a mixed PRODUIT/SERVICE document
/// this does NOT agree with [`ht_to_ttc`] applied to the grand total; the
/// two paths are intentionally distinct.
pub fn document_totals(lignes: &[DevisLigne], precompte_applique: bool) -> DocumentTotals {
    let total_ht = lignes
        .iter()
        .map(|l| to_decimal(l.montant_ht))
        .sum::<Decimal>();
    let precompte = if precompte_applique {
        lignes
            .iter()
            .filter(|l| l.type_article == ArticleKind::Service)
            .map(|l| to_decimal(l.montant_ht) * PRECOMPTE_FACTOR)
            .sum::<Decimal>()
    } else {
        Decimal::ZERO
    };
    DocumentTotals {
        total_ht: to_f64(total_ht),
        total_precompte: to_f64(precompte),
        total_ttc: to_f64(total_ht - precompte),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ligne(kind: ArticleKind, montant_ht: f64) -> DevisLigne {
        DevisLigne {
            id_article: 1,
            designation: "Test".to_string(),
            type_article: kind,
            quantite: 1,
            prix_unitaire: montant_ht,
            montant_ht,
        }
    }

    #[test]
    fn test_tva_on_ticket() {
        assert_eq!(tva_on(5000.0, TAUX_TVA), 475.0);
        assert_eq!(tva_on(1000.0, TAUX_TVA), 95.0);
        // Tax-inclusive screen: rate 0 adds nothing
        assert_eq!(tva_on(5000.0, 0.0), 0.0);
        assert_eq!(tva_on(5000.0, f64::NAN), 0.0);
    }

    #[test]
    fn test_ht_to_ttc_active() {
        assert_eq!(ht_to_ttc(1000.0, true), 905.0);
        assert_eq!(ht_to_ttc(10000.0, true), 9050.0);
    }

    #[test]
    fn test_ht_to_ttc_inactive_passthrough() {
        assert_eq!(ht_to_ttc(1000.0, false), 1000.0);
        assert_eq!(ht_to_ttc(123.45, false), 123.45);
    }

    #[test]
    fn test_non_positive_amounts_collapse_to_zero() {
        assert_eq!(ht_to_ttc(0.0, true), 0.0);
        assert_eq!(ht_to_ttc(-500.0, true), 0.0);
        assert_eq!(ht_to_ttc(0.0, false), 0.0);
        assert_eq!(ttc_to_ht(0.0, true), 0.0);
        assert_eq!(ttc_to_ht(-905.0, true), 0.0);
    }

    #[test]
    fn test_ttc_to_ht_active() {
        assert_eq!(ttc_to_ht(905.0, true), 1000.0);
        assert_eq!(ttc_to_ht(9050.0, true), 10000.0);
    }

    #[test]
    fn test_conversions_are_inverses() {
        // ttc_to_ht(ht_to_ttc(ht)) ≈ ht within 1e-6 for all positive ht
        let samples = [
            0.01,
            0.07,
            1.0,
            33.33,
            100.0,
            1000.0 / 3.0,
            905.0,
            12_345.67,
            999_999.99,
            1_000_000_000.0,
        ];
        for &ht in &samples {
            let there_and_back = ttc_to_ht(ht_to_ttc(ht, true), true);
            assert!(
                (there_and_back - ht).abs() < 1e-6,
                "round trip drifted for ht={ht}: got {there_and_back}"
            );
        }
        // and the other direction
        for &ttc in &samples {
            let back = ht_to_ttc(ttc_to_ht(ttc, true), true);
            assert!(
                (back - ttc).abs() < 1e-6,
                "round trip drifted for ttc={ttc}: got {back}"
            );
        }
    }

    #[test]
    fn test_service_line_carries_precompte() {
        let lignes = vec![ligne(ArticleKind::Service, 1000.0)];
        assert_eq!(precompte_total(&lignes, true), 95.0);

        let totals = document_totals(&lignes, true);
        assert_eq!(totals.total_ht, 1000.0);
        assert_eq!(totals.total_precompte, 95.0);
        assert_eq!(totals.total_ttc, 905.0);
    }

    #[test]
    fn test_produit_line_carries_none() {
        let lignes = vec![ligne(ArticleKind::Produit, 1000.0)];
        assert_eq!(precompte_total(&lignes, true), 0.0);

        let totals = document_totals(&lignes, true);
        assert_eq!(totals.total_ht, 1000.0);
        assert_eq!(totals.total_precompte, 0.0);
        assert_eq!(totals.total_ttc, 1000.0);
    }

    #[test]
    fn test_flag_off_disables_precompte() {
        let lignes = vec![
            ligne(ArticleKind::Service, 800.0),
            ligne(ArticleKind::Produit, 200.0),
        ];
        assert_eq!(precompte_total(&lignes, false), 0.0);
        assert_eq!(document_totals(&lignes, false).total_ttc, 1000.0);
    }

    #[test]
    fn test_mixed_document_diverges_from_single_amount_path() {
        // 500 SERVICE + 500 PRODUIT: per-line precompte hits only the
        // SERVICE half, the single-amount conversion hits everything.
        let lignes = vec![
            ligne(ArticleKind::Service, 500.0),
            ligne(ArticleKind::Produit, 500.0),
        ];
        let totals = document_totals(&lignes, true);
        assert_eq!(totals.total_precompte, 47.5);
        assert_eq!(totals.total_ttc, 952.5);
        assert_eq!(ht_to_ttc(1000.0, true), 905.0);
        assert_ne!(totals.total_ttc, ht_to_ttc(1000.0, true));
    }
}
