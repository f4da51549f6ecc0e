//! # Avoir Drafting
//!
//! The credit-note drafting state machine behind the avoir form.
//!
//! ## Drafting Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Avoir Draft Lifecycle                                │
//! │                                                                         │
//! │  AvoirDraft::new(numero, date)                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  select_facture(SelectedFacture) ──► prefills montants from the        │
//! │       │                              invoice, captures montant_avance  │
//! │       │                              and the precompte flag            │
//! │       ▼                                                                 │
//! │  set_montant_ht / set_montant_ttc ──► free editing, HT and TTC kept    │
//! │       │                               in sync via the precompte rule   │
//! │       ▼                                                                 │
//! │  apply_selection(SelectedFacture) ──► lignes computed by proportion,   │
//! │       │                               montants now LOCKED              │
//! │       ▼                                                                 │
//! │  submit() ──► AvoirPayload (or the first failing check, in order)      │
//! │                                                                         │
//! │  INVARIANT: montant_ttc never exceeds the invoice's montant_avance     │
//! │  (what was actually paid), not its montant_ttc.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A rejected operation leaves the draft untouched, so the form can surface
//! the error and let the user adjust.

use chrono::NaiveDate;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money;
use crate::tax;
use crate::types::{AvoirStatus, AvoirSummary, FactureArticle, FactureSummary, LigneAvoir};
use crate::validation;

// =============================================================================
// Article Selection
// =============================================================================

/// One row of the article selection step.
///
/// Rows start unselected with the full invoiced quantity prefilled, so
/// ticking a row without touching the quantity returns everything.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ArticleSelection {
    pub id_article: i64,
    pub designation: String,
    /// Invoiced quantity; the ceiling for `quantite_retour`
    pub quantite_facture: f64,
    pub prix_unitaire: f64,
    pub montant_ht: f64,
    pub montant_ttc: f64,
    pub selected: bool,
    pub quantite_retour: f64,
}

impl ArticleSelection {
    fn from_article(article: &FactureArticle) -> Self {
        ArticleSelection {
            id_article: article.id_article,
            designation: article.designation.clone(),
            quantite_facture: article.quantite_facture,
            prix_unitaire: article.prix_unitaire,
            montant_ht: article.montant_ht,
            montant_ttc: article.montant_ttc,
            selected: false,
            quantite_retour: article.quantite_facture,
        }
    }
}

/// Lines and totals produced by a confirmed selection.
#[derive(Debug, Clone)]
pub struct SelectionOutcome {
    pub lignes: Vec<LigneAvoir>,
    pub total_ht: f64,
    pub total_ttc: f64,
}

// =============================================================================
// Selected Facture
// =============================================================================

/// The invoice a draft is being written against, with its returnable lines.
///
/// Carries everything the draft checks need: `montant_avance` (the payment
/// ceiling) and the precompte flag (the HT/TTC sync rule).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SelectedFacture {
    pub facture: FactureSummary,
    pub articles: Vec<ArticleSelection>,
}

impl SelectedFacture {
    /// Builds the selection context from an invoice and its returnable
    /// lines (`GET /api/factures/{id}/articles-disponibles`).
    pub fn new(facture: FactureSummary, articles: Vec<FactureArticle>) -> Self {
        SelectedFacture {
            facture,
            articles: articles.iter().map(ArticleSelection::from_article).collect(),
        }
    }

    /// Total already collected on the invoice. The avoir can never refund
    /// more than this.
    pub fn montant_paye(&self) -> f64 {
        self.facture.montant_avance
    }

    pub fn precompte_active(&self) -> bool {
        self.facture.precompte_active()
    }

    pub fn has_articles(&self) -> bool {
        !self.articles.is_empty()
    }

    /// Ticks or unticks an article row.
    pub fn toggle_article(&mut self, id_article: i64) -> CoreResult<()> {
        let row = self
            .articles
            .iter_mut()
            .find(|a| a.id_article == id_article)
            .ok_or(CoreError::LineNotFound { id_article })?;
        row.selected = !row.selected;
        Ok(())
    }

    /// Sets the quantity to return on a row.
    ///
    /// The value is clamped into `0..=quantite_facture`; a non-numeric
    /// input counts as 0. Clamping instead of erroring matches the form:
    /// typing past the ceiling just snaps back.
    pub fn set_quantite_retour(&mut self, id_article: i64, quantite: f64) -> CoreResult<()> {
        let row = self
            .articles
            .iter_mut()
            .find(|a| a.id_article == id_article)
            .ok_or(CoreError::LineNotFound { id_article })?;
        let quantite = if quantite.is_finite() { quantite } else { 0.0 };
        row.quantite_retour = quantite.max(0.0).min(row.quantite_facture);
        Ok(())
    }

    /// Confirms the selection: builds the avoir lines from the ticked rows.
    ///
    /// ## Proportion Rule
    /// Returning part of a line refunds the same fraction of its montants:
    /// `montant × (quantite_retour / quantite_facture)`, unrounded. The
    /// fraction never exceeds 1 because quantities are clamped on input.
    ///
    /// ## Ceiling Check
    /// When the invoice has recorded payments, the selected total may not
    /// exceed them. An unpaid invoice passes here; [`AvoirDraft::submit`]
    /// rejects it with [`CoreError::FactureNeverPaid`] instead, which is
    /// the clearer message.
    pub fn confirm_selection(&self) -> CoreResult<SelectionOutcome> {
        let retenues: Vec<&ArticleSelection> = self
            .articles
            .iter()
            .filter(|a| a.selected && a.quantite_retour > 0.0)
            .collect();

        if retenues.is_empty() {
            return Err(CoreError::NoArticlesSelected);
        }

        let mut total_ht = Decimal::ZERO;
        let mut total_ttc = Decimal::ZERO;
        let mut lignes = Vec::with_capacity(retenues.len());

        for row in retenues {
            let proportion = if row.quantite_facture > 0.0 {
                money::to_decimal(row.quantite_retour) / money::to_decimal(row.quantite_facture)
            } else {
                Decimal::ZERO
            };
            let montant_ht = money::to_decimal(row.montant_ht) * proportion;
            let montant_ttc = money::to_decimal(row.montant_ttc) * proportion;

            total_ht += montant_ht;
            total_ttc += montant_ttc;

            lignes.push(LigneAvoir {
                id_article: row.id_article,
                quantite: row.quantite_retour,
                prix_unitaire: row.prix_unitaire,
                montant_ht: montant_ht.to_f64().unwrap_or_default(),
                montant_ttc: montant_ttc.to_f64().unwrap_or_default(),
            });
        }

        let paye = money::to_decimal(self.montant_paye());
        if paye > Decimal::ZERO && total_ttc > paye {
            return Err(CoreError::CeilingExceeded {
                montant_ttc: total_ttc.to_f64().unwrap_or_default(),
                montant_paye: self.montant_paye(),
            });
        }

        Ok(SelectionOutcome {
            lignes,
            total_ht: total_ht.to_f64().unwrap_or_default(),
            total_ttc: total_ttc.to_f64().unwrap_or_default(),
        })
    }
}

// =============================================================================
// Avoir Draft
// =============================================================================

/// A credit note being drafted.
///
/// ## Amount Locking
/// Before a selection is applied, HT and TTC are freely editable and kept
/// in sync through the invoice's precompte rule. Once `lignes` is
/// non-empty the montants are derived from the selection and the setters
/// refuse with [`CoreError::AmountsLocked`].
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AvoirDraft {
    pub numero_avoir: String,
    #[ts(as = "String")]
    pub date_avoir: NaiveDate,
    pub id_facture: Option<i64>,
    pub motif: String,
    pub montant_ht: f64,
    pub montant_ttc: f64,
    pub statut: AvoirStatus,
    pub lignes: Vec<LigneAvoir>,

    /// Precompte flag of the selected invoice; drives the HT/TTC sync
    pub precompte_active: bool,

    /// montant_avance of the selected invoice; the refund ceiling
    pub montant_paye: f64,
}

impl AvoirDraft {
    /// Starts a fresh draft.
    ///
    /// The numero comes from `GET /api/avoirs/generate-numero` (format
    /// `AVO-{year}-{seq:03}`); the date is the caller's clock. This module
    /// does no I/O.
    pub fn new(numero_avoir: String, date_avoir: NaiveDate) -> Self {
        AvoirDraft {
            numero_avoir,
            date_avoir,
            id_facture: None,
            motif: String::new(),
            montant_ht: 0.0,
            montant_ttc: 0.0,
            statut: AvoirStatus::EnAttente,
            lignes: Vec::new(),
            precompte_active: false,
            montant_paye: 0.0,
        }
    }

    /// Reopens an existing avoir for editing.
    ///
    /// Only EN_ATTENTE avoirs are editable; a processed or refused one
    /// returns [`CoreError::InvalidStatus`]. The invoice context (ceiling,
    /// precompte) is restored by re-selecting the facture.
    pub fn edit(avoir: &AvoirSummary, date_avoir: NaiveDate) -> CoreResult<Self> {
        if !avoir.statut.can_modify() {
            return Err(CoreError::InvalidStatus {
                action: "modifier".to_string(),
                statut: avoir.statut.libelle().to_string(),
            });
        }

        Ok(AvoirDraft {
            numero_avoir: avoir.numero_avoir.clone(),
            date_avoir: avoir.date_avoir.unwrap_or(date_avoir),
            id_facture: avoir.id_facture,
            motif: avoir.motif.clone().unwrap_or_default(),
            montant_ht: avoir.montant_ttc,
            montant_ttc: avoir.montant_ttc,
            statut: avoir.statut,
            lignes: Vec::new(),
            precompte_active: false,
            montant_paye: 0.0,
        })
    }

    /// Points the draft at an invoice.
    ///
    /// Prefills the montants with the invoice totals (the user narrows them
    /// down afterwards), captures the payment ceiling and the precompte
    /// flag, and drops any lines from a previously selected invoice.
    pub fn select_facture(&mut self, selection: &SelectedFacture) {
        self.id_facture = Some(selection.facture.id_facture);
        self.montant_ht = selection.facture.montant_ht;
        self.montant_ttc = selection.facture.montant_ttc;
        self.precompte_active = selection.precompte_active();
        self.montant_paye = selection.montant_paye();
        self.lignes.clear();
    }

    /// Amounts become read-only once they are derived from selected lines.
    pub fn amounts_locked(&self) -> bool {
        !self.lignes.is_empty()
    }

    /// Sets the HT amount and recomputes TTC through the precompte rule.
    pub fn set_montant_ht(&mut self, montant_ht: f64) -> CoreResult<()> {
        if self.amounts_locked() {
            return Err(CoreError::AmountsLocked);
        }
        money::require_finite(montant_ht, "montant_ht")?;

        self.montant_ht = montant_ht;
        self.montant_ttc = tax::ht_to_ttc(montant_ht, self.precompte_active);
        Ok(())
    }

    /// Sets the TTC amount and recomputes HT through the precompte rule.
    pub fn set_montant_ttc(&mut self, montant_ttc: f64) -> CoreResult<()> {
        if self.amounts_locked() {
            return Err(CoreError::AmountsLocked);
        }
        money::require_finite(montant_ttc, "montant_ttc")?;

        self.montant_ttc = montant_ttc;
        self.montant_ht = tax::ttc_to_ht(montant_ttc, self.precompte_active);
        Ok(())
    }

    /// Applies a confirmed article selection to the draft.
    ///
    /// On success the draft tracks the selection's invoice, its lines and
    /// its computed totals, and the montants lock. On failure (nothing
    /// ticked, or selection past the ceiling) the draft is unchanged.
    pub fn apply_selection(&mut self, selection: &SelectedFacture) -> CoreResult<()> {
        let outcome = selection.confirm_selection()?;

        self.id_facture = Some(selection.facture.id_facture);
        self.precompte_active = selection.precompte_active();
        self.montant_paye = selection.montant_paye();
        self.lignes = outcome.lignes;
        self.montant_ht = outcome.total_ht;
        self.montant_ttc = outcome.total_ttc;
        Ok(())
    }

    /// Validates the draft and produces the submission body.
    ///
    /// ## Check Order
    /// 1. numero_avoir present
    /// 2. an invoice is selected
    /// 3. motif present
    /// 4. at least one article line
    /// 5. montant strictly positive
    /// 6. the invoice has recorded payments
    /// 7. montant_ttc within the payment ceiling
    ///
    /// The order is part of the contract: the user fixes one thing at a
    /// time, starting from the top of the form.
    pub fn submit(&self) -> CoreResult<AvoirPayload> {
        if self.numero_avoir.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "numero_avoir".to_string(),
            }
            .into());
        }

        let id_facture = self.id_facture.ok_or(CoreError::NoFactureSelected)?;

        validation::validate_motif(&self.motif)?;

        if self.lignes.is_empty() {
            return Err(CoreError::NoArticlesSelected);
        }

        if self.montant_ttc <= 0.0 {
            return Err(ValidationError::MustBePositive {
                field: "montant".to_string(),
            }
            .into());
        }

        if self.montant_paye <= 0.0 {
            return Err(CoreError::FactureNeverPaid);
        }

        if money::to_decimal(self.montant_ttc) > money::to_decimal(self.montant_paye) {
            return Err(CoreError::CeilingExceeded {
                montant_ttc: self.montant_ttc,
                montant_paye: self.montant_paye,
            });
        }

        Ok(AvoirPayload {
            numero_avoir: self.numero_avoir.trim().to_string(),
            date_avoir: self.date_avoir,
            id_facture,
            motif: self.motif.trim().to_string(),
            montant: self.montant_ttc,
            statut: self.statut,
            lignes: self.lignes.clone(),
        })
    }
}

// =============================================================================
// Avoir Payload
// =============================================================================

/// Submission body for `POST /api/avoirs` and `PUT /api/avoirs/{id}`.
///
/// The backend stores a single amount column, so the TTC total travels as
/// `montant`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AvoirPayload {
    pub numero_avoir: String,
    #[ts(as = "String")]
    pub date_avoir: NaiveDate,
    pub id_facture: i64,
    pub motif: String,
    pub montant: f64,
    pub statut: AvoirStatus,
    pub lignes: Vec<LigneAvoir>,
}

// =============================================================================
// Unit Tests
// =============================================================================
