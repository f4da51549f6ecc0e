//! # Avoir Workflow
//!
//! Drives a credit-note draft from "Nouvel avoir" to submission, plus the
//! list-page actions (valider / refuser / supprimer). The draft rules live
//! in `gescom_core::avoir`; this module sequences them around the backend
//! calls.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Draft Lifecycle                                 │
//! │                                                                         │
//! │  start ──► numero + factures fetched, first invoice auto-selected      │
//! │    │         (numero fetch failure falls back to a local AVO-…-001)    │
//! │    ▼                                                                    │
//! │  choose_facture ──► montants prefilled from the invoice                │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  open_article_selection ──► returnable lines fetched                   │
//! │    │   toggle_article / set_quantite_retour                            │
//! │    ▼                                                                    │
//! │  apply_selection ──► montants locked to the selected lines             │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  submit ──► POST /api/avoirs (or PUT when editing)                     │
//! │              failure keeps the draft; success clears it                │
//! │                                                                         │
//! │  edit(avoir) enters the same cycle with the EN_ATTENTE gate checked    │
//! │  before any network round trip.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use tracing::{info, warn};

use gescom_client::AvoirValidation;
use gescom_core::{AvoirDraft, AvoirSummary, CoreError, FactureSummary, SelectedFacture};

use crate::backend::Backend;
use crate::error::TerminalResult;

/// Credit-note editor state for one terminal.
pub struct AvoirWorkflow<B> {
    backend: Arc<B>,
    draft: Option<AvoirDraft>,
    /// `Some(id_avoir)` when reworking an existing avoir; submit then
    /// routes to the update endpoint.
    editing: Option<i64>,
    factures: Vec<FactureSummary>,
    selection: Option<SelectedFacture>,
}

impl<B: Backend> AvoirWorkflow<B> {
    pub fn new(backend: Arc<B>) -> Self {
        AvoirWorkflow {
            backend,
            draft: None,
            editing: None,
            factures: Vec::new(),
            selection: None,
        }
    }

    fn draft_mut(&mut self) -> TerminalResult<&mut AvoirDraft> {
        Ok(self.draft.as_mut().ok_or(CoreError::NoFactureSelected)?)
    }

    // =========================================================================
    // Draft Lifecycle
    // =========================================================================

    /// Opens a fresh draft: fetches the next numero and the candidate
    /// invoices, then auto-selects the first one.
    ///
    /// A failed numero fetch degrades to a local `AVO-{year}-001`; the
    /// operator corrects it in the form. No invoices at all aborts the
    /// draft, since an avoir without an invoice cannot exist.
    pub async fn start(
        &mut self,
        id_client: Option<i64>,
        date_avoir: NaiveDate,
    ) -> TerminalResult<()> {
        let numero = match self.backend.generate_numero_avoir().await {
            Ok(numero) => numero,
            Err(err) => {
                warn!(error = %err, "Numero fetch failed, falling back to local format");
                format!("AVO-{}-001", date_avoir.year())
            }
        };

        let factures = self.backend.factures_for_client(id_client).await?;
        if factures.is_empty() {
            self.abandon();
            return Err(CoreError::NoFactureSelected.into());
        }

        self.factures = factures;
        self.draft = Some(AvoirDraft::new(numero, date_avoir));
        self.editing = None;
        self.selection = None;

        let premiere = self.factures[0].id_facture;
        self.choose_facture(premiere)
    }

    /// Reopens an existing avoir in the editor.
    ///
    /// The EN_ATTENTE gate runs before the invoice fetch so a processed
    /// avoir is refused without a round trip.
    pub async fn edit(&mut self, avoir: &AvoirSummary, date_avoir: NaiveDate) -> TerminalResult<()> {
        let draft = AvoirDraft::edit(avoir, date_avoir)?;

        self.factures = self.backend.factures_for_client(None).await?;
        self.draft = Some(draft);
        self.editing = Some(avoir.id_avoir);
        self.selection = None;
        Ok(())
    }

    /// Points the draft at one of the fetched invoices and prefills the
    /// montants from its totals.
    pub fn choose_facture(&mut self, id_facture: i64) -> TerminalResult<()> {
        let facture = self
            .factures
            .iter()
            .find(|f| f.id_facture == id_facture)
            .cloned()
            .ok_or(CoreError::NoFactureSelected)?;

        let selection = SelectedFacture::new(facture, Vec::new());
        self.draft_mut()?.select_facture(&selection);
        self.selection = Some(selection);
        Ok(())
    }

    /// Fetches the returnable lines of the selected invoice and opens the
    /// article picker.
    pub async fn open_article_selection(&mut self) -> TerminalResult<()> {
        let id_facture = self
            .draft
            .as_ref()
            .and_then(|d| d.id_facture)
            .ok_or(CoreError::NoFactureSelected)?;

        let lignes = self.backend.articles_disponibles(id_facture).await?;
        if lignes.is_empty() {
            return Err(CoreError::NoReturnableArticles.into());
        }

        let facture = self
            .factures
            .iter()
            .find(|f| f.id_facture == id_facture)
            .cloned()
            .ok_or(CoreError::NoFactureSelected)?;
        self.selection = Some(SelectedFacture::new(facture, lignes));
        Ok(())
    }

    /// Ticks or unticks a row in the article picker.
    pub fn toggle_article(&mut self, id_article: i64) -> TerminalResult<()> {
        let selection = self
            .selection
            .as_mut()
            .ok_or(CoreError::NoFactureSelected)?;
        Ok(selection.toggle_article(id_article)?)
    }

    /// Sets the quantity to return on a picker row.
    pub fn set_quantite_retour(&mut self, id_article: i64, quantite: f64) -> TerminalResult<()> {
        let selection = self
            .selection
            .as_mut()
            .ok_or(CoreError::NoFactureSelected)?;
        Ok(selection.set_quantite_retour(id_article, quantite)?)
    }

    /// Confirms the picker: derives the avoir lines and montants from the
    /// ticked rows. A rejected selection leaves the draft untouched.
    pub fn apply_selection(&mut self) -> TerminalResult<()> {
        let selection = self
            .selection
            .as_ref()
            .ok_or(CoreError::NoFactureSelected)?;
        let draft = self.draft.as_mut().ok_or(CoreError::NoFactureSelected)?;
        Ok(draft.apply_selection(selection)?)
    }

    // =========================================================================
    // Form Fields
    // =========================================================================

    pub fn set_numero_avoir(&mut self, numero_avoir: &str) -> TerminalResult<()> {
        self.draft_mut()?.numero_avoir = numero_avoir.to_string();
        Ok(())
    }

    pub fn set_motif(&mut self, motif: &str) -> TerminalResult<()> {
        self.draft_mut()?.motif = motif.to_string();
        Ok(())
    }

    pub fn set_date_avoir(&mut self, date_avoir: NaiveDate) -> TerminalResult<()> {
        self.draft_mut()?.date_avoir = date_avoir;
        Ok(())
    }

    /// Manual HT entry; refused once a selection locked the montants.
    pub fn set_montant_ht(&mut self, montant_ht: f64) -> TerminalResult<()> {
        Ok(self.draft_mut()?.set_montant_ht(montant_ht)?)
    }

    /// Manual TTC entry; refused once a selection locked the montants.
    pub fn set_montant_ttc(&mut self, montant_ttc: f64) -> TerminalResult<()> {
        Ok(self.draft_mut()?.set_montant_ttc(montant_ttc)?)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn draft(&self) -> Option<&AvoirDraft> {
        self.draft.as_ref()
    }

    pub fn selection(&self) -> Option<&SelectedFacture> {
        self.selection.as_ref()
    }

    pub fn factures(&self) -> &[FactureSummary] {
        &self.factures
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Drops the draft without saving.
    pub fn abandon(&mut self) {
        self.draft = None;
        self.editing = None;
        self.selection = None;
        self.factures.clear();
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Validates the draft and sends it.
    ///
    /// A backend failure keeps the draft so the operator can retry; only a
    /// saved avoir clears the editor.
    pub async fn submit(&mut self) -> TerminalResult<AvoirSummary> {
        let payload = self
            .draft
            .as_ref()
            .ok_or(CoreError::NoFactureSelected)?
            .submit()?;

        let saved = match self.editing {
            Some(id_avoir) => self.backend.update_avoir(id_avoir, &payload).await?,
            None => self.backend.create_avoir(&payload).await?,
        };

        info!(
            numero = %saved.numero_avoir,
            montant = saved.montant_ttc,
            "Avoir saved"
        );
        self.draft = None;
        self.editing = None;
        self.selection = None;
        Ok(saved)
    }

    // =========================================================================
    // List-Page Actions
    // =========================================================================

    pub async fn list(&self) -> TerminalResult<Vec<AvoirSummary>> {
        Ok(self.backend.list_avoirs().await?)
    }

    /// Validates an avoir; the backend reconciles the invoice.
    ///
    /// The status gate runs locally first so a stale list row fails fast.
    pub async fn valider(&self, avoir: &AvoirSummary) -> TerminalResult<AvoirValidation> {
        if !avoir.statut.can_validate() {
            return Err(CoreError::InvalidStatus {
                action: "valider".to_string(),
                statut: avoir.statut.libelle().to_string(),
            }
            .into());
        }
        Ok(self.backend.valider_avoir(avoir.id_avoir).await?)
    }

    pub async fn refuser(&self, avoir: &AvoirSummary) -> TerminalResult<AvoirSummary> {
        if !avoir.statut.can_refuse() {
            return Err(CoreError::InvalidStatus {
                action: "refuser".to_string(),
                statut: avoir.statut.libelle().to_string(),
            }
            .into());
        }
        Ok(self.backend.refuser_avoir(avoir.id_avoir).await?)
    }

    pub async fn supprimer(&self, avoir: &AvoirSummary) -> TerminalResult<()> {
        if !avoir.statut.can_delete() {
            return Err(CoreError::InvalidStatus {
                action: "supprimer".to_string(),
                statut: avoir.statut.libelle().to_string(),
            }
            .into());
        }
        Ok(self.backend.delete_avoir(avoir.id_avoir).await?)
    }
}
