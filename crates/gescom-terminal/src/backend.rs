//! # Backend Seam
//!
//! The terminal flows never talk to `reqwest` directly; they go through the
//! [`Backend`] trait. Production wires in [`gescom_client::BackendClient`],
//! tests wire in a scripted mock. The trait carries only the operations the
//! session and the avoir workflow actually drive.

use async_trait::async_trait;

use gescom_client::{AvoirValidation, BackendClient, ClientResult};
use gescom_core::{
    AvoirPayload, AvoirSummary, FactureArticle, FactureSummary, SalesTodayCheck, VentePayload,
    VenteReceipt,
};

/// Async seam between the terminal flows and the HTTP client.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Whether at least one counter sale exists today (gates return mode).
    async fn has_sales_today(&self) -> ClientResult<SalesTodayCheck>;

    /// Submits a counter sale or return.
    async fn create_vente(&self, payload: &VentePayload) -> ClientResult<VenteReceipt>;

    /// Invoices, optionally filtered by client.
    async fn factures_for_client(
        &self,
        id_client: Option<i64>,
    ) -> ClientResult<Vec<FactureSummary>>;

    /// Invoice lines available for a credit note.
    async fn articles_disponibles(&self, id_facture: i64) -> ClientResult<Vec<FactureArticle>>;

    /// All credit notes.
    async fn list_avoirs(&self) -> ClientResult<Vec<AvoirSummary>>;

    /// Next backend-assigned avoir numero.
    async fn generate_numero_avoir(&self) -> ClientResult<String>;

    /// Creates a credit note.
    async fn create_avoir(&self, payload: &AvoirPayload) -> ClientResult<AvoirSummary>;

    /// Updates an EN_ATTENTE credit note.
    async fn update_avoir(
        &self,
        id_avoir: i64,
        payload: &AvoirPayload,
    ) -> ClientResult<AvoirSummary>;

    /// Deletes an EN_ATTENTE credit note.
    async fn delete_avoir(&self, id_avoir: i64) -> ClientResult<()>;

    /// Validates a credit note (the backend reconciles the invoice).
    async fn valider_avoir(&self, id_avoir: i64) -> ClientResult<AvoirValidation>;

    /// Refuses a credit note.
    async fn refuser_avoir(&self, id_avoir: i64) -> ClientResult<AvoirSummary>;
}

#[async_trait]
impl Backend for BackendClient {
    async fn has_sales_today(&self) -> ClientResult<SalesTodayCheck> {
        BackendClient::has_sales_today(self).await
    }

    async fn create_vente(&self, payload: &VentePayload) -> ClientResult<VenteReceipt> {
        BackendClient::create_vente(self, payload).await
    }

    async fn factures_for_client(
        &self,
        id_client: Option<i64>,
    ) -> ClientResult<Vec<FactureSummary>> {
        BackendClient::factures_for_client(self, id_client).await
    }

    async fn articles_disponibles(&self, id_facture: i64) -> ClientResult<Vec<FactureArticle>> {
        BackendClient::articles_disponibles(self, id_facture).await
    }

    async fn list_avoirs(&self) -> ClientResult<Vec<AvoirSummary>> {
        BackendClient::list_avoirs(self).await
    }

    async fn generate_numero_avoir(&self) -> ClientResult<String> {
        BackendClient::generate_numero_avoir(self).await
    }

    async fn create_avoir(&self, payload: &AvoirPayload) -> ClientResult<AvoirSummary> {
        BackendClient::create_avoir(self, payload).await
    }

    async fn update_avoir(
        &self,
        id_avoir: i64,
        payload: &AvoirPayload,
    ) -> ClientResult<AvoirSummary> {
        BackendClient::update_avoir(self, id_avoir, payload).await
    }

    async fn delete_avoir(&self, id_avoir: i64) -> ClientResult<()> {
        BackendClient::delete_avoir(self, id_avoir).await
    }

    async fn valider_avoir(&self, id_avoir: i64) -> ClientResult<AvoirValidation> {
        BackendClient::valider_avoir(self, id_avoir).await
    }

    async fn refuser_avoir(&self, id_avoir: i64) -> ClientResult<AvoirSummary> {
        BackendClient::refuser_avoir(self, id_avoir).await
    }
}

// =============================================================================
// Scripted Mock (test builds only)
// =============================================================================
