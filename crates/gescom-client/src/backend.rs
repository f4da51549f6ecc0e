//! # Backend Client - Typed HTTP Client for the Gescom Backend
//!
//! One method per backend endpoint, with the JSON shapes the backend
//! actually serves. All money travels as plain floats; computation happens
//! in `gescom-core` before a payload reaches this module.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       BackendClient Architecture                        │
//! │                                                                         │
//! │  ┌────────────────────────────────────────────────────────────────────┐│
//! │  │                   BackendClient (this module)                      ││
//! │  │                                                                    ││
//! │  │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────────────┐ ││
//! │  │  │ AuthSession  │  │ Comptoir ops │  │ Avoir ops                │ ││
//! │  │  │              │  │              │  │                          │ ││
//! │  │  │ login/logout │  │ search/vente │  │ create/update/delete     │ ││
//! │  │  │ bearer token │  │ historique   │  │ valider/refuser          │ ││
//! │  │  │ RwLock store │  │ ventes jour  │  │ numero generation        │ ││
//! │  │  └──────────────┘  └──────────────┘  └──────────────────────────┘ ││
//! │  └────────────────────────────────────────────────────────────────────┘│
//! │                                 │                                       │
//! │                                 │ JSON over HTTP (reqwest)             │
//! │                                 ▼                                       │
//! │  ┌────────────────────────────────────────────────────────────────────┐│
//! │  │                     FastAPI backend (port 8000)                    ││
//! │  │                                                                    ││
//! │  │  /api/auth │ /api/articles │ /api/comptoir │ /api/factures        ││
//! │  │  /api/avoirs                                                       ││
//! │  └────────────────────────────────────────────────────────────────────┘│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Error Mapping
//! Non-2xx responses carry a FastAPI body `{"detail": "..."}`. The detail is
//! French and shown to the operator verbatim; when the body is not JSON the
//! client falls back to `Erreur serveur (HTTP {status})`.

use std::sync::Arc;

use reqwest::header;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use gescom_core::{
    Article, AvoirPayload, AvoirStatus, AvoirSummary, FactureArticle, FactureSummary,
    SalesTodayCheck, VenteHistorique, VentePayload, VenteReceipt, VentesJour,
};

use crate::auth::{AuthSession, LoginRequest, LoginResponse};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

// =============================================================================
// Response Envelopes
// =============================================================================

/// FastAPI error body.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    detail: String,
}

/// `GET /api/avoirs/generate-numero` response.
#[derive(Debug, Deserialize)]
struct NumeroAvoir {
    numero_avoir: String,
}

/// Bare `{"message": ...}` acknowledgements.
#[derive(Debug, Deserialize)]
struct MessageBody {
    #[serde(default)]
    message: String,
}

/// `PUT /api/avoirs/{id}/refuser` response.
#[derive(Debug, Deserialize)]
struct RefusEnvelope {
    #[serde(default)]
    message: String,
    avoir: AvoirSummary,
}

/// Outcome of `PUT /api/avoirs/{id}/valider`.
///
/// Validation is the backend's transaction: it flips the avoir to TRAITE,
/// books the negative reglement, restocks PRODUIT lines and recomputes the
/// invoice status. The client only displays what came back.
#[derive(Debug, Clone, Deserialize)]
pub struct AvoirValidation {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub avoir: AvoirValide,
    #[serde(default)]
    pub facture_nouveau_statut: String,
    #[serde(default)]
    pub facture_solde_restant: f64,
}

/// The validated avoir inside an [`AvoirValidation`].
#[derive(Debug, Clone, Deserialize)]
pub struct AvoirValide {
    pub id_avoir: i64,
    pub numero_avoir: String,
    pub statut: AvoirStatus,
    pub montant_ttc: f64,
}

/// Outcome of `DELETE /api/comptoir/ventes/{id}` (stock is restored server
/// side for PRODUIT lines).
#[derive(Debug, Clone, Deserialize)]
pub struct VenteSuppression {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub articles_remis_en_stock: i64,
}

// =============================================================================
// Status Mapping
// =============================================================================

/// Maps a non-2xx status plus its extracted detail to a typed error.
fn status_error(status: u16, detail: String) -> ClientError {
    match status {
        401 => ClientError::Unauthorized { detail },
        404 => ClientError::NotFound { detail },
        s if s >= 500 => ClientError::ServerError { status: s, detail },
        s => ClientError::Rejected { status: s, detail },
    }
}

// =============================================================================
// Backend Client
// =============================================================================

/// Typed HTTP client for the Gescom backend.
///
/// Cheap to clone conceptually but not `Clone` itself: share it behind an
/// `Arc` (the terminal does). The auth session lives in an `RwLock` so a
/// login on one task is visible to all requests.
pub struct BackendClient {
    config: ClientConfig,
    http: reqwest::Client,
    session: Arc<RwLock<Option<AuthSession>>>,
}

impl BackendClient {
    /// Creates a client from the given configuration.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            config,
            http,
            session: Arc::new(RwLock::new(None)),
        })
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // =========================================================================
    // Session Management
    // =========================================================================

    /// Authenticates against `POST /api/auth/login` and stores the session.
    ///
    /// A 401 carries the backend's reason (unknown user, disabled account,
    /// wrong password) as its French `detail`.
    pub async fn login(&self, nom_utilisateur: &str, mot_de_passe: &str) -> ClientResult<AuthSession> {
        let body = LoginRequest {
            nom_utilisateur: nom_utilisateur.to_string(),
            mot_de_passe: mot_de_passe.to_string(),
        };

        let resp = self
            .http
            .post(self.config.endpoint("/api/auth/login"))
            .json(&body)
            .send()
            .await?;
        let login: LoginResponse = Self::parse(resp).await?;

        let session = AuthSession::from(login);
        info!(
            utilisateur = %session.utilisateur().nom_utilisateur,
            role = session.utilisateur().role.as_deref().unwrap_or("-"),
            "Authenticated against backend"
        );

        *self.session.write().await = Some(session.clone());
        Ok(session)
    }

    /// Drops the stored session. The backend keeps no server-side session,
    /// so logout is purely local.
    pub async fn logout(&self) {
        *self.session.write().await = None;
        debug!("Session cleared");
    }

    /// Returns a clone of the current session, if logged in.
    pub async fn current_session(&self) -> Option<AuthSession> {
        self.session.read().await.clone()
    }

    /// True once `login` has succeeded.
    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_some()
    }

    // =========================================================================
    // Request Plumbing
    // =========================================================================

    /// Attaches the bearer token (when logged in), sends, and parses.
    async fn send<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> ClientResult<T> {
        let bearer = self.session.read().await.as_ref().map(AuthSession::bearer);
        let req = match bearer {
            Some(value) => req.header(header::AUTHORIZATION, value),
            None => req,
        };
        let resp = req.send().await?;
        Self::parse(resp).await
    }

    async fn parse<T: DeserializeOwned>(resp: reqwest::Response) -> ClientResult<T> {
        if !resp.status().is_success() {
            return Err(Self::error_from_response(resp).await);
        }
        resp.json::<T>()
            .await
            .map_err(|e| ClientError::DeserializationFailed(e.to_string()))
    }

    async fn error_from_response(resp: reqwest::Response) -> ClientError {
        let status = resp.status().as_u16();
        let detail = resp
            .json::<ApiErrorBody>()
            .await
            .map(|body| body.detail)
            .unwrap_or_else(|_| format!("Erreur serveur (HTTP {})", status));
        status_error(status, detail)
    }

    // =========================================================================
    // Articles
    // =========================================================================

    /// Full catalog, `GET /api/articles`.
    pub async fn list_articles(&self) -> ClientResult<Vec<Article>> {
        debug!("Fetching article catalog");
        self.send(self.http.get(self.config.endpoint("/api/articles")))
            .await
    }

    /// Quick search on designation or code, `GET /api/comptoir/articles/search`.
    pub async fn search_articles(&self, q: &str, limit: usize) -> ClientResult<Vec<Article>> {
        debug!(q, limit, "Searching articles");
        self.send(
            self.http
                .get(self.config.endpoint("/api/comptoir/articles/search"))
                .query(&[("q", q.to_string()), ("limit", limit.to_string())]),
        )
        .await
    }

    /// Best sellers for the counter grid, `GET /api/comptoir/articles/populaires`.
    pub async fn popular_articles(&self, limit: usize) -> ClientResult<Vec<Article>> {
        debug!(limit, "Fetching popular articles");
        self.send(
            self.http
                .get(self.config.endpoint("/api/comptoir/articles/populaires"))
                .query(&[("limit", limit.to_string())]),
        )
        .await
    }

    // =========================================================================
    // Comptoir
    // =========================================================================

    /// Whether at least one counter sale exists today.
    ///
    /// Return mode is gated on this check (no sales today means nothing can
    /// come back over the counter).
    pub async fn has_sales_today(&self) -> ClientResult<SalesTodayCheck> {
        debug!("Checking for sales today");
        self.send(
            self.http
                .get(self.config.endpoint("/api/comptoir/verifier-ventes-aujourd-hui")),
        )
        .await
    }

    /// Today's running total and tickets, `GET /api/comptoir/ventes/aujourdhui`.
    /// RETOUR tickets count negative in `total_jour`.
    pub async fn ventes_du_jour(&self) -> ClientResult<VentesJour> {
        debug!("Fetching today's sales");
        self.send(
            self.http
                .get(self.config.endpoint("/api/comptoir/ventes/aujourdhui")),
        )
        .await
    }

    /// Submits a counter sale or return, `POST /api/comptoir/vente`.
    ///
    /// The backend assigns `numero_facture` (F + timestamp), books the sale
    /// as paid and moves stock for PRODUIT lines (SORTIE on COMPTOIR,
    /// ENTREE on RETOUR).
    pub async fn create_vente(&self, payload: &VentePayload) -> ClientResult<VenteReceipt> {
        info!(
            type_vente = %payload.type_vente,
            nb_lignes = payload.articles.len(),
            total_ttc = payload.total_ttc,
            "Submitting counter sale"
        );

        let receipt: VenteReceipt = self
            .send(
                self.http
                    .post(self.config.endpoint("/api/comptoir/vente"))
                    .json(payload),
            )
            .await?;

        info!(
            numero = %receipt.numero_facture,
            monnaie = receipt.monnaie,
            "Sale recorded"
        );
        Ok(receipt)
    }

    /// Counter sale history, `GET /api/comptoir/ventes`.
    pub async fn list_ventes(&self, limit: usize) -> ClientResult<Vec<VenteHistorique>> {
        debug!(limit, "Fetching sale history");
        self.send(
            self.http
                .get(self.config.endpoint("/api/comptoir/ventes"))
                .query(&[("limit", limit.to_string())]),
        )
        .await
    }

    /// A single past sale with its lines, `GET /api/comptoir/ventes/{id}`.
    pub async fn get_vente(&self, id_facture: i64) -> ClientResult<VenteHistorique> {
        debug!(id_facture, "Fetching sale");
        self.send(
            self.http
                .get(self.config.endpoint(&format!("/api/comptoir/ventes/{id_facture}"))),
        )
        .await
    }

    /// Deletes a past sale; the backend restores PRODUIT stock.
    pub async fn delete_vente(&self, id_facture: i64) -> ClientResult<VenteSuppression> {
        info!(id_facture, "Deleting counter sale");
        let outcome: VenteSuppression = self
            .send(
                self.http
                    .delete(self.config.endpoint(&format!("/api/comptoir/ventes/{id_facture}"))),
            )
            .await?;
        info!(
            id_facture,
            restocked = outcome.articles_remis_en_stock,
            "Sale deleted"
        );
        Ok(outcome)
    }

    // =========================================================================
    // Factures
    // =========================================================================

    /// Invoices, optionally filtered by client, `GET /api/factures`.
    pub async fn factures_for_client(
        &self,
        id_client: Option<i64>,
    ) -> ClientResult<Vec<FactureSummary>> {
        debug!(?id_client, "Fetching invoices");
        let mut req = self.http.get(self.config.endpoint("/api/factures"));
        if let Some(id) = id_client {
            req = req.query(&[("id_client", id.to_string())]);
        }
        self.send(req).await
    }

    /// Lines of an invoice available for a credit note,
    /// `GET /api/factures/{id}/articles-disponibles`.
    pub async fn articles_disponibles(&self, id_facture: i64) -> ClientResult<Vec<FactureArticle>> {
        debug!(id_facture, "Fetching returnable invoice lines");
        self.send(self.http.get(
            self.config
                .endpoint(&format!("/api/factures/{id_facture}/articles-disponibles")),
        ))
        .await
    }

    // =========================================================================
    // Avoirs
    // =========================================================================

    /// All credit notes, `GET /api/avoirs`.
    pub async fn list_avoirs(&self) -> ClientResult<Vec<AvoirSummary>> {
        debug!("Fetching avoirs");
        self.send(self.http.get(self.config.endpoint("/api/avoirs")))
            .await
    }

    /// Next `AVO-{year}-{seq}` numero, `GET /api/avoirs/generate-numero`.
    pub async fn generate_numero_avoir(&self) -> ClientResult<String> {
        debug!("Generating avoir numero");
        let envelope: NumeroAvoir = self
            .send(
                self.http
                    .get(self.config.endpoint("/api/avoirs/generate-numero")),
            )
            .await?;
        Ok(envelope.numero_avoir)
    }

    /// Creates a credit note, `POST /api/avoirs`.
    pub async fn create_avoir(&self, payload: &AvoirPayload) -> ClientResult<AvoirSummary> {
        info!(
            numero = %payload.numero_avoir,
            id_facture = payload.id_facture,
            montant = payload.montant,
            "Creating avoir"
        );
        self.send(
            self.http
                .post(self.config.endpoint("/api/avoirs"))
                .json(payload),
        )
        .await
    }

    /// Updates an EN_ATTENTE credit note, `PUT /api/avoirs/{id}`.
    ///
    /// Anything already processed comes back as a 400 with the backend's
    /// French explanation.
    pub async fn update_avoir(
        &self,
        id_avoir: i64,
        payload: &AvoirPayload,
    ) -> ClientResult<AvoirSummary> {
        info!(id_avoir, montant = payload.montant, "Updating avoir");
        let body = Self::update_body(payload)?;
        self.send(
            self.http
                .put(self.config.endpoint(&format!("/api/avoirs/{id_avoir}")))
                .json(&body),
        )
        .await
    }

    /// The update handler reads the amount from a `montant_ttc` key while
    /// the create handler persists `montant` (and rejects unknown keys), so
    /// the update body carries both.
    fn update_body(payload: &AvoirPayload) -> ClientResult<serde_json::Value> {
        let mut body = serde_json::to_value(payload)?;
        if let serde_json::Value::Object(ref mut map) = body {
            map.insert(
                "montant_ttc".to_string(),
                serde_json::Value::from(payload.montant),
            );
        }
        Ok(body)
    }

    /// Deletes an EN_ATTENTE credit note, `DELETE /api/avoirs/{id}`.
    pub async fn delete_avoir(&self, id_avoir: i64) -> ClientResult<()> {
        info!(id_avoir, "Deleting avoir");
        let ack: MessageBody = self
            .send(
                self.http
                    .delete(self.config.endpoint(&format!("/api/avoirs/{id_avoir}"))),
            )
            .await?;
        debug!(id_avoir, message = %ack.message, "Avoir deleted");
        Ok(())
    }

    /// Validates a credit note, `PUT /api/avoirs/{id}/valider`.
    ///
    /// This is the reconciliation transaction: statut becomes TRAITE, the
    /// refund is booked against the invoice and PRODUIT lines return to
    /// stock. The response reports the invoice's new status and remaining
    /// balance.
    pub async fn valider_avoir(&self, id_avoir: i64) -> ClientResult<AvoirValidation> {
        info!(id_avoir, "Validating avoir");
        let outcome: AvoirValidation = self
            .send(
                self.http
                    .put(self.config.endpoint(&format!("/api/avoirs/{id_avoir}/valider"))),
            )
            .await?;
        info!(
            id_avoir,
            facture_statut = %outcome.facture_nouveau_statut,
            solde_restant = outcome.facture_solde_restant,
            "Avoir validated"
        );
        Ok(outcome)
    }

    /// Refuses a credit note, `PUT /api/avoirs/{id}/refuser`. No financial
    /// side effects; statut becomes REFUSE.
    pub async fn refuser_avoir(&self, id_avoir: i64) -> ClientResult<AvoirSummary> {
        info!(id_avoir, "Refusing avoir");
        let envelope: RefusEnvelope = self
            .send(
                self.http
                    .put(self.config.endpoint(&format!("/api/avoirs/{id_avoir}/refuser"))),
            )
            .await?;
        debug!(id_avoir, message = %envelope.message, "Avoir refused");
        Ok(envelope.avoir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use gescom_core::LigneAvoir;

    #[test]
    fn test_status_error_mapping() {
        assert!(matches!(
            status_error(401, "Mot de passe incorrect".into()),
            ClientError::Unauthorized { .. }
        ));
        assert!(matches!(
            status_error(404, "Avoir non trouvé".into()),
            ClientError::NotFound { .. }
        ));
        assert!(matches!(
            status_error(400, "Cet avoir a déjà été traité".into()),
            ClientError::Rejected { status: 400, .. }
        ));
        assert!(matches!(
            status_error(500, "Erreur".into()),
            ClientError::ServerError { status: 500, .. }
        ));
    }

    #[test]
    fn test_validation_response_shape() {
        let json = r#"{
            "success": true,
            "message": "Avoir AVO-2026-007 validé et traité",
            "avoir": {
                "id_avoir": 7,
                "numero_avoir": "AVO-2026-007",
                "statut": "TRAITE",
                "montant_ttc": 4000.0
            },
            "facture_nouveau_statut": "Partiellement payée",
            "facture_solde_restant": 1000.0
        }"#;

        let outcome: AvoirValidation = serde_json::from_str(json).unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.avoir.statut, AvoirStatus::Traite);
        assert_eq!(outcome.avoir.montant_ttc, 4000.0);
        assert_eq!(outcome.facture_solde_restant, 1000.0);
    }

    #[test]
    fn test_raw_avoir_row_parses_as_summary() {
        // POST /api/avoirs echoes the raw row: amount under "montant".
        let json = r#"{
            "id_avoir": 3,
            "numero_avoir": "AVO-2026-003",
            "date_avoir": "2026-08-26",
            "id_facture": 12,
            "motif": "Article défectueux",
            "montant": 4000.0,
            "statut": "EN_ATTENTE"
        }"#;

        let avoir: AvoirSummary = serde_json::from_str(json).unwrap();
        assert_eq!(avoir.montant_ttc, 4000.0);
        assert_eq!(avoir.statut, AvoirStatus::EnAttente);
    }

    #[test]
    fn test_update_body_carries_both_amount_keys() {
        let payload = AvoirPayload {
            numero_avoir: "AVO-2026-003".to_string(),
            date_avoir: NaiveDate::from_ymd_opt(2026, 8, 26).unwrap(),
            id_facture: 12,
            motif: "Article défectueux".to_string(),
            montant: 4000.0,
            statut: AvoirStatus::EnAttente,
            lignes: vec![LigneAvoir {
                id_article: 1,
                quantite: 2.0,
                prix_unitaire: 2000.0,
                montant_ht: 4000.0,
                montant_ttc: 4000.0,
            }],
        };

        let body = BackendClient::update_body(&payload).unwrap();
        assert_eq!(body["montant"], 4000.0);
        assert_eq!(body["montant_ttc"], 4000.0);
        assert_eq!(body["lignes"][0]["quantite"], 2.0);
    }

    #[test]
    fn test_suppression_response_shape() {
        let json = r#"{
            "success": true,
            "message": "Vente F20260826101530 supprimée avec succès",
            "articles_remis_en_stock": 2
        }"#;
        let outcome: VenteSuppression = serde_json::from_str(json).unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.articles_remis_en_stock, 2);
    }
}
