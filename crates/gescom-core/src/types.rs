//! # Domain Types
//!
//! Wire-faithful types for the Gescom backend's JSON contract, plus the
//! enums the engines dispatch on.
//!
//! ## Type Relationships
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Domain Type Map                                  │
//! │                                                                         │
//! │  Article ───────────► CartLine (snapshot at add time)                  │
//! │   │ type_article                                                        │
//! │   ▼                                                                     │
//! │  ArticleKind (PRODUIT / SERVICE)                                       │
//! │                                                                         │
//! │  FactureSummary ───► SelectedFacture (avoir draft)                     │
//! │   │                                                                     │
//! │   └─► FactureArticle (returnable line) ─► AvoirSelection ─► LigneAvoir │
//! │                                                                         │
//! │  SaleKind (COMPTOIR / RETOUR) = terminal mode AND persisted type_vente │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Field names are the backend's French snake_case names so serde needs no
//! rename attributes. Amounts are `f64` on the wire; the engines convert to
//! `Decimal` for arithmetic (see [`crate::money`]).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Article Kind
// =============================================================================

/// Article classification.
///
/// PRODUIT articles move stock; SERVICE articles never do, but they are the
/// only ones that carry precompte on line-item documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ArticleKind {
    Produit,
    Service,
}

impl std::fmt::Display for ArticleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArticleKind::Produit => write!(f, "PRODUIT"),
            ArticleKind::Service => write!(f, "SERVICE"),
        }
    }
}

// =============================================================================
// Sale Kind
// =============================================================================

/// The two counter operations.
///
/// One enum serves double duty: it is the terminal's current mode and the
/// `type_vente` persisted with the sale. The backend decrements stock for
/// COMPTOIR and increments it for RETOUR; line quantities stay positive in
/// both cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum SaleKind {
    #[default]
    Comptoir,
    Retour,
}

impl SaleKind {
    /// Returns true for return mode (stock flows back in).
    pub fn is_retour(&self) -> bool {
        matches!(self, SaleKind::Retour)
    }
}

impl std::fmt::Display for SaleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaleKind::Comptoir => write!(f, "COMPTOIR"),
            SaleKind::Retour => write!(f, "RETOUR"),
        }
    }
}

// =============================================================================
// Payment Mode
// =============================================================================

/// Payment modes offered at the counter.
///
/// Wire spellings match the backend's display strings (accents included).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PaymentMode {
    #[default]
    #[serde(rename = "Espèces")]
    Especes,
    #[serde(rename = "Carte")]
    Carte,
    #[serde(rename = "Mobile")]
    Mobile,
    #[serde(rename = "Chèque")]
    Cheque,
}

impl PaymentMode {
    /// Cash is the only mode where the received amount is checked against
    /// the total due at checkout.
    pub fn is_cash(&self) -> bool {
        matches!(self, PaymentMode::Especes)
    }
}

// =============================================================================
// Avoir Status
// =============================================================================

/// Credit-note lifecycle status.
///
/// ## Transitions
/// ```text
/// EN_ATTENTE ──valider──► TRAITE   (refund booked, stock restored)
///     │
///     └──refuser──► REFUSE          (irreversible)
/// ```
/// Only EN_ATTENTE avoirs may be modified or deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum AvoirStatus {
    #[default]
    EnAttente,
    Valide,
    Refuse,
    Traite,
}

impl AvoirStatus {
    pub fn can_modify(&self) -> bool {
        matches!(self, AvoirStatus::EnAttente)
    }

    pub fn can_delete(&self) -> bool {
        matches!(self, AvoirStatus::EnAttente)
    }

    pub fn can_validate(&self) -> bool {
        matches!(self, AvoirStatus::EnAttente)
    }

    pub fn can_refuse(&self) -> bool {
        matches!(self, AvoirStatus::EnAttente)
    }

    /// French label shown in the avoir list.
    pub fn libelle(&self) -> &'static str {
        match self {
            AvoirStatus::EnAttente => "En attente",
            AvoirStatus::Valide => "Validé",
            AvoirStatus::Refuse => "Refusé",
            AvoirStatus::Traite => "Traité",
        }
    }
}

impl std::fmt::Display for AvoirStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AvoirStatus::EnAttente => write!(f, "EN_ATTENTE"),
            AvoirStatus::Valide => write!(f, "VALIDE"),
            AvoirStatus::Refuse => write!(f, "REFUSE"),
            AvoirStatus::Traite => write!(f, "TRAITE"),
        }
    }
}

// =============================================================================
// Article
// =============================================================================

/// An article as served by `GET /api/articles` and the comptoir search.
///
/// The search endpoint returns a reduced field set, so everything beyond the
/// identity fields defaults when absent.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Article {
    pub id_article: i64,
    #[serde(default)]
    pub code_article: Option<String>,
    pub designation: String,
    #[serde(default)]
    pub prix_vente: Option<f64>,
    #[serde(default)]
    pub stock_actuel: i64,
    #[serde(default)]
    pub stock_alerte: Option<i64>,
    #[serde(default)]
    pub type_article: Option<ArticleKind>,
    #[serde(default)]
    pub categorie: Option<String>,
    #[serde(default)]
    pub unite: Option<String>,
}

impl Article {
    /// Current sale price, zero when the backend row has none.
    pub fn prix(&self) -> f64 {
        self.prix_vente.unwrap_or(0.0)
    }

    /// Stock tracking applies to PRODUIT articles only. An article without
    /// a declared kind is treated like a service: no stock guard, and the
    /// backend moves no stock for it either.
    pub fn is_produit(&self) -> bool {
        self.type_article == Some(ArticleKind::Produit)
    }
}

// =============================================================================
// Facture
// =============================================================================

/// An invoice as served by `GET /api/factures`.
///
/// `precompte_applique` is an integer flag (0/1) in the backend schema, so
/// it stays an integer here; use [`FactureSummary::precompte_active`].
/// Numero format: `F{YYYYMMDDHHMMSS}` for counter sales.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FactureSummary {
    pub id_facture: i64,
    pub numero_facture: String,
    #[serde(default)]
    pub type_facture: Option<String>,
    pub id_client: i64,
    #[ts(as = "String")]
    pub date_facture: NaiveDate,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub date_echeance: Option<NaiveDate>,
    #[serde(default)]
    pub montant_ht: f64,
    #[serde(default)]
    pub montant_ttc: f64,
    /// Amount already collected on this invoice. The avoir ceiling rule
    /// compares against this, never against montant_ttc.
    #[serde(default)]
    pub montant_avance: f64,
    #[serde(default)]
    pub montant_reste: f64,
    #[serde(default)]
    pub precompte_applique: i64,
    pub statut: String,
    #[serde(default)]
    pub mode_paiement: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl FactureSummary {
    pub fn precompte_active(&self) -> bool {
        self.precompte_applique != 0
    }
}

/// A returnable invoice line, from `GET /api/factures/{id}/articles-disponibles`.
///
/// `quantite_facture` is the quantity originally invoiced; the avoir form
/// calls it `quantite_max` because it bounds the returnable quantity.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FactureArticle {
    pub id_article: i64,
    pub designation: String,
    #[serde(default)]
    pub type_article: Option<ArticleKind>,
    #[serde(alias = "quantite_max")]
    pub quantite_facture: f64,
    pub prix_unitaire: f64,
    pub montant_ht: f64,
    pub montant_ttc: f64,
}

// =============================================================================
// Avoir
// =============================================================================

/// A credit-note row from `GET /api/avoirs`.
///
/// The backend stores a single `montant` column. The list endpoint serves it
/// as `montant_ttc`; create/update echo the raw row with `montant`, hence the
/// alias. Numero format: `AVO-{year}-{seq:03}`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AvoirSummary {
    pub id_avoir: i64,
    pub numero_avoir: String,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub date_avoir: Option<NaiveDate>,
    #[serde(default)]
    pub id_facture: Option<i64>,
    #[serde(default)]
    pub facture_numero: Option<String>,
    #[serde(default)]
    pub client_nom: Option<String>,
    #[serde(default)]
    pub motif: Option<String>,
    #[serde(default, alias = "montant")]
    pub montant_ttc: f64,
    #[serde(default)]
    pub statut: AvoirStatus,
}

/// One line of a credit note, proportional to the returned quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LigneAvoir {
    pub id_article: i64,
    pub quantite: f64,
    pub prix_unitaire: f64,
    pub montant_ht: f64,
    pub montant_ttc: f64,
}

// =============================================================================
// Vente (counter sale)
// =============================================================================

/// One cart line as submitted to `POST /api/comptoir/vente`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VenteLigne {
    pub id_article: i64,
    pub quantite: u32,
    pub prix_unitaire: f64,
}

/// The counter-sale submission body.
///
/// The backend recomputes its own totals from `articles`; the ticket totals
/// travel along for the sale record and the printed ticket.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VentePayload {
    pub articles: Vec<VenteLigne>,
    pub montant_recu: f64,
    pub type_vente: SaleKind,
    pub nom_client: String,
    pub mode_paiement: PaymentMode,
    pub total_ht: f64,
    pub total_tva: f64,
    pub total_ttc: f64,
    pub notes: Option<String>,
}

/// Response of a successful sale creation.
///
/// The backend side effects behind this response: the facture row (numero
/// `F{YYYYMMDDHHMMSS}`, statut Payée), and one stock movement per PRODUIT
/// line (COMPTOIR → SORTIE, RETOUR → ENTREE).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VenteReceipt {
    pub success: bool,
    pub facture_id: i64,
    pub numero_facture: String,
    pub montant_ttc: f64,
    pub montant_recu: f64,
    pub monnaie: f64,
}

/// A past counter sale, from `GET /api/comptoir/ventes`. The single-sale
/// endpoint serves the same shape plus `notes`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VenteHistorique {
    pub id_facture: i64,
    pub numero_facture: String,
    #[serde(default)]
    pub date_vente: Option<String>,
    #[serde(default)]
    pub montant_total: f64,
    #[serde(default)]
    pub type_facture: Option<String>,
    #[serde(default)]
    pub client_nom: Option<String>,
    #[serde(default)]
    pub vendeur: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub lignes: Vec<VenteHistoriqueLigne>,
}

/// A line of a past counter sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VenteHistoriqueLigne {
    pub id_article: i64,
    pub quantite: f64,
    pub prix_unitaire: f64,
    #[serde(default)]
    pub total_ht: f64,
    #[serde(default)]
    pub article_nom: Option<String>,
}

/// Today's counter activity, from `GET /api/comptoir/ventes/aujourdhui`.
///
/// `total_jour` nets COMPTOIR sales (positive) against RETOUR refunds
/// (negative).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VentesJour {
    #[serde(default)]
    pub total_jour: f64,
    #[serde(default)]
    pub nb_ventes: i64,
    #[serde(default)]
    pub ventes: Vec<VenteJourLigne>,
}

/// One entry of the daily summary.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VenteJourLigne {
    pub numero: String,
    pub montant: f64,
    #[serde(default)]
    pub heure: String,
}

/// Answer of `GET /api/comptoir/verifier-ventes-aujourd-hui`, gating the
/// switch into return mode.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesTodayCheck {
    pub ventes_aujourd_hui: bool,
    #[serde(default)]
    pub nombre_ventes: i64,
}

// =============================================================================
// Devis line (per-line precompte input)
// =============================================================================

/// A quote line as built in the devis form.
///
/// `montant_ht = quantite × prix_unitaire`; the per-line precompte path in
/// [`crate::tax`] consumes these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DevisLigne {
    pub id_article: i64,
    pub designation: String,
    pub type_article: ArticleKind,
    pub quantite: u32,
    pub prix_unitaire: f64,
    pub montant_ht: f64,
}

// =============================================================================
// Utilisateur
// =============================================================================

/// A user as embedded in the login response.
///
/// `droits` is the raw rights blob; resolve it once with
/// [`crate::permissions::PermissionSet::resolve`] instead of re-parsing it
/// per call site.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Utilisateur {
    pub id_utilisateur: i64,
    pub nom_utilisateur: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default = "default_actif")]
    pub actif: bool,
    #[serde(default)]
    pub droits: Option<String>,
}

fn default_actif() -> bool {
    true
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_wire_spellings() {
        assert_eq!(
            serde_json::to_string(&ArticleKind::Produit).unwrap(),
            "\"PRODUIT\""
        );
        assert_eq!(
            serde_json::to_string(&SaleKind::Retour).unwrap(),
            "\"RETOUR\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentMode::Especes).unwrap(),
            "\"Espèces\""
        );
        assert_eq!(
            serde_json::to_string(&AvoirStatus::EnAttente).unwrap(),
            "\"EN_ATTENTE\""
        );
    }

    #[test]
    fn test_article_tolerates_reduced_search_shape() {
        // The comptoir search omits categorie/unite/stock_alerte
        let json = r#"{
            "id_article": 42,
            "code_article": "ART-042",
            "designation": "Clavier USB",
            "prix_vente": 5000.0,
            "stock_actuel": 3,
            "type_article": "PRODUIT"
        }"#;
        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.prix(), 5000.0);
        assert!(article.is_produit());
        assert_eq!(article.categorie, None);
    }

    #[test]
    fn test_article_without_kind_is_not_produit() {
        let json = r#"{"id_article": 7, "designation": "Main d'oeuvre", "stock_actuel": 0}"#;
        let article: Article = serde_json::from_str(json).unwrap();
        assert!(!article.is_produit());
        assert_eq!(article.prix(), 0.0);
    }

    #[test]
    fn test_facture_precompte_flag_is_integer_on_wire() {
        let json = r#"{
            "id_facture": 1,
            "numero_facture": "F20260826093000",
            "id_client": 9,
            "date_facture": "2026-08-26",
            "montant_ht": 10000.0,
            "montant_ttc": 9050.0,
            "montant_avance": 9050.0,
            "precompte_applique": 1,
            "statut": "Payée"
        }"#;
        let facture: FactureSummary = serde_json::from_str(json).unwrap();
        assert!(facture.precompte_active());
        assert_eq!(facture.montant_avance, 9050.0);
    }

    #[test]
    fn test_avoir_status_rules() {
        assert!(AvoirStatus::EnAttente.can_modify());
        assert!(AvoirStatus::EnAttente.can_validate());
        assert!(!AvoirStatus::Traite.can_modify());
        assert!(!AvoirStatus::Refuse.can_delete());
        assert!(!AvoirStatus::Valide.can_refuse());
        assert_eq!(AvoirStatus::Traite.libelle(), "Traité");
    }

    #[test]
    fn test_vente_payload_wire_shape() {
        let payload = VentePayload {
            articles: vec![VenteLigne {
                id_article: 42,
                quantite: 2,
                prix_unitaire: 5000.0,
            }],
            montant_recu: 10000.0,
            type_vente: SaleKind::Comptoir,
            nom_client: "Client Comptoir".to_string(),
            mode_paiement: PaymentMode::Especes,
            total_ht: 10000.0,
            total_tva: 0.0,
            total_ttc: 10000.0,
            notes: None,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type_vente"], "COMPTOIR");
        assert_eq!(json["articles"][0]["id_article"], 42);
        assert_eq!(json["notes"], serde_json::Value::Null);
    }
}
