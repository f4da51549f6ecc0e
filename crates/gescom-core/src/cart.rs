//! # Counter Cart
//!
//! The in-memory cart behind the comptoir screen.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Counter Action           Cart Method             State Change          │
//! │  ──────────────           ───────────             ────────────          │
//! │                                                                         │
//! │  Click article ──────────► add_article() ───────► merge or push line   │
//! │                              │                                          │
//! │                              └── PRODUIT + mode COMPTOIR:               │
//! │                                  reject when quantity would exceed      │
//! │                                  the stock snapshot                     │
//! │                                                                         │
//! │  Quantity +/- ───────────► update_quantity() ───► qty = n (<1 removes) │
//! │                                                                         │
//! │  Remise % ───────────────► update_discount() ───► remise_pct = p       │
//! │                                                                         │
//! │  Click remove ───────────► remove_line() ───────► lignes.remove(i)     │
//! │                                                                         │
//! │  Vider le panier ────────► clear() ─────────────► lignes.clear()       │
//! │                                                                         │
//! │  Valider la vente ───────► build_payload() ─────► VentePayload         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Lines are unique by `id_article` (adding the same article merges)
//! - In COMPTOIR mode a PRODUIT line never exceeds its stock snapshot;
//!   RETOUR mode has no stock guard (stock flows back in)
//! - Quantities stay in `1..=MAX_LINE_QUANTITY`; setting below 1 removes
//!   the line
//! - A failed operation leaves the cart unchanged

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::{self, MONEY_TOLERANCE};
use crate::tax;
use crate::types::{Article, ArticleKind, PaymentMode, SaleKind, VenteLigne, VentePayload};
use crate::validation;
use crate::MAX_CART_LINES;

// =============================================================================
// Cart Line
// =============================================================================

/// One line of the counter cart.
///
/// ## Design Notes
/// The article data is frozen at add time. If the article is edited in the
/// catalog while the cart is open, the line keeps the price and stock the
/// cashier saw when adding it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub id_article: i64,

    /// Code at time of adding (frozen)
    pub code_article: Option<String>,

    /// Designation at time of adding (frozen)
    pub designation: String,

    /// Unit price at time of adding (frozen)
    pub prix_unitaire: f64,

    /// Line discount in percent, 0 to 100
    pub remise_pct: f64,

    pub quantite: u32,

    /// Kind at time of adding; drives the stock guard
    pub type_article: Option<ArticleKind>,

    /// Stock at time of adding (frozen); the guard ceiling for PRODUIT
    pub stock_actuel: i64,
}

impl CartLine {
    /// Creates a cart line from a catalog article.
    pub fn from_article(article: &Article, quantite: u32) -> Self {
        CartLine {
            id_article: article.id_article,
            code_article: article.code_article.clone(),
            designation: article.designation.clone(),
            prix_unitaire: article.prix(),
            remise_pct: 0.0,
            quantite,
            type_article: article.type_article,
            stock_actuel: article.stock_actuel,
        }
    }

    /// Stock tracking applies only to PRODUIT lines.
    pub fn is_produit(&self) -> bool {
        self.type_article == Some(ArticleKind::Produit)
    }

    /// Unit price after the line discount, rounded to 2 decimals.
    ///
    /// Rounding the unit price (rather than the line total) keeps the
    /// submitted `prix_unitaire` consistent with the ticket totals: the
    /// backend recomputes quantity × unit price from the payload.
    pub fn prix_remise(&self) -> f64 {
        let prix = money::to_decimal(self.prix_unitaire);
        let remise = money::to_decimal(self.remise_pct);
        let facteur = (rust_decimal::Decimal::ONE_HUNDRED - remise)
            / rust_decimal::Decimal::ONE_HUNDRED;
        money::to_f64(prix * facteur)
    }

    /// Line total: quantity × discounted unit price.
    pub fn montant(&self) -> f64 {
        let prix = money::to_decimal(self.prix_remise());
        money::to_f64(prix * rust_decimal::Decimal::from(self.quantite))
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The counter cart.
///
/// The current [`SaleKind`] lives on the cart because the stock guard
/// depends on it. Switching modes goes through [`Cart::reset`], which also
/// empties the lines: a cart never mixes sale and return lines.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    pub lignes: Vec<CartLine>,

    pub mode: SaleKind,

    /// When the cart was created/last cleared
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty cart in the given mode.
    pub fn new(mode: SaleKind) -> Self {
        Cart {
            lignes: Vec::new(),
            mode,
            created_at: Utc::now(),
        }
    }

    /// Adds an article to the cart or merges into an existing line.
    ///
    /// ## Stock Guard (COMPTOIR mode, PRODUIT articles only)
    /// - An article with no stock cannot enter the cart
    /// - A merge that would push the line past `stock_actuel` is rejected
    ///
    /// RETOUR mode skips the guard entirely, and so do SERVICE articles
    /// and articles with no declared kind.
    pub fn add_article(&mut self, article: &Article, quantite: u32) -> CoreResult<()> {
        validation::validate_quantite(quantite)?;

        let guard_stock = self.mode == SaleKind::Comptoir && article.is_produit();

        if let Some(ligne) = self
            .lignes
            .iter_mut()
            .find(|l| l.id_article == article.id_article)
        {
            let nouvelle = ligne.quantite.saturating_add(quantite);
            validation::validate_quantite(nouvelle)?;
            if guard_stock && i64::from(nouvelle) > article.stock_actuel {
                return Err(CoreError::OutOfStock {
                    designation: article.designation.clone(),
                    stock: article.stock_actuel,
                });
            }
            ligne.quantite = nouvelle;
            // Fresh catalog data wins over the old snapshot
            ligne.stock_actuel = article.stock_actuel;
            return Ok(());
        }

        if guard_stock && i64::from(quantite) > article.stock_actuel {
            return Err(CoreError::OutOfStock {
                designation: article.designation.clone(),
                stock: article.stock_actuel,
            });
        }

        if self.lignes.len() >= MAX_CART_LINES {
            return Err(CoreError::CartFull {
                max: MAX_CART_LINES,
            });
        }

        self.lignes.push(CartLine::from_article(article, quantite));
        Ok(())
    }

    /// Sets the quantity of a line.
    ///
    /// ## Behavior
    /// - Any quantity below 1 removes the line (the spinner arrow goes
    ///   through 0 and keyboard entry can produce negatives)
    /// - In COMPTOIR mode a PRODUIT line cannot exceed its stock snapshot
    /// - Unknown article: [`CoreError::LineNotFound`]
    pub fn update_quantity(&mut self, id_article: i64, quantite: i64) -> CoreResult<()> {
        if quantite < 1 {
            return self.remove_line(id_article);
        }

        // Past this point the value is positive; the bound check rejects
        // anything over MAX_LINE_QUANTITY
        let quantite = u32::try_from(quantite).unwrap_or(u32::MAX);
        validation::validate_quantite(quantite)?;

        let guard_stock = self.mode == SaleKind::Comptoir;
        let ligne = self
            .lignes
            .iter_mut()
            .find(|l| l.id_article == id_article)
            .ok_or(CoreError::LineNotFound { id_article })?;

        if guard_stock && ligne.is_produit() && i64::from(quantite) > ligne.stock_actuel {
            return Err(CoreError::OutOfStock {
                designation: ligne.designation.clone(),
                stock: ligne.stock_actuel,
            });
        }

        ligne.quantite = quantite;
        Ok(())
    }

    /// Sets the discount percentage of a line.
    ///
    /// A value outside 0..=100 is rejected and the line keeps its previous
    /// discount.
    pub fn update_discount(&mut self, id_article: i64, remise_pct: f64) -> CoreResult<()> {
        validation::validate_remise(remise_pct)?;

        let ligne = self
            .lignes
            .iter_mut()
            .find(|l| l.id_article == id_article)
            .ok_or(CoreError::LineNotFound { id_article })?;

        ligne.remise_pct = remise_pct;
        Ok(())
    }

    /// Removes a line by article id.
    pub fn remove_line(&mut self, id_article: i64) -> CoreResult<()> {
        let initial_len = self.lignes.len();
        self.lignes.retain(|l| l.id_article != id_article);

        if self.lignes.len() == initial_len {
            Err(CoreError::LineNotFound { id_article })
        } else {
            Ok(())
        }
    }

    /// Clears all lines, keeping the current mode.
    pub fn clear(&mut self) {
        self.lignes.clear();
        self.created_at = Utc::now();
    }

    /// Clears the cart and switches it to the given mode.
    pub fn reset(&mut self, mode: SaleKind) {
        self.clear();
        self.mode = mode;
    }

    pub fn is_empty(&self) -> bool {
        self.lignes.is_empty()
    }

    /// Number of distinct articles.
    pub fn nb_lignes(&self) -> usize {
        self.lignes.len()
    }

    /// Total quantity across all lines.
    pub fn quantite_totale(&self) -> u32 {
        self.lignes.iter().map(|l| l.quantite).sum()
    }

    /// Sum of the line totals. This is the ticket's HT amount.
    pub fn total_ht(&self) -> f64 {
        let somme: rust_decimal::Decimal = self
            .lignes
            .iter()
            .map(|l| money::to_decimal(l.montant()))
            .sum();
        money::to_f64(somme)
    }

    /// Computes the ticket totals for a given received amount and TVA rate.
    ///
    /// The counter runs untaxed by default (`taux_tva` 0): the ticket total
    /// is the sum of the line totals and `monnaie` is what goes back to the
    /// customer. A taxed counter passes its configured rate instead.
    ///
    /// `monnaie` may be negative here; [`Cart::build_payload`] is where an
    /// insufficient cash amount becomes an error.
    pub fn totals(&self, montant_recu: f64, taux_tva: f64) -> CartTotals {
        let total_ht = self.total_ht();
        let total_tva = tax::tva_on(total_ht, taux_tva);
        let ht = money::to_decimal(total_ht);
        let tva = money::to_decimal(total_tva);
        let total_ttc = money::to_f64(ht + tva);
        let recu = money::to_decimal(montant_recu);
        let monnaie = money::to_f64(recu - (ht + tva));

        CartTotals {
            nb_lignes: self.nb_lignes(),
            quantite_totale: self.quantite_totale(),
            total_ht,
            total_tva,
            total_ttc,
            montant_recu,
            monnaie,
        }
    }

    /// Builds the sale submission body.
    ///
    /// ## Checks
    /// - Empty cart: [`CoreError::EmptyCart`]
    /// - Cash payment with `montant_recu` below the ticket total:
    ///   [`CoreError::InsufficientPayment`]
    ///
    /// A missing or non-positive `montant_recu` defaults to the exact ticket
    /// total (customer paid exactly; `monnaie` 0). Only cash checks the
    /// received amount: card and mobile payments settle externally.
    pub fn build_payload(
        &self,
        nom_client: &str,
        mode_paiement: PaymentMode,
        montant_recu: Option<f64>,
        taux_tva: f64,
        notes: Option<String>,
    ) -> CoreResult<VentePayload> {
        if self.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let nom_client = validation::normalize_nom_client(nom_client)?;
        let provisional = self.totals(0.0, taux_tva);
        let recu = match montant_recu {
            Some(m) if m > 0.0 => {
                money::require_finite(m, "montant_recu")?;
                m
            }
            _ => provisional.total_ttc,
        };

        if mode_paiement.is_cash() {
            let manque = money::to_decimal(provisional.total_ttc) - money::to_decimal(recu);
            if manque > MONEY_TOLERANCE {
                return Err(CoreError::InsufficientPayment {
                    attendu: provisional.total_ttc,
                    recu,
                });
            }
        }

        Ok(VentePayload {
            articles: self
                .lignes
                .iter()
                .map(|l| VenteLigne {
                    id_article: l.id_article,
                    quantite: l.quantite,
                    prix_unitaire: l.prix_remise(),
                })
                .collect(),
            montant_recu: recu,
            type_vente: self.mode,
            nom_client,
            mode_paiement,
            total_ht: provisional.total_ht,
            total_tva: provisional.total_tva,
            total_ttc: provisional.total_ttc,
            notes,
        })
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new(SaleKind::Comptoir)
    }
}

// =============================================================================
// Cart Totals
// =============================================================================

/// Ticket totals summary for display and receipts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartTotals {
    pub nb_lignes: usize,
    pub quantite_totale: u32,
    pub total_ht: f64,
    pub total_tva: f64,
    pub total_ttc: f64,
    pub montant_recu: f64,
    /// Received minus TTC; negative means the customer still owes
    pub monnaie: f64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn article(id: i64, prix: f64, stock: i64, kind: ArticleKind) -> Article {
        Article {
            id_article: id,
            code_article: Some(format!("ART-{id:03}")),
            designation: format!("Article {id}"),
            prix_vente: Some(prix),
            stock_actuel: stock,
            stock_alerte: Some(10),
            type_article: Some(kind),
            categorie: None,
            unite: Some("pièce".to_string()),
        }
    }

    #[test]
    fn test_add_article_pushes_line() {
        let mut cart = Cart::new(SaleKind::Comptoir);
        cart.add_article(&article(1, 1500.0, 10, ArticleKind::Produit), 2)
            .unwrap();

        assert_eq!(cart.nb_lignes(), 1);
        assert_eq!(cart.quantite_totale(), 2);
        assert_eq!(cart.total_ht(), 3000.0);
    }

    #[test]
    fn test_add_same_article_merges() {
        let mut cart = Cart::new(SaleKind::Comptoir);
        let art = article(1, 1500.0, 10, ArticleKind::Produit);

        cart.add_article(&art, 2).unwrap();
        cart.add_article(&art, 3).unwrap();

        assert_eq!(cart.nb_lignes(), 1);
        assert_eq!(cart.quantite_totale(), 5);
    }

    #[test]
    fn test_stock_guard_blocks_produit_without_stock() {
        let mut cart = Cart::new(SaleKind::Comptoir);
        let err = cart
            .add_article(&article(1, 1500.0, 0, ArticleKind::Produit), 1)
            .unwrap_err();

        assert!(matches!(err, CoreError::OutOfStock { stock: 0, .. }));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_stock_guard_ignores_services() {
        let mut cart = Cart::new(SaleKind::Comptoir);
        cart.add_article(&article(1, 8000.0, 0, ArticleKind::Service), 1)
            .unwrap();
        assert_eq!(cart.nb_lignes(), 1);
    }

    #[test]
    fn test_stock_guard_ignores_articles_without_kind() {
        let mut cart = Cart::new(SaleKind::Comptoir);
        let mut art = article(1, 500.0, 0, ArticleKind::Produit);
        art.type_article = None;

        cart.add_article(&art, 1).unwrap();
        assert_eq!(cart.nb_lignes(), 1);
    }

    #[test]
    fn test_retour_mode_skips_stock_guard() {
        let mut cart = Cart::new(SaleKind::Retour);
        cart.add_article(&article(1, 1500.0, 0, ArticleKind::Produit), 3)
            .unwrap();
        assert_eq!(cart.quantite_totale(), 3);
    }

    #[test]
    fn test_merge_cannot_exceed_stock() {
        let mut cart = Cart::new(SaleKind::Comptoir);
        let art = article(1, 1500.0, 3, ArticleKind::Produit);

        cart.add_article(&art, 2).unwrap();
        let err = cart.add_article(&art, 2).unwrap_err();

        assert!(matches!(err, CoreError::OutOfStock { stock: 3, .. }));
        // Failed merge leaves the line untouched
        assert_eq!(cart.quantite_totale(), 2);
    }

    #[test]
    fn test_update_quantity_below_one_removes_line() {
        let mut cart = Cart::new(SaleKind::Comptoir);
        let art = article(1, 1500.0, 10, ArticleKind::Produit);

        cart.add_article(&art, 2).unwrap();
        cart.update_quantity(1, 0).unwrap();
        assert!(cart.is_empty());

        cart.add_article(&art, 2).unwrap();
        cart.update_quantity(1, -5).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_respects_stock_snapshot() {
        let mut cart = Cart::new(SaleKind::Comptoir);
        cart.add_article(&article(1, 1500.0, 5, ArticleKind::Produit), 2)
            .unwrap();

        assert!(cart.update_quantity(1, 5).is_ok());
        assert!(matches!(
            cart.update_quantity(1, 6),
            Err(CoreError::OutOfStock { .. })
        ));
        assert_eq!(cart.quantite_totale(), 5);
    }

    #[test]
    fn test_update_unknown_line() {
        let mut cart = Cart::new(SaleKind::Comptoir);
        assert!(matches!(
            cart.update_quantity(99, 1),
            Err(CoreError::LineNotFound { id_article: 99 })
        ));
    }

    #[test]
    fn test_discount_applies_to_line_total() {
        let mut cart = Cart::new(SaleKind::Comptoir);
        cart.add_article(&article(1, 1000.0, 10, ArticleKind::Produit), 3)
            .unwrap();

        cart.update_discount(1, 15.0).unwrap();

        // 1000 × 0.85 = 850 per unit, × 3
        assert_eq!(cart.lignes[0].prix_remise(), 850.0);
        assert_eq!(cart.total_ht(), 2550.0);
    }

    #[test]
    fn test_discount_out_of_range_is_rejected_without_change() {
        let mut cart = Cart::new(SaleKind::Comptoir);
        cart.add_article(&article(1, 1000.0, 10, ArticleKind::Produit), 1)
            .unwrap();
        cart.update_discount(1, 10.0).unwrap();

        assert!(cart.update_discount(1, 101.0).is_err());
        assert!(cart.update_discount(1, -1.0).is_err());
        assert_eq!(cart.lignes[0].remise_pct, 10.0);
    }

    #[test]
    fn test_cart_full() {
        let mut cart = Cart::new(SaleKind::Comptoir);
        for id in 0..MAX_CART_LINES as i64 {
            cart.add_article(&article(id, 100.0, 10, ArticleKind::Produit), 1)
                .unwrap();
        }

        let err = cart
            .add_article(
                &article(10_000, 100.0, 10, ArticleKind::Produit),
                1,
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::CartFull { max } if max == MAX_CART_LINES));
    }

    #[test]
    fn test_totals_untaxed_counter() {
        let mut cart = Cart::new(SaleKind::Comptoir);
        cart.add_article(&article(1, 1500.0, 10, ArticleKind::Produit), 3)
            .unwrap();
        cart.add_article(&article(2, 500.0, 10, ArticleKind::Produit), 1)
            .unwrap();

        let totals = cart.totals(10_000.0, 0.0);

        assert_eq!(totals.total_ht, 5000.0);
        assert_eq!(totals.total_tva, 0.0);
        assert_eq!(totals.total_ttc, 5000.0);
        assert_eq!(totals.monnaie, 5000.0);
    }

    #[test]
    fn test_totals_taxed_counter() {
        let mut cart = Cart::new(SaleKind::Comptoir);
        cart.add_article(&article(1, 1500.0, 10, ArticleKind::Produit), 3)
            .unwrap();
        cart.add_article(&article(2, 500.0, 10, ArticleKind::Produit), 1)
            .unwrap();

        let totals = cart.totals(10_000.0, tax::TAUX_TVA);

        assert_eq!(totals.total_tva, 475.0); // 5000 × 9.5%
        assert_eq!(totals.total_ttc, 5475.0);
        assert_eq!(totals.monnaie, 4525.0);
    }

    #[test]
    fn test_negative_monnaie_surfaces_in_totals() {
        let mut cart = Cart::new(SaleKind::Comptoir);
        cart.add_article(&article(1, 1500.0, 10, ArticleKind::Produit), 1)
            .unwrap();

        let totals = cart.totals(1000.0, 0.0);
        assert_eq!(totals.monnaie, -500.0);
    }

    #[test]
    fn test_build_payload_rejects_empty_cart() {
        let cart = Cart::new(SaleKind::Comptoir);
        let err = cart
            .build_payload("", PaymentMode::Especes, None, 0.0, None)
            .unwrap_err();
        assert!(matches!(err, CoreError::EmptyCart));
    }

    #[test]
    fn test_build_payload_rejects_insufficient_cash() {
        let mut cart = Cart::new(SaleKind::Comptoir);
        cart.add_article(&article(1, 1500.0, 10, ArticleKind::Produit), 2)
            .unwrap();

        let err = cart
            .build_payload("", PaymentMode::Especes, Some(2000.0), 0.0, None)
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientPayment {
                attendu,
                recu
            } if attendu == 3000.0 && recu == 2000.0
        ));
    }

    #[test]
    fn test_build_payload_card_skips_cash_check() {
        let mut cart = Cart::new(SaleKind::Comptoir);
        cart.add_article(&article(1, 1500.0, 10, ArticleKind::Produit), 2)
            .unwrap();

        let payload = cart
            .build_payload("", PaymentMode::Carte, Some(1000.0), 0.0, None)
            .unwrap();
        assert_eq!(payload.montant_recu, 1000.0);
    }

    #[test]
    fn test_build_payload_defaults_received_to_total() {
        let mut cart = Cart::new(SaleKind::Comptoir);
        cart.add_article(&article(1, 1500.0, 10, ArticleKind::Produit), 2)
            .unwrap();

        let payload = cart
            .build_payload("", PaymentMode::Especes, None, 0.0, None)
            .unwrap();

        assert_eq!(payload.montant_recu, 3000.0);
        assert_eq!(payload.nom_client, "Client Comptoir");
        assert_eq!(payload.type_vente, SaleKind::Comptoir);
    }

    #[test]
    fn test_build_payload_sends_discounted_unit_price() {
        let mut cart = Cart::new(SaleKind::Comptoir);
        cart.add_article(&article(1, 1000.0, 10, ArticleKind::Produit), 3)
            .unwrap();
        cart.update_discount(1, 15.0).unwrap();

        let payload = cart
            .build_payload("Mme Diallo", PaymentMode::Especes, Some(3000.0), 0.0, None)
            .unwrap();

        assert_eq!(payload.articles[0].prix_unitaire, 850.0);
        assert_eq!(payload.total_ht, 2550.0);
        assert_eq!(payload.nom_client, "Mme Diallo");
    }

    #[test]
    fn test_reset_switches_mode_and_clears() {
        let mut cart = Cart::new(SaleKind::Comptoir);
        cart.add_article(&article(1, 1500.0, 10, ArticleKind::Produit), 2)
            .unwrap();

        cart.reset(SaleKind::Retour);

        assert!(cart.is_empty());
        assert_eq!(cart.mode, SaleKind::Retour);
    }
}
