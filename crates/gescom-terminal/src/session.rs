//! # Terminal Session
//!
//! The live state of one counter: the cart, the sale mode and the payment
//! entry. Commands mutate the cart through the core engine; only `checkout`
//! and `switch_mode` talk to the backend.
//!
//! ## Mode Switch Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Mode Switch Decision                             │
//! │                                                                         │
//! │  switch_mode(target, confirm_clear)                                    │
//! │        │                                                                │
//! │        ├─ target == current ────────────────► Ok (no-op)               │
//! │        │                                                                │
//! │        ├─ target == RETOUR ─► has_sales_today?                         │
//! │        │                        ├─ network error ──► abort, unchanged  │
//! │        │                        └─ no sales ───────► NoSalesToday      │
//! │        │                                                                │
//! │        ├─ cart not empty, no confirm ───────► SwitchNeedsConfirmation  │
//! │        │                                                                │
//! │        └─ otherwise ────────────────────────► reset cart + payment     │
//! │                                                                         │
//! │  The sales check runs before the confirmation concern: an unreachable  │
//! │  backend aborts the switch with cart and payment untouched.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex};

use tracing::info;

use gescom_core::{
    Article, Cart, CartTotals, CoreError, PaymentMode, SaleKind, VenteReceipt,
};

use crate::backend::Backend;
use crate::error::{TerminalError, TerminalResult};

// =============================================================================
// Payment Entry
// =============================================================================

/// What the operator typed into the payment panel.
///
/// Everything is optional until checkout: an empty `nom_client` becomes
/// "Client Comptoir" and a missing `montant_recu` defaults to the exact
/// total when the payload is built.
#[derive(Debug, Clone, Default)]
pub struct PaymentEntry {
    pub nom_client: String,
    pub mode_paiement: PaymentMode,
    pub montant_recu: Option<f64>,
    pub notes: Option<String>,
}

// =============================================================================
// Terminal Session
// =============================================================================

/// One counter's live state.
///
/// ## Thread Safety
/// The cart lives behind `Arc<Mutex<_>>`: UI commands can run concurrently
/// and each cart operation is short. Locks are never held across an await.
pub struct TerminalSession<B> {
    backend: Arc<B>,
    cart: Arc<Mutex<Cart>>,
    paiement: Mutex<PaymentEntry>,
    taux_tva: f64,
}

impl<B: Backend> TerminalSession<B> {
    /// Creates a session in sale mode with an empty cart.
    ///
    /// The counter screen charges no TVA by default; taxed deployments opt
    /// in with [`with_taux_tva`](Self::with_taux_tva).
    pub fn new(backend: Arc<B>) -> Self {
        TerminalSession {
            backend,
            cart: Arc::new(Mutex::new(Cart::new(SaleKind::Comptoir))),
            paiement: Mutex::new(PaymentEntry::default()),
            taux_tva: 0.0,
        }
    }

    /// Sets the TVA rate applied on top of cart totals.
    pub fn with_taux_tva(mut self, taux_tva: f64) -> Self {
        self.taux_tva = taux_tva;
        self
    }

    // =========================================================================
    // Cart Access
    // =========================================================================

    /// Executes a function with read access to the cart.
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.cart.lock().expect("cart mutex poisoned");
        f(&cart)
    }

    /// Executes a function with write access to the cart.
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().expect("cart mutex poisoned");
        f(&mut cart)
    }

    /// The current sale mode.
    pub fn mode(&self) -> SaleKind {
        self.with_cart(|c| c.mode)
    }

    /// True when the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.with_cart(Cart::is_empty)
    }

    // =========================================================================
    // Cart Commands
    // =========================================================================

    /// Adds an article (or merges into its existing line).
    pub fn add_article(&self, article: &Article, quantite: u32) -> TerminalResult<()> {
        Ok(self.with_cart_mut(|c| c.add_article(article, quantite))?)
    }

    /// Sets a line's quantity; anything below 1 removes the line.
    pub fn update_quantity(&self, id_article: i64, quantite: i64) -> TerminalResult<()> {
        Ok(self.with_cart_mut(|c| c.update_quantity(id_article, quantite))?)
    }

    /// Sets a line's discount percentage.
    pub fn update_discount(&self, id_article: i64, remise_pct: f64) -> TerminalResult<()> {
        Ok(self.with_cart_mut(|c| c.update_discount(id_article, remise_pct))?)
    }

    /// Removes a line.
    pub fn remove_line(&self, id_article: i64) -> TerminalResult<()> {
        Ok(self.with_cart_mut(|c| c.remove_line(id_article))?)
    }

    /// Empties the cart, keeping the mode and the payment entry.
    pub fn clear(&self) {
        self.with_cart_mut(Cart::clear);
    }

    // =========================================================================
    // Payment Entry
    // =========================================================================

    pub fn set_nom_client(&self, nom_client: &str) {
        self.paiement.lock().expect("payment mutex poisoned").nom_client = nom_client.to_string();
    }

    pub fn set_mode_paiement(&self, mode_paiement: PaymentMode) {
        self.paiement.lock().expect("payment mutex poisoned").mode_paiement = mode_paiement;
    }

    pub fn set_montant_recu(&self, montant_recu: Option<f64>) {
        self.paiement.lock().expect("payment mutex poisoned").montant_recu = montant_recu;
    }

    pub fn set_notes(&self, notes: Option<String>) {
        self.paiement.lock().expect("payment mutex poisoned").notes = notes;
    }

    /// A snapshot of the payment entry.
    pub fn paiement(&self) -> PaymentEntry {
        self.paiement.lock().expect("payment mutex poisoned").clone()
    }

    fn reset_paiement(&self) {
        *self.paiement.lock().expect("payment mutex poisoned") = PaymentEntry::default();
    }

    /// Ticket totals with the entered amount (0 when nothing entered yet,
    /// which shows the outstanding amount as negative change).
    pub fn totals(&self) -> CartTotals {
        let recu = self
            .paiement
            .lock()
            .expect("payment mutex poisoned")
            .montant_recu
            .unwrap_or(0.0);
        self.with_cart(|c| c.totals(recu, self.taux_tva))
    }

    // =========================================================================
    // Mode Switching
    // =========================================================================

    /// Switches between sale and return mode.
    ///
    /// Return mode is only reachable when the backend reports at least one
    /// sale today. A non-empty cart needs `confirm_clear`; every completed
    /// switch resets the cart and the payment entry.
    pub async fn switch_mode(&self, target: SaleKind, confirm_clear: bool) -> TerminalResult<()> {
        if self.mode() == target {
            return Ok(());
        }

        // Sales check first; a backend failure aborts with state untouched.
        if target.is_retour() {
            let check = self.backend.has_sales_today().await?;
            if !check.ventes_aujourd_hui {
                return Err(CoreError::NoSalesToday.into());
            }
        }

        if !self.is_empty() && !confirm_clear {
            return Err(TerminalError::SwitchNeedsConfirmation);
        }

        self.with_cart_mut(|c| c.reset(target));
        self.reset_paiement();
        info!(mode = %target, "Terminal mode switched");
        Ok(())
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Builds the vente payload and submits it.
    ///
    /// Validation failures and backend errors leave the cart and payment
    /// entry exactly as they were; only a recorded sale clears them.
    pub async fn checkout(&self) -> TerminalResult<VenteReceipt> {
        let paiement = self.paiement();
        let payload = self.with_cart(|c| {
            c.build_payload(
                &paiement.nom_client,
                paiement.mode_paiement,
                paiement.montant_recu,
                self.taux_tva,
                paiement.notes.clone(),
            )
        })?;

        let receipt = self.backend.create_vente(&payload).await?;

        self.with_cart_mut(Cart::clear);
        self.reset_paiement();
        info!(
            numero = %receipt.numero_facture,
            monnaie = receipt.monnaie,
            "Checkout complete"
        );
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::MockBackend;
    use gescom_core::ArticleKind;

    fn article(id: i64, prix: f64, stock: i64) -> Article {
        Article {
            id_article: id,
            code_article: Some(format!("ART-{id:03}")),
            designation: format!("Article {id}"),
            prix_vente: Some(prix),
            stock_actuel: stock,
            stock_alerte: None,
            type_article: Some(ArticleKind::Produit),
            categorie: None,
            unite: None,
        }
    }

    fn session_with(backend: MockBackend) -> TerminalSession<MockBackend> {
        TerminalSession::new(Arc::new(backend))
    }

    #[tokio::test]
    async fn test_switch_to_retour_blocked_without_sales() {
        let session = session_with(MockBackend::default());

        let err = session
            .switch_mode(SaleKind::Retour, false)
            .await
            .unwrap_err();
        assert!(matches!(err, TerminalError::Core(CoreError::NoSalesToday)));
        assert_eq!(session.mode(), SaleKind::Comptoir);
    }

    #[tokio::test]
    async fn test_switch_to_retour_clears_cart_and_payment() {
        let session = session_with(MockBackend {
            ventes_aujourd_hui: true,
            ..MockBackend::default()
        });
        session.add_article(&article(1, 5000.0, 10), 2).unwrap();
        session.set_montant_recu(Some(10000.0));

        session.switch_mode(SaleKind::Retour, true).await.unwrap();

        assert_eq!(session.mode(), SaleKind::Retour);
        assert!(session.is_empty());
        assert_eq!(session.paiement().montant_recu, None);
    }

    #[tokio::test]
    async fn test_switch_with_lines_needs_confirmation() {
        let session = session_with(MockBackend {
            ventes_aujourd_hui: true,
            ..MockBackend::default()
        });
        session.add_article(&article(1, 5000.0, 10), 1).unwrap();

        let err = session
            .switch_mode(SaleKind::Retour, false)
            .await
            .unwrap_err();
        assert!(matches!(err, TerminalError::SwitchNeedsConfirmation));
        // Refused switch leaves everything in place
        assert_eq!(session.mode(), SaleKind::Comptoir);
        assert_eq!(session.with_cart(|c| c.nb_lignes()), 1);
    }

    #[tokio::test]
    async fn test_switch_aborts_on_network_failure() {
        let backend = MockBackend {
            ventes_aujourd_hui: true,
            ..MockBackend::default()
        };
        backend.offline.store(true, std::sync::atomic::Ordering::SeqCst);
        let session = session_with(backend);
        session.add_article(&article(1, 5000.0, 10), 1).unwrap();

        let err = session
            .switch_mode(SaleKind::Retour, true)
            .await
            .unwrap_err();
        assert!(err.is_network());
        assert_eq!(session.mode(), SaleKind::Comptoir);
        assert_eq!(session.with_cart(|c| c.nb_lignes()), 1);
    }

    #[tokio::test]
    async fn test_switch_to_same_mode_is_noop() {
        let backend = MockBackend::default();
        backend.offline.store(true, std::sync::atomic::Ordering::SeqCst);
        let session = session_with(backend);

        // No backend call happens, so offline does not matter
        session.switch_mode(SaleKind::Comptoir, false).await.unwrap();
    }

    #[tokio::test]
    async fn test_checkout_records_sale_and_clears() {
        let session = session_with(MockBackend::default());
        session.add_article(&article(1, 5000.0, 10), 1).unwrap();
        session.set_montant_recu(Some(10000.0));

        let receipt = session.checkout().await.unwrap();

        assert_eq!(receipt.montant_ttc, 5000.0);
        assert_eq!(receipt.monnaie, 5000.0);
        assert!(session.is_empty());
        assert_eq!(session.paiement().montant_recu, None);
    }

    #[tokio::test]
    async fn test_checkout_keeps_state_on_failure_then_retries() {
        let backend = MockBackend::default();
        backend
            .fail_next_submit
            .store(true, std::sync::atomic::Ordering::SeqCst);
        let session = session_with(backend);
        session.add_article(&article(1, 5000.0, 10), 1).unwrap();
        session.set_montant_recu(Some(5000.0));

        let err = session.checkout().await.unwrap_err();
        assert!(err.is_network());
        assert_eq!(session.with_cart(|c| c.nb_lignes()), 1);
        assert_eq!(session.paiement().montant_recu, Some(5000.0));

        // Same ticket goes through on retry
        let receipt = session.checkout().await.unwrap();
        assert_eq!(receipt.montant_ttc, 5000.0);
        assert!(session.is_empty());
    }

    #[tokio::test]
    async fn test_checkout_empty_cart_refused() {
        let session = session_with(MockBackend::default());
        let err = session.checkout().await.unwrap_err();
        assert!(matches!(err, TerminalError::Core(CoreError::EmptyCart)));
    }

    #[tokio::test]
    async fn test_checkout_insufficient_cash_refused() {
        let session = session_with(MockBackend::default());
        session.add_article(&article(1, 5000.0, 10), 1).unwrap();
        session.set_montant_recu(Some(3000.0));

        let err = session.checkout().await.unwrap_err();
        assert!(matches!(
            err,
            TerminalError::Core(CoreError::InsufficientPayment { .. })
        ));
        assert_eq!(session.with_cart(|c| c.nb_lignes()), 1);
    }

    #[tokio::test]
    async fn test_totals_follow_session_rate() {
        let untaxed = session_with(MockBackend::default());
        untaxed.add_article(&article(1, 5000.0, 10), 1).unwrap();
        untaxed.set_montant_recu(Some(10000.0));
        let t = untaxed.totals();
        assert_eq!(t.total_ttc, 5000.0);
        assert_eq!(t.monnaie, 5000.0);

        let taxed = session_with(MockBackend::default()).with_taux_tva(9.5);
        taxed.add_article(&article(1, 5000.0, 10), 1).unwrap();
        taxed.set_montant_recu(Some(10000.0));
        let t = taxed.totals();
        assert_eq!(t.total_tva, 475.0);
        assert_eq!(t.total_ttc, 5475.0);
        assert_eq!(t.monnaie, 4525.0);
    }
}
