//! # POS Session
//!
//! One storefront session: the cart, the latest catalog and promotion
//! snapshots, and the providers behind them.
//!
//! ## Operation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      PosSession Operations                              │
//! │                                                                         │
//! │  View Action            Session Method          Effect                  │
//! │  ───────────            ──────────────          ──────                  │
//! │                                                                         │
//! │  Open menu ───────────► refresh_all() ────────► snapshots installed     │
//! │                                                                         │
//! │  "Add to cart" ───────► add_line(request) ────► catalog lookup,         │
//! │                                                 CartStore::add_line     │
//! │                                                                         │
//! │  Pick promotion ──────► apply_promotion(id) ──► eligibility at now()    │
//! │                                                                         │
//! │  Render drawer ───────► view() ───────────────► CartView snapshot       │
//! │                                                                         │
//! │  Place order ─────────► place_order() ────────► checkout, submit,       │
//! │                                                 clear on success        │
//! │                                                                         │
//! │  NOTE: every cart operation takes the cart lock, so mutations are       │
//! │        applied one at a time in the order they were issued.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use bistro_core::eligibility::eligible_promotions;
use bistro_core::{
    CartLine, CartStore, CartTotals, CatalogSnapshot, CoreError, CoreResult, LineId, LineSpec,
    PaymentMethod, Promotion, PromotionCatalog, RejectedRecord, ToppingSelection,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};
use crate::providers::{CatalogProvider, OrderSubmitter, PromotionProvider, SubmissionReceipt};
use crate::snapshot::{RefreshOutcome, SnapshotSlot, Ticket};

// =============================================================================
// Requests & Views
// =============================================================================

/// A topping picked by id, as the view sends it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToppingPick {
    pub topping_id: String,
    pub quantity: u32,
}

/// "Add to cart" from the dish modal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddLineRequest {
    pub dish_id: String,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub toppings: Vec<ToppingPick>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub note: Option<String>,
}

fn default_quantity() -> u32 {
    1
}

impl AddLineRequest {
    pub fn new(dish_id: impl Into<String>) -> Self {
        AddLineRequest {
            dish_id: dish_id.into(),
            size: None,
            toppings: Vec::new(),
            quantity: default_quantity(),
            note: None,
        }
    }
}

/// Everything the cart drawer renders, read in one lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub revision: u64,
    pub lines: Vec<CartLine>,
    pub totals: CartTotals,
    pub applied_promotion: Option<Promotion>,
    pub payment_method: PaymentMethod,
    /// Promotions selectable right now, in catalog order.
    pub eligible_promotions: Vec<Promotion>,
}

// =============================================================================
// Session
// =============================================================================

/// A storefront session.
pub struct PosSession<C, P, S> {
    catalog_provider: C,
    promotion_provider: P,
    submitter: S,
    clock: Arc<dyn Clock>,
    cart: Mutex<CartStore>,
    catalog: SnapshotSlot<CatalogSnapshot>,
    promotions: SnapshotSlot<PromotionCatalog>,
}

impl<C, P, S> PosSession<C, P, S>
where
    C: CatalogProvider,
    P: PromotionProvider,
    S: OrderSubmitter,
{
    /// Creates a session with an empty cart and no snapshots.
    ///
    /// Call [`refresh_all`](Self::refresh_all) before adding lines.
    pub fn new(
        config: &SessionConfig,
        catalog_provider: C,
        promotion_provider: P,
        submitter: S,
        clock: Arc<dyn Clock>,
    ) -> Self {
        info!(store = %config.store.name, "Starting POS session");
        PosSession {
            catalog_provider,
            promotion_provider,
            submitter,
            clock,
            cart: Mutex::new(CartStore::with_default_payment(config.default_payment_method())),
            catalog: SnapshotSlot::new(),
            promotions: SnapshotSlot::new(),
        }
    }

    // =========================================================================
    // Refresh
    // =========================================================================

    /// Fetches and installs the catalog.
    ///
    /// Invalid dishes and toppings are skipped with a warning. A failed fetch
    /// keeps the previous snapshot; if a newer refresh was started meanwhile,
    /// the failure is dropped like any other stale result.
    pub async fn refresh_catalog(&self) -> SessionResult<RefreshOutcome> {
        let ticket = self.catalog.begin().await;
        let record = match self.catalog_provider.fetch_catalog().await {
            Ok(record) => record,
            Err(e) => return fetch_failed(&self.catalog, ticket, "catalog", e).await,
        };

        let (snapshot, rejected) = CatalogSnapshot::ingest(record);
        log_rejected("catalog", &rejected);
        let dishes = snapshot.dishes().len();

        let outcome = self.catalog.install(ticket, snapshot).await;
        log_outcome("catalog", outcome, dishes);
        Ok(outcome)
    }

    /// Fetches and installs the promotion catalog.
    ///
    /// Records that fail validation are skipped with a warning and do not
    /// affect the rest of the batch.
    pub async fn refresh_promotions(&self) -> SessionResult<RefreshOutcome> {
        let ticket = self.promotions.begin().await;
        let records = match self.promotion_provider.fetch_promotions().await {
            Ok(records) => records,
            Err(e) => return fetch_failed(&self.promotions, ticket, "promotions", e).await,
        };

        let (catalog, rejected) = PromotionCatalog::ingest(records);
        log_rejected("promotions", &rejected);
        let count = catalog.len();

        let outcome = self.promotions.install(ticket, catalog).await;
        log_outcome("promotions", outcome, count);
        Ok(outcome)
    }

    /// Refreshes catalog and promotions concurrently.
    pub async fn refresh_all(&self) -> SessionResult<()> {
        let (catalog, promotions) = tokio::join!(self.refresh_catalog(), self.refresh_promotions());
        catalog?;
        promotions?;
        Ok(())
    }

    /// The installed catalog, if any.
    pub async fn catalog(&self) -> Option<Arc<CatalogSnapshot>> {
        self.catalog.current().await
    }

    /// Promotions selectable right now, in catalog order.
    pub async fn eligible_promotions(&self) -> Vec<Promotion> {
        let Some(promotions) = self.promotions.current().await else {
            return Vec::new();
        };
        let now = self.clock.now();
        eligible_promotions(promotions.as_slice(), &now)
            .into_iter()
            .cloned()
            .collect()
    }

    // =========================================================================
    // Lines
    // =========================================================================

    /// Adds a line from catalog ids.
    pub async fn add_line(&self, request: AddLineRequest) -> SessionResult<LineId> {
        let catalog = self.require_catalog().await?;
        let dish = catalog
            .dish(&request.dish_id)
            .ok_or_else(|| CoreError::DishNotFound(request.dish_id.clone()))?;
        let toppings = resolve_picks(&catalog, &request.toppings)?;

        let spec = LineSpec {
            variant_size: request.size,
            toppings,
            quantity: request.quantity,
            note: request.note,
        };

        let mut cart = self.cart.lock().await;
        logged("add_line", cart.add_line(dish, spec))
    }

    pub async fn remove_line(&self, line_id: LineId) -> bool {
        self.cart.lock().await.remove_line(line_id)
    }

    pub async fn set_quantity(&self, line_id: LineId, quantity: u32) -> SessionResult<()> {
        let mut cart = self.cart.lock().await;
        logged("set_quantity", cart.set_quantity(line_id, quantity))
    }

    pub async fn increment_line(&self, line_id: LineId) -> SessionResult<u32> {
        let mut cart = self.cart.lock().await;
        logged("increment_line", cart.increment_line(line_id))
    }

    pub async fn decrement_line(&self, line_id: LineId) -> SessionResult<u32> {
        let mut cart = self.cart.lock().await;
        logged("decrement_line", cart.decrement_line(line_id))
    }

    /// Adds one unit of a topping, priced from the current catalog.
    pub async fn add_topping(&self, line_id: LineId, topping_id: &str) -> SessionResult<()> {
        let catalog = self.require_catalog().await?;
        let topping = catalog
            .topping(topping_id)
            .ok_or_else(|| CoreError::ToppingNotFound(topping_id.to_string()))?;

        let mut cart = self.cart.lock().await;
        logged("add_topping", cart.add_topping(line_id, topping))
    }

    pub async fn remove_topping(&self, line_id: LineId, topping_id: &str) -> SessionResult<()> {
        let mut cart = self.cart.lock().await;
        logged("remove_topping", cart.remove_topping(line_id, topping_id))
    }

    pub async fn replace_toppings(&self, line_id: LineId, picks: &[ToppingPick]) -> SessionResult<()> {
        let catalog = self.require_catalog().await?;
        let selections = resolve_picks(&catalog, picks)?;

        let mut cart = self.cart.lock().await;
        logged("replace_toppings", cart.replace_toppings(line_id, selections))
    }

    pub async fn set_note(&self, line_id: LineId, note: Option<&str>) -> SessionResult<()> {
        let mut cart = self.cart.lock().await;
        logged("set_note", cart.set_note(line_id, note))
    }

    // =========================================================================
    // Promotion, Payment, Clear
    // =========================================================================

    /// Applies a promotion by id, checked against the clock's `now`.
    pub async fn apply_promotion(&self, promotion_id: &str) -> SessionResult<()> {
        let promotions = self.promotions.current().await.unwrap_or_default();
        let promotion = promotions
            .get(promotion_id)
            .ok_or_else(|| CoreError::PromotionNotFound(promotion_id.to_string()))?;

        let now = self.clock.now();
        let mut cart = self.cart.lock().await;
        logged("apply_promotion", cart.apply_promotion(promotion, &now))
    }

    pub async fn remove_promotion(&self) -> Option<Promotion> {
        self.cart.lock().await.remove_promotion()
    }

    pub async fn set_payment_method(&self, method: PaymentMethod) {
        self.cart.lock().await.set_payment_method(method);
    }

    pub async fn clear(&self) {
        self.cart.lock().await.clear();
    }

    // =========================================================================
    // Views & Checkout
    // =========================================================================

    /// Snapshot of the cart for rendering.
    pub async fn view(&self) -> CartView {
        let eligible = self.eligible_promotions().await;
        let cart = self.cart.lock().await;
        CartView {
            revision: cart.revision(),
            lines: cart.lines().to_vec(),
            totals: cart.totals().clone(),
            applied_promotion: cart.applied_promotion().cloned(),
            payment_method: cart.payment_method(),
            eligible_promotions: eligible,
        }
    }

    /// Checks out, submits the order and clears the cart.
    ///
    /// The applied promotion is re-checked against the latest promotion
    /// catalog, so one switched off or withdrawn since it was applied rejects
    /// with `PromotionExpired`. The cart stays locked while the submitter
    /// runs, so nothing can change between checkout and clearing. A failed
    /// submission leaves the cart as it was.
    pub async fn place_order(&self) -> SessionResult<SubmissionReceipt> {
        let promotions = self.promotions.current().await;
        let now = self.clock.now();
        let mut cart = self.cart.lock().await;

        let current = cart
            .applied_promotion()
            .and_then(|applied| promotions.as_deref().and_then(|catalog| catalog.get(&applied.id)));
        let payload = logged("checkout", cart.checkout_with(current, &now))?;
        let receipt = self.submitter.submit(&payload).await.map_err(|e| match e {
            SessionError::SubmissionFailed(_) => e,
            other => SessionError::SubmissionFailed(other.to_string()),
        })?;

        info!(
            order_id = %receipt.order_id,
            lines = payload.lines.len(),
            total = %payload.final_total,
            promotion = ?payload.applied_promotion_id,
            "Order placed"
        );
        cart.clear();
        Ok(receipt)
    }

    async fn require_catalog(&self) -> SessionResult<Arc<CatalogSnapshot>> {
        self.catalog.current().await.ok_or(SessionError::CatalogNotLoaded)
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn resolve_picks(catalog: &CatalogSnapshot, picks: &[ToppingPick]) -> CoreResult<Vec<ToppingSelection>> {
    picks
        .iter()
        .map(|pick| {
            catalog
                .topping(&pick.topping_id)
                .map(|topping| ToppingSelection::new(topping.clone(), pick.quantity))
                .ok_or_else(|| CoreError::ToppingNotFound(pick.topping_id.clone()))
        })
        .collect()
}

async fn fetch_failed<T>(
    slot: &SnapshotSlot<T>,
    ticket: Ticket,
    kind: &str,
    error: SessionError,
) -> SessionResult<RefreshOutcome> {
    if slot.is_latest(ticket).await {
        return Err(error);
    }
    debug!(kind, error = %error, "Stale fetch failed, ignoring");
    Ok(RefreshOutcome::Superseded)
}

fn logged<T>(operation: &'static str, result: CoreResult<T>) -> SessionResult<T> {
    result.map_err(|e| {
        debug!(operation, error = %e, "Cart operation rejected");
        SessionError::from(e)
    })
}

fn log_rejected(kind: &str, rejected: &[RejectedRecord]) {
    for record in rejected {
        warn!(kind, id = %record.id, error = %record.error, "Skipping invalid record");
    }
}

fn log_outcome(kind: &str, outcome: RefreshOutcome, count: usize) {
    match outcome {
        RefreshOutcome::Installed => info!(kind, count, "Snapshot installed"),
        RefreshOutcome::Superseded => debug!(kind, "Stale snapshot discarded"),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
