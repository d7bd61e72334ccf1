//! # Order Draft Module
//!
//! In-memory state for the order being built or edited in the dashboard.
//! The draft is forgiving where the persistence layer is strict: unknown
//! lines are ignored, out-of-range quantities are clamped, and nothing
//! here touches a database.
//!
//! ## Draft Lifecycle
//! ```text
//!   new()                    from_order(order, items)
//!     │                              │
//!     ▼                              ▼
//! ┌─────────────────────────────────────────────┐
//! │ OrderDraft                                  │
//! │   step: ChoosingProducts ⇄ ReviewingOrder   │
//! │   add / update / remove / clear lines       │
//! │   totals() recomputed on demand             │
//! └──────────────────┬──────────────────────────┘
//!                    │ begin_submit() (single-flight)
//!                    ▼
//!          to_create_order() / to_update_order()
//!                    │
//!                    ▼
//!            persistence layer
//! ```
//!
//! ## Concurrency
//! [`DraftSession`] wraps the draft in `Arc<Mutex<…>>` so UI event
//! handlers on different threads share one draft. The submit flag is a
//! separate atomic: holding it does not block reads of the draft, it
//! only refuses a second submit while the first is in flight.

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::{Money, Percent};
use crate::pricing::{price_line, LinePricing, OrderTotals};
use crate::types::{
    CreateOrder, OrderItemInput, Product, PurchaseOrder, PurchaseOrderItem, UpdateOrder,
};
use crate::{DEFAULT_DISCOUNT_PERCENT, DEFAULT_TAX_PERCENT, MAX_DRAFT_LINES, MAX_LINE_QUANTITY};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use ts_rs::TS;

/// Baseline deltas below one cent are arithmetic noise, not changes.
fn total_change_epsilon() -> Decimal {
    Decimal::new(1, 2)
}

// =============================================================================
// Draft Step
// =============================================================================

/// The dashboard's two-step order flow.
///
/// Transitions are user-driven in both directions; the draft never
/// forces a step change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum DraftStep {
    /// Picking products and quantities from the catalog.
    ChoosingProducts,
    /// Reviewing lines, rates and totals before submitting.
    ReviewingOrder,
}

// =============================================================================
// Draft Line
// =============================================================================

/// One line of the draft.
///
/// Pricing terms are snapshotted when the line is created. Catalog edits
/// made while the draft is open do not retroactively change lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DraftLine {
    /// The product this line orders
    pub product_id: String,
    /// Units ordered
    pub quantity: i64,
    /// Unit price for this line
    pub unit_price: Money,
    /// Line discount rate (dto)
    pub discount_percent: Percent,
    /// Line tax rate (iva)
    pub tax_percent: Percent,
    /// The persisted item this line edits, when the draft was loaded
    /// from an existing order. `None` for lines added in this draft.
    pub item_id: Option<String>,
}

impl DraftLine {
    /// Creates a fresh line with the default rates (no discount,
    /// standard tax).
    pub fn new(product_id: impl Into<String>, quantity: i64, unit_price: Money) -> Self {
        DraftLine {
            product_id: product_id.into(),
            quantity,
            unit_price,
            discount_percent: Percent::from(DEFAULT_DISCOUNT_PERCENT),
            tax_percent: Percent::from(DEFAULT_TAX_PERCENT),
            item_id: None,
        }
    }

    /// Creates a line from a catalog product, snapshotting its price.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        DraftLine::new(product.id.clone(), quantity, product.price)
    }

    /// Creates a line from a persisted order item, keeping its id so
    /// an edit round-trip can be traced back to the stored line.
    pub fn from_order_item(item: &PurchaseOrderItem) -> Self {
        DraftLine {
            product_id: item.product_id.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            discount_percent: item.discount_percent,
            tax_percent: item.tax_percent,
            item_id: Some(item.id.clone()),
        }
    }

    /// Derives this line's amounts.
    pub fn pricing(&self) -> LinePricing {
        price_line(
            self.quantity,
            self.unit_price,
            self.discount_percent,
            self.tax_percent,
        )
    }

    /// The line's payable amount.
    pub fn line_total(&self) -> Money {
        self.pricing().line_total
    }

    /// Converts the line to order input for submission.
    pub fn to_input(&self) -> OrderItemInput {
        OrderItemInput {
            product_id: self.product_id.clone(),
            quantity: self.quantity,
            unit_price: self.unit_price,
            discount_percent: self.discount_percent,
            tax_percent: self.tax_percent,
        }
    }
}

// =============================================================================
// Order Draft
// =============================================================================

/// The order being built or edited.
///
/// A draft starts empty ([`OrderDraft::new`]) or loaded from a persisted
/// order ([`OrderDraft::from_order`]). In the second case the customer is
/// locked and a baseline total is kept so the UI can show how far the
/// edit has drifted from what was originally billed.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderDraft {
    /// The customer the order will be billed to
    pub customer_id: Option<String>,
    /// Draft lines, one per product
    pub items: Vec<DraftLine>,
    /// Current step of the two-step flow
    pub step: DraftStep,
    /// When this draft was started (UTC)
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    /// Total of the persisted order this draft edits, if any
    #[serde(default)]
    baseline_total: Option<Money>,
    /// Edits keep the original customer
    #[serde(default)]
    customer_locked: bool,
    /// Whether the draft has unsaved changes
    #[serde(default)]
    dirty: bool,
}

impl OrderDraft {
    /// Creates an empty draft at the product-choosing step.
    pub fn new() -> Self {
        OrderDraft {
            customer_id: None,
            items: Vec::new(),
            step: DraftStep::ChoosingProducts,
            created_at: Utc::now(),
            baseline_total: None,
            customer_locked: false,
            dirty: false,
        }
    }

    /// Loads a persisted order into a draft for editing.
    ///
    /// The customer is locked (orders cannot be rebilled to someone
    /// else) and the stored total becomes the baseline for
    /// [`OrderDraft::total_delta`].
    pub fn from_order(order: &PurchaseOrder, items: &[PurchaseOrderItem]) -> Self {
        OrderDraft {
            customer_id: Some(order.customer_id.clone()),
            items: items.iter().map(DraftLine::from_order_item).collect(),
            step: DraftStep::ChoosingProducts,
            created_at: Utc::now(),
            baseline_total: Some(order.total_amount),
            customer_locked: true,
            dirty: false,
        }
    }

    // ====== Line Operations ======

    /// Adds a product line, merging with an existing line for the same
    /// product.
    ///
    /// Merging only adds quantity; the existing line's price and rates
    /// stay as the operator set them. A brand-new line gets the default
    /// rates. Quantities below 1 are treated as 1.
    ///
    /// ## Errors
    /// - [`CoreError::DraftTooLarge`] when the draft already holds
    ///   [`MAX_DRAFT_LINES`] distinct lines
    /// - [`CoreError::QuantityTooLarge`] when the merged quantity would
    ///   exceed [`MAX_LINE_QUANTITY`]
    pub fn add_item(
        &mut self,
        product_id: impl Into<String>,
        quantity: i64,
        unit_price: Money,
    ) -> CoreResult<()> {
        let product_id = product_id.into();
        let quantity = quantity.max(1);

        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|line| line.product_id == product_id)
        {
            let merged = existing.quantity + quantity;
            if merged > MAX_LINE_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: merged,
                    max: MAX_LINE_QUANTITY,
                });
            }
            existing.quantity = merged;
        } else {
            if self.items.len() >= MAX_DRAFT_LINES {
                return Err(CoreError::DraftTooLarge {
                    max: MAX_DRAFT_LINES,
                });
            }
            if quantity > MAX_LINE_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: quantity,
                    max: MAX_LINE_QUANTITY,
                });
            }
            self.items.push(DraftLine::new(product_id, quantity, unit_price));
        }

        self.dirty = true;
        Ok(())
    }

    /// Adds a catalog product at its current price.
    pub fn add_product(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        self.add_item(product.id.clone(), quantity, product.price)
    }

    /// Sets a line's quantity, clamped to `1..=MAX_LINE_QUANTITY`.
    /// No-op if the product has no line.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) {
        if let Some(line) = self.line_mut(product_id) {
            line.quantity = quantity.clamp(1, MAX_LINE_QUANTITY);
            self.dirty = true;
        }
    }

    /// Sets a line's unit price. No-op if the product has no line.
    pub fn update_unit_price(&mut self, product_id: &str, unit_price: Money) {
        if let Some(line) = self.line_mut(product_id) {
            line.unit_price = unit_price;
            self.dirty = true;
        }
    }

    /// Sets a line's discount rate. No-op if the product has no line.
    pub fn update_discount(&mut self, product_id: &str, discount_percent: Percent) {
        if let Some(line) = self.line_mut(product_id) {
            line.discount_percent = discount_percent;
            self.dirty = true;
        }
    }

    /// Sets a line's tax rate. No-op if the product has no line.
    pub fn update_tax_rate(&mut self, product_id: &str, tax_percent: Percent) {
        if let Some(line) = self.line_mut(product_id) {
            line.tax_percent = tax_percent;
            self.dirty = true;
        }
    }

    /// Removes a line. No-op if the product has no line.
    pub fn remove_item(&mut self, product_id: &str) {
        let before = self.items.len();
        self.items.retain(|line| line.product_id != product_id);
        if self.items.len() != before {
            self.dirty = true;
        }
    }

    /// Removes every line. Customer and step are kept.
    pub fn clear(&mut self) {
        if !self.items.is_empty() {
            self.items.clear();
            self.dirty = true;
        }
    }

    fn line_mut(&mut self, product_id: &str) -> Option<&mut DraftLine> {
        self.items
            .iter_mut()
            .find(|line| line.product_id == product_id)
    }

    // ====== Customer and Step ======

    /// Sets the customer the order will be billed to.
    ///
    /// ## Errors
    /// [`CoreError::CustomerLocked`] when the draft edits an existing
    /// order.
    pub fn set_customer(&mut self, customer_id: impl Into<String>) -> CoreResult<()> {
        if self.customer_locked {
            return Err(CoreError::CustomerLocked);
        }
        self.customer_id = Some(customer_id.into());
        self.dirty = true;
        Ok(())
    }

    /// Moves the flow to the given step. Navigation is not a content
    /// change, so this never marks the draft dirty.
    pub fn change_step(&mut self, step: DraftStep) {
        self.step = step;
    }

    // ====== Derived State ======

    /// The draft's totals, recomputed from its lines.
    pub fn totals(&self) -> OrderTotals {
        OrderTotals::aggregate(self.items.iter().map(DraftLine::pricing))
    }

    /// Number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Total units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|line| line.quantity).sum()
    }

    /// Whether the draft has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether the draft has unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether the customer can no longer be changed.
    pub fn is_customer_locked(&self) -> bool {
        self.customer_locked
    }

    /// The stored total of the order this draft edits, if any.
    pub fn baseline_total(&self) -> Option<Money> {
        self.baseline_total
    }

    /// Signed difference between the draft's current total and the
    /// baseline. `None` for drafts not loaded from an order.
    pub fn total_delta(&self) -> Option<Money> {
        self.baseline_total
            .map(|baseline| self.totals().total - baseline)
    }

    /// Whether the edit has moved the total by at least one cent.
    pub fn total_changed(&self) -> bool {
        match self.total_delta() {
            Some(delta) => delta.abs().amount() >= total_change_epsilon(),
            None => false,
        }
    }

    // ====== Submission ======

    /// Builds the creation payload, checking the draft is submittable.
    ///
    /// ## Errors
    /// Validation errors for a missing customer or an empty draft.
    pub fn to_create_order(&self) -> CoreResult<CreateOrder> {
        let customer_id = self.require_customer()?;
        let items = self.require_items()?;
        Ok(CreateOrder { customer_id, items })
    }

    /// Builds the replacement payload for the order this draft edits.
    ///
    /// ## Errors
    /// Validation errors for a missing customer or an empty draft.
    pub fn to_update_order(&self) -> CoreResult<UpdateOrder> {
        let customer_id = self.require_customer()?;
        let items = self.require_items()?;
        Ok(UpdateOrder { customer_id, items })
    }

    fn require_customer(&self) -> CoreResult<String> {
        self.customer_id
            .clone()
            .ok_or_else(|| ValidationError::Required {
                field: "customer_id".to_string(),
            })
            .map_err(CoreError::from)
    }

    fn require_items(&self) -> CoreResult<Vec<OrderItemInput>> {
        if self.items.is_empty() {
            return Err(ValidationError::MustNotBeEmpty {
                field: "items".to_string(),
            }
            .into());
        }
        Ok(self.items.iter().map(DraftLine::to_input).collect())
    }
}

impl Default for OrderDraft {
    fn default() -> Self {
        OrderDraft::new()
    }
}

// =============================================================================
// Draft Session
// =============================================================================

/// Thread-safe shared handle to a draft, with a single-flight submit
/// guard.
///
/// Clones share the same draft and the same guard. UI handlers access
/// the draft through the `with_draft` closures so the mutex is never
/// held across an await point.
#[derive(Clone)]
pub struct DraftSession {
    draft: Arc<Mutex<OrderDraft>>,
    submit_in_flight: Arc<AtomicBool>,
}

impl DraftSession {
    /// Session around a fresh empty draft.
    pub fn new() -> Self {
        DraftSession {
            draft: Arc::new(Mutex::new(OrderDraft::new())),
            submit_in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Session around a draft loaded from a persisted order.
    pub fn for_order(order: &PurchaseOrder, items: &[PurchaseOrderItem]) -> Self {
        DraftSession {
            draft: Arc::new(Mutex::new(OrderDraft::from_order(order, items))),
            submit_in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Runs a closure with read access to the draft.
    pub fn with_draft<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&OrderDraft) -> R,
    {
        let draft = self.draft.lock().expect("Draft mutex poisoned");
        f(&draft)
    }

    /// Runs a closure with mutable access to the draft.
    pub fn with_draft_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut OrderDraft) -> R,
    {
        let mut draft = self.draft.lock().expect("Draft mutex poisoned");
        f(&mut draft)
    }

    /// Claims the right to submit this draft.
    ///
    /// Succeeds at most once at a time: while the returned guard is
    /// alive, further calls fail with [`CoreError::SubmitInFlight`].
    /// Dropping the guard (success or failure) re-allows submits.
    ///
    /// ## Errors
    /// - Validation errors when the draft has no customer or no lines
    /// - [`CoreError::SubmitInFlight`] when a submit is already running
    pub fn begin_submit(&self) -> CoreResult<SubmitGuard> {
        {
            let draft = self.draft.lock().expect("Draft mutex poisoned");
            if draft.customer_id.is_none() {
                return Err(ValidationError::Required {
                    field: "customer_id".to_string(),
                }
                .into());
            }
            if draft.items.is_empty() {
                return Err(ValidationError::MustNotBeEmpty {
                    field: "items".to_string(),
                }
                .into());
            }
        }

        if self
            .submit_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(CoreError::SubmitInFlight);
        }

        Ok(SubmitGuard {
            flag: Arc::clone(&self.submit_in_flight),
        })
    }

    /// Whether a submit is currently in flight.
    pub fn is_submitting(&self) -> bool {
        self.submit_in_flight.load(Ordering::Acquire)
    }

    /// Throws the current draft away and starts a fresh one.
    pub fn discard(&self) {
        let mut draft = self.draft.lock().expect("Draft mutex poisoned");
        *draft = OrderDraft::new();
    }
}

impl Default for DraftSession {
    fn default() -> Self {
        DraftSession::new()
    }
}

/// RAII token for an in-flight submit. Dropping it re-allows submits.
#[must_use = "the submit stays guarded only while this is held"]
pub struct SubmitGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for SubmitGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
