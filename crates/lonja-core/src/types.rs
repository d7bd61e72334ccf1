//! # Core Types Module
//!
//! Defines the domain entities shared across the backend and the
//! dashboard. Every type here derives `TS` so the frontend gets
//! TypeScript bindings generated from the same source of truth.
//!
//! ## Entity Relationships
//! ```text
//! ┌──────────┐       ┌─────────┐
//! │ Category │◄──────│ Product │◄─────────────┐
//! └──────────┘       └────┬────┘              │
//!                         │                   │
//!                         ▼                   │
//!              ┌───────────────────┐    ┌─────┴─────────────┐
//!              │ VendorProductRate │    │ PurchaseOrderItem │
//!              └─────────┬─────────┘    └─────┬─────────────┘
//!                        │                    │
//!                   ┌────┴───┐       ┌────────┴──────┐      ┌──────────┐
//!                   │ Vendor │       │ PurchaseOrder │─────►│ Customer │
//!                   └────────┘       └───────────────┘      └──────────┘
//! ```
//!
//! ## Conventions
//! - **IDs**: UUID v4 strings (SQLite has no native UUID type)
//! - **Money/rates**: [`Money`] and [`Percent`] decimals, stored as TEXT
//! - **Timestamps**: UTC, RFC3339 in transit
//! - **Serialization**: camelCase for the TypeScript side

use crate::money::{Money, Percent};
use crate::pricing::{price_line, LinePricing, OrderTotals};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Catalog Entities
// =============================================================================

/// A product available for purchase orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// Display name shown in the product grid
    pub name: String,
    /// Optional longer description
    pub description: Option<String>,
    /// Current unit price
    pub price: Money,
    /// Owning category, if categorized
    pub category_id: Option<String>,
    /// Optional image for the product card
    pub image_url: Option<String>,
    /// Soft-delete flag. Deleted products stay on historical orders
    /// but disappear from pickers.
    pub deleted: bool,
    /// Creation timestamp (UTC)
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    /// Last update timestamp (UTC)
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A product category for grouping and filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Category {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// Category name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
}

/// A customer that purchase orders are billed to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Customer {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// Customer or business name
    pub name: String,
    /// Contact email
    pub email: Option<String>,
    /// Contact phone
    pub phone: Option<String>,
    /// Billing address
    pub address: Option<String>,
}

/// A supplier the operation buys stock from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Vendor {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// Vendor or business name
    pub name: String,
    /// Contact email
    pub email: Option<String>,
    /// Contact phone
    pub phone: Option<String>,
}

/// The rate a specific vendor charges for a specific product.
///
/// One row per (vendor, product) pair; re-registering a rate replaces
/// the previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct VendorProductRate {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// The vendor offering this rate
    pub vendor_id: String,
    /// The product the rate applies to
    pub product_id: String,
    /// Agreed unit rate
    pub rate: Money,
    /// When the rate was last registered (UTC)
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Purchase Orders
// =============================================================================

/// A persisted purchase order header.
///
/// `total_amount` is computed server-side from the order's items at
/// write time; it is never taken from the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PurchaseOrder {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// Human-facing sequential number, unique per database
    pub order_no: i64,
    /// The customer the order is billed to
    pub customer_id: String,
    /// Payable total, recomputed from items on every write
    pub total_amount: Money,
    /// Creation timestamp (UTC)
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    /// Last update timestamp (UTC)
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A persisted line on a purchase order.
///
/// Pricing terms are snapshotted at order time, so later catalog edits
/// never change what a historical order says.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PurchaseOrderItem {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// Owning purchase order
    pub order_id: String,
    /// The ordered product
    pub product_id: String,
    /// Units ordered
    pub quantity: i64,
    /// Unit price agreed at order time
    pub unit_price: Money,
    /// Line discount rate (dto)
    pub discount_percent: Percent,
    /// Line tax rate (iva)
    pub tax_percent: Percent,
}

impl PurchaseOrderItem {
    /// Derives this line's amounts from its stored terms.
    pub fn pricing(&self) -> LinePricing {
        price_line(
            self.quantity,
            self.unit_price,
            self.discount_percent,
            self.tax_percent,
        )
    }
}

// =============================================================================
// Order Input DTOs
// =============================================================================

/// One line of order input as submitted by the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderItemInput {
    /// The ordered product
    pub product_id: String,
    /// Units ordered
    pub quantity: i64,
    /// Unit price for this line
    pub unit_price: Money,
    /// Line discount rate (dto)
    pub discount_percent: Percent,
    /// Line tax rate (iva)
    pub tax_percent: Percent,
}

impl OrderItemInput {
    /// Derives this line's amounts.
    pub fn pricing(&self) -> LinePricing {
        price_line(
            self.quantity,
            self.unit_price,
            self.discount_percent,
            self.tax_percent,
        )
    }
}

/// Payload for creating a purchase order.
///
/// Carries no totals on purpose: the server derives them from the items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateOrder {
    /// The customer the order is billed to
    pub customer_id: String,
    /// Order lines, at least one
    pub items: Vec<OrderItemInput>,
}

impl CreateOrder {
    /// Computes the order's totals from its items.
    pub fn totals(&self) -> OrderTotals {
        OrderTotals::aggregate(self.items.iter().map(|item| item.pricing()))
    }
}

/// Payload for replacing an existing purchase order's content.
///
/// Updates are full replacements: the stored lines become exactly
/// `items`, and the totals are recomputed from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateOrder {
    /// The customer the order is billed to
    pub customer_id: String,
    /// Replacement order lines, at least one
    pub items: Vec<OrderItemInput>,
}

impl UpdateOrder {
    /// Computes the order's totals from its items.
    pub fn totals(&self) -> OrderTotals {
        OrderTotals::aggregate(self.items.iter().map(|item| item.pricing()))
    }
}

// =============================================================================
// Formatting Helpers
// =============================================================================

/// Formats a sequential order number for display: zero-padded to four
/// digits (`1` → `"0001"`). Numbers past 9999 render unpadded.
///
/// ## Example
/// ```rust
/// use lonja_core::types::format_order_no;
///
/// assert_eq!(format_order_no(1), "0001");
/// assert_eq!(format_order_no(42), "0042");
/// assert_eq!(format_order_no(12345), "12345");
/// ```
pub fn format_order_no(order_no: i64) -> String {
    format!("{:04}", order_no)
}

// =============================================================================
// Unit Tests
// =============================================================================
