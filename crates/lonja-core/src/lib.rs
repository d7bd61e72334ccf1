//! # lonja-core: Pure Business Logic for Lonja
//!
//! This crate is the **heart** of Lonja. It contains all pricing and
//! order-draft logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Lonja Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Admin Dashboard (frontend)                     │   │
//! │  │   Product Grid ──► Order Draft ──► Review ──► Order History    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON (camelCase, ts-rs bindings)       │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ lonja-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   money   │  │  pricing  │  │   draft   │  │ validation│  │   │
//! │  │   │   Money   │  │ price_line│  │ OrderDraft│  │   rules   │  │   │
//! │  │   │  Percent  │  │OrderTotals│  │  Session  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    lonja-db (Database Layer)                    │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Customer, PurchaseOrder, etc.)
//! - [`money`] - Decimal money and percentage rates (no floating point!)
//! - [`pricing`] - The line algorithm and order totals
//! - [`draft`] - The in-progress order and its submit guard
//! - [`error`] - Domain error types
//! - [`validation`] - Order input validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Decimal Money**: All monetary values are exact decimals; rounding
//!    happens once, at the display boundary
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use lonja_core::money::{Money, Percent};
//! use lonja_core::pricing::price_line;
//! use rust_decimal::Decimal;
//!
//! // 3 × €10.00 with a 10% discount and 21% IVA
//! let line = price_line(
//!     3,
//!     Money::new(Decimal::from(10)),
//!     Percent::from(10),
//!     Percent::from(21),
//! );
//!
//! // Tax applies to the discounted base: 27.00 × 21% = 5.67
//! assert_eq!(format!("{}", line.tax_amount), "€5.67");
//! assert_eq!(format!("{}", line.line_total), "€32.67");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod draft;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use lonja_core::Money` instead of
// `use lonja_core::money::Money`

pub use draft::{DraftLine, DraftSession, DraftStep, OrderDraft, SubmitGuard};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, Percent};
pub use pricing::{price_line, LinePricing, OrderTotals};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Currency symbol used by `Money`'s display formatting
pub const CURRENCY_SYMBOL: &str = "€";

/// Default tax rate applied to new draft lines, in percent
///
/// ## Why 21?
/// The standard Spanish IVA rate. Operators change it per line for
/// reduced-rate goods (10%, 4%); this is only the starting value.
pub const DEFAULT_TAX_PERCENT: i64 = 21;

/// Default discount applied to new draft lines, in percent
pub const DEFAULT_DISCOUNT_PERCENT: i64 = 0;

/// Maximum distinct lines in a single order draft
///
/// ## Business Reason
/// Keeps drafts at a size the review screen and the order PDF can
/// actually present. Real orders run 5-30 lines.
pub const MAX_DRAFT_LINES: usize = 100;

/// Maximum quantity on a single order line
///
/// ## Business Reason
/// Catches typo quantities (1000 instead of 10) before they become
/// five-figure orders.
pub const MAX_LINE_QUANTITY: i64 = 999;
