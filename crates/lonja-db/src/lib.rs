//! # lonja-db: Database Layer for the Lonja Dashboard
//!
//! SQLite persistence for the lonja purchasing dashboard, async via
//! sqlx. Everything the dashboard stores lives in one database file.
//!
//! ## Architecture Position
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Dashboard request (submit order, browse catalog)            │
//! │       │                                                      │
//! │       ▼                                                      │
//! │  Database handle (pool.rs)                                   │
//! │       │  hands out repositories over a shared SqlitePool     │
//! │       ▼                                                      │
//! │  PurchaseOrderRepository ─ order writes, one tx each         │
//! │  ProductRepository       ─ catalog CRUD + search             │
//! │  CustomerRepository, VendorRepository, VendorRateRepository, │
//! │  CategoryRepository      ─ supporting tables                 │
//! │       │                                                      │
//! │       ▼                                                      │
//! │  ./data/lonja.db  (WAL mode, foreign keys on, embedded       │
//! │                    migrations applied at startup)            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (purchase_order, product, etc.)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lonja_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/lonja.db")).await?;
//!
//! let order = db.purchase_orders().create_order(&payload).await?;
//! let products = db.products().search("gamba", 20).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::customer::CustomerRepository;
pub use repository::product::{DeleteOutcome, ProductRepository};
pub use repository::purchase_order::PurchaseOrderRepository;
pub use repository::vendor::{VendorRateRepository, VendorRepository};
