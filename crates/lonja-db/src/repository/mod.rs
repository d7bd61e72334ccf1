//! # Repository Module
//!
//! One repository struct per aggregate, each owning the SQL for its
//! tables. Handlers never write SQL directly; they go through a
//! repository, so order totals are recomputed in exactly one code path
//! and tests drive the same API against an in-memory database.
//!
//! ```text
//! Dashboard request handler
//!      │
//!      │  db.purchase_orders().create_order(&payload)
//!      ▼
//! PurchaseOrderRepository ── one transaction per order write
//!      │
//!      ▼
//! SQLite
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Product catalog CRUD and search
//! - [`category::CategoryRepository`] - Category CRUD
//! - [`customer::CustomerRepository`] - Customer CRUD
//! - [`vendor::VendorRepository`] - Vendor CRUD
//! - [`vendor::VendorRateRepository`] - Per-vendor product rates
//! - [`purchase_order::PurchaseOrderRepository`] - Order create/update/delete

pub mod category;
pub mod customer;
pub mod product;
pub mod purchase_order;
pub mod vendor;
