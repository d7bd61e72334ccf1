//! # Vendor Repository
//!
//! Database operations for vendors and their per-product rates.
//!
//! ## Rate Upsert
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 One Rate Per (Vendor, Product)                          │
//! │                                                                         │
//! │  register_rate(vendor, product, 24.50)                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT ... ON CONFLICT (vendor_id, product_id)                        │
//! │            DO UPDATE SET rate, updated_at                              │
//! │       │                                                                 │
//! │       ├── New pair   → fresh row                                       │
//! │       └── Known pair → rate replaced, row id kept stable               │
//! │                                                                         │
//! │  The table's UNIQUE constraint makes the invariant hold even if        │
//! │  two handlers race on the same pair.                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use lonja_core::{Money, Vendor, VendorProductRate};

// =============================================================================
// Vendors
// =============================================================================

/// Repository for vendor database operations.
#[derive(Debug, Clone)]
pub struct VendorRepository {
    pool: SqlitePool,
}

impl VendorRepository {
    /// Creates a new VendorRepository.
    pub fn new(pool: SqlitePool) -> Self {
        VendorRepository { pool }
    }

    /// Inserts a new vendor.
    pub async fn insert(&self, vendor: &Vendor) -> DbResult<Vendor> {
        debug!(id = %vendor.id, name = %vendor.name, "Inserting vendor");

        sqlx::query("INSERT INTO vendors (id, name, email, phone) VALUES (?1, ?2, ?3, ?4)")
            .bind(&vendor.id)
            .bind(&vendor.name)
            .bind(&vendor.email)
            .bind(&vendor.phone)
            .execute(&self.pool)
            .await?;

        Ok(vendor.clone())
    }

    /// Gets a vendor by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Vendor>> {
        let vendor = sqlx::query_as::<_, Vendor>(
            "SELECT id, name, email, phone FROM vendors WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(vendor)
    }

    /// Lists all vendors sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Vendor>> {
        let vendors = sqlx::query_as::<_, Vendor>(
            "SELECT id, name, email, phone FROM vendors ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(vendors)
    }

    /// Updates an existing vendor.
    pub async fn update(&self, vendor: &Vendor) -> DbResult<()> {
        debug!(id = %vendor.id, "Updating vendor");

        let result =
            sqlx::query("UPDATE vendors SET name = ?2, email = ?3, phone = ?4 WHERE id = ?1")
                .bind(&vendor.id)
                .bind(&vendor.name)
                .bind(&vendor.email)
                .bind(&vendor.phone)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Vendor", &vendor.id));
        }

        Ok(())
    }

    /// Deletes a vendor. Its registered rates cascade away.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting vendor");

        let result = sqlx::query("DELETE FROM vendors WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Vendor", id));
        }

        Ok(())
    }
}

/// Helper to generate a new vendor ID.
pub fn generate_vendor_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Vendor Rates
// =============================================================================

/// Repository for per-vendor product rates.
#[derive(Debug, Clone)]
pub struct VendorRateRepository {
    pool: SqlitePool,
}

impl VendorRateRepository {
    /// Creates a new VendorRateRepository.
    pub fn new(pool: SqlitePool) -> Self {
        VendorRateRepository { pool }
    }

    /// Registers a rate for a (vendor, product) pair, replacing any
    /// previous rate for the same pair.
    ///
    /// ## Returns
    /// The stored row. On replacement the row keeps its original id.
    pub async fn upsert(
        &self,
        vendor_id: &str,
        product_id: &str,
        rate: Money,
    ) -> DbResult<VendorProductRate> {
        debug!(vendor_id = %vendor_id, product_id = %product_id, rate = %rate, "Registering vendor rate");

        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO vendor_product_rates (id, vendor_id, product_id, rate, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (vendor_id, product_id)
            DO UPDATE SET rate = excluded.rate, updated_at = excluded.updated_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(vendor_id)
        .bind(product_id)
        .bind(rate)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let stored = sqlx::query_as::<_, VendorProductRate>(
            r#"
            SELECT id, vendor_id, product_id, rate, updated_at
            FROM vendor_product_rates
            WHERE vendor_id = ?1 AND product_id = ?2
            "#,
        )
        .bind(vendor_id)
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }

    /// Lists a vendor's rates, most recently updated first.
    pub async fn list_for_vendor(&self, vendor_id: &str) -> DbResult<Vec<VendorProductRate>> {
        let rates = sqlx::query_as::<_, VendorProductRate>(
            r#"
            SELECT id, vendor_id, product_id, rate, updated_at
            FROM vendor_product_rates
            WHERE vendor_id = ?1
            ORDER BY updated_at DESC
            "#,
        )
        .bind(vendor_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rates)
    }

    /// Deletes a rate by its row id.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting vendor rate");

        let result = sqlx::query("DELETE FROM vendor_product_rates WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("VendorProductRate", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::product::generate_product_id;
    use lonja_core::Product;
    use rust_decimal::Decimal;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn money(cents: i64) -> Money {
        Money::new(Decimal::new(cents, 2))
    }

    fn test_vendor(name: &str) -> Vendor {
        Vendor {
            id: generate_vendor_id(),
            name: name.to_string(),
            email: None,
            phone: None,
        }
    }

    fn test_product(name: &str) -> Product {
        let now = Utc::now();
        Product {
            id: generate_product_id(),
            name: name.to_string(),
            description: None,
            price: money(1000),
            category_id: None,
            image_url: None,
            deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_vendor_crud() {
        let db = test_db().await;
        let mut vendor = test_vendor("Barca Hermanos");

        db.vendors().insert(&vendor).await.unwrap();

        vendor.phone = Some("+34 611 111 111".to_string());
        db.vendors().update(&vendor).await.unwrap();

        let found = db.vendors().get_by_id(&vendor.id).await.unwrap().unwrap();
        assert_eq!(found.phone.as_deref(), Some("+34 611 111 111"));

        db.vendors().delete(&vendor.id).await.unwrap();
        assert!(db.vendors().get_by_id(&vendor.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_keeps_one_row_per_pair() {
        let db = test_db().await;
        let vendor = test_vendor("Barca Hermanos");
        let product = test_product("Gamba roja");
        db.vendors().insert(&vendor).await.unwrap();
        db.products().insert(&product).await.unwrap();

        let first = db
            .vendor_rates()
            .upsert(&vendor.id, &product.id, money(3800))
            .await
            .unwrap();

        let second = db
            .vendor_rates()
            .upsert(&vendor.id, &product.id, money(3650))
            .await
            .unwrap();

        // same row, replaced rate
        assert_eq!(second.id, first.id);
        assert_eq!(second.rate, money(3650));

        let rates = db.vendor_rates().list_for_vendor(&vendor.id).await.unwrap();
        assert_eq!(rates.len(), 1);
    }

    #[tokio::test]
    async fn test_rates_for_different_products_coexist() {
        let db = test_db().await;
        let vendor = test_vendor("Cofradía Sur");
        let gamba = test_product("Gamba blanca");
        let pulpo = test_product("Pulpo");
        db.vendors().insert(&vendor).await.unwrap();
        db.products().insert(&gamba).await.unwrap();
        db.products().insert(&pulpo).await.unwrap();

        db.vendor_rates()
            .upsert(&vendor.id, &gamba.id, money(2400))
            .await
            .unwrap();
        db.vendor_rates()
            .upsert(&vendor.id, &pulpo.id, money(2100))
            .await
            .unwrap();

        let rates = db.vendor_rates().list_for_vendor(&vendor.id).await.unwrap();
        assert_eq!(rates.len(), 2);
    }

    #[tokio::test]
    async fn test_vendor_delete_cascades_rates() {
        let db = test_db().await;
        let vendor = test_vendor("Barca Hermanos");
        let product = test_product("Merluza");
        db.vendors().insert(&vendor).await.unwrap();
        db.products().insert(&product).await.unwrap();

        db.vendor_rates()
            .upsert(&vendor.id, &product.id, money(1200))
            .await
            .unwrap();

        db.vendors().delete(&vendor.id).await.unwrap();

        let rates = db.vendor_rates().list_for_vendor(&vendor.id).await.unwrap();
        assert!(rates.is_empty());
    }

    #[tokio::test]
    async fn test_rate_requires_existing_vendor() {
        let db = test_db().await;
        let product = test_product("Almeja");
        db.products().insert(&product).await.unwrap();

        let result = db
            .vendor_rates()
            .upsert("no-such-vendor", &product.id, money(900))
            .await;

        assert!(matches!(result, Err(DbError::ForeignKeyViolation { .. })));
    }
}
