//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! ## Delete Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Product Delete Decision                              │
//! │                                                                         │
//! │  delete(product_id)                                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Is the product referenced by any purchase_order_items row?            │
//! │       │                                                                 │
//! │       ├── YES → soft delete (deleted = 1)                              │
//! │       │         Historical orders keep resolving the product;         │
//! │       │         pickers and listings stop showing it.                  │
//! │       │                                                                 │
//! │       └── NO  → hard delete (DROP the row)                             │
//! │                 Nothing points at it; vendor rates cascade away.       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use lonja_core::Product;

/// What [`ProductRepository::delete`] actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The row was flagged `deleted = 1` because order history references it.
    SoftDeleted,
    /// The row was removed outright.
    HardDeleted,
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// // Search products by name
/// let results = repo.search("gamba", 20).await?;
///
/// // Get by ID
/// let product = repo.get_by_id("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new product.
    ///
    /// ## Arguments
    /// * `product` - Product to insert (id should be generated beforehand)
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, description, price, category_id,
                image_url, deleted, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(&product.category_id)
        .bind(&product.image_url)
        .bind(product.deleted)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product.clone())
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found (deleted ones included, so
    ///   order history can still resolve them)
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price, category_id,
                   image_url, deleted, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Searches active products by name.
    ///
    /// ## Arguments
    /// * `query` - Search term (matched anywhere in the name)
    /// * `limit` - Maximum results to return
    ///
    /// An empty query falls back to [`ProductRepository::list`].
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let query = query.trim();

        debug!(query = %query, limit = %limit, "Searching products");

        if query.is_empty() {
            return self.list(limit).await;
        }

        let pattern = format!("%{}%", query);

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price, category_id,
                   image_url, deleted, created_at, updated_at
            FROM products
            WHERE deleted = 0 AND name LIKE ?1
            ORDER BY name
            LIMIT ?2
            "#,
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Lists active products sorted by name.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price, category_id,
                   image_url, deleted, created_at, updated_at
            FROM products
            WHERE deleted = 0
            ORDER BY name
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Lists active products in a category, sorted by name.
    pub async fn list_by_category(&self, category_id: &str, limit: u32) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price, category_id,
                   image_url, deleted, created_at, updated_at
            FROM products
            WHERE deleted = 0 AND category_id = ?1
            ORDER BY name
            LIMIT ?2
            "#,
        )
        .bind(category_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Updates an existing product's editable fields.
    ///
    /// ## Returns
    /// * `Ok(())` - Update successful
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                description = ?3,
                price = ?4,
                category_id = ?5,
                image_url = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(&product.category_id)
        .bind(&product.image_url)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Deletes a product, softly if order history references it.
    ///
    /// ## Returns
    /// Which kind of delete was performed, or `DbError::NotFound` if the
    /// product doesn't exist.
    pub async fn delete(&self, id: &str) -> DbResult<DeleteOutcome> {
        let referenced: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM purchase_order_items WHERE product_id = ?1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if referenced > 0 {
            debug!(id = %id, referenced = referenced, "Soft-deleting product");

            let now = Utc::now();
            let result = sqlx::query(
                "UPDATE products SET deleted = 1, updated_at = ?2 WHERE id = ?1",
            )
            .bind(id)
            .bind(now)
            .execute(&self.pool)
            .await?;

            if result.rows_affected() == 0 {
                return Err(DbError::not_found("Product", id));
            }
            Ok(DeleteOutcome::SoftDeleted)
        } else {
            debug!(id = %id, "Hard-deleting product");

            let result = sqlx::query("DELETE FROM products WHERE id = ?1")
                .bind(id)
                .execute(&self.pool)
                .await?;

            if result.rows_affected() == 0 {
                return Err(DbError::not_found("Product", id));
            }
            Ok(DeleteOutcome::HardDeleted)
        }
    }

    /// Counts active products (for diagnostics and seed checks).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE deleted = 0")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use lonja_core::Money;
    use rust_decimal::Decimal;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn test_product(name: &str, price_cents: i64) -> Product {
        let now = Utc::now();
        Product {
            id: generate_product_id(),
            name: name.to_string(),
            description: None,
            price: Money::new(Decimal::new(price_cents, 2)),
            category_id: None,
            image_url: None,
            deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let product = test_product("Gamba blanca", 2450);

        db.products().insert(&product).await.unwrap();

        let found = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Gamba blanca");
        // price round-trips the exact decimal
        assert_eq!(found.price, Money::new(Decimal::new(2450, 2)));
        assert!(!found.deleted);
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let db = test_db().await;
        let found = db.products().get_by_id("no-such-id").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_search_by_name() {
        let db = test_db().await;
        db.products()
            .insert(&test_product("Gamba blanca", 2450))
            .await
            .unwrap();
        db.products()
            .insert(&test_product("Gamba roja", 3800))
            .await
            .unwrap();
        db.products()
            .insert(&test_product("Merluza", 1200))
            .await
            .unwrap();

        let gambas = db.products().search("gamba", 10).await.unwrap();
        assert_eq!(gambas.len(), 2);

        // empty query lists everything active
        let all = db.products().search("  ", 10).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_update() {
        let db = test_db().await;
        let mut product = test_product("Merluza", 1200);
        db.products().insert(&product).await.unwrap();

        product.name = "Merluza de pincho".to_string();
        product.price = Money::new(Decimal::new(1450, 2));
        db.products().update(&product).await.unwrap();

        let found = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Merluza de pincho");
        assert_eq!(found.price, Money::new(Decimal::new(1450, 2)));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let db = test_db().await;
        let product = test_product("Ghost", 100);

        let result = db.products().update(&product).await;
        assert!(matches!(result, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_unreferenced_product_is_hard_deleted() {
        let db = test_db().await;
        let product = test_product("Pulpo", 2200);
        db.products().insert(&product).await.unwrap();

        let outcome = db.products().delete(&product.id).await.unwrap();
        assert_eq!(outcome, DeleteOutcome::HardDeleted);

        assert!(db.products().get_by_id(&product.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let db = test_db().await;
        let result = db.products().delete("no-such-id").await;
        assert!(matches!(result, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_count_excludes_deleted() {
        let db = test_db().await;
        let keep = test_product("Almeja", 900);
        let mut gone = test_product("Navaja", 1500);
        gone.deleted = true;

        db.products().insert(&keep).await.unwrap();
        db.products().insert(&gone).await.unwrap();

        assert_eq!(db.products().count().await.unwrap(), 1);

        // listings skip the soft-deleted row, get_by_id still finds it
        let listed = db.products().list(10).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(db.products().get_by_id(&gone.id).await.unwrap().is_some());
    }
}
