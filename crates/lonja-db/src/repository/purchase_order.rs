//! # Purchase Order Repository
//!
//! Transactional persistence for purchase orders and their line items.
//!
//! ## Create Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Order Creation Transaction                         │
//! │                                                                         │
//! │  create_order(input)                                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. Validate (customer present, items non-empty, rates in range)        │
//! │  2. Recompute totals from the submitted items                           │
//! │       │                                                                 │
//! │       ▼           BEGIN TRANSACTION                                     │
//! │  3. INSERT header, order_no = COALESCE(MAX(order_no), 0) + 1            │
//! │  4. INSERT each line item                                               │
//! │  5. SELECT the stored header back                                       │
//! │       │           COMMIT                                                │
//! │       ▼                                                                 │
//! │  PurchaseOrder { total_amount: server-computed }                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why Recompute Totals?
//! The caller's draft already shows a total, but the stored figure is the
//! one invoices are built from. The repository runs the same line formula
//! over the submitted items and persists that result, so a stale or
//! tampered client value never reaches the database.
//!
//! Updates are full-replace: the header row is updated, the old line items
//! deleted, and the submitted set inserted, all inside one transaction. A
//! failure at any step rolls the whole order back to its previous state.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use lonja_core::validation::{
    validate_customer_id, validate_order_items, validate_uuid, ValidationOptions,
};
use lonja_core::{CreateOrder, OrderItemInput, PurchaseOrder, PurchaseOrderItem, UpdateOrder};

/// Repository for purchase order database operations.
#[derive(Debug, Clone)]
pub struct PurchaseOrderRepository {
    pool: SqlitePool,
    validation: ValidationOptions,
}

impl PurchaseOrderRepository {
    /// Creates a new PurchaseOrderRepository with permissive validation.
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseOrderRepository {
            pool,
            validation: ValidationOptions::default(),
        }
    }

    /// Replaces the validation options, e.g. with [`ValidationOptions::strict`].
    pub fn with_validation(mut self, validation: ValidationOptions) -> Self {
        self.validation = validation;
        self
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Creates a purchase order with its line items.
    ///
    /// The order number is allocated inside the transaction, so concurrent
    /// creates on the same database never share a number. The stored
    /// `total_amount` is recomputed here from the submitted items.
    pub async fn create_order(&self, input: &CreateOrder) -> DbResult<PurchaseOrder> {
        validate_customer_id(&input.customer_id)?;
        validate_order_items(&input.items, &self.validation)?;

        let totals = input.totals();
        let order_id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO purchase_orders (id, order_no, customer_id, total_amount, created_at, updated_at)
            VALUES (
                ?1,
                (SELECT COALESCE(MAX(order_no), 0) + 1 FROM purchase_orders),
                ?2, ?3, ?4, ?5
            )
            "#,
        )
        .bind(&order_id)
        .bind(&input.customer_id)
        .bind(totals.total)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for item in &input.items {
            insert_item(&mut tx, &order_id, item).await?;
        }

        let order = fetch_order(&mut tx, &order_id).await?;

        tx.commit().await?;

        info!(
            order_id = %order.id,
            order_no = order.order_no,
            total = %order.total_amount,
            items = input.items.len(),
            "Purchase order created"
        );

        Ok(order)
    }

    /// Updates a purchase order, replacing its entire line item set.
    ///
    /// Returns [`DbError::NotFound`] when no order has the given id. The
    /// delete-and-reinsert of items happens inside the same transaction as
    /// the header update, so a failed update leaves the old lines intact.
    pub async fn update_order(&self, id: &str, input: &UpdateOrder) -> DbResult<PurchaseOrder> {
        validate_uuid("order_id", id)?;
        validate_customer_id(&input.customer_id)?;
        validate_order_items(&input.items, &self.validation)?;

        let totals = input.totals();
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let header = sqlx::query(
            r#"
            UPDATE purchase_orders
            SET customer_id = ?2, total_amount = ?3, updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&input.customer_id)
        .bind(totals.total)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if header.rows_affected() == 0 {
            // dropping tx rolls back
            return Err(DbError::not_found("PurchaseOrder", id));
        }

        sqlx::query("DELETE FROM purchase_order_items WHERE order_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        for item in &input.items {
            insert_item(&mut tx, id, item).await?;
        }

        let order = fetch_order(&mut tx, id).await?;

        tx.commit().await?;

        info!(
            order_id = %order.id,
            order_no = order.order_no,
            total = %order.total_amount,
            items = input.items.len(),
            "Purchase order updated"
        );

        Ok(order)
    }

    /// Deletes a purchase order. Line items cascade away with the header.
    pub async fn delete_order(&self, id: &str) -> DbResult<()> {
        debug!(order_id = %id, "Deleting purchase order");

        let result = sqlx::query("DELETE FROM purchase_orders WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("PurchaseOrder", id));
        }

        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets an order header by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<PurchaseOrder>> {
        let order = sqlx::query_as::<_, PurchaseOrder>(
            r#"
            SELECT id, order_no, customer_id, total_amount, created_at, updated_at
            FROM purchase_orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Gets an order's line items in the order they were added.
    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<PurchaseOrderItem>> {
        let items = sqlx::query_as::<_, PurchaseOrderItem>(
            r#"
            SELECT id, order_id, product_id, quantity, unit_price, discount_percent, tax_percent
            FROM purchase_order_items
            WHERE order_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists all orders, newest order number first.
    pub async fn list(&self) -> DbResult<Vec<PurchaseOrder>> {
        let orders = sqlx::query_as::<_, PurchaseOrder>(
            r#"
            SELECT id, order_no, customer_id, total_amount, created_at, updated_at
            FROM purchase_orders
            ORDER BY order_no DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Counts all orders.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM purchase_orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Inserts one line item inside an open transaction.
async fn insert_item(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    order_id: &str,
    item: &OrderItemInput,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO purchase_order_items
            (id, order_id, product_id, quantity, unit_price, discount_percent, tax_percent)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(order_id)
    .bind(&item.product_id)
    .bind(item.quantity)
    .bind(item.unit_price)
    .bind(item.discount_percent)
    .bind(item.tax_percent)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Reads the stored header back inside the transaction that wrote it.
async fn fetch_order(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    order_id: &str,
) -> DbResult<PurchaseOrder> {
    let order = sqlx::query_as::<_, PurchaseOrder>(
        r#"
        SELECT id, order_no, customer_id, total_amount, created_at, updated_at
        FROM purchase_orders
        WHERE id = ?1
        "#,
    )
    .bind(order_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(order)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::customer::generate_customer_id;
    use crate::repository::product::{generate_product_id, DeleteOutcome};
    use lonja_core::{format_order_no, Customer, Money, Percent, Product, ValidationError};
    use rust_decimal::Decimal;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn money(cents: i64) -> Money {
        Money::new(Decimal::new(cents, 2))
    }

    fn pct(value: i64) -> Percent {
        Percent::new(Decimal::from(value))
    }

    async fn seed_customer(db: &Database, name: &str) -> Customer {
        let customer = Customer {
            id: generate_customer_id(),
            name: name.to_string(),
            email: None,
            phone: None,
            address: None,
        };
        db.customers().insert(&customer).await.unwrap()
    }

    async fn seed_product(db: &Database, name: &str, cents: i64) -> Product {
        let now = Utc::now();
        let product = Product {
            id: generate_product_id(),
            name: name.to_string(),
            description: None,
            price: money(cents),
            category_id: None,
            image_url: None,
            deleted: false,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await.unwrap()
    }

    fn item(product_id: &str, quantity: i64, cents: i64, dto: i64, iva: i64) -> OrderItemInput {
        OrderItemInput {
            product_id: product_id.to_string(),
            quantity,
            unit_price: money(cents),
            discount_percent: pct(dto),
            tax_percent: pct(iva),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_order_numbers() {
        let db = test_db().await;
        let customer = seed_customer(&db, "Restaurante La Barca").await;
        let gamba = seed_product(&db, "Gamba blanca", 2450).await;

        for expected_no in 1..=3 {
            let order = db
                .purchase_orders()
                .create_order(&CreateOrder {
                    customer_id: customer.id.clone(),
                    items: vec![item(&gamba.id, 1, 2450, 0, 21)],
                })
                .await
                .unwrap();
            assert_eq!(order.order_no, expected_no);
        }

        assert_eq!(format_order_no(3), "0003");
        assert_eq!(db.purchase_orders().count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_create_recomputes_total_server_side() {
        let db = test_db().await;
        let customer = seed_customer(&db, "Marisquería Puerto").await;
        let merluza = seed_product(&db, "Merluza", 1000).await;

        // 2 x 10.00, 10% off, 21% tax: base 18.00, tax 3.78, total 21.78
        let order = db
            .purchase_orders()
            .create_order(&CreateOrder {
                customer_id: customer.id.clone(),
                items: vec![item(&merluza.id, 2, 1000, 10, 21)],
            })
            .await
            .unwrap();

        assert_eq!(order.total_amount, money(2178));

        let stored = db
            .purchase_orders()
            .get_by_id(&order.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.total_amount, money(2178));
    }

    #[tokio::test]
    async fn test_items_preserve_insertion_order() {
        let db = test_db().await;
        let customer = seed_customer(&db, "Bar Centro").await;
        let pulpo = seed_product(&db, "Pulpo", 2100).await;
        let almeja = seed_product(&db, "Almeja fina", 1650).await;
        let gamba = seed_product(&db, "Gamba roja", 3800).await;

        let order = db
            .purchase_orders()
            .create_order(&CreateOrder {
                customer_id: customer.id.clone(),
                items: vec![
                    item(&pulpo.id, 2, 2100, 0, 21),
                    item(&almeja.id, 1, 1650, 5, 10),
                    item(&gamba.id, 3, 3800, 0, 21),
                ],
            })
            .await
            .unwrap();

        let items = db.purchase_orders().get_items(&order.id).await.unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].product_id, pulpo.id);
        assert_eq!(items[1].product_id, almeja.id);
        assert_eq!(items[2].product_id, gamba.id);
        assert_eq!(items[2].quantity, 3);
    }

    #[tokio::test]
    async fn test_update_replaces_items_and_total() {
        let db = test_db().await;
        let customer = seed_customer(&db, "Restaurante La Barca").await;
        let gamba = seed_product(&db, "Gamba blanca", 2450).await;
        let pulpo = seed_product(&db, "Pulpo", 2100).await;

        let order = db
            .purchase_orders()
            .create_order(&CreateOrder {
                customer_id: customer.id.clone(),
                items: vec![item(&gamba.id, 1, 2450, 0, 21)],
            })
            .await
            .unwrap();

        // 3 x 10.00 with no discount and 21% tax: total 36.30
        let updated = db
            .purchase_orders()
            .update_order(
                &order.id,
                &UpdateOrder {
                    customer_id: customer.id.clone(),
                    items: vec![item(&pulpo.id, 3, 1000, 0, 21)],
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.order_no, order.order_no);
        assert_eq!(updated.total_amount, money(3630));

        let items = db.purchase_orders().get_items(&order.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id, pulpo.id);
    }

    #[tokio::test]
    async fn test_update_missing_order_is_not_found() {
        let db = test_db().await;
        let customer = seed_customer(&db, "Bar Centro").await;
        let gamba = seed_product(&db, "Gamba blanca", 2450).await;

        let missing = Uuid::new_v4().to_string();
        let result = db
            .purchase_orders()
            .update_order(
                &missing,
                &UpdateOrder {
                    customer_id: customer.id.clone(),
                    items: vec![item(&gamba.id, 1, 2450, 0, 21)],
                },
            )
            .await;

        assert!(matches!(result, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_cascades_items() {
        let db = test_db().await;
        let customer = seed_customer(&db, "Marisquería Puerto").await;
        let merluza = seed_product(&db, "Merluza", 1280).await;

        let order = db
            .purchase_orders()
            .create_order(&CreateOrder {
                customer_id: customer.id.clone(),
                items: vec![item(&merluza.id, 4, 1280, 0, 10)],
            })
            .await
            .unwrap();

        db.purchase_orders().delete_order(&order.id).await.unwrap();

        assert!(db
            .purchase_orders()
            .get_by_id(&order.id)
            .await
            .unwrap()
            .is_none());
        assert!(db
            .purchase_orders()
            .get_items(&order.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_empty_items() {
        let db = test_db().await;
        let customer = seed_customer(&db, "Bar Centro").await;

        let result = db
            .purchase_orders()
            .create_order(&CreateOrder {
                customer_id: customer.id.clone(),
                items: vec![],
            })
            .await;

        assert!(matches!(
            result,
            Err(DbError::Validation(ValidationError::MustNotBeEmpty { .. }))
        ));
        assert_eq!(db.purchase_orders().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_customer() {
        let db = test_db().await;
        let gamba = seed_product(&db, "Gamba blanca", 2450).await;

        let result = db
            .purchase_orders()
            .create_order(&CreateOrder {
                customer_id: "   ".to_string(),
                items: vec![item(&gamba.id, 1, 2450, 0, 21)],
            })
            .await;

        assert!(matches!(
            result,
            Err(DbError::Validation(ValidationError::Required { .. }))
        ));
    }

    #[tokio::test]
    async fn test_strict_validation_rejects_percent_over_100() {
        let db = test_db().await;
        let customer = seed_customer(&db, "Restaurante La Barca").await;
        let gamba = seed_product(&db, "Gamba blanca", 2450).await;

        let strict = PurchaseOrderRepository::new(db.pool().clone())
            .with_validation(ValidationOptions::strict());

        let result = strict
            .create_order(&CreateOrder {
                customer_id: customer.id.clone(),
                items: vec![item(&gamba.id, 1, 2450, 120, 21)],
            })
            .await;

        assert!(matches!(
            result,
            Err(DbError::Validation(ValidationError::OutOfRange { .. }))
        ));

        // the permissive default accepts the same input
        let order = db
            .purchase_orders()
            .create_order(&CreateOrder {
                customer_id: customer.id.clone(),
                items: vec![item(&gamba.id, 1, 2450, 120, 21)],
            })
            .await
            .unwrap();
        assert!(order.total_amount.is_negative());
    }

    #[tokio::test]
    async fn test_referenced_product_is_soft_deleted() {
        let db = test_db().await;
        let customer = seed_customer(&db, "Restaurante La Barca").await;
        let gamba = seed_product(&db, "Gamba blanca", 2450).await;

        db.purchase_orders()
            .create_order(&CreateOrder {
                customer_id: customer.id.clone(),
                items: vec![item(&gamba.id, 1, 2450, 0, 21)],
            })
            .await
            .unwrap();

        let outcome = db.products().delete(&gamba.id).await.unwrap();
        assert_eq!(outcome, DeleteOutcome::SoftDeleted);

        // the order's line still resolves, pickers no longer offer it
        let stored = db.products().get_by_id(&gamba.id).await.unwrap().unwrap();
        assert!(stored.deleted);
        assert!(db.products().search("gamba", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let db = test_db().await;
        let customer = seed_customer(&db, "Bar Centro").await;
        let gamba = seed_product(&db, "Gamba blanca", 2450).await;

        for _ in 0..3 {
            db.purchase_orders()
                .create_order(&CreateOrder {
                    customer_id: customer.id.clone(),
                    items: vec![item(&gamba.id, 1, 2450, 0, 21)],
                })
                .await
                .unwrap();
        }

        let orders = db.purchase_orders().list().await.unwrap();
        let numbers: Vec<i64> = orders.iter().map(|o| o.order_no).collect();
        assert_eq!(numbers, vec![3, 2, 1]);
    }
}
