//! # Customer Repository
//!
//! Database operations for customers. Purchase orders reference their
//! customer without a cascade, so deleting a customer with order history
//! fails with a foreign key violation rather than orphaning the orders.

use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use lonja_core::Customer;

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Inserts a new customer.
    pub async fn insert(&self, customer: &Customer) -> DbResult<Customer> {
        debug!(id = %customer.id, name = %customer.name, "Inserting customer");

        sqlx::query(
            "INSERT INTO customers (id, name, email, phone, address) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.address)
        .execute(&self.pool)
        .await?;

        Ok(customer.clone())
    }

    /// Gets a customer by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT id, name, email, phone, address FROM customers WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Lists all customers sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            "SELECT id, name, email, phone, address FROM customers ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Updates an existing customer.
    pub async fn update(&self, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, "Updating customer");

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                name = ?2,
                email = ?3,
                phone = ?4,
                address = ?5
            WHERE id = ?1
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.address)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", &customer.id));
        }

        Ok(())
    }

    /// Deletes a customer.
    ///
    /// ## Errors
    /// `DbError::ForeignKeyViolation` when purchase orders still reference
    /// the customer.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting customer");

        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }
}

/// Helper to generate a new customer ID.
pub fn generate_customer_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn test_customer(name: &str) -> Customer {
        Customer {
            id: generate_customer_id(),
            name: name.to_string(),
            email: None,
            phone: None,
            address: None,
        }
    }

    #[tokio::test]
    async fn test_crud_round_trip() {
        let db = test_db().await;
        let mut customer = test_customer("Restaurante La Barca");

        db.customers().insert(&customer).await.unwrap();

        customer.email = Some("pedidos@labarca.example".to_string());
        customer.phone = Some("+34 600 000 000".to_string());
        db.customers().update(&customer).await.unwrap();

        let found = db
            .customers()
            .get_by_id(&customer.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.email.as_deref(), Some("pedidos@labarca.example"));

        db.customers().delete(&customer.id).await.unwrap();
        assert!(db
            .customers()
            .get_by_id(&customer.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_list_sorted_by_name() {
        let db = test_db().await;
        db.customers().insert(&test_customer("Zurito")).await.unwrap();
        db.customers().insert(&test_customer("Asador Norte")).await.unwrap();

        let customers = db.customers().list().await.unwrap();
        assert_eq!(customers.len(), 2);
        assert_eq!(customers[0].name, "Asador Norte");
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let db = test_db().await;
        let result = db.customers().delete("no-such-id").await;
        assert!(matches!(result, Err(DbError::NotFound { .. })));
    }
}
