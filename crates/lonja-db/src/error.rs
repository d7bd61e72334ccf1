//! # Database Error Types
//!
//! Everything the storage layer can fail with, folded into one enum so
//! request handlers match on a single type. Raw `sqlx::Error` values are
//! classified on the way out of the pool: constraint failures become the
//! specific variant (`UniqueViolation`, `ForeignKeyViolation`), anything
//! else stays a query or connection error with its message attached.
//!
//! Order submission is validated here, at the write boundary, so a
//! hand-rolled client can never persist an order the dashboard's own
//! rules would refuse. Those failures surface as [`DbError::Validation`].

use lonja_core::ValidationError;
use sqlx::error::ErrorKind;
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// Returned both for reads of a missing ID and for updates or
    /// deletes whose `rows_affected` came back zero.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A UNIQUE index rejected the write. `field` carries the
    /// `table.column` SQLite named in its message, e.g.
    /// `purchase_orders.order_no`.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// A referenced row does not exist, or a referencing row still does.
    ///
    /// Orders point at customers and line items point at products, so
    /// this fires for bad IDs on insert and for deleting a customer
    /// that orders still reference.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Input rejected before any SQL ran.
    ///
    /// Empty item lists, blank customer IDs, nonpositive quantities.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Could not open or reach the database file.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A schema migration did not apply cleanly.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed for a reason other than a constraint.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// All pool connections were busy past the acquire timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Anything sqlx reports that fits no category above.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            // The driver classifies SQLite extended result codes for us,
            // so constraint failures are matched by kind rather than by
            // sniffing message text.
            sqlx::Error::Database(db_err) => match db_err.kind() {
                ErrorKind::UniqueViolation => {
                    // "UNIQUE constraint failed: purchase_orders.order_no"
                    let field = db_err
                        .message()
                        .rsplit(": ")
                        .next()
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                }
                ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation {
                    message: db_err.message().to_string(),
                },
                _ => DbError::QueryFailed(db_err.message().to_string()),
            },

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
