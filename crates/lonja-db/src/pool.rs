//! # Database Pool Management
//!
//! One `SqlitePool` per process, wrapped in a cloneable [`Database`]
//! handle that hands out repositories. Request handlers each grab a
//! repository from a clone of the handle; reads run in parallel on
//! separate connections while SQLite serializes the writers.
//!
//! The pool opens the database in WAL (Write-Ahead Logging) mode so
//! order writes do not stall catalog reads, with `synchronous=NORMAL`
//! and foreign keys on. Migrations run during [`Database::new`] unless
//! the config opts out.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::category::CategoryRepository;
use crate::repository::customer::CustomerRepository;
use crate::repository::product::ProductRepository;
use crate::repository::purchase_order::PurchaseOrderRepository;
use crate::repository::vendor::{VendorRateRepository, VendorRepository};

// =============================================================================
// Configuration
// =============================================================================

/// Pool settings for one SQLite database file.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/lonja.db")
///     .max_connections(5)
///     .min_connections(1);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file. Created on first connect.
    pub database_path: PathBuf,

    /// Pool ceiling. Five covers a single-operator dashboard.
    pub max_connections: u32,

    /// Connections kept alive while idle. Default: 1.
    pub min_connections: u32,

    /// How long an acquire waits before giving up. Default: 30s.
    pub connect_timeout: Duration,

    /// Idle time before a pooled connection is dropped. Default: 10 min.
    pub idle_timeout: Duration,

    /// Whether `Database::new` applies pending migrations. Default: true.
    pub run_migrations: bool,
}

impl DbConfig {
    /// Configuration with defaults for the given database path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    /// Configuration for an in-memory database, one per test.
    ///
    /// Capped to a single connection: every `:memory:` connection is its
    /// own empty database, so a second one would not see the schema.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// SQLite connect options for this configuration.
    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        // mode=rwc creates the file on first open
        let url = format!("sqlite://{}?mode=rwc", self.database_path.display());

        let options = SqliteConnectOptions::from_str(&url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            // WAL: readers don't block the writer and vice versa
            .journal_mode(SqliteJournalMode::Wal)
            // NORMAL: safe from corruption, may lose the last
            // transaction on a crash
            .synchronous(SqliteSynchronous::Normal)
            // SQLite ships with foreign keys off; order item cascades
            // depend on them
            .foreign_keys(true)
            .create_if_missing(true);

        Ok(options)
    }
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle providing repository access.
///
/// Cheap to clone; every clone shares the same pool.
///
/// ```rust,ignore
/// let db = Database::new(DbConfig::new("./lonja.db")).await?;
///
/// let products = db.products().list(50).await?;
/// let order = db.purchase_orders().create_order(&payload).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the database file, builds the pool, and brings the schema
    /// up to date.
    ///
    /// Fails with [`DbError::ConnectionFailed`] when the file cannot be
    /// opened and [`DbError::MigrationFailed`] when a pending migration
    /// does not apply.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            max_connections = config.max_connections,
            "Opening database"
        );

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(config.connect_options()?)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!("Database pool created");

        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Applies pending migrations.
    ///
    /// Called by `new()` unless the config disables it; safe to call
    /// again at any point.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Returns a reference to the connection pool.
    ///
    /// For queries not covered by a repository. Prefer the repository
    /// methods when one exists.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the product repository.
    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    /// Returns the category repository.
    pub fn categories(&self) -> CategoryRepository {
        CategoryRepository::new(self.pool.clone())
    }

    /// Returns the customer repository.
    pub fn customers(&self) -> CustomerRepository {
        CustomerRepository::new(self.pool.clone())
    }

    /// Returns the vendor repository.
    pub fn vendors(&self) -> VendorRepository {
        VendorRepository::new(self.pool.clone())
    }

    /// Returns the vendor rate repository.
    pub fn vendor_rates(&self) -> VendorRateRepository {
        VendorRateRepository::new(self.pool.clone())
    }

    /// Returns the purchase order repository.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let order = db.purchase_orders().create_order(&payload).await?;
    /// println!("created order {}", format_order_no(order.order_no));
    /// ```
    pub fn purchase_orders(&self) -> PurchaseOrderRepository {
        PurchaseOrderRepository::new(self.pool.clone())
    }

    /// Closes the pool. Repository calls fail afterwards.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// True when the database still answers queries.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
