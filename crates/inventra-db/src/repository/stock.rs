//! # Stock Ledger
//!
//! The only writer of `products.quantity`.
//!
//! ## Atomic Adjustment
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 adjust_by_delta(product, -3)                            │
//! │                                                                         │
//! │  UPDATE products                                                       │
//! │     SET quantity = quantity + (-3)                                     │
//! │   WHERE id = ?  AND quantity + (-3) >= 0   ← check and write are one   │
//! │  RETURNING ...                               statement                 │
//! │       │                                                                 │
//! │       ├── row returned  → new StockLevel                               │
//! │       │                                                                 │
//! │       └── no row        → look up the product                          │
//! │                             ├── missing → ProductNotFound              │
//! │                             ├── delta > 0 → OutOfRange (unchanged)     │
//! │                             └── present → InsufficientStock (unchanged)│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The follow-up lookup only classifies a refusal that already happened;
//! it never decides whether the write goes through.
//!
//! Adjustments run either on their own (autocommit) or on the connection
//! of an enclosing order transaction, in which case the new quantity is
//! visible to others only after that transaction commits.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use inventra_core::validation::validate_stock_level;
use inventra_core::{CoreError, StockChange, StockLevel, ValidationError};

/// Repository for quantity-on-hand.
#[derive(Debug, Clone)]
pub struct StockLedger {
    pool: SqlitePool,
}

impl StockLedger {
    /// Creates a new StockLedger.
    pub fn new(pool: SqlitePool) -> Self {
        StockLedger { pool }
    }

    /// Applies `quantity += delta` atomically.
    ///
    /// Negative deltas are sales, positive deltas are restocks.
    ///
    /// ## Errors
    /// - `Core(ProductNotFound)` - no such product
    /// - `Core(InsufficientStock)` - result would be negative; stock unchanged
    /// - `Core(Validation)` - result would not fit in an `i64`; stock unchanged
    pub async fn adjust_by_delta(&self, product_id: i64, delta: i64) -> DbResult<StockLevel> {
        let mut conn = self.pool.acquire().await?;
        let level = adjust_in(&mut *conn, product_id, delta).await?;

        info!(
            product_id,
            delta,
            quantity = level.quantity,
            "Stock adjusted"
        );

        Ok(level)
    }

    /// Overwrites quantity-on-hand. For manual corrections, not sales.
    ///
    /// ## Errors
    /// - `Core(Validation)` - negative target
    /// - `Core(ProductNotFound)` - no such product
    pub async fn set_absolute(&self, product_id: i64, quantity: i64) -> DbResult<StockLevel> {
        validate_stock_level(quantity)?;

        let level = sqlx::query_as::<_, StockLevel>(
            r#"
            UPDATE products
            SET quantity = ?2, updated_at = ?3
            WHERE id = ?1
            RETURNING id AS product_id, product_code, name, price_cents, quantity
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(CoreError::ProductNotFound(product_id))?;

        info!(product_id, quantity, "Stock set");
        Ok(level)
    }

    /// Applies a [`StockChange`].
    pub async fn adjust(&self, product_id: i64, change: StockChange) -> DbResult<StockLevel> {
        match change {
            StockChange::Delta(delta) => self.adjust_by_delta(product_id, delta).await,
            StockChange::Absolute(quantity) => self.set_absolute(product_id, quantity).await,
        }
    }

    /// Current committed quantity-on-hand.
    pub async fn quantity_on_hand(&self, product_id: i64) -> DbResult<i64> {
        let quantity: Option<i64> = sqlx::query_scalar("SELECT quantity FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?;

        quantity.ok_or_else(|| CoreError::ProductNotFound(product_id).into())
    }
}

/// Conditional decrement/increment on `conn`.
///
/// Shared by [`StockLedger::adjust_by_delta`] and order placement, which
/// passes its transaction's connection.
pub(crate) async fn adjust_in(
    conn: &mut SqliteConnection,
    product_id: i64,
    delta: i64,
) -> DbResult<StockLevel> {
    debug!(product_id, delta, "Adjusting stock");

    let updated = sqlx::query_as::<_, StockLevel>(
        r#"
        UPDATE products
        SET quantity = quantity + ?2, updated_at = ?3
        WHERE id = ?1
          AND quantity + ?2 >= 0
          AND (?2 <= 0 OR quantity <= 9223372036854775807 - ?2)
        RETURNING id AS product_id, product_code, name, price_cents, quantity
        "#,
    )
    .bind(product_id)
    .bind(delta)
    .bind(Utc::now())
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(level) = updated {
        return Ok(level);
    }

    let current: Option<(String, i64)> =
        sqlx::query_as("SELECT product_code, quantity FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_optional(&mut *conn)
            .await?;

    let err = match current {
        None => CoreError::ProductNotFound(product_id),
        // SQLite would store the overflowed sum as REAL
        Some(_) if delta > 0 => CoreError::Validation(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: i64::MAX,
        }),
        Some((product_code, available)) => CoreError::InsufficientStock {
            product_id,
            product_code,
            available,
            requested: delta.saturating_neg(),
        },
    };

    warn!(product_id, delta, error = %err, "Stock adjustment refused");
    Err(DbError::Core(err))
}
