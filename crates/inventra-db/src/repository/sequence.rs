//! # Order Number Sequencer
//!
//! Issues `#NNNNNN` order numbers from a persisted counter.
//!
//! ## Increment-and-Return
//! ```text
//! caller A ──┐
//!            ├──► UPDATE sequences SET value = value + 1
//! caller B ──┘        WHERE name = 'order_number'
//!                     RETURNING value
//!                          │
//!                          ▼
//!            A gets 7, B gets 8 (never the same value)
//! ```
//!
//! The increment runs in its own autocommit statement, outside any order
//! transaction, so issuance stays an O(1) write. The counter sits in the
//! sequence store, a database file of its own, so it never waits on the
//! writer lock of an open order transaction. A number drawn for an order
//! that later rolls back is not handed out again; the gap is accepted.

use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use inventra_core::OrderNumber;

const ORDER_NUMBER_COUNTER: &str = "order_number";

/// Repository for the order number counter.
#[derive(Debug, Clone)]
pub struct OrderNumberSequencer {
    pool: SqlitePool,
}

impl OrderNumberSequencer {
    /// Creates a new OrderNumberSequencer over a sequence store pool.
    pub fn new(pool: SqlitePool) -> Self {
        OrderNumberSequencer { pool }
    }

    /// The sequence store pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Consumes and returns the next order number.
    ///
    /// The first call on a fresh database yields `#000001`.
    ///
    /// ## Errors
    /// - `SequencerUnavailable` - the counter row is missing or the
    ///   increment failed. There is no fallback.
    pub async fn next(&self) -> DbResult<OrderNumber> {
        let value: Option<i64> = sqlx::query_scalar(
            "UPDATE sequences SET value = value + 1 WHERE name = ?1 RETURNING value",
        )
        .bind(ORDER_NUMBER_COUNTER)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Order number increment failed");
            DbError::SequencerUnavailable(e.to_string())
        })?;

        let number = to_order_number(value)?;
        debug!(order_number = %number, "Issued order number");
        Ok(number)
    }

    /// The number the next [`next`](Self::next) call would issue.
    ///
    /// For display only; it is not reserved and a concurrent caller may
    /// take it first.
    pub async fn peek_next(&self) -> DbResult<OrderNumber> {
        let value: Option<i64> =
            sqlx::query_scalar("SELECT value + 1 FROM sequences WHERE name = ?1")
                .bind(ORDER_NUMBER_COUNTER)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| DbError::SequencerUnavailable(e.to_string()))?;

        to_order_number(value)
    }
}

fn to_order_number(value: Option<i64>) -> DbResult<OrderNumber> {
    match value {
        Some(v) if v > 0 => Ok(OrderNumber::from_sequence(v as u64)),
        Some(v) => Err(DbError::SequencerUnavailable(format!(
            "counter holds invalid value {v}"
        ))),
        None => Err(DbError::SequencerUnavailable(format!(
            "counter '{ORDER_NUMBER_COUNTER}' is missing"
        ))),
    }
}
