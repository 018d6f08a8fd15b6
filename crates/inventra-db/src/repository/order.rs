//! # Order Repository
//!
//! Order placement and order maintenance.
//!
//! ## Order Placement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       place_order(request)                              │
//! │                                                                         │
//! │  1. validate (inventra-core)     EmptyOrder / InvalidQuantity /        │
//! │                                  InvalidStatus, nothing consumed       │
//! │  2. sequencer.next()             sequence store, SequencerUnavailable  │
//! │                                                                         │
//! │  3. BEGIN ──────────────────────────────────────────────────────┐      │
//! │     │ for each line, ascending product id:                      │      │
//! │     │   StockLedger conditional UPDATE ... RETURNING snapshot   │      │
//! │     │   (ProductNotFound / InsufficientStock → ROLLBACK)        │      │
//! │     │ price lines from snapshots, sum total                     │      │
//! │     │ INSERT order header                                       │      │
//! │     │ INSERT order items (request order)                        │      │
//! │     │ deadline passed? → ROLLBACK, DeadlineExceeded             │      │
//! │  4. COMMIT ─────────────────────────────────────────────────────┘      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Either the header, every item and every stock decrement persist, or
//! none do. A failure after step 2 leaves a gap in order numbers; the
//! number is never reissued.
//!
//! Dropping the returned future before commit drops the transaction,
//! which rolls it back. After commit the order stands.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::sequence::OrderNumberSequencer;
use crate::repository::stock::adjust_in;
use inventra_core::order::order_total;
use inventra_core::status::normalize;
use inventra_core::{
    CoreError, Order, OrderDetails, OrderItem, OrderNumber, PlaceOrderRequest, PricedLine,
    ProductSales, StockLevel, ValidatedOrder,
};

const ORDER_COLUMNS: &str = r#"
    id,
    order_number,
    customer_ref,
    status,
    total_cents,
    platform,
    destination,
    created_at,
    updated_at
"#;

const ITEM_COLUMNS: &str = r#"
    id,
    order_id,
    product_id,
    product_code_snapshot,
    name_snapshot,
    unit_price_cents,
    quantity,
    line_total_cents,
    created_at
"#;

/// An `orders` row as stored.
///
/// Status is kept as text so rows written before normalization existed
/// (`Shipped`, `PENDING`) still load; [`OrderRow::into_order`] passes it
/// through the same normalizer the write path uses.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    order_number: String,
    customer_ref: String,
    status: String,
    total_cents: i64,
    platform: Option<String>,
    destination: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self) -> DbResult<Order> {
        let order_number = OrderNumber::parse(&self.order_number).map_err(|e| {
            DbError::Internal(format!("order {} has a malformed number: {e}", self.id))
        })?;

        let status = normalize(&self.status).map_err(|e| {
            DbError::Internal(format!("order {} has an unreadable status: {e}", self.id))
        })?;

        Ok(Order {
            id: self.id,
            order_number,
            customer_ref: self.customer_ref,
            status,
            total_cents: self.total_cents,
            platform: self.platform,
            destination: self.destination,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Repository for order database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.orders();
///
/// let placed = repo.place_order(request).await?;
/// let shipped = repo.update_status(placed.order.id, "Shipped").await?;
/// ```
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
    sequencer: OrderNumberSequencer,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    ///
    /// `sequencer` runs on the sequence store, not on `pool`.
    pub fn new(pool: SqlitePool, sequencer: OrderNumberSequencer) -> Self {
        OrderRepository { pool, sequencer }
    }

    // =========================================================================
    // Placement
    // =========================================================================

    /// Places an order as one atomic unit of work.
    ///
    /// ## Errors
    /// - Validation: `EmptyOrder`, `OrderTooLarge`, `InvalidQuantity`,
    ///   `InvalidUnitPrice`, `InvalidStatus`, `Validation`
    /// - Consistency: `ProductNotFound`, `InsufficientStock`
    /// - Infrastructure: `SequencerUnavailable`, `TransactionFailed`
    pub async fn place_order(&self, request: PlaceOrderRequest) -> DbResult<OrderDetails> {
        self.place(request, None).await
    }

    /// Like [`place_order`](Self::place_order), but rolls back with
    /// `DeadlineExceeded` if `deadline` has passed when the order is
    /// ready to commit.
    pub async fn place_order_before(
        &self,
        request: PlaceOrderRequest,
        deadline: Instant,
    ) -> DbResult<OrderDetails> {
        self.place(request, Some(deadline)).await
    }

    #[tracing::instrument(
        name = "place_order",
        skip(self, request, deadline),
        fields(customer_ref = %request.customer_ref, lines = request.items.len())
    )]
    async fn place(
        &self,
        request: PlaceOrderRequest,
        deadline: Option<Instant>,
    ) -> DbResult<OrderDetails> {
        let order = request.validate()?;

        let order_number = self.sequencer.next().await?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let details = match write_order(&mut *tx, &order, &order_number).await {
            Ok(details) => details,
            Err(err) => {
                debug!(order_number = %order_number, error = %err, "Order aborted");
                rollback(tx, &order_number).await;
                return Err(err.in_transaction());
            }
        };

        if deadline.is_some_and(|d| Instant::now() >= d) {
            warn!(order_number = %order_number, "Deadline passed before commit");
            rollback(tx, &order_number).await;
            return Err(DbError::DeadlineExceeded);
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            order_id = details.order.id,
            order_number = %details.order.order_number,
            status = %details.order.status,
            total_cents = details.order.total_cents,
            items = details.items.len(),
            "Order placed"
        );

        Ok(details)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets an order with its items.
    ///
    /// Header and items are read from one snapshot.
    pub async fn get(&self, order_id: i64) -> DbResult<Option<OrderDetails>> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1");
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(order_id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            tx.commit().await?;
            return Ok(None);
        };

        let sql = format!("SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = ?1 ORDER BY id");
        let items = sqlx::query_as::<_, OrderItem>(&sql)
            .bind(order_id)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(OrderDetails {
            order: row.into_order()?,
            items,
        }))
    }

    /// Lists orders with their items, newest first.
    ///
    /// The page's items come from a single query against the same snapshot
    /// as the headers.
    pub async fn list(&self, limit: u32, offset: u32) -> DbResult<Vec<OrderDetails>> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2"
        );
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut *tx)
            .await?;

        let sql = format!(
            r#"
            SELECT {ITEM_COLUMNS} FROM order_items
            WHERE order_id IN (
                SELECT id FROM orders ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2
            )
            ORDER BY id
            "#
        );
        let items = sqlx::query_as::<_, OrderItem>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;

        let mut by_order: HashMap<i64, Vec<OrderItem>> = HashMap::with_capacity(rows.len());
        for item in items {
            by_order.entry(item.order_id).or_default().push(item);
        }

        debug!(count = rows.len(), "Listed orders");
        rows.into_iter()
            .map(|row| {
                let items = by_order.remove(&row.id).unwrap_or_default();
                Ok(OrderDetails {
                    order: row.into_order()?,
                    items,
                })
            })
            .collect()
    }

    /// Products ranked by revenue across all order items.
    pub async fn top_products(&self, limit: u32) -> DbResult<Vec<ProductSales>> {
        let sales = sqlx::query_as::<_, ProductSales>(
            r#"
            SELECT
                oi.product_id,
                p.product_code,
                p.name,
                SUM(oi.quantity) AS quantity_sold,
                SUM(oi.line_total_cents) AS revenue_cents
            FROM order_items oi
            INNER JOIN products p ON p.id = oi.product_id
            GROUP BY oi.product_id, p.product_code, p.name
            ORDER BY revenue_cents DESC, quantity_sold DESC, oi.product_id
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    // =========================================================================
    // Maintenance
    // =========================================================================

    /// Normalizes `raw` and writes it as the order's status.
    ///
    /// ## Errors
    /// - `Core(InvalidStatus)` - unknown status, nothing written
    /// - `Core(OrderNotFound)` - no such order
    pub async fn update_status(&self, order_id: i64, raw: &str) -> DbResult<Order> {
        let status = normalize(raw)?;

        let sql = format!(
            "UPDATE orders SET status = ?2, updated_at = ?3 WHERE id = ?1 RETURNING {ORDER_COLUMNS}"
        );

        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(order_id)
            .bind(status.as_str())
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(CoreError::OrderNotFound(order_id))?;

        info!(order_id, status = %status, "Order status updated");
        row.into_order()
    }

    /// Deletes an order and its items, returning what was removed.
    ///
    /// Stock is not restored.
    ///
    /// ## Errors
    /// - `Core(OrderNotFound)` - no such order, nothing removed
    pub async fn delete(&self, order_id: i64) -> DbResult<OrderDetails> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let removed = match delete_order(&mut *tx, order_id).await {
            Ok(Some(details)) => details,
            Ok(None) => {
                rollback(tx, order_id).await;
                return Err(CoreError::OrderNotFound(order_id).into());
            }
            Err(err) => {
                rollback(tx, order_id).await;
                return Err(err.in_transaction());
            }
        };

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            order_id,
            order_number = %removed.order.order_number,
            items = removed.items.len(),
            "Order deleted"
        );

        Ok(removed)
    }
}

// =============================================================================
// Transaction Steps
// =============================================================================

async fn write_order(
    conn: &mut SqliteConnection,
    order: &ValidatedOrder,
    order_number: &OrderNumber,
) -> DbResult<OrderDetails> {
    let mut snapshots: Vec<Option<StockLevel>> = vec![None; order.lines.len()];
    for idx in order.adjustment_order() {
        let line = &order.lines[idx];
        snapshots[idx] = Some(adjust_in(&mut *conn, line.product_id, -line.quantity).await?);
    }

    let mut priced = Vec::with_capacity(order.lines.len());
    for (idx, (line, snapshot)) in order.lines.iter().zip(&snapshots).enumerate() {
        let snapshot = snapshot
            .as_ref()
            .ok_or_else(|| DbError::Internal(format!("line {} was not adjusted", idx + 1)))?;
        priced.push(PricedLine::price(idx + 1, line, snapshot)?);
    }

    let total = order_total(&priced)?;
    let now = Utc::now();

    let sql = format!(
        r#"
        INSERT INTO orders (
            order_number, customer_ref, status, total_cents,
            platform, destination, created_at, updated_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
        RETURNING {ORDER_COLUMNS}
        "#
    );

    let header = sqlx::query_as::<_, OrderRow>(&sql)
        .bind(order_number.to_string())
        .bind(&order.customer_ref)
        .bind(order.status.as_str())
        .bind(total.cents())
        .bind(order.platform.as_deref())
        .bind(order.destination.as_deref())
        .bind(now)
        .fetch_one(&mut *conn)
        .await?
        .into_order()?;

    let sql = format!(
        r#"
        INSERT INTO order_items (
            order_id, product_id, product_code_snapshot, name_snapshot,
            unit_price_cents, quantity, line_total_cents, created_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        RETURNING {ITEM_COLUMNS}
        "#
    );

    let mut items = Vec::with_capacity(priced.len());
    for line in &priced {
        let item = sqlx::query_as::<_, OrderItem>(&sql)
            .bind(header.id)
            .bind(line.product_id)
            .bind(&line.product_code_snapshot)
            .bind(&line.name_snapshot)
            .bind(line.unit_price.cents())
            .bind(line.quantity)
            .bind(line.line_total.cents())
            .bind(now)
            .fetch_one(&mut *conn)
            .await?;
        items.push(item);
    }

    Ok(OrderDetails {
        order: header,
        items,
    })
}

async fn delete_order(conn: &mut SqliteConnection, order_id: i64) -> DbResult<Option<OrderDetails>> {
    let sql = format!("DELETE FROM order_items WHERE order_id = ?1 RETURNING {ITEM_COLUMNS}");
    let mut items = sqlx::query_as::<_, OrderItem>(&sql)
        .bind(order_id)
        .fetch_all(&mut *conn)
        .await?;
    items.sort_by_key(|item| item.id);

    let sql = format!("DELETE FROM orders WHERE id = ?1 RETURNING {ORDER_COLUMNS}");
    let row = sqlx::query_as::<_, OrderRow>(&sql)
        .bind(order_id)
        .fetch_optional(&mut *conn)
        .await?;

    match row {
        Some(row) => Ok(Some(OrderDetails {
            order: row.into_order()?,
            items,
        })),
        None => Ok(None),
    }
}

/// Rolls back `tx`, logging a failure. `order` is the order number or id.
async fn rollback(tx: Transaction<'_, Sqlite>, order: impl fmt::Display) {
    if let Err(e) = tx.rollback().await {
        warn!(order = %order, error = %e, "Rollback failed");
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::time::Duration;

    use chrono::Utc;
    use tokio::time::Instant;

    use crate::repository::stock::adjust_in;
    use crate::test_support::{memory_db, seed_product, FileDb};
    use crate::DbError;
    use inventra_core::{CoreError, OrderLineRequest, OrderStatus, PlaceOrderRequest};

    async fn order_count(db: &crate::Database) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    async fn item_count(db: &crate::Database) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM order_items")
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_place_order_totals_and_stock() {
        let db = memory_db().await;
        let a = seed_product(&db, "A-1", 1000, 5).await;
        let b = seed_product(&db, "B-1", 500, 5).await;

        let placed = db
            .orders()
            .place_order(
                PlaceOrderRequest::new(
                    "cust-1",
                    vec![OrderLineRequest::new(a.id, 2), OrderLineRequest::new(b.id, 1)],
                )
                .platform("shopee"),
            )
            .await
            .unwrap();

        assert_eq!(placed.order.order_number.to_string(), "#000001");
        assert_eq!(placed.order.total_cents, 2500);
        assert_eq!(placed.order.status, OrderStatus::Pending);
        assert_eq!(placed.order.platform.as_deref(), Some("shopee"));

        assert_eq!(placed.items.len(), 2);
        assert_eq!(placed.items[0].product_id, a.id);
        assert_eq!(placed.items[0].line_total_cents, 2000);
        assert_eq!(placed.items[0].product_code_snapshot, "A-1");
        assert_eq!(placed.items[1].line_total_cents, 500);

        assert_eq!(db.stock().quantity_on_hand(a.id).await.unwrap(), 3);
        assert_eq!(db.stock().quantity_on_hand(b.id).await.unwrap(), 4);

        let loaded = db.orders().get(placed.order.id).await.unwrap().unwrap();
        assert_eq!(loaded, placed);
    }

    #[tokio::test]
    async fn test_insufficient_stock_rolls_back_everything() {
        let db = memory_db().await;
        let a = seed_product(&db, "A-1", 1000, 5).await;
        let b = seed_product(&db, "B-1", 500, 1).await;

        let err = db
            .orders()
            .place_order(PlaceOrderRequest::new(
                "cust-1",
                vec![OrderLineRequest::new(a.id, 2), OrderLineRequest::new(b.id, 3)],
            ))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Core(CoreError::InsufficientStock {
                available: 1,
                requested: 3,
                ..
            })
        ));
        assert_eq!(db.stock().quantity_on_hand(a.id).await.unwrap(), 5);
        assert_eq!(db.stock().quantity_on_hand(b.id).await.unwrap(), 1);
        assert_eq!(order_count(&db).await, 0);
        assert_eq!(item_count(&db).await, 0);
    }

    #[tokio::test]
    async fn test_missing_product_rolls_back() {
        let db = memory_db().await;
        let a = seed_product(&db, "A-1", 1000, 5).await;

        let err = db
            .orders()
            .place_order(PlaceOrderRequest::new(
                "cust-1",
                vec![OrderLineRequest::new(a.id, 1), OrderLineRequest::new(777, 1)],
            ))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Core(CoreError::ProductNotFound(777))));
        assert_eq!(db.stock().quantity_on_hand(a.id).await.unwrap(), 5);
        assert_eq!(order_count(&db).await, 0);
    }

    #[tokio::test]
    async fn test_validation_does_not_consume_number() {
        let db = memory_db().await;
        let a = seed_product(&db, "A-1", 1000, 5).await;

        let err = db
            .orders()
            .place_order(PlaceOrderRequest::new("cust-1", vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::EmptyOrder)));

        let err = db
            .orders()
            .place_order(PlaceOrderRequest::new("cust-1", vec![OrderLineRequest::new(a.id, 1)]).status("lost"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::InvalidStatus(_))));

        assert_eq!(db.sequencer().peek_next().await.unwrap().to_string(), "#000001");
    }

    #[tokio::test]
    async fn test_failed_order_leaves_gap() {
        let db = memory_db().await;
        let a = seed_product(&db, "A-1", 1000, 1).await;

        let first = db
            .orders()
            .place_order(PlaceOrderRequest::new("cust-1", vec![OrderLineRequest::new(a.id, 5)]))
            .await;
        assert!(first.is_err());

        let placed = db
            .orders()
            .place_order(PlaceOrderRequest::new("cust-1", vec![OrderLineRequest::new(a.id, 1)]))
            .await
            .unwrap();
        assert_eq!(placed.order.order_number.to_string(), "#000002");
    }

    #[tokio::test]
    async fn test_status_shipped_is_stored_as_shipping() {
        let db = memory_db().await;
        let a = seed_product(&db, "A-1", 1000, 5).await;

        let placed = db
            .orders()
            .place_order(PlaceOrderRequest::new("cust-1", vec![OrderLineRequest::new(a.id, 1)]).status("Shipped"))
            .await
            .unwrap();
        assert_eq!(placed.order.status, OrderStatus::Shipping);

        let stored: String = sqlx::query_scalar("SELECT status FROM orders WHERE id = ?1")
            .bind(placed.order.id)
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(stored, "shipping");
    }

    #[tokio::test]
    async fn test_legacy_status_normalized_on_read() {
        let db = memory_db().await;
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO orders (order_number, customer_ref, status, total_cents, created_at, updated_at)
            VALUES ('#000099', 'legacy', 'Shipped', 0, ?1, ?1)
            "#,
        )
        .bind(now)
        .execute(db.pool())
        .await
        .unwrap();

        let orders = db.orders().list(10, 0).await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].order.status, OrderStatus::Shipping);
        assert_eq!(orders[0].order.order_number.sequence(), 99);
        assert!(orders[0].items.is_empty());
    }

    #[tokio::test]
    async fn test_list_returns_item_snapshots() {
        let db = memory_db().await;
        let a = seed_product(&db, "A-1", 1000, 10).await;
        let b = seed_product(&db, "B-1", 500, 10).await;

        let first = db
            .orders()
            .place_order(PlaceOrderRequest::new(
                "cust-1",
                vec![OrderLineRequest::new(a.id, 1), OrderLineRequest::new(b.id, 2)],
            ))
            .await
            .unwrap();
        let second = db
            .orders()
            .place_order(PlaceOrderRequest::new("cust-2", vec![OrderLineRequest::new(b.id, 1)]))
            .await
            .unwrap();

        // Catalog edits after the sale must not show up in the order
        sqlx::query("UPDATE products SET name = 'Renamed', price_cents = 9999")
            .execute(db.pool())
            .await
            .unwrap();

        let listed = db.orders().list(10, 0).await.unwrap();
        assert_eq!(listed, vec![second.clone(), first.clone()]);
        assert_eq!(listed[1].items[0].name_snapshot, "Product A-1");
        assert_eq!(listed[1].items[1].unit_price_cents, 500);

        let page = db.orders().list(1, 1).await.unwrap();
        assert_eq!(page, vec![first]);
        assert!(db.orders().list(10, 2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_asserted_price_used_for_historical_entry() {
        let db = memory_db().await;
        let a = seed_product(&db, "A-1", 1000, 5).await;

        let placed = db
            .orders()
            .place_order(PlaceOrderRequest::new(
                "cust-1",
                vec![OrderLineRequest::with_unit_price(a.id, 3, 800)],
            ))
            .await
            .unwrap();

        assert_eq!(placed.items[0].unit_price_cents, 800);
        assert_eq!(placed.order.total_cents, 2400);
    }

    #[tokio::test]
    async fn test_expired_deadline_rolls_back() {
        let db = memory_db().await;
        let a = seed_product(&db, "A-1", 1000, 5).await;

        let err = db
            .orders()
            .place_order_before(
                PlaceOrderRequest::new("cust-1", vec![OrderLineRequest::new(a.id, 2)]),
                Instant::now(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::DeadlineExceeded));
        assert!(err.is_retryable());
        assert_eq!(db.stock().quantity_on_hand(a.id).await.unwrap(), 5);
        assert_eq!(order_count(&db).await, 0);

        let placed = db
            .orders()
            .place_order_before(
                PlaceOrderRequest::new("cust-1", vec![OrderLineRequest::new(a.id, 2)]),
                Instant::now() + Duration::from_secs(60),
            )
            .await
            .unwrap();
        assert_eq!(placed.order.order_number.to_string(), "#000002");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_dropped_placement_rolls_back() {
        let file = FileDb::new(4).await;
        let a = seed_product(&file.db, "A-1", 1000, 5).await;
        let other = seed_product(&file.db, "Z-1", 100, 5).await;

        // Another writer holds the lock, so placement stalls inside its transaction
        let mut blocker = file.db.pool().begin().await.unwrap();
        adjust_in(&mut *blocker, other.id, -1).await.unwrap();

        let stalled = tokio::time::timeout(
            Duration::from_millis(200),
            file.db.orders().place_order(PlaceOrderRequest::new(
                "cust-1",
                vec![OrderLineRequest::new(a.id, 2)],
            )),
        )
        .await;
        assert!(stalled.is_err());

        blocker.rollback().await.unwrap();

        assert_eq!(file.db.stock().quantity_on_hand(a.id).await.unwrap(), 5);
        assert_eq!(file.db.stock().quantity_on_hand(other.id).await.unwrap(), 5);
        assert_eq!(order_count(&file.db).await, 0);

        // The abandoned number stays consumed
        let placed = file
            .db
            .orders()
            .place_order(PlaceOrderRequest::new("cust-1", vec![OrderLineRequest::new(a.id, 2)]))
            .await
            .unwrap();
        assert_eq!(placed.order.order_number.to_string(), "#000002");
        assert_eq!(file.db.stock().quantity_on_hand(a.id).await.unwrap(), 3);
        assert_eq!(order_count(&file.db).await, 1);
    }

    #[tokio::test]
    async fn test_missing_counter_changes_nothing() {
        let db = memory_db().await;
        let a = seed_product(&db, "A-1", 1000, 5).await;

        sqlx::query("DELETE FROM sequences")
            .execute(db.sequencer().pool())
            .await
            .unwrap();

        let err = db
            .orders()
            .place_order(PlaceOrderRequest::new("cust-1", vec![OrderLineRequest::new(a.id, 2)]))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::SequencerUnavailable(_)));
        assert!(err.is_retryable());
        assert_eq!(db.stock().quantity_on_hand(a.id).await.unwrap(), 5);
        assert_eq!(order_count(&db).await, 0);
        assert_eq!(item_count(&db).await, 0);
    }

    #[tokio::test]
    async fn test_update_status() {
        let db = memory_db().await;
        let a = seed_product(&db, "A-1", 1000, 5).await;
        let placed = db
            .orders()
            .place_order(PlaceOrderRequest::new("cust-1", vec![OrderLineRequest::new(a.id, 1)]))
            .await
            .unwrap();

        let updated = db
            .orders()
            .update_status(placed.order.id, " COMPLETED ")
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Completed);

        assert!(matches!(
            db.orders().update_status(placed.order.id, "teleported").await,
            Err(DbError::Core(CoreError::InvalidStatus(_)))
        ));
        assert!(matches!(
            db.orders().update_status(404, "pending").await,
            Err(DbError::Core(CoreError::OrderNotFound(404)))
        ));
    }

    #[tokio::test]
    async fn test_delete_order() {
        let db = memory_db().await;
        let a = seed_product(&db, "A-1", 1000, 5).await;
        let placed = db
            .orders()
            .place_order(PlaceOrderRequest::new("cust-1", vec![OrderLineRequest::new(a.id, 2)]))
            .await
            .unwrap();

        let removed = db.orders().delete(placed.order.id).await.unwrap();
        assert_eq!(removed, placed);

        assert!(db.orders().get(placed.order.id).await.unwrap().is_none());
        assert_eq!(item_count(&db).await, 0);
        // Stock is not restored.
        assert_eq!(db.stock().quantity_on_hand(a.id).await.unwrap(), 3);

        assert!(matches!(
            db.orders().delete(placed.order.id).await,
            Err(DbError::Core(CoreError::OrderNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_top_products() {
        let db = memory_db().await;
        let a = seed_product(&db, "A-1", 1000, 50).await;
        let b = seed_product(&db, "B-1", 300, 50).await;
        seed_product(&db, "C-1", 100, 50).await;

        for items in [
            vec![OrderLineRequest::new(a.id, 1), OrderLineRequest::new(b.id, 2)],
            vec![OrderLineRequest::new(b.id, 5)],
        ] {
            db.orders()
                .place_order(PlaceOrderRequest::new("cust-1", items))
                .await
                .unwrap();
        }

        let top = db.orders().top_products(10).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].product_code, "B-1");
        assert_eq!(top[0].quantity_sold, 7);
        assert_eq!(top[0].revenue_cents, 2100);
        assert_eq!(top[1].product_code, "A-1");
        assert_eq!(top[1].revenue_cents, 1000);

        assert_eq!(db.orders().top_products(1).await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_get_never_sees_header_without_items() {
        let file = FileDb::new(4).await;
        let p = seed_product(&file.db, "A-1", 100, 1000).await;
        let q = seed_product(&file.db, "B-1", 200, 1000).await;

        let mut ids = Vec::new();
        for i in 0..20 {
            let placed = file
                .db
                .orders()
                .place_order(PlaceOrderRequest::new(
                    format!("cust-{i}"),
                    vec![OrderLineRequest::new(p.id, 1), OrderLineRequest::new(q.id, 1)],
                ))
                .await
                .unwrap();
            ids.push(placed.order.id);
        }

        let deleter = {
            let orders = file.db.orders();
            let ids = ids.clone();
            tokio::spawn(async move {
                for id in ids {
                    orders.delete(id).await.unwrap();
                }
            })
        };

        let reader = {
            let orders = file.db.orders();
            tokio::spawn(async move {
                for _ in 0..5 {
                    for &id in &ids {
                        if let Some(details) = orders.get(id).await.unwrap() {
                            assert_eq!(details.items.len(), 2, "order {id} read without items");
                        }
                    }
                }
            })
        };

        deleter.await.unwrap();
        reader.await.unwrap();
        assert_eq!(order_count(&file.db).await, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_orders_never_oversell() {
        let file = FileDb::new(4).await;
        let p = seed_product(&file.db, "HOT-1", 100, 5).await;

        let mut handles = Vec::new();
        for i in 0..12 {
            let orders = file.db.orders();
            handles.push(tokio::spawn(async move {
                orders
                    .place_order(PlaceOrderRequest::new(
                        format!("cust-{i}"),
                        vec![OrderLineRequest::new(p.id, 1)],
                    ))
                    .await
            }));
        }

        let mut numbers = HashSet::new();
        let mut refused = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(placed) => assert!(numbers.insert(placed.order.order_number)),
                Err(DbError::Core(CoreError::InsufficientStock { .. })) => refused += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(numbers.len(), 5);
        assert_eq!(refused, 7);
        assert_eq!(file.db.stock().quantity_on_hand(p.id).await.unwrap(), 0);
        assert_eq!(order_count(&file.db).await, 5);
    }
}
