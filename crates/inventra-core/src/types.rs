//! # Domain Types
//!
//! Core domain types used throughout Inventra.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Order      │   │   OrderItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (i64)       │   │  id (i64)       │   │  id (i64)       │       │
//! │  │  product_code   │   │  order_number   │   │  order_id (FK)  │       │
//! │  │  price_cents    │   │  status         │   │  snapshots      │       │
//! │  │  quantity ≥ 0   │   │  total_cents    │   │  line_total     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  Order 1──* OrderItem *──1 Product (reference only, for stock)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: numeric, immutable, used for relations
//! - Business key: `product_code` / `order_number`, human-readable and
//!   immutable once issued

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::order_number::OrderNumber;
use crate::status::OrderStatus;

// =============================================================================
// Product
// =============================================================================

/// A product held in stock.
///
/// `quantity` is only ever changed through the Stock Ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Internal identifier.
    pub id: i64,

    /// Human-facing product code, unique.
    pub product_code: String,

    /// Display name.
    pub name: String,

    /// Supplier name.
    pub supplier_name: String,

    /// Category label.
    pub category: String,

    /// Unit price in minor currency units.
    pub price_cents: i64,

    /// Quantity on hand, never negative.
    pub quantity: i64,

    /// User who created the product.
    pub created_by: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Whether `quantity` units could be sold right now.
    ///
    /// Informational only; the ledger's conditional update decides.
    pub fn has_stock_for(&self, quantity: i64) -> bool {
        self.quantity >= quantity
    }
}

/// Input for creating a product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub product_code: String,
    pub name: String,
    pub supplier_name: String,
    pub category: String,
    pub price_cents: i64,
    /// Opening stock.
    pub quantity: i64,
    pub created_by: Option<String>,
}

// =============================================================================
// Stock
// =============================================================================

/// A requested change to quantity-on-hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum StockChange {
    /// `quantity += delta`; refused if the result would be negative.
    Delta(i64),
    /// `quantity = value`; manual correction.
    Absolute(i64),
}

/// Product state right after a successful stock adjustment.
///
/// Carries the snapshot fields the order builder copies onto order items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockLevel {
    pub product_id: i64,
    pub product_code: String,
    pub name: String,
    pub price_cents: i64,
    /// Quantity on hand after the adjustment.
    pub quantity: i64,
}

// =============================================================================
// Order
// =============================================================================

/// An order header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    pub id: i64,
    #[ts(as = "String")]
    pub order_number: OrderNumber,
    /// Customer reference supplied by the calling layer.
    pub customer_ref: String,
    pub status: OrderStatus,
    /// Sum of line totals, minor units.
    pub total_cents: i64,
    /// Sales channel, e.g. "shopee" or "walk-in".
    pub platform: Option<String>,
    /// Shipping destination.
    pub destination: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A line item in an order.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    /// Product code at time of sale (frozen).
    pub product_code_snapshot: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    /// Unit price at time of sale (frozen).
    pub unit_price_cents: i64,
    pub quantity: i64,
    /// unit_price × quantity, computed server-side.
    pub line_total_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

/// An order together with its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderDetails {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

// =============================================================================
// Reporting
// =============================================================================

/// Sales figures for one product, aggregated over all order items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ProductSales {
    pub product_id: i64,
    pub product_code: String,
    pub name: String,
    pub quantity_sold: i64,
    pub revenue_cents: i64,
}
