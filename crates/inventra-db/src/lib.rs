//! # inventra-db: Database Layer for Inventra
//!
//! Persistence for products, stock, order numbers and orders, on SQLite
//! through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Inventra Data Flow                               │
//! │                                                                         │
//! │  Transport handler (place order)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   inventra-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │  │   │
//! │  │   │               │    │ ProductRepo    │    │ 001_init.sql │  │   │
//! │  │   │ SqlitePool    │◄───│ StockLedger    │    │              │  │   │
//! │  │   │ WAL, FKs on   │    │ Sequencer      │    │              │  │   │
//! │  │   │               │    │ OrderRepo      │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (INVENTRA_DATABASE_PATH)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`config`] - Environment-driven application configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types and retry categories
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use inventra_core::{OrderLineRequest, PlaceOrderRequest};
//! use inventra_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("inventra.db")).await?;
//!
//! let request = PlaceOrderRequest::new(
//!     "cust-42",
//!     vec![OrderLineRequest::new(1, 2), OrderLineRequest::new(2, 1)],
//! );
//! let placed = db.orders().place_order(request).await?;
//! println!("{} total {}", placed.order.order_number, placed.order.total());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

#[cfg(test)]
pub(crate) mod test_support;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{AppConfig, ConfigError};
pub use error::{DbError, DbResult, ErrorCategory};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::order::OrderRepository;
pub use repository::product::ProductRepository;
pub use repository::sequence::OrderNumberSequencer;
pub use repository::stock::StockLedger;
