//! # inventra-core: Pure Business Logic for Inventra
//!
//! The order-placement and stock-accounting rules, as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Inventra Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            Transport (HTTP, auth, JSON) - external              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ PlaceOrderRequest                      │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ inventra-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌─────────────┐  ┌──────────┐  │   │
//! │  │   │   types   │  │   money   │  │   status    │  │  order   │  │   │
//! │  │   │  Product  │  │   Money   │  │ OrderStatus │  │ pricing  │  │   │
//! │  │   │   Order   │  │           │  │ normalize() │  │ requests │  │   │
//! │  │   └───────────┘  └───────────┘  └─────────────┘  └──────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 inventra-db (Database Layer)                    │   │
//! │  │      Stock Ledger, Sequencer counter, Order transactions        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Order, OrderItem, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`status`] - Status Normalizer shared by write and read paths
//! - [`order_number`] - `#NNNNNN` order number formatting and parsing
//! - [`order`] - Order requests, validation and line pricing
//! - [`validation`] - Field-level input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use inventra_core::money::Money;
//! use inventra_core::status::{normalize, OrderStatus};
//!
//! let unit = Money::from_cents(1000);
//! assert_eq!(unit.checked_mul_quantity(2), Some(Money::from_cents(2000)));
//!
//! assert_eq!(normalize("Shipped").unwrap(), OrderStatus::Shipping);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod order;
pub mod order_number;
pub mod status;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use order::{OrderLineRequest, PlaceOrderRequest, PricedLine, ValidatedOrder};
pub use order_number::OrderNumber;
pub use status::{normalize, OrderStatus};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of lines accepted in a single order.
///
/// ## Business Reason
/// Keeps one order's transaction short; every line holds a product row
/// until commit.
pub const MAX_ORDER_LINES: usize = 100;

/// Width of the zero-padded numeric part of an order number (`#000001`).
pub const ORDER_NUMBER_WIDTH: usize = 6;
