//! # Error Types
//!
//! Domain-specific error types for inventra-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  inventra-core errors (this file)                                      │
//! │  ├── CoreError        - Validation and consistency errors              │
//! │  └── ValidationError  - Field-level input failures                     │
//! │                                                                         │
//! │  inventra-db errors (separate crate)                                   │
//! │  └── DbError          - Wraps CoreError, adds infrastructure failures  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → transport layer         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Categories
//! - Validation (`EmptyOrder`, `InvalidQuantity`, `InvalidStatus`, ...):
//!   caller mistakes, never retried automatically.
//! - Consistency (`InsufficientStock`, `ProductNotFound`, `OrderNotFound`):
//!   reflect current state; the caller re-fetches before trying again.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Order request has no lines.
    #[error("Order must contain at least one item")]
    EmptyOrder,

    /// Order request has more lines than allowed.
    #[error("Order cannot have more than {max} items")]
    OrderTooLarge { max: usize },

    /// A line quantity is zero or negative, or too large to price.
    #[error("Invalid quantity {quantity} on line {line}")]
    InvalidQuantity { line: usize, quantity: i64 },

    /// A caller-asserted unit price is negative.
    #[error("Invalid unit price {unit_price_cents} on line {line}")]
    InvalidUnitPrice { line: usize, unit_price_cents: i64 },

    /// Product id does not exist.
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// Applying the adjustment would take stock below zero.
    ///
    /// ## User Workflow
    /// ```text
    /// Place order (qty: 5)
    ///      │
    ///      ▼
    /// Conditional decrement: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { product_code: "KOPI-250", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// Whole order rolled back, stock unchanged
    /// ```
    #[error(
        "Insufficient stock for {product_code} (id {product_id}): available {available}, requested {requested}"
    )]
    InsufficientStock {
        product_id: i64,
        product_code: String,
        available: i64,
        requested: i64,
    },

    /// Status string is not one of the canonical statuses or a known alias.
    #[error("Invalid order status: '{0}'")]
    InvalidStatus(String),

    /// Order id does not exist.
    #[error("Order not found: {0}")]
    OrderNotFound(i64),

    /// A line or order total does not fit in the money type.
    #[error("Order amount overflow")]
    AmountOverflow,

    /// Field-level validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// True for caller mistakes (bad input).
    ///
    /// Everything else in this enum reflects current persisted state.
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            CoreError::ProductNotFound(_)
                | CoreError::InsufficientStock { .. }
                | CoreError::OrderNotFound(_)
        )
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
