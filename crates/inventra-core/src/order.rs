//! # Order Requests and Pricing
//!
//! Pure steps of order placement. The database layer runs them inside the
//! transaction; nothing here touches storage.
//!
//! ## Placement Pipeline
//! ```text
//! PlaceOrderRequest
//!      │
//!      ▼
//! validate()            ← empty? quantity ≤ 0? price < 0? status known?
//!      │                  (runs before an order number is drawn)
//!      ▼
//! ValidatedOrder
//!      │
//!      ├── adjustment_order()   ← product-id order for stock decrements
//!      │
//!      ▼
//! PricedLine::price()   ← unit price from the product snapshot, or the
//!      │                  caller-asserted historical price
//!      ▼
//! order_total()         ← Σ line totals, overflow-checked
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::status::{normalize_or_default, OrderStatus};
use crate::types::StockLevel;
use crate::validation::{validate_optional_text, validate_required_text};
use crate::MAX_ORDER_LINES;

// =============================================================================
// Requests
// =============================================================================

/// One requested line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderLineRequest {
    pub product_id: i64,
    pub quantity: i64,
    /// Caller-asserted unit price, for entering historical orders.
    /// When absent the product's current price is used.
    pub unit_price_cents: Option<i64>,
}

impl OrderLineRequest {
    /// A line priced at the product's current price.
    pub fn new(product_id: i64, quantity: i64) -> Self {
        OrderLineRequest {
            product_id,
            quantity,
            unit_price_cents: None,
        }
    }

    /// A line with a caller-asserted unit price.
    pub fn with_unit_price(product_id: i64, quantity: i64, unit_price_cents: i64) -> Self {
        OrderLineRequest {
            product_id,
            quantity,
            unit_price_cents: Some(unit_price_cents),
        }
    }
}

/// An order-placement request, already authenticated and parsed by the
/// calling layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlaceOrderRequest {
    pub customer_ref: String,
    pub items: Vec<OrderLineRequest>,
    /// Free-form status; normalized, `pending` when absent.
    pub status: Option<String>,
    pub platform: Option<String>,
    pub destination: Option<String>,
}

impl PlaceOrderRequest {
    /// A pending order for `customer_ref`.
    pub fn new(customer_ref: impl Into<String>, items: Vec<OrderLineRequest>) -> Self {
        PlaceOrderRequest {
            customer_ref: customer_ref.into(),
            items,
            status: None,
            platform: None,
            destination: None,
        }
    }

    /// Sets the requested status.
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Sets the sales channel.
    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    /// Sets the shipping destination.
    pub fn destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    /// Checks everything that does not need the database.
    ///
    /// ## Errors
    /// - `EmptyOrder` - no lines
    /// - `OrderTooLarge` - more than [`MAX_ORDER_LINES`] lines
    /// - `InvalidQuantity` - a quantity ≤ 0 (line numbers are 1-based)
    /// - `InvalidUnitPrice` - a negative asserted price
    /// - `InvalidStatus` - unknown status
    /// - `Validation` - missing customer reference, overlong text
    pub fn validate(self) -> CoreResult<ValidatedOrder> {
        if self.items.is_empty() {
            return Err(CoreError::EmptyOrder);
        }

        if self.items.len() > MAX_ORDER_LINES {
            return Err(CoreError::OrderTooLarge {
                max: MAX_ORDER_LINES,
            });
        }

        for (idx, line) in self.items.iter().enumerate() {
            if line.quantity <= 0 {
                return Err(CoreError::InvalidQuantity {
                    line: idx + 1,
                    quantity: line.quantity,
                });
            }

            if let Some(price) = line.unit_price_cents {
                if price < 0 {
                    return Err(CoreError::InvalidUnitPrice {
                        line: idx + 1,
                        unit_price_cents: price,
                    });
                }
            }
        }

        validate_required_text("customer_ref", &self.customer_ref)?;
        validate_optional_text("platform", self.platform.as_deref())?;
        validate_optional_text("destination", self.destination.as_deref())?;

        let status = normalize_or_default(self.status.as_deref())?;

        Ok(ValidatedOrder {
            customer_ref: self.customer_ref.trim().to_string(),
            status,
            platform: trimmed(self.platform),
            destination: trimmed(self.destination),
            lines: self.items,
        })
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// =============================================================================
// Validated Order
// =============================================================================

/// A request that passed [`PlaceOrderRequest::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedOrder {
    pub customer_ref: String,
    pub status: OrderStatus,
    pub platform: Option<String>,
    pub destination: Option<String>,
    pub lines: Vec<OrderLineRequest>,
}

impl ValidatedOrder {
    /// Line indices sorted by product id (stable for equal ids).
    ///
    /// Stock is decremented in this order so concurrent orders touching
    /// the same products take row locks in the same sequence.
    pub fn adjustment_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.lines.len()).collect();
        order.sort_by_key(|&idx| self.lines[idx].product_id);
        order
    }
}

// =============================================================================
// Pricing
// =============================================================================

/// A line with its snapshot and server-computed total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub product_id: i64,
    pub product_code_snapshot: String,
    pub name_snapshot: String,
    pub unit_price: Money,
    pub quantity: i64,
    pub line_total: Money,
}

impl PricedLine {
    /// Prices `request` against the product snapshot taken when its stock
    /// was decremented. `line` is 1-based, for error reporting.
    pub fn price(line: usize, request: &OrderLineRequest, snapshot: &StockLevel) -> CoreResult<Self> {
        let unit_price =
            Money::from_cents(request.unit_price_cents.unwrap_or(snapshot.price_cents));

        let line_total = unit_price
            .checked_mul_quantity(request.quantity)
            .ok_or(CoreError::InvalidQuantity {
                line,
                quantity: request.quantity,
            })?;

        Ok(PricedLine {
            product_id: snapshot.product_id,
            product_code_snapshot: snapshot.product_code.clone(),
            name_snapshot: snapshot.name.clone(),
            unit_price,
            quantity: request.quantity,
            line_total,
        })
    }
}

/// Sums line totals.
pub fn order_total(lines: &[PricedLine]) -> CoreResult<Money> {
    Money::checked_sum(lines.iter().map(|l| l.line_total)).ok_or(CoreError::AmountOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    fn snapshot(product_id: i64, price_cents: i64) -> StockLevel {
        StockLevel {
            product_id,
            product_code: format!("P-{product_id}"),
            name: format!("Product {product_id}"),
            price_cents,
            quantity: 10,
        }
    }

    #[test]
    fn test_empty_order_rejected() {
        let err = PlaceOrderRequest::new("cust-1", vec![]).validate().unwrap_err();
        assert_eq!(err, CoreError::EmptyOrder);
    }

    #[test]
    fn test_non_positive_quantity_rejected() {
        let req = PlaceOrderRequest::new(
            "cust-1",
            vec![OrderLineRequest::new(1, 2), OrderLineRequest::new(2, 0)],
        );
        assert_eq!(
            req.validate().unwrap_err(),
            CoreError::InvalidQuantity { line: 2, quantity: 0 }
        );

        let req = PlaceOrderRequest::new("cust-1", vec![OrderLineRequest::new(1, -3)]);
        assert!(matches!(
            req.validate(),
            Err(CoreError::InvalidQuantity { line: 1, quantity: -3 })
        ));
    }

    #[test]
    fn test_negative_asserted_price_rejected() {
        let req = PlaceOrderRequest::new("cust-1", vec![OrderLineRequest::with_unit_price(1, 1, -1)]);
        assert!(matches!(
            req.validate(),
            Err(CoreError::InvalidUnitPrice { line: 1, .. })
        ));
    }

    #[test]
    fn test_too_many_lines_rejected() {
        let items = (0..=MAX_ORDER_LINES as i64)
            .map(|i| OrderLineRequest::new(i, 1))
            .collect();
        assert_eq!(
            PlaceOrderRequest::new("cust-1", items).validate().unwrap_err(),
            CoreError::OrderTooLarge { max: MAX_ORDER_LINES }
        );
    }

    #[test]
    fn test_status_normalized_and_defaulted() {
        let req = PlaceOrderRequest::new("cust-1", vec![OrderLineRequest::new(1, 1)]);
        assert_eq!(req.clone().validate().unwrap().status, OrderStatus::Pending);

        let shipped = req.clone().status("Shipped").validate().unwrap();
        assert_eq!(shipped.status, OrderStatus::Shipping);

        assert_eq!(
            req.status("bogus").validate().unwrap_err(),
            CoreError::InvalidStatus("bogus".to_string())
        );
    }

    #[test]
    fn test_customer_ref_required() {
        let req = PlaceOrderRequest::new("  ", vec![OrderLineRequest::new(1, 1)]);
        assert_eq!(
            req.validate().unwrap_err(),
            CoreError::Validation(ValidationError::Required {
                field: "customer_ref".to_string()
            })
        );
    }

    #[test]
    fn test_optional_text_trimmed() {
        let v = PlaceOrderRequest::new(" cust-1 ", vec![OrderLineRequest::new(1, 1)])
            .platform("  shopee ")
            .destination("   ")
            .validate()
            .unwrap();
        assert_eq!(v.customer_ref, "cust-1");
        assert_eq!(v.platform.as_deref(), Some("shopee"));
        assert_eq!(v.destination, None);
    }

    #[test]
    fn test_adjustment_order_sorted_by_product() {
        let v = PlaceOrderRequest::new(
            "cust-1",
            vec![
                OrderLineRequest::new(9, 1),
                OrderLineRequest::new(3, 1),
                OrderLineRequest::new(9, 2),
                OrderLineRequest::new(1, 1),
            ],
        )
        .validate()
        .unwrap();
        assert_eq!(v.adjustment_order(), vec![3, 1, 0, 2]);
    }

    #[test]
    fn test_pricing_and_total() {
        let a = PricedLine::price(1, &OrderLineRequest::new(1, 2), &snapshot(1, 1000)).unwrap();
        let b = PricedLine::price(2, &OrderLineRequest::new(2, 1), &snapshot(2, 500)).unwrap();

        assert_eq!(a.line_total.cents(), 2000);
        assert_eq!(b.line_total.cents(), 500);
        assert_eq!(a.product_code_snapshot, "P-1");
        assert_eq!(order_total(&[a, b]).unwrap().cents(), 2500);
    }

    #[test]
    fn test_asserted_price_overrides_snapshot() {
        let line = PricedLine::price(
            1,
            &OrderLineRequest::with_unit_price(1, 3, 700),
            &snapshot(1, 1000),
        )
        .unwrap();
        assert_eq!(line.unit_price.cents(), 700);
        assert_eq!(line.line_total.cents(), 2100);
    }

    #[test]
    fn test_line_overflow_is_invalid_quantity() {
        let err = PricedLine::price(1, &OrderLineRequest::new(1, i64::MAX), &snapshot(1, 2))
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidQuantity { line: 1, .. }));
    }
}
