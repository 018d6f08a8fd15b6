//! # Status Normalizer
//!
//! Maps free-form order status strings onto the canonical set.
//!
//! ## One Function, Both Paths
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  WRITE PATH                              READ PATH                      │
//! │  place_order / update_status             list / get order               │
//! │       │                                       │                         │
//! │       ▼                                       ▼                         │
//! │  normalize("Shipped") ──► "shipping"    normalize(row.status)           │
//! │       │                                       │                         │
//! │       ▼                                       ▼                         │
//! │  stored as "shipping"                   displayed as "shipping"         │
//! │                                                                         │
//! │  Unknown input is rejected, never stored verbatim.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//! - Surrounding whitespace is ignored.
//! - Matching is case-insensitive.
//! - `shipped` is a legacy alias of `shipping`.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

/// Canonical order status.
///
/// Serializes to the canonical lowercase form. Deserialization goes
/// through [`normalize`], so JSON input follows the same rules as every
/// other entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order placed, not yet dispatched.
    Pending,
    /// Order handed to the carrier.
    Shipping,
    /// Order delivered.
    Completed,
    /// Order cancelled.
    Cancelled,
}

/// Legacy spellings accepted on input, with their canonical status.
const ALIASES: &[(&str, OrderStatus)] = &[("shipped", OrderStatus::Shipping)];

impl OrderStatus {
    /// Every canonical status, in lifecycle order.
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Shipping,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    /// The stored / displayed form.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Shipping => "shipping",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize(s)
    }
}

impl<'de> Deserialize<'de> for OrderStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        normalize(&raw).map_err(serde::de::Error::custom)
    }
}

/// Normalizes a raw status string.
///
/// ## Example
/// ```rust
/// use inventra_core::status::{normalize, OrderStatus};
///
/// assert_eq!(normalize("SHIPPING").unwrap(), OrderStatus::Shipping);
/// assert_eq!(normalize("Shipped").unwrap(), OrderStatus::Shipping);
/// assert!(normalize("bogus").is_err());
/// ```
pub fn normalize(raw: &str) -> CoreResult<OrderStatus> {
    let key = raw.trim().to_ascii_lowercase();

    if let Some(status) = OrderStatus::ALL.iter().find(|s| s.as_str() == key) {
        return Ok(*status);
    }

    ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, status)| *status)
        .ok_or_else(|| CoreError::InvalidStatus(raw.to_string()))
}

/// Normalizes an optional status, defaulting to `pending` when absent.
pub fn normalize_or_default(raw: Option<&str>) -> CoreResult<OrderStatus> {
    raw.map(normalize)
        .unwrap_or_else(|| Ok(OrderStatus::default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shipping_spellings_agree() {
        let a = normalize("Shipped").unwrap();
        let b = normalize("shipping").unwrap();
        let c = normalize("SHIPPING").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.as_str(), "shipping");
    }

    #[test]
    fn test_canonical_round_trip() {
        for status in OrderStatus::ALL {
            assert_eq!(normalize(status.as_str()).unwrap(), status);
            assert_eq!(status.to_string().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_whitespace_and_case() {
        assert_eq!(normalize("  Completed \n").unwrap(), OrderStatus::Completed);
        assert_eq!(normalize("CANCELLED").unwrap(), OrderStatus::Cancelled);
    }

    #[test]
    fn test_unknown_rejected() {
        assert_eq!(
            normalize("bogus"),
            Err(CoreError::InvalidStatus("bogus".to_string()))
        );
        assert!(normalize("").is_err());
        assert!(normalize("canceled").is_err());
    }

    #[test]
    fn test_default_is_pending() {
        assert_eq!(normalize_or_default(None).unwrap(), OrderStatus::Pending);
        assert_eq!(
            normalize_or_default(Some("shipped")).unwrap(),
            OrderStatus::Shipping
        );
        assert!(normalize_or_default(Some("lost")).is_err());
    }

    #[test]
    fn test_serde_uses_canonical_form() {
        let json = serde_json::to_string(&OrderStatus::Shipping).unwrap();
        assert_eq!(json, "\"shipping\"");

        let legacy: OrderStatus = serde_json::from_str("\"shipped\"").unwrap();
        assert_eq!(legacy, OrderStatus::Shipping);
    }

    #[test]
    fn test_deserialize_matches_normalize() {
        let mixed: OrderStatus = serde_json::from_str("\"Shipped\"").unwrap();
        assert_eq!(mixed, OrderStatus::Shipping);

        let padded: OrderStatus = serde_json::from_str("\" PENDING \"").unwrap();
        assert_eq!(padded, OrderStatus::Pending);

        let err = serde_json::from_str::<OrderStatus>("\"lost\"").unwrap_err();
        assert!(err.to_string().contains("Invalid order status"));
    }
}
