//! # Order Numbers
//!
//! Human-readable order identifiers: `#` followed by a zero-padded
//! sequence value, `#000001`, `#000002`, ...
//!
//! This module only formats and parses. Issuing the next value is the
//! database counter's job (`inventra_db::OrderNumberSequencer`), which
//! increments and returns in one statement. Reading the last order number
//! and adding one in application code would let two concurrent callers
//! produce the same number.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::ORDER_NUMBER_WIDTH;

/// A formatted order number such as `#000042`.
///
/// Serialized as its string form; embedding types export it to
/// TypeScript as `string`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderNumber {
    sequence: u64,
}

impl OrderNumber {
    /// Builds the order number for a counter value.
    ///
    /// ## Example
    /// ```rust
    /// use inventra_core::OrderNumber;
    ///
    /// assert_eq!(OrderNumber::from_sequence(1).to_string(), "#000001");
    /// assert_eq!(OrderNumber::from_sequence(1234567).to_string(), "#1234567");
    /// ```
    pub const fn from_sequence(sequence: u64) -> Self {
        OrderNumber { sequence }
    }

    /// The counter value behind this number.
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Parses `#NNNNNN`.
    ///
    /// At least [`ORDER_NUMBER_WIDTH`] digits are required, and the value
    /// must be positive.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "order_number".to_string(),
            reason: reason.to_string(),
        };

        let digits = raw
            .strip_prefix('#')
            .ok_or_else(|| invalid("must start with '#'"))?;

        if digits.len() < ORDER_NUMBER_WIDTH || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("must be '#' followed by at least 6 digits"));
        }

        let sequence: u64 = digits.parse().map_err(|_| invalid("sequence out of range"))?;
        if sequence == 0 {
            return Err(invalid("sequence starts at 1"));
        }

        Ok(OrderNumber { sequence })
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:0width$}", self.sequence, width = ORDER_NUMBER_WIDTH)
    }
}

impl FromStr for OrderNumber {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderNumber::parse(s)
    }
}

impl TryFrom<String> for OrderNumber {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        OrderNumber::parse(&value)
    }
}

impl From<OrderNumber> for String {
    fn from(number: OrderNumber) -> Self {
        number.to_string()
    }
}
