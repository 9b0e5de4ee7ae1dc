//! Stock records: the ledger's unit of truth
//!
//! A `StockRecord` holds the on-hand and reserved quantities for one
//! composite key. All quantity arithmetic lives here so the invariants
//! (`0 <= reserved <= on_hand`) are enforced in exactly one place; the
//! backend ledger adds locking and persistence around these operations.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stock class dimension of the record key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockType {
    Standard,
    Quarantine,
    Blocked,
}

impl StockType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockType::Standard => "standard",
            StockType::Quarantine => "quarantine",
            StockType::Blocked => "blocked",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "standard" => Some(StockType::Standard),
            "quarantine" => Some(StockType::Quarantine),
            "blocked" => Some(StockType::Blocked),
            _ => None,
        }
    }
}

impl Default for StockType {
    fn default() -> Self {
        StockType::Standard
    }
}

/// Composite key addressing one stock record
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StockRecordKey {
    pub company_code: String,
    pub article_code: String,
    pub warehouse_code: String,
    pub location_code: String,
    /// Empty string for articles without lot tracking
    pub lot_id: String,
    pub pallet_id: Option<String>,
    pub stock_type: StockType,
}

impl std::fmt::Display for StockRecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}/{}/{}/{}",
            self.company_code,
            self.article_code,
            self.warehouse_code,
            self.location_code,
            if self.lot_id.is_empty() { "-" } else { &self.lot_id },
            self.pallet_id.as_deref().unwrap_or("-"),
            self.stock_type.as_str(),
        )
    }
}

/// Quantity bookkeeping for one stock record key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    pub on_hand: Decimal,
    pub reserved: Decimal,
}

/// Invariant violations raised by stock arithmetic
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockError {
    #[error("insufficient stock: requested {requested}, available {available}")]
    Insufficient {
        requested: Decimal,
        available: Decimal,
    },

    #[error("invalid reservation release: requested {requested}, reserved {reserved}")]
    InvalidReservation {
        requested: Decimal,
        reserved: Decimal,
    },

    #[error("adjustment by {delta} would leave on-hand {on_hand} below reserved {reserved}")]
    NegativeStock {
        on_hand: Decimal,
        reserved: Decimal,
        delta: Decimal,
    },

    #[error("quantity must be positive, got {0}")]
    NonPositiveQuantity(Decimal),
}

impl StockRecord {
    pub fn new(on_hand: Decimal, reserved: Decimal) -> Self {
        Self { on_hand, reserved }
    }

    /// Quantity not held by any reservation
    pub fn available(&self) -> Decimal {
        self.on_hand - self.reserved
    }

    /// A record with nothing on hand and nothing reserved may be pruned
    pub fn is_empty(&self) -> bool {
        self.on_hand.is_zero() && self.reserved.is_zero()
    }

    /// Take a reservation against available quantity
    pub fn reserve(&mut self, quantity: Decimal) -> Result<(), StockError> {
        require_positive(quantity)?;
        let available = self.available();
        if quantity > available {
            return Err(StockError::Insufficient {
                requested: quantity,
                available,
            });
        }
        self.reserved += quantity;
        Ok(())
    }

    /// Release part or all of the reservation
    pub fn release(&mut self, quantity: Decimal) -> Result<(), StockError> {
        require_positive(quantity)?;
        if quantity > self.reserved {
            return Err(StockError::InvalidReservation {
                requested: quantity,
                reserved: self.reserved,
            });
        }
        self.reserved -= quantity;
        Ok(())
    }

    /// Change on-hand by a signed delta
    ///
    /// On-hand may never drop below the reserved quantity.
    pub fn adjust(&mut self, delta: Decimal) -> Result<(), StockError> {
        let new_on_hand = self.on_hand + delta;
        if new_on_hand < self.reserved || new_on_hand < Decimal::ZERO {
            return Err(StockError::NegativeStock {
                on_hand: self.on_hand,
                reserved: self.reserved,
                delta,
            });
        }
        self.on_hand = new_on_hand;
        Ok(())
    }
}

fn require_positive(quantity: Decimal) -> Result<(), StockError> {
    if quantity <= Decimal::ZERO {
        return Err(StockError::NonPositiveQuantity(quantity));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_reserve_within_available() {
        let mut record = StockRecord::new(dec("100"), dec("0"));
        record.reserve(dec("40")).unwrap();
        assert_eq!(record.reserved, dec("40"));
        assert_eq!(record.available(), dec("60"));
    }

    #[test]
    fn test_reserve_beyond_available_fails() {
        let mut record = StockRecord::new(dec("10"), dec("5"));
        let err = record.reserve(dec("6")).unwrap_err();
        assert_eq!(
            err,
            StockError::Insufficient {
                requested: dec("6"),
                available: dec("5"),
            }
        );
        // Record untouched on failure
        assert_eq!(record, StockRecord::new(dec("10"), dec("5")));
    }

    #[test]
    fn test_release_beyond_reserved_fails() {
        let mut record = StockRecord::new(dec("10"), dec("3"));
        assert!(record.release(dec("4")).is_err());
        record.release(dec("3")).unwrap();
        assert_eq!(record.reserved, dec("0"));
    }

    #[test]
    fn test_adjust_below_reserved_fails() {
        let mut record = StockRecord::new(dec("10"), dec("4"));
        assert!(record.adjust(dec("-7")).is_err());
        record.adjust(dec("-6")).unwrap();
        assert_eq!(record.on_hand, dec("4"));
    }

    #[test]
    fn test_empty_record_pruning_condition() {
        let mut record = StockRecord::new(dec("5"), dec("0"));
        assert!(!record.is_empty());
        record.adjust(dec("-5")).unwrap();
        assert!(record.is_empty());
    }
}
