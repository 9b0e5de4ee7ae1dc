//! Transfer request/result models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::StockRecordKey;

/// Destination of a transfer within the same company
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransferDestination {
    pub warehouse_code: String,
    pub location_code: String,
    pub pallet_id: Option<String>,
}

/// A request to move quantity between stock records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
    pub source: StockRecordKey,
    pub destination: TransferDestination,
    pub quantity: Decimal,
    pub requested_by: Uuid,
}

impl TransferRequest {
    /// Stock record key the destination side of this transfer resolves to
    ///
    /// Company, article, lot and stock type carry over from the source;
    /// only the physical placement changes.
    pub fn destination_key(&self) -> StockRecordKey {
        StockRecordKey {
            company_code: self.source.company_code.clone(),
            article_code: self.source.article_code.clone(),
            warehouse_code: self.destination.warehouse_code.clone(),
            location_code: self.destination.location_code.clone(),
            lot_id: self.source.lot_id.clone(),
            pallet_id: self.destination.pallet_id.clone(),
            stock_type: self.source.stock_type,
        }
    }
}

/// Shortfall policy when availability does not cover the request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferPolicy {
    /// Reject the whole transfer when availability is short (default)
    #[default]
    AllOrNothing,
    /// Move as much as is available, report the applied quantity
    PartialFill,
}

/// Terminal status of a transfer request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    Applied,
    PartiallyApplied,
    Rejected,
    RolledBack,
}

impl TransferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Applied => "applied",
            TransferStatus::PartiallyApplied => "partially_applied",
            TransferStatus::Rejected => "rejected",
            TransferStatus::RolledBack => "rolled_back",
        }
    }
}

/// Outcome reported for every transfer request
///
/// Non-applied terminal states carry a machine-readable error code and a
/// human-readable reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferResult {
    pub status: TransferStatus,
    pub requested_quantity: Decimal,
    pub applied_quantity: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
