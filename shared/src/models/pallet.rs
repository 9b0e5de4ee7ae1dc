//! Pallet models

use serde::{Deserialize, Serialize};

/// A physical grouping unit that may hold stock of mixed lots/articles
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pallet {
    pub pallet_id: String,
    pub status: PalletStatus,
}

/// Pallet lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PalletStatus {
    Open,
    Closed,
    Shipped,
}

impl PalletStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PalletStatus::Open => "open",
            PalletStatus::Closed => "closed",
            PalletStatus::Shipped => "shipped",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "open" => Some(PalletStatus::Open),
            "closed" => Some(PalletStatus::Closed),
            "shipped" => Some(PalletStatus::Shipped),
            _ => None,
        }
    }
}

impl Pallet {
    /// Only open pallets accept new stock; closed and shipped pallets are
    /// frozen groupings
    pub fn can_receive(&self) -> bool {
        self.status == PalletStatus::Open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_open_pallets_receive() {
        let mut pallet = Pallet {
            pallet_id: "PAL-0001".to_string(),
            status: PalletStatus::Open,
        };
        assert!(pallet.can_receive());
        pallet.status = PalletStatus::Closed;
        assert!(!pallet.can_receive());
        pallet.status = PalletStatus::Shipped;
        assert!(!pallet.can_receive());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [PalletStatus::Open, PalletStatus::Closed, PalletStatus::Shipped] {
            assert_eq!(PalletStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(PalletStatus::from_str("unknown"), None);
    }
}
