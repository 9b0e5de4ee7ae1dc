//! Lot (batch) models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A dated production grouping of an article
///
/// A lot is unique per article. An empty `lot_id` means the article is not
/// lot-tracked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Lot {
    pub article_code: String,
    pub lot_id: String,
    pub expiry_date: Option<NaiveDate>,
}

impl Lot {
    /// True when the article carries no lot tracking
    pub fn is_untracked(&self) -> bool {
        self.lot_id.is_empty()
    }

    /// True when the lot has expired as of the given date
    pub fn is_expired_at(&self, date: NaiveDate) -> bool {
        self.expiry_date.map(|exp| exp < date).unwrap_or(false)
    }
}

/// Order lots first-expired-first-out
///
/// Expiry-bearing lots come first, soonest expiry leading; lots without an
/// expiry date sort last. Allocation ordering is a caller policy, not a
/// ledger invariant.
pub fn sort_fefo(lots: &mut [Lot]) {
    lots.sort_by(|a, b| match (a.expiry_date, b.expiry_date) {
        (Some(ea), Some(eb)) => ea.cmp(&eb).then_with(|| a.lot_id.cmp(&b.lot_id)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.lot_id.cmp(&b.lot_id),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lot(id: &str, expiry: Option<&str>) -> Lot {
        Lot {
            article_code: "ART-001".to_string(),
            lot_id: id.to_string(),
            expiry_date: expiry.map(|d| d.parse().unwrap()),
        }
    }

    #[test]
    fn test_fefo_ordering() {
        let mut lots = vec![
            lot("L3", None),
            lot("L1", Some("2026-03-01")),
            lot("L2", Some("2026-01-15")),
        ];
        sort_fefo(&mut lots);
        let ids: Vec<&str> = lots.iter().map(|l| l.lot_id.as_str()).collect();
        assert_eq!(ids, vec!["L2", "L1", "L3"]);
    }

    #[test]
    fn test_untracked_lot() {
        assert!(lot("", None).is_untracked());
        assert!(!lot("L1", None).is_untracked());
    }
}
