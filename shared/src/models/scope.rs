//! Authorized warehouse scope

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Access mode for a scope check
///
/// Read and Write currently evaluate the same grant set; the distinction
/// is kept as a parameter for forward compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessMode {
    Read,
    Write,
}

/// The set of warehouses an identity may read or mutate
///
/// Delivered by the identity provider once per session; an empty or absent
/// warehouse set means no access.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorizedScope {
    pub center_code: String,
    pub company_code: String,
    pub warehouse_codes: BTreeSet<String>,
}

impl AuthorizedScope {
    /// Membership check for a company/warehouse pair
    pub fn allows(&self, company_code: &str, warehouse_code: &str, _mode: AccessMode) -> bool {
        self.company_code == company_code && self.warehouse_codes.contains(warehouse_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope(warehouses: &[&str]) -> AuthorizedScope {
        AuthorizedScope {
            center_code: "C01".to_string(),
            company_code: "ACME".to_string(),
            warehouse_codes: warehouses.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_empty_scope_denies_everything() {
        let scope = scope(&[]);
        assert!(!scope.allows("ACME", "WH1", AccessMode::Read));
        assert!(!scope.allows("ACME", "WH1", AccessMode::Write));
    }

    #[test]
    fn test_membership_required() {
        let scope = scope(&["WH1", "WH2"]);
        assert!(scope.allows("ACME", "WH1", AccessMode::Write));
        assert!(scope.allows("ACME", "WH2", AccessMode::Read));
        assert!(!scope.allows("ACME", "WH3", AccessMode::Read));
    }

    #[test]
    fn test_company_must_match() {
        let scope = scope(&["WH1"]);
        assert!(!scope.allows("OTHER", "WH1", AccessMode::Read));
    }

    #[test]
    fn test_read_and_write_use_same_grants() {
        let scope = scope(&["WH1"]);
        assert_eq!(
            scope.allows("ACME", "WH1", AccessMode::Read),
            scope.allows("ACME", "WH1", AccessMode::Write)
        );
    }
}
