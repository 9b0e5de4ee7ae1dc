//! Warehouse and location models

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::Article;

/// A warehouse, identified by `(company_code, warehouse_code)`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Warehouse {
    pub company_code: String,
    pub warehouse_code: String,
    pub center_code: String,
    pub name: String,
}

/// A storage location inside a warehouse
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Location {
    pub warehouse_code: String,
    pub location_code: String,
    /// Allergen whitelist. Empty set = any article allowed.
    pub permitted_allergen_codes: BTreeSet<String>,
}

impl Location {
    /// Allergen compatibility check
    ///
    /// A location with an empty permitted set accepts any article.
    /// Otherwise the article's declared allergens must all be on the
    /// whitelist.
    pub fn accepts(&self, article: &Article) -> bool {
        if self.permitted_allergen_codes.is_empty() {
            return true;
        }
        article
            .allergen_codes
            .is_subset(&self.permitted_allergen_codes)
    }
}
