//! Article catalog models

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// An article in the catalog, identified by its primary code
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Article {
    /// Primary article code (identity)
    pub code: String,
    pub description: String,
    /// Alternate code (e.g., EAN). Not guaranteed unique across articles.
    pub alternate_code: Option<String>,
    /// Declared allergen codes (e.g., "GLUTEN", "LACTOSE")
    pub allergen_codes: BTreeSet<String>,
}

impl Article {
    /// True when the given code matches the primary or alternate code,
    /// ignoring ASCII case
    pub fn matches_code(&self, code: &str) -> bool {
        if self.code.eq_ignore_ascii_case(code) {
            return true;
        }
        self.alternate_code
            .as_deref()
            .map(|alt| alt.eq_ignore_ascii_case(code))
            .unwrap_or(false)
    }

    /// True when the article declares no allergens
    pub fn is_allergen_free(&self) -> bool {
        self.allergen_codes.is_empty()
    }
}
