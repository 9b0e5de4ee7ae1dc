//! Catalog resolution tests
//!
//! Property-based and unit tests for scan-code resolution:
//! - Every article is reachable through its own primary code
//! - Matching is exact and case-insensitive, never fuzzy
//! - Shared alternate codes yield every candidate

use proptest::prelude::*;
use std::collections::BTreeSet;

use shared::catalog::CatalogIndex;
use shared::models::Article;

fn article(code: &str, alternate: Option<&str>) -> Article {
    Article {
        code: code.to_string(),
        description: format!("Article {}", code),
        alternate_code: alternate.map(|s| s.to_string()),
        allergen_codes: BTreeSet::new(),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_empty_catalog_resolves_nothing() {
        let index = CatalogIndex::build(Vec::new());
        assert!(index.is_empty());
        assert!(index.resolve("ART-001").is_empty());
    }

    #[test]
    fn test_no_fuzzy_matching() {
        let index = CatalogIndex::build(vec![article("ART-001", None)]);
        assert!(index.resolve("ART-00").is_empty());
        assert!(index.resolve("ART-0011").is_empty());
        assert!(index.resolve("ART").is_empty());
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        let index = CatalogIndex::build(vec![article("ART-001", None)]);
        assert_eq!(index.resolve("  ART-001  ").len(), 1);
        assert_eq!(index.resolve("\tart-001\n").len(), 1);
    }

    #[test]
    fn test_alternate_collision_returns_every_candidate() {
        let index = CatalogIndex::build(vec![
            article("ART-001", Some("4006381333931")),
            article("ART-002", Some("4006381333931")),
            article("ART-003", Some("9990000000000")),
        ]);

        let mut codes: Vec<String> = index
            .resolve("4006381333931")
            .into_iter()
            .map(|a| a.code)
            .collect();
        codes.sort();
        assert_eq!(codes, vec!["ART-001", "ART-002"]);
        assert_eq!(index.resolve("9990000000000").len(), 1);
    }

    #[test]
    fn test_primary_and_alternate_of_same_article() {
        let index = CatalogIndex::build(vec![article("ART-001", Some("EAN-1"))]);
        assert_eq!(index.resolve("ART-001").len(), 1);
        assert_eq!(index.resolve("EAN-1").len(), 1);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

/// Generate valid article codes
fn code_strategy() -> impl Strategy<Value = String> {
    "[A-Z0-9]{3,12}"
}

proptest! {
    /// Property: every article resolves through its own primary code
    #[test]
    fn prop_primary_code_always_resolves(codes in prop::collection::btree_set(code_strategy(), 1..20)) {
        let articles: Vec<Article> = codes.iter().map(|c| article(c, None)).collect();
        let index = CatalogIndex::build(articles);

        for code in &codes {
            let candidates = index.resolve(code);
            prop_assert!(candidates.iter().any(|a| &a.code == code));
        }
    }

    /// Property: resolution is case-insensitive in both directions
    #[test]
    fn prop_resolution_ignores_case(code in code_strategy()) {
        let index = CatalogIndex::build(vec![article(&code, None)]);

        prop_assert_eq!(index.resolve(&code.to_lowercase()).len(), 1);
        prop_assert_eq!(index.resolve(&code.to_uppercase()).len(), 1);
    }

    /// Property: codes absent from the catalog never resolve
    #[test]
    fn prop_unknown_codes_resolve_to_empty(
        known in code_strategy(),
        unknown in code_strategy(),
    ) {
        prop_assume!(known != unknown);
        let index = CatalogIndex::build(vec![article(&known, None)]);
        prop_assert!(index.resolve(&unknown).is_empty());
    }

    /// Property: an alternate code shared by N articles yields N candidates
    #[test]
    fn prop_shared_alternate_yields_all_owners(
        codes in prop::collection::btree_set(code_strategy(), 2..10),
        alternate in "[0-9]{13}",
    ) {
        prop_assume!(!codes.contains(&alternate));
        let articles: Vec<Article> = codes
            .iter()
            .map(|c| article(c, Some(&alternate)))
            .collect();
        let expected = articles.len();
        let index = CatalogIndex::build(articles);

        prop_assert_eq!(index.resolve(&alternate).len(), expected);
    }
}
