//! Catalog resolution for scanned codes
//!
//! Maps a scanned code to zero, one, or many candidate articles. Matching
//! is case-insensitive and exact, against both primary and alternate
//! codes. Alternate codes are not guaranteed unique, so a scan may yield
//! several candidates; the resolver never guesses — the caller must obtain
//! a single selection before acting on the result.

use std::collections::HashMap;

use crate::models::Article;

/// In-memory lookup index over a set of articles
///
/// Built once from a catalog snapshot; used by the scanning client for
/// offline resolution and by tests. The backend resolves against the
/// database with the same matching rule.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    articles: Vec<Article>,
    /// Lowercased code -> indices into `articles`
    by_code: HashMap<String, Vec<usize>>,
}

impl CatalogIndex {
    /// Build an index from a catalog snapshot
    pub fn build(articles: Vec<Article>) -> Self {
        let mut by_code: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, article) in articles.iter().enumerate() {
            let primary = article.code.to_ascii_lowercase();
            by_code.entry(primary).or_default().push(idx);
            if let Some(alt) = &article.alternate_code {
                let alt = alt.to_ascii_lowercase();
                let entry = by_code.entry(alt).or_default();
                // An article whose alternate equals its own primary code
                // must not appear twice for that code
                if !entry.contains(&idx) {
                    entry.push(idx);
                }
            }
        }
        Self { articles, by_code }
    }

    /// Resolve a scanned code to candidate articles
    ///
    /// Returns an empty vec when nothing matches, one element when the
    /// code is unambiguous, and every candidate when an alternate code is
    /// shared by more than one article.
    pub fn resolve(&self, code: &str) -> Vec<Article> {
        let normalized = code.trim().to_ascii_lowercase();
        if normalized.is_empty() {
            return Vec::new();
        }
        self.by_code
            .get(&normalized)
            .map(|indices| indices.iter().map(|&i| self.articles[i].clone()).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}
