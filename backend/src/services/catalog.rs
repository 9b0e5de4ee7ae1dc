//! Article catalog service
//!
//! Backs the scan-code resolver: a scanned code matches primary and
//! alternate codes case-insensitively and exactly. Alternate codes may
//! collide across articles; every candidate is returned and the caller
//! (the scanning client's selection dialog) picks exactly one.

use std::collections::BTreeSet;

use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::error::{AppError, AppResult};
use shared::models::Article;
use shared::validation::normalize_scan_code;

/// Catalog service for article lookup and scan resolution
#[derive(Clone)]
pub struct CatalogService {
    db: PgPool,
}

/// Row mapping for article queries
#[derive(Debug, FromRow)]
struct ArticleRow {
    code: String,
    description: String,
    alternate_code: Option<String>,
    allergen_codes: Vec<String>,
}

impl From<ArticleRow> for Article {
    fn from(row: ArticleRow) -> Self {
        Article {
            code: row.code,
            description: row.description,
            alternate_code: row.alternate_code,
            allergen_codes: row.allergen_codes.into_iter().collect::<BTreeSet<_>>(),
        }
    }
}

/// Resolution outcome for a scanned code
#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub code: String,
    pub candidates: Vec<Article>,
}

impl CatalogService {
    /// Create a new CatalogService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Resolve a scanned code to zero, one, or many candidate articles
    pub async fn resolve(&self, raw_code: &str) -> AppResult<ResolveResponse> {
        let code = normalize_scan_code(raw_code).map_err(|msg| AppError::Validation {
            field: "code".to_string(),
            message: msg.to_string(),
        })?;

        let rows = sqlx::query_as::<_, ArticleRow>(
            r#"
            SELECT code, description, alternate_code, allergen_codes
            FROM articles
            WHERE LOWER(code) = LOWER($1) OR LOWER(alternate_code) = LOWER($1)
            ORDER BY code
            "#,
        )
        .bind(&code)
        .fetch_all(&self.db)
        .await?;

        Ok(ResolveResponse {
            code,
            candidates: rows.into_iter().map(Article::from).collect(),
        })
    }

    /// Get an article by primary code
    pub async fn get_article(&self, code: &str) -> AppResult<Article> {
        let row = sqlx::query_as::<_, ArticleRow>(
            r#"
            SELECT code, description, alternate_code, allergen_codes
            FROM articles
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Article".to_string()))?;

        Ok(row.into())
    }

    /// List the catalog (snapshot used by the scanning client's offline index)
    pub async fn list_articles(&self) -> AppResult<Vec<Article>> {
        let rows = sqlx::query_as::<_, ArticleRow>(
            r#"
            SELECT code, description, alternate_code, allergen_codes
            FROM articles
            ORDER BY code
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Article::from).collect())
    }
}
