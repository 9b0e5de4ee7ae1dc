//! HTTP handlers for catalog and scan-code resolution endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::catalog::{CatalogService, ResolveResponse};
use crate::models::Article;
use crate::AppState;

/// Resolve a scanned code to candidate articles
pub async fn resolve_code(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(code): Path<String>,
) -> AppResult<Json<ResolveResponse>> {
    let service = CatalogService::new(state.db);
    let resolution = service.resolve(&code).await?;
    Ok(Json(resolution))
}

/// Get an article by primary code
pub async fn get_article(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(code): Path<String>,
) -> AppResult<Json<Article>> {
    let service = CatalogService::new(state.db);
    let article = service.get_article(&code).await?;
    Ok(Json(article))
}

/// List the article catalog
pub async fn list_articles(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<Article>>> {
    let service = CatalogService::new(state.db);
    let articles = service.list_articles().await?;
    Ok(Json(articles))
}
