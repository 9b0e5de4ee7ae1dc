//! HTTP handlers for authorization scope endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::scope::{GrantInput, ScopeService, WarehouseGrant};
use crate::models::AuthorizedScope;
use crate::AppState;

/// Get the caller's authorized scope
pub async fn get_my_scope(current_user: CurrentUser) -> Json<AuthorizedScope> {
    Json(current_user.0.scope())
}

/// List warehouse grants of a user
pub async fn list_grants(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<Vec<WarehouseGrant>>> {
    let service = ScopeService::new(state.db);
    let grants = service.list_grants(user_id).await?;
    Ok(Json(grants))
}

/// Grant warehouse access to a user
pub async fn create_grant(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(input): Json<GrantInput>,
) -> AppResult<Json<WarehouseGrant>> {
    let service = ScopeService::new(state.db);
    let grant = service.grant(input).await?;
    Ok(Json(grant))
}

/// Revoke a warehouse grant
pub async fn revoke_grant(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path((user_id, company_code, warehouse_code)): Path<(Uuid, String, String)>,
) -> AppResult<Json<()>> {
    let service = ScopeService::new(state.db);
    service
        .revoke(user_id, &company_code, &warehouse_code)
        .await?;
    Ok(Json(()))
}
