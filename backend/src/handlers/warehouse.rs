//! HTTP handlers for warehouse master data endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::warehouse::WarehouseService;
use crate::models::{Location, Lot, Pallet, Warehouse};
use crate::AppState;

/// List warehouses of the caller's company
pub async fn list_warehouses(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Warehouse>>> {
    let service = WarehouseService::new(state.db);
    let warehouses = service.list_warehouses(&current_user.0.company_code).await?;
    Ok(Json(warehouses))
}

/// List locations of a warehouse
pub async fn list_locations(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(warehouse_code): Path<String>,
) -> AppResult<Json<Vec<Location>>> {
    let service = WarehouseService::new(state.db);
    let locations = service.list_locations(&warehouse_code).await?;
    Ok(Json(locations))
}

/// Get one location with its allergen whitelist
pub async fn get_location(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path((warehouse_code, location_code)): Path<(String, String)>,
) -> AppResult<Json<Location>> {
    let service = WarehouseService::new(state.db);
    let location = service.get_location(&warehouse_code, &location_code).await?;
    Ok(Json(location))
}

/// Get a pallet by id
pub async fn get_pallet(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(pallet_id): Path<String>,
) -> AppResult<Json<Pallet>> {
    let service = WarehouseService::new(state.db);
    let pallet = service
        .get_pallet(&pallet_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Pallet".to_string()))?;
    Ok(Json(pallet))
}

/// List lots of an article, first-expired-first-out
pub async fn list_article_lots(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(article_code): Path<String>,
) -> AppResult<Json<Vec<Lot>>> {
    let service = WarehouseService::new(state.db);
    let lots = service.list_lots_fefo(&article_code).await?;
    Ok(Json(lots))
}
