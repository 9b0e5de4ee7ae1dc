//! Route definitions for the Warehouse Stock Management Platform

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Protected routes - catalog and scan resolution
        .nest("/catalog", catalog_routes())
        // Protected routes - warehouse master data
        .nest("/warehouses", warehouse_routes())
        // Protected routes - pallets
        .nest("/pallets", pallet_routes())
        // Protected routes - stock ledger
        .nest("/stock", stock_routes())
        // Protected routes - transfers
        .nest("/transfers", transfer_routes())
        // Protected routes - authorization scope
        .nest("/scope", scope_routes())
        // Protected routes - reporting
        .nest("/reports", reporting_routes())
}

/// Catalog routes (protected)
fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/articles", get(handlers::list_articles))
        .route("/articles/:code", get(handlers::get_article))
        .route("/articles/:code/lots", get(handlers::list_article_lots))
        .route("/resolve/:code", get(handlers::resolve_code))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Warehouse master data routes (protected)
fn warehouse_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_warehouses))
        .route("/:warehouse_code/locations", get(handlers::list_locations))
        .route(
            "/:warehouse_code/locations/:location_code",
            get(handlers::get_location),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Pallet routes (protected)
fn pallet_routes() -> Router<AppState> {
    Router::new()
        .route("/:pallet_id", get(handlers::get_pallet))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Stock ledger routes (protected)
fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/lookup", post(handlers::lookup_record))
        .route("/receive", post(handlers::receive_stock))
        .route("/reserve", post(handlers::reserve_stock))
        .route("/release", post(handlers::release_stock))
        .route("/adjust", post(handlers::adjust_stock))
        .route("/move", post(handlers::move_stock))
        .route(
            "/warehouse/:warehouse_code",
            get(handlers::list_warehouse_stock),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Transfer routes (protected)
fn transfer_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_transfer))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Authorization scope routes (protected)
fn scope_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(handlers::get_my_scope))
        .route("/grants", post(handlers::create_grant))
        .route("/grants/:user_id", get(handlers::list_grants))
        .route(
            "/grants/:user_id/:company_code/:warehouse_code",
            delete(handlers::revoke_grant),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Reporting routes (protected)
fn reporting_routes() -> Router<AppState> {
    Router::new()
        .route("/stock-balances", get(handlers::get_stock_balances))
        .route_layer(middleware::from_fn(auth_middleware))
}
