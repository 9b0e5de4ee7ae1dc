//! HTTP request handlers

pub mod catalog;
pub mod health;
pub mod reporting;
pub mod scope;
pub mod stock;
pub mod transfer;
pub mod warehouse;

pub use catalog::{get_article, list_articles, resolve_code};
pub use health::health_check;
pub use reporting::get_stock_balances;
pub use scope::{create_grant, get_my_scope, list_grants, revoke_grant};
pub use stock::{
    adjust_stock, list_warehouse_stock, lookup_record, move_stock, receive_stock, release_stock,
    reserve_stock,
};
pub use transfer::create_transfer;
pub use warehouse::{get_location, get_pallet, list_article_lots, list_locations, list_warehouses};
