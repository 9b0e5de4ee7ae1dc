pub mod audit;
pub mod catalog;
pub mod ledger;
pub mod reporting;
pub mod scope;
pub mod stock_store;
pub mod transfer;
pub mod warehouse;

pub use audit::AuditService;
pub use catalog::CatalogService;
pub use ledger::StockLedger;
pub use reporting::ReportingService;
pub use scope::ScopeService;
pub use stock_store::{InMemoryStockStore, PgStockStore, StockStore};
pub use transfer::{TransferContext, TransferEngine};
pub use warehouse::WarehouseService;
