//! Domain models for the Warehouse Stock Management Platform

mod article;
mod lot;
mod pallet;
mod scope;
mod stock;
mod transfer;
mod warehouse;

pub use article::*;
pub use lot::*;
pub use pallet::*;
pub use scope::*;
pub use stock::*;
pub use transfer::*;
pub use warehouse::*;
