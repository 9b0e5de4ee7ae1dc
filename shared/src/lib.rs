//! Shared types and domain logic for the Warehouse Stock Management Platform
//!
//! This crate contains types shared between the backend, the scanning
//! client (via WASM), and other components of the system. Everything in
//! here is pure: no IO, no async, no storage.

pub mod catalog;
pub mod models;
pub mod types;
pub mod validation;

pub use catalog::*;
pub use models::*;
pub use types::*;
pub use validation::*;
