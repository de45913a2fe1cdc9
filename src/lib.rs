//! Per-user shopping carts kept consistent with a product catalog, served
//! over a small axum API.

pub mod api;
pub mod config;
pub mod entities;
pub mod ledger;
pub mod middleware;
