// sale-node/src/lib.rs

//! CLI harness around the token-sale ledger: TOML configuration,
//! deployment and JSON state persistence.

pub mod config;
pub mod store;

pub use config::SaleConfig;
